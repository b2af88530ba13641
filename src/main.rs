use structopt::StructOpt;

use crate::cli::commands::Command;
use crate::cli::Tilefish;

mod cli;

fn main() {
    env_logger::init();
    Tilefish::from_args().execute();
}
