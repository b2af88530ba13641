//! CLI argument parsing using StructOpt.

use structopt::StructOpt;

use crate::cli::commands::{
    best_move::BestMoveArgs, count_positions::CountPositionsArgs, play::PlayArgs,
};

#[derive(StructOpt)]
#[structopt(name = "tilefish", about = "A tile-list chess engine")]
pub enum Tilefish {
    #[structopt(
        name = "best-move",
        about = "Determine the best move for the side to move. The position is read as piece descriptor lines (`<color> <kind> <square> <move-count>`) from stdin, or the standard starting position with `--start`. Prints the chosen move and the full resulting piece list."
    )]
    BestMove(BestMoveArgs),
    #[structopt(
        name = "count-positions",
        about = "Count the reachable positions from the starting position for each depth up to `--depth` (default: 4), and report the time taken."
    )]
    CountPositions(CountPositionsArgs),
    #[structopt(
        name = "play",
        about = "Watch the engine play against itself at the given `--difficulty` (default: casual), printing the board after every move."
    )]
    Play(PlayArgs),
}

impl crate::cli::commands::Command for Tilefish {
    fn execute(self) {
        match self {
            Self::BestMove(cmd) => cmd.execute(),
            Self::CountPositions(cmd) => cmd.execute(),
            Self::Play(cmd) => cmd.execute(),
        }
    }
}
