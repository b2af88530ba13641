//! Play command - the engine plays against itself.

use structopt::StructOpt;
use tilefish::board::Board;
use tilefish::chess_move::apply::apply;
use tilefish::engine::{Difficulty, Engine, SearchMode};

use super::Command;

#[derive(StructOpt)]
pub struct PlayArgs {
    #[structopt(short, long, default_value = "casual")]
    pub difficulty: Difficulty,
    #[structopt(short, long, default_value = "parallel")]
    pub mode: SearchMode,
    #[structopt(long, default_value = "200", help = "Stop after this many half-moves")]
    pub moves: u32,
}

impl Command for PlayArgs {
    fn execute(self) {
        let mut board = Board::starting_position();
        let mut engine = Engine::new(self.difficulty, self.mode);
        println!("{}", board);

        for half_move in 1..=self.moves {
            let chosen = match engine.choose_move(&mut board) {
                Ok(Some(chosen)) => chosen,
                Ok(None) => {
                    println!("{} has no legal moves: game over", board.turn());
                    return;
                }
                Err(error) => {
                    eprintln!("engine error: {}", error);
                    std::process::exit(1);
                }
            };

            if let Err(error) = apply(&mut board, &chosen.chess_move) {
                eprintln!("could not apply {}: {}", chosen.description, error);
                std::process::exit(1);
            }
            board.toggle_turn();

            println!(
                "{}. {} plays {} (score {}, depth {})",
                half_move,
                board.turn().opposite(),
                chosen.description,
                chosen.score,
                chosen.depth
            );
            println!("{}", board);
        }
        println!("move limit reached");
    }
}
