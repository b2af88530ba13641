//! Best move command - choose a move for the side to move.

use std::io::{self, BufRead};

use structopt::StructOpt;
use tilefish::board::color::Color;
use tilefish::board::Board;
use tilefish::engine::{
    board_from_descriptors, Difficulty, Engine, PieceDescriptor, SearchMode,
};

use super::Command;

#[derive(StructOpt)]
pub struct BestMoveArgs {
    #[structopt(short, long, default_value = "casual")]
    pub difficulty: Difficulty,
    #[structopt(short, long, default_value = "sequential")]
    pub mode: SearchMode,
    #[structopt(short, long, default_value = "white", help = "Side to move")]
    pub turn: Color,
    #[structopt(long, help = "Use the standard starting position instead of stdin")]
    pub start: bool,
}

impl Command for BestMoveArgs {
    fn execute(self) {
        let mut board = if self.start {
            let mut board = Board::starting_position();
            board.set_turn(self.turn);
            board
        } else {
            match read_position(self.turn) {
                Ok(board) => board,
                Err(error) => {
                    eprintln!("could not read the position: {}", error);
                    std::process::exit(1);
                }
            }
        };

        let mut engine = Engine::new(self.difficulty, self.mode);
        match engine.choose_move(&mut board) {
            Ok(Some(chosen)) => {
                println!("{}", chosen.description);
                for descriptor in &chosen.pieces {
                    println!("{}", descriptor);
                }
            }
            Ok(None) => println!("no legal moves: game over"),
            Err(error) => {
                eprintln!("failed to choose a move: {}", error);
                std::process::exit(1);
            }
        }
    }
}

/// Reads descriptor lines from stdin until EOF or a blank line.
fn read_position(turn: Color) -> Result<Board, String> {
    let stdin = io::stdin();
    let mut descriptors: Vec<PieceDescriptor> = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        descriptors.push(line.parse().map_err(|e| format!("{}", e))?);
    }
    board_from_descriptors(&descriptors, turn).map_err(|e| e.to_string())
}
