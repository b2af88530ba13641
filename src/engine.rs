//! The engine facade consumed by the game-loop collaborator.
//!
//! A position enters as an ordered list of piece descriptors plus a time
//! budget, and leaves as a chosen move description with the complete
//! resulting piece list (white pieces then black pieces), or `None` when the
//! side to move has no legal move — an end-of-game signal, not an error.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use thiserror::Error;

use crate::board::color::Color;
use crate::board::error::BoardError;
use crate::board::piece::{Piece, PieceKind};
use crate::board::square::Square;
use crate::board::Board;
use crate::chess_move::ChessMove;
use crate::searcher::deepening::{deepen_candidates, enumerate_candidates};
use crate::searcher::parallel::deepen_candidates_parallel;
use crate::searcher::repetition::{select_candidate, RepetitionTable};
use crate::searcher::{SearchContext, SearchError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration error: {message}")]
    Config { message: String },
    #[error("board error: {0}")]
    Board(#[from] BoardError),
    #[error("search error: {0}")]
    Search(#[from] SearchError),
    #[error("internal invariant violated: {detail}")]
    Invariant { detail: String },
}

/// Fixed (search-time, max-depth) pairs. An unrecognized level is rejected
/// at construction time, before any engine state exists.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Difficulty {
    Novice,
    Casual,
    Club,
    Expert,
    Master,
}

impl Difficulty {
    pub fn time_budget(&self) -> Duration {
        let seconds = match self {
            Difficulty::Novice => 1,
            Difficulty::Casual => 3,
            Difficulty::Club => 8,
            Difficulty::Expert => 20,
            Difficulty::Master => 45,
        };
        Duration::from_secs(seconds)
    }

    pub fn max_depth(&self) -> u8 {
        match self {
            Difficulty::Novice => 2,
            Difficulty::Casual => 3,
            Difficulty::Club => 4,
            Difficulty::Expert => 5,
            Difficulty::Master => 6,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;
    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level {
            "novice" => Ok(Difficulty::Novice),
            "casual" => Ok(Difficulty::Casual),
            "club" => Ok(Difficulty::Club),
            "expert" => Ok(Difficulty::Expert),
            "master" => Ok(Difficulty::Master),
            other => Err(format!(
                "unrecognized difficulty `{}`; options are: novice, casual, club, expert, master",
                other
            )),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchMode {
    Sequential,
    Parallel,
}

impl FromStr for SearchMode {
    type Err = String;
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "sequential" => Ok(SearchMode::Sequential),
            "parallel" => Ok(SearchMode::Parallel),
            other => Err(format!(
                "unrecognized search mode `{}`; options are: sequential, parallel",
                other
            )),
        }
    }
}

/// One piece in the wire format shared with the collaborator:
/// `<color> <kind> <square> <move-count>`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PieceDescriptor {
    pub kind: PieceKind,
    pub color: Color,
    pub square: Square,
    pub move_count: u16,
}

impl fmt::Display for PieceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.color, self.kind, self.square, self.move_count
        )
    }
}

impl FromStr for PieceDescriptor {
    type Err = BoardError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let invalid = || BoardError::InvalidPieceDescriptor {
            descriptor: line.to_string(),
        };
        let mut parts = line.split_whitespace();
        let color = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        let kind = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        let square = Square::from_algebraic(parts.next().ok_or_else(invalid)?)?;
        let move_count = parts
            .next()
            .ok_or_else(invalid)?
            .parse()
            .map_err(|_| invalid())?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            kind,
            color,
            square,
            move_count,
        })
    }
}

/// Builds a board from descriptors with `turn` to move. Both kings must be
/// present and no square may be listed twice.
pub fn board_from_descriptors(
    descriptors: &[PieceDescriptor],
    turn: Color,
) -> Result<Board, EngineError> {
    let mut board = Board::new();
    for descriptor in descriptors {
        board.put(
            descriptor.square,
            Piece::with_move_count(descriptor.kind, descriptor.color, descriptor.move_count),
        )?;
    }
    for &color in &Color::ALL {
        board.king_square(color)?;
    }
    board.set_turn(turn);
    Ok(board)
}

/// The complete piece list in descriptor order: white pieces then black
/// pieces, each side in its king-first sorted order.
pub fn descriptors_from_board(board: &Board) -> Vec<PieceDescriptor> {
    let mut descriptors = Vec::with_capacity(32);
    for &color in &[Color::White, Color::Black] {
        for entry in board.pieces(color).entries() {
            let piece = board
                .piece_at(entry.square)
                .expect("piece lists agree with the board");
            descriptors.push(PieceDescriptor {
                kind: piece.kind,
                color,
                square: entry.square,
                move_count: piece.move_count,
            });
        }
    }
    descriptors
}

/// The engine's answer: the move played, its description, and the full
/// resulting piece list.
#[derive(Clone, Debug)]
pub struct ChosenMove {
    pub chess_move: ChessMove,
    pub description: String,
    pub pieces: Vec<PieceDescriptor>,
    pub score: i32,
    pub depth: u8,
}

pub struct Engine {
    time_budget: Duration,
    max_depth: u8,
    mode: SearchMode,
    repetitions: RepetitionTable,
    scanned: Arc<AtomicUsize>,
}

impl Engine {
    pub fn new(difficulty: Difficulty, mode: SearchMode) -> Self {
        Self {
            time_budget: difficulty.time_budget(),
            max_depth: difficulty.max_depth(),
            mode,
            repetitions: RepetitionTable::new(),
            scanned: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    pub fn scanned_count(&self) -> usize {
        self.scanned.load(Ordering::Relaxed)
    }

    /// Selects the best move for the side to move, or `None` when there is
    /// no legal move (checkmate or stalemate). The board is restored to its
    /// entry state; the caller applies the chosen move or consumes the
    /// returned piece list.
    pub fn choose_move(&mut self, board: &mut Board) -> Result<Option<ChosenMove>, EngineError> {
        board.recompute_protections();
        board.validate().map_err(|error| EngineError::Invariant {
            detail: error.to_string(),
        })?;

        let color = board.turn();
        let mut candidates = enumerate_candidates(board, color)?;
        if candidates.is_empty() {
            info!("{} has no legal moves: game over", color);
            return Ok(None);
        }

        let deadline = Instant::now() + self.time_budget;
        let completed_depth = match self.mode {
            SearchMode::Sequential => {
                let mut context = SearchContext::with_counter(deadline, Arc::clone(&self.scanned));
                deepen_candidates(&mut context, &mut candidates, color, self.max_depth)?
            }
            SearchMode::Parallel => deepen_candidates_parallel(
                &mut candidates,
                color,
                self.max_depth,
                deadline,
                Arc::clone(&self.scanned),
            )?,
        };

        let index = select_candidate(&candidates, &self.repetitions);
        let chosen = &candidates[index];
        self.repetitions.record_selection(chosen.position.encode());

        info!(
            "{} plays {} (score {}, depth {}, {} positions scanned)",
            color,
            chosen.description,
            chosen.score,
            completed_depth,
            self.scanned_count()
        );

        let mut resulting = chosen.position.clone();
        resulting.set_turn(color.opposite());
        Ok(Some(ChosenMove {
            chess_move: chosen.chess_move,
            description: chosen.description.clone(),
            pieces: descriptors_from_board(&resulting),
            score: chosen.score,
            depth: completed_depth,
        }))
    }

    pub fn repetitions(&self) -> &RepetitionTable {
        &self.repetitions
    }

    pub fn export_repetitions(&self) -> Result<String, EngineError> {
        self.repetitions.to_json().map_err(|error| EngineError::Config {
            message: format!("could not serialize repetition table: {}", error),
        })
    }

    pub fn import_repetitions(&mut self, json: &str) -> Result<(), EngineError> {
        self.repetitions = RepetitionTable::from_json(json).map_err(|error| EngineError::Config {
            message: format!("could not parse repetition table: {}", error),
        })?;
        Ok(())
    }

    /// Drops per-game state. Required between independent games so stale
    /// repetition counts do not leak across.
    pub fn new_game(&mut self) {
        self.repetitions.clear();
        self.scanned.store(0, Ordering::Relaxed);
    }
}
