pub mod board;
pub mod chess_move;
pub mod engine;
pub mod evaluate;
pub mod move_generation;
pub mod searcher;
