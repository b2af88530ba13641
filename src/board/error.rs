use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("square ({row}, {col}) is out of range")]
    SquareOutOfRange { row: u8, col: u8 },
    #[error("tile index {index} is out of range")]
    IndexOutOfRange { index: usize },
    #[error("`{coord}` is not a valid algebraic square")]
    InvalidAlgebraicSquare { coord: String },
    #[error("cannot put a piece on a square that is already occupied")]
    SquareOccupied,
    #[error("cannot apply chess move, the `from` square is empty")]
    FromSquareIsEmpty,
    #[error("castle operation was not applied to a king")]
    CastleNonKing,
    #[error("castle operation expected an unmoved rook")]
    CastleMissingRook,
    #[error("promotion square did not contain a pawn")]
    PromotionNonPawn,
    #[error("`{descriptor}` is not a valid piece descriptor")]
    InvalidPieceDescriptor { descriptor: String },
    #[error("position has no {color} king")]
    MissingKing { color: crate::board::color::Color },
    #[error("board occupancy and piece lists disagree at {square}")]
    ListBoardMismatch { square: crate::board::square::Square },
}
