use super::piece::PieceKind;
use super::square::Square;

/// One side's roster, ordered with the king first, then queens, rooks,
/// bishops, knights, and pawns. Move enumeration and evaluation walk this
/// order, so it is maintained across every insertion and removal; undo
/// restores captured entries at their original index to keep the order
/// byte-for-byte stable across a make/unmake cycle.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PieceList {
    entries: Vec<ListEntry>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ListEntry {
    pub square: Square,
    pub kind: PieceKind,
}

fn kind_order(kind: PieceKind) -> u8 {
    match kind {
        PieceKind::King => 0,
        PieceKind::Queen => 1,
        PieceKind::Rook => 2,
        PieceKind::Bishop => 3,
        PieceKind::Knight => 4,
        PieceKind::Pawn => 5,
    }
}

impl PieceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn king_square(&self) -> Option<Square> {
        match self.entries.first() {
            Some(entry) if entry.kind == PieceKind::King => Some(entry.square),
            _ => None,
        }
    }

    pub fn count_of(&self, kind: PieceKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Inserts at the end of the entry's kind group, keeping the king-first
    /// descending-material order.
    pub fn insert_sorted(&mut self, square: Square, kind: PieceKind) -> usize {
        let order = kind_order(kind);
        let index = self
            .entries
            .iter()
            .position(|e| kind_order(e.kind) > order)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, ListEntry { square, kind });
        index
    }

    pub fn index_of(&self, square: Square) -> Option<usize> {
        self.entries.iter().position(|e| e.square == square)
    }

    pub fn remove_at(&mut self, index: usize) -> ListEntry {
        self.entries.remove(index)
    }

    /// Position-preserving reinsertion used by move undo.
    pub fn insert_at(&mut self, index: usize, entry: ListEntry) {
        self.entries.insert(index, entry);
    }

    pub fn relocate(&mut self, from: Square, to: Square) -> Option<usize> {
        let index = self.index_of(from)?;
        self.entries[index].square = to;
        Some(index)
    }

    pub fn is_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| kind_order(pair[0].kind) <= kind_order(pair[1].kind))
    }
}
