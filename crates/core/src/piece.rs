//! Piece instances as they live on the grid.

use crate::types::{Coord, PieceId, PieceTypeId};

/// One piece on the board.
///
/// A piece only exists inside a grid cell (or transiently between being
/// spawned and placed). `coord` always mirrors the cell holding it; the grid
/// keeps it in sync on every placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    id: PieceId,
    kind: PieceTypeId,
    pub(crate) coord: Coord,
    pub(crate) selected: bool,
}

impl Piece {
    /// Create an unplaced piece
    pub fn new(id: PieceId, kind: PieceTypeId) -> Self {
        Self {
            id,
            kind,
            coord: Coord::default(),
            selected: false,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceTypeId {
        self.kind
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Match equality: same type, regardless of identity
    pub fn matches(&self, other: &Piece) -> bool {
        self.kind == other.kind
    }
}
