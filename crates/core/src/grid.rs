//! Grid module - the authoritative board of pieces
//!
//! A `width x height` grid where each cell holds one piece or is empty.
//! Uses a flat vector in row-major order (`y * width + x`) for cache locality.
//! Coordinates: `(x, y)` with `(0, 0)` at the bottom-left; row 0 is the floor.
//!
//! Out-of-bounds reads are not errors: [`Grid::get`] returns `None` so match
//! and hint probes can look past the edges freely.

use arrayvec::ArrayVec;

use crate::error::{ConfigError, GridError};
use crate::piece::Piece;
use crate::types::{Coord, Direction, PieceTypeId, WorldPos};

/// Final resting place of a dropping piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    /// Row the piece comes to rest on
    pub row: i32,
    /// Number of rows descended
    pub rows: u32,
}

/// The board grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u16,
    height: u16,
    /// World position of the bottom-left cell
    origin: Coord,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Option<Piece>>,
}

impl Grid {
    /// Create an empty grid centred on `center`
    pub fn new(width: u16, height: u16, center: Coord) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::InvalidWidth(width));
        }
        if height == 0 {
            return Err(ConfigError::InvalidHeight(height));
        }

        let origin = Coord::new(
            center.x - i32::from(width) / 2,
            center.y - i32::from(height) / 2,
        );
        let len = usize::from(width) * usize::from(height);

        Ok(Self {
            width,
            height,
            origin,
            cells: vec![None; len],
        })
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some((y as usize) * usize::from(self.width) + (x as usize))
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.index(c.x, c.y).is_some()
    }

    /// Piece at (x, y); `None` for empty or out-of-bounds cells
    pub fn get(&self, x: i32, y: i32) -> Option<&Piece> {
        self.index(x, y).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn get_at(&self, c: Coord) -> Option<&Piece> {
        self.get(c.x, c.y)
    }

    pub(crate) fn get_mut(&mut self, c: Coord) -> Option<&mut Piece> {
        let idx = self.index(c.x, c.y)?;
        self.cells[idx].as_mut()
    }

    /// Type at (x, y); `None` is the "no type" sentinel for empty or off-grid probes
    pub fn kind_at(&self, x: i32, y: i32) -> Option<PieceTypeId> {
        self.get(x, y).map(Piece::kind)
    }

    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some() && self.get(x, y).is_none()
    }

    /// Place a piece, updating its stored coordinate.
    ///
    /// Returns the previous occupant, which the caller now owns.
    pub fn set(&mut self, x: i32, y: i32, mut piece: Piece) -> Result<Option<Piece>, GridError> {
        let idx = self.index(x, y).ok_or(GridError::OutOfBounds { x, y })?;
        piece.coord = Coord::new(x, y);
        Ok(self.cells[idx].replace(piece))
    }

    /// Remove and return the piece at (x, y)
    pub fn clear(&mut self, x: i32, y: i32) -> Option<Piece> {
        let idx = self.index(x, y)?;
        self.cells[idx].take()
    }

    /// Remove every piece
    pub fn clear_all(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Exchange the contents of two cells (either may be empty)
    pub fn swap(&mut self, a: Coord, b: Coord) -> Result<(), GridError> {
        let ia = self.index(a.x, a.y).ok_or(GridError::OutOfBounds { x: a.x, y: a.y })?;
        let ib = self.index(b.x, b.y).ok_or(GridError::OutOfBounds { x: b.x, y: b.y })?;
        self.cells.swap(ia, ib);
        if let Some(p) = self.cells[ia].as_mut() {
            p.coord = a;
        }
        if let Some(p) = self.cells[ib].as_mut() {
            p.coord = b;
        }
        Ok(())
    }

    /// Orthogonal adjacency: Manhattan distance exactly 1
    pub fn is_adjacent(a: Coord, b: Coord) -> bool {
        a.is_adjacent(b)
    }

    /// True iff y > 0 and the cell directly below is empty
    pub fn can_drop(&self, x: i32, y: i32) -> bool {
        y > 0 && self.is_empty_at(x, y - 1)
    }

    /// Simulate repeated one-cell descent from (x, y).
    ///
    /// Bounded by the grid height; exceeding it means the grid is corrupt and
    /// is reported as [`GridError::DropOverrun`].
    pub fn drop_target(&self, x: i32, y: i32) -> Result<DropTarget, GridError> {
        let limit = u32::from(self.height);
        let mut row = y;
        let mut rows = 0u32;

        while self.can_drop(x, row) {
            rows += 1;
            row -= 1;
            // Unreachable on a consistent grid: only corrupt state gets here.
            if rows > limit {
                return Err(GridError::DropOverrun { x, y, limit });
            }
        }

        Ok(DropTarget { row, rows })
    }

    /// Types of the two nearest cells to the left and the two nearest below.
    ///
    /// Empty and off-grid probes contribute nothing.
    pub fn refill_exclusions(&self, x: i32, y: i32) -> ArrayVec<PieceTypeId, 4> {
        [(x - 1, y), (x - 2, y), (x, y - 1), (x, y - 2)]
            .into_iter()
            .filter_map(|(px, py)| self.kind_at(px, py))
            .collect()
    }

    /// Bottom-left world anchor: `center - size / 2`
    pub fn origin(&self) -> Coord {
        self.origin
    }

    /// World placement of a cell: `origin + (x, y)`
    pub fn world_position(&self, c: Coord) -> WorldPos {
        WorldPos::new(
            (self.origin.x + c.x) as f32,
            (self.origin.y + c.y) as f32,
        )
    }

    /// Cell under a world position, if it lies on the board
    pub fn coord_at_world(&self, pos: WorldPos) -> Option<Coord> {
        let c = Coord::new(
            (pos.x - self.origin.x as f32).round() as i32,
            (pos.y - self.origin.y as f32).round() as i32,
        );
        self.contains(c).then_some(c)
    }

    /// Neighbouring coordinate in `dir`, if it lies on the board
    pub fn neighbor(&self, c: Coord, dir: Direction) -> Option<Coord> {
        let n = c.step(dir);
        self.contains(n).then_some(n)
    }

    /// All coordinates in row-major order: bottom row first, left to right
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let w = i32::from(self.width);
        let h = i32::from(self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Coord::new(x, y)))
    }

    /// Occupied cells in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().filter_map(Option::as_ref)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Sorted multiset of the types on the board
    pub fn kind_histogram(&self) -> Vec<PieceTypeId> {
        let mut kinds: Vec<PieceTypeId> = self.pieces().map(Piece::kind).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Replace the contents from text rows in the [`Grid::to_text`] format.
    ///
    /// Rows are top first; each glyph is a base-36 type id or `.` for empty.
    /// `spawn` creates the piece for each type.
    pub fn fill_from_text(
        &mut self,
        rows: &[&str],
        mut spawn: impl FnMut(PieceTypeId) -> Piece,
    ) -> Result<(), GridError> {
        let mismatch = |width: usize| GridError::LayoutMismatch {
            width,
            height: rows.len(),
            expected_width: self.width,
            expected_height: self.height,
        };
        if rows.len() != usize::from(self.height) {
            return Err(mismatch(rows.first().map_or(0, |r| r.chars().count())));
        }
        if let Some(row) = rows.iter().find(|r| r.chars().count() != usize::from(self.width)) {
            return Err(mismatch(row.chars().count()));
        }

        let mut kinds = Vec::with_capacity(self.cells.len());
        for (r, row) in rows.iter().enumerate() {
            let y = i32::from(self.height) - 1 - r as i32;
            for (x, ch) in row.chars().enumerate() {
                let kind = match ch {
                    '.' => None,
                    _ => Some(ch.to_digit(36).ok_or(GridError::UnknownGlyph(ch))?),
                };
                kinds.push((x as i32, y, kind));
            }
        }

        self.clear_all();
        for (x, y, kind) in kinds {
            if let Some(kind) = kind {
                self.set(x, y, spawn(PieceTypeId(kind)))?;
            }
        }
        Ok(())
    }

    /// Render the grid as text rows, top row first.
    ///
    /// Each cell is the type id modulo 36 in base 36, `.` for empty.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for y in (0..i32::from(self.height)).rev() {
            for x in 0..i32::from(self.width) {
                let ch = match self.kind_at(x, y) {
                    Some(kind) => std::char::from_digit(kind.0 % 36, 36).unwrap_or('?'),
                    None => '.',
                };
                out.push(ch);
            }
            if y > 0 {
                out.push('\n');
            }
        }
        out
    }
}
