//! Match detection - runs, board scans and hint search
//!
//! A run is a maximal line of same-typed pieces along one axis; a match is a
//! run of at least [`MIN_MATCH_LEN`]. Board scans only look forward
//! (towards +x and +y) from each cell so every run is found from its first
//! cell without double counting.
//!
//! The hint search never mutates the grid. For a candidate piece and
//! direction it checks, with local lookups only, whether the piece would
//! complete a run at the neighbouring cell:
//!
//! ```text
//!   straight       perpendicular pair     notch
//!   . A A  <-a     A . .                  A . A
//!                  . a A ...               . a .
//! ```

use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::piece::Piece;
use crate::types::{Coord, Direction, PieceTypeId, MIN_MATCH_LEN};

/// The union of all matched cells from one scan.
///
/// A true set: a piece in both a horizontal and a vertical run appears once.
/// Iteration is ascending by column, then row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    cells: BTreeSet<Coord>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_match(&self) -> bool {
        !self.cells.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.cells.contains(&c)
    }

    pub fn insert(&mut self, c: Coord) -> bool {
        self.cells.insert(c)
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }
}

impl FromIterator<Coord> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// A swap that would produce a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    /// The piece to move
    pub from: Coord,
    /// Direction of its neighbour to swap with
    pub direction: Direction,
}

impl Hint {
    pub fn to(&self) -> Coord {
        self.from.step(self.direction)
    }
}

/// Pieces of the origin's type, starting one step from `origin` in `direction`.
///
/// Stops at the first mismatch, empty cell or board edge. An empty origin
/// yields an empty run.
pub fn find_run(grid: &Grid, origin: Coord, direction: Direction) -> Vec<&Piece> {
    let Some(start) = grid.get_at(origin) else {
        return Vec::new();
    };

    let mut run = Vec::new();
    let mut cursor = origin.step(direction);
    while let Some(piece) = grid.get_at(cursor) {
        if !piece.matches(start) {
            break;
        }
        run.push(piece);
        cursor = cursor.step(direction);
    }
    run
}

/// Scan every occupied cell for forward horizontal and vertical matches
pub fn scan_board(grid: &Grid) -> MatchSet {
    let mut matched = MatchSet::new();

    for origin in grid.coords() {
        if grid.get_at(origin).is_none() {
            continue;
        }

        for direction in [Direction::Right, Direction::Up] {
            let run = find_run(grid, origin, direction);
            if run.len() + 1 >= MIN_MATCH_LEN {
                matched.insert(origin);
                matched.extend_from(&run);
            }
        }
    }

    matched
}

impl MatchSet {
    fn extend_from(&mut self, run: &[&Piece]) {
        for piece in run {
            self.cells.insert(piece.coord());
        }
    }
}

/// Count up to `max` consecutive cells of `kind` starting one step from `from`
fn run_len(grid: &Grid, from: Coord, direction: Direction, kind: PieceTypeId, max: usize) -> usize {
    (1..=max as i32)
        .map(|d| from.offset(direction, d))
        .take_while(|c| grid.kind_at(c.x, c.y) == Some(kind))
        .count()
}

/// Whether swapping the piece at `from` with its neighbour in `direction`
/// would put it into a run at the neighbour's cell.
///
/// Only the moved piece's side of the swap is checked; the neighbour's side is
/// the same check from the neighbour in the opposite direction.
pub fn swap_creates_match(grid: &Grid, from: Coord, direction: Direction) -> bool {
    let Some(kind) = grid.get_at(from).map(Piece::kind) else {
        return false;
    };
    let to = from.step(direction);
    match grid.get_at(to) {
        Some(other) if other.kind() != kind => {}
        _ => return false,
    }

    let need = MIN_MATCH_LEN - 1;

    // Straight: two more of the kind beyond the target, away from `from`.
    if run_len(grid, to, direction, kind, need) >= need {
        return true;
    }

    // Perpendicular through the target: pair on one side, or one either side (notch).
    let [side_a, side_b] = direction.perpendicular();
    run_len(grid, to, side_a, kind, need) + run_len(grid, to, side_b, kind, need) >= need
}

/// First swap that would produce a match.
///
/// Scan order is row-major (bottom row first, left to right), directions in
/// [`Direction::ALL`] order. `None` when no single swap matches anywhere.
pub fn find_hint_move(grid: &Grid) -> Option<Hint> {
    grid.coords().find_map(|from| {
        Direction::ALL
            .into_iter()
            .find(|&direction| swap_creates_match(grid, from, direction))
            .map(|direction| Hint { from, direction })
    })
}

/// The piece to move for the first hint, see [`find_hint_move`]
pub fn find_hint(grid: &Grid) -> Option<&Piece> {
    find_hint_move(grid).and_then(|hint| grid.get_at(hint.from))
}
