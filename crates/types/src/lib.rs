//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the board engine.
//! All types are plain data with no behaviour beyond simple geometry, making
//! them usable in any context (rules, rendering, input mapping).
//!
//! # Coordinates
//!
//! Boards are indexed `(x, y)` with the origin `(0, 0)` at the **bottom-left**:
//!
//! - `x` grows to the right (columns)
//! - `y` grows upward (rows), so gravity pulls pieces towards `y = 0`
//!
//! # Timing Constants
//!
//! Default animation durations in milliseconds. They only matter to effect
//! implementations; the rules never read them.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SWAP_MS` | 250 | Two pieces trading places |
//! | `DROP_MS_PER_ROW` | 60 | Falling one row |
//! | `REMOVE_MS` | 150 | Matched piece scaling down |
//! | `SPAWN_MS` | 100 | Refilled piece appearing |
//! | `POPULATE_SPAWN_MS` | 20 | Piece appearing during initial population |
//! | `SHAKE_MS` | 250 | Invalid drag feedback |
//! | `SETTLE_MS` | 100 | Pause before input is re-enabled |
//!
//! # Examples
//!
//! ```
//! use match_board_types::{Coord, Direction, PieceTypeId};
//!
//! let here = Coord::new(2, 3);
//! assert_eq!(here.step(Direction::Up), Coord::new(2, 4));
//! assert!(here.is_adjacent(Coord::new(1, 3)));
//! assert!(!here.is_adjacent(Coord::new(3, 4)));
//!
//! assert_eq!(Direction::Left.opposite(), Direction::Right);
//! assert_eq!(Direction::Left.as_str(), "left");
//! assert_eq!(PieceTypeId(4).to_string(), "#4");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default board width in cells
pub const DEFAULT_BOARD_WIDTH: u16 = 8;

/// Default board height in cells
pub const DEFAULT_BOARD_HEIGHT: u16 = 8;

/// Minimum run length that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Default score needed to finish a level
pub const DEFAULT_TARGET_SCORE: u32 = 50;

/// Swap animation duration (250ms)
pub const SWAP_MS: u32 = 250;

/// Drop animation duration per row fallen (60ms)
pub const DROP_MS_PER_ROW: u32 = 60;

/// Remove (scale down) animation duration (150ms)
pub const REMOVE_MS: u32 = 150;

/// Spawn animation duration during refill (100ms)
pub const SPAWN_MS: u32 = 100;

/// Spawn animation duration during the initial population (20ms)
pub const POPULATE_SPAWN_MS: u32 = 20;

/// Shake animation duration (250ms)
pub const SHAKE_MS: u32 = 250;

/// Settle pause before input is re-enabled (100ms)
pub const SETTLE_MS: u32 = 100;

/// Drag distance, in world units, after which a press becomes a swap gesture
pub const SWAP_DRAG_THRESHOLD: f32 = 0.5;

/// Opaque identifier of a piece kind.
///
/// Two pieces match iff their type ids are equal. The id is chosen by the
/// level configuration and is independent of any rendering asset handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceTypeId(pub u32);

impl fmt::Display for PieceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one piece instance.
///
/// Unlike [`PieceTypeId`], no two live pieces share a `PieceId`. Selection
/// logic compares identities; match logic compares types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u64);

/// A board cell coordinate.
///
/// Ordering is column-major (`x` first, then `y`), which is the order matched
/// pieces are removed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring coordinate one cell away in `dir`
    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir, 1)
    }

    /// The coordinate `distance` cells away in `dir`
    pub fn offset(self, dir: Direction, distance: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }

    pub fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Orthogonal neighbours only: diagonals and the cell itself are never adjacent.
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }

    /// Direction from `self` to an adjacent `other`, if they are adjacent
    pub fn direction_to(self, other: Coord) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&dir| self.step(dir) == other)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four orthogonal directions
///
/// `Up` points towards higher rows (away from the floor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector `(dx, dy)` for this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The two directions perpendicular to this one
    pub fn perpendicular(&self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Left | Direction::Right => [Direction::Down, Direction::Up],
        }
    }

    /// Resolve a drag vector to its dominant axis.
    ///
    /// Returns `None` for a zero vector. Ties between axes resolve to the
    /// horizontal direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use match_board_types::Direction;
    ///
    /// assert_eq!(Direction::from_vector(0.9, 0.2), Some(Direction::Right));
    /// assert_eq!(Direction::from_vector(-0.1, -0.7), Some(Direction::Down));
    /// assert_eq!(Direction::from_vector(0.0, 0.0), None);
    /// ```
    pub fn from_vector(dx: f32, dy: f32) -> Option<Self> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if dx.abs() >= dy.abs() {
            Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
        } else {
            Some(if dy > 0.0 { Direction::Up } else { Direction::Down })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// A position in world space (board cells are one unit wide)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: WorldPos) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Audio feedback cues surfaced by the board
///
/// - **Select**: a piece became the selection
/// - **Spawn**: a new piece appeared
/// - **Swap**: two pieces started trading places
/// - **MatchSuccess**: a clear phase removed matched pieces
/// - **InvalidMove**: a swap produced no match, or a drag had no target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Select,
    Spawn,
    Swap,
    MatchSuccess,
    InvalidMove,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Select => "select",
            SoundCue::Spawn => "spawn",
            SoundCue::Swap => "swap",
            SoundCue::MatchSuccess => "matchSuccess",
            SoundCue::InvalidMove => "invalidMove",
        }
    }
}
