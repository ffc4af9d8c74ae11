//! Core board logic module - rules, cascades and selection
//!
//! This module contains the tile-matching rules and the state machines that
//! drive them. It has **no dependencies** on rendering, audio or an async
//! runtime: every visual step is an awaited call on an injected
//! [`BoardEffects`] implementation.
//!
//! - **Deterministic**: a seeded factory produces identical boards and refills
//! - **Testable**: [`NoopEffects`] and [`RecordingEffects`] run boards headless
//! - **Portable**: drive it from any executor; it never spawns tasks
//!
//! # Module Structure
//!
//! - [`catalog`]: piece types and their score values
//! - [`factory`]: random piece generation with neighbour exclusions
//! - [`grid`]: the board of cells with geometry and gravity helpers
//! - [`matcher`]: run detection, board scans and hint search
//! - [`cascade`]: the clear, drop, refill, recheck loop
//! - [`board`]: the selection state machine and swap handling
//! - [`effects`]: the rendering and audio boundary
//! - [`config`]: level configuration, level sets and score progress
//! - [`gesture`]: pointer drag resolution
//!
//! # Game Rules
//!
//! - **Match**: three or more same-typed pieces in a row or column
//! - **Swap**: only orthogonal neighbours trade places
//! - **Revert**: a swap that matches nothing is undone (configurable)
//! - **Gravity**: pieces fall straight down into empty cells
//! - **Refill**: empty cells get new pieces that avoid the two nearest
//!   types to the left and below (configurable)
//! - **Cascade**: clearing repeats until the board holds no match
//!
//! # Example
//!
//! ```
//! use match_board_core::types::Coord;
//! use match_board_core::{scan_board, LevelConfig, MatchBoard, NoopEffects, SwapOutcome};
//!
//! let level = LevelConfig {
//!     width: 3,
//!     height: 3,
//!     ..LevelConfig::default()
//! };
//! let mut board = MatchBoard::new(&level, NoopEffects, 12345).unwrap();
//! board.set_layout(&["012", "120", "002"]).unwrap();
//!
//! // Lifting the bottom-right 2 swaps a 0 down, completing the bottom row.
//! let outcome = tokio_test::block_on(board.swap(Coord::new(2, 0), Coord::new(2, 1)));
//! match outcome {
//!     SwapOutcome::Matched(report) => assert!(report.score >= 3),
//!     other => panic!("expected a match, got {:?}", other),
//! }
//! assert!(!scan_board(board.grid()).has_match());
//! assert!(board.is_input_enabled());
//! ```

pub mod board;
pub mod cascade;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod error;
pub mod factory;
pub mod gesture;
pub mod grid;
pub mod matcher;
pub mod piece;

pub use match_board_types as types;

// Re-export commonly used types for convenience
pub use board::{MatchBoard, SelectOutcome, SelectionPhase, SwapOutcome};
pub use cascade::{CascadePhase, CascadeReport, CascadeResolver, MAX_CASCADE_ITERATIONS};
pub use catalog::{PieceCatalog, PieceSpec};
pub use config::{AnimationDurations, GameConfig, LevelConfig, LevelSet, ScoreProgress};
pub use effects::{BoardEffects, EffectEvent, NoopEffects, PieceMove, RecordingEffects};
pub use error::{ConfigError, GridError};
pub use factory::PieceFactory;
pub use gesture::{DragGesture, GestureEnd};
pub use grid::{DropTarget, Grid};
pub use matcher::{find_hint, find_hint_move, find_run, scan_board, Hint, MatchSet};
pub use piece::Piece;
