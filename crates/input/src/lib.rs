//! Terminal input module (board-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events into [`BoardAction`]s and turns mouse press/drag/release sequences
//! into clicks and swap drags through [`core::DragGesture`].

pub mod map;
pub mod pointer;

pub use match_board_core as core;
pub use match_board_types as types;

pub use map::{handle_key_event, should_quit, BoardAction};
pub use pointer::{PointerAction, PointerHandler};
