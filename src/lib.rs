//! Match board (workspace facade crate).
//!
//! This package exposes `match_board::{core,input,term,types}` while the
//! implementation lives in dedicated crates under `crates/`.

pub use match_board_core as core;
pub use match_board_input as input;
pub use match_board_term as term;
pub use match_board_types as types;
