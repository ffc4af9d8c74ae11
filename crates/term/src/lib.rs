//! Terminal board renderer module.
//!
//! A small, game-oriented rendering layer for playing the board in a
//! terminal. It avoids widget toolkits and renders into a simple framebuffer
//! that is diffed and flushed to a crossterm backend.
//!
//! - [`scene`]: sprites per piece, moved only by effect requests
//! - [`board_view`]: pure scene to framebuffer rendering and hit testing
//! - [`renderer`]: framebuffer diffing and terminal output
//! - [`effects`]: [`TermEffects`], the [`BoardEffects`](crate::core::BoardEffects)
//!   implementation that animates each request before resolving it

pub mod board_view;
pub mod effects;
pub mod fb;
pub mod renderer;
pub mod scene;

pub use match_board_core as core;
pub use match_board_types as types;

pub use board_view::{progress_bar, AnchorY, BoardLayout, BoardView, Viewport};
pub use effects::{TermEffects, FRAME_INTERVAL};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use scene::{lerp, Hud, Palette, Scene, Sprite};
