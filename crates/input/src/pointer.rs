//! Mouse press/drag/release handling.
//!
//! Terminal mouse reports arrive in screen cells. The caller supplies the two
//! mappings the handler needs: screen cell to world position, and world
//! position to board cell. A press over a piece starts a [`DragGesture`]; the
//! gesture decides whether the interaction ends as a click or a drag.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::core::{DragGesture, GestureEnd};
use crate::types::{Coord, Direction, WorldPos};

/// A pointer intent on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Pointer went down over a cell (highlight feedback)
    Press(Coord),
    /// Released without dragging
    Click(Coord),
    /// Dragged past the swap threshold
    Drag(Coord, Direction),
}

#[derive(Debug, Clone, Default)]
pub struct PointerHandler {
    gesture: Option<DragGesture>,
}

impl PointerHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.gesture.is_some()
    }

    /// Drop any gesture in progress (e.g. when the board is replaced)
    pub fn cancel(&mut self) {
        self.gesture = None;
    }

    pub fn handle_mouse_event(
        &mut self,
        event: MouseEvent,
        to_world: impl Fn(u16, u16) -> WorldPos,
        cell_at: impl Fn(WorldPos) -> Option<Coord>,
    ) -> Option<PointerAction> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let pos = to_world(event.column, event.row);
                self.gesture = cell_at(pos).map(|c| DragGesture::begin(c, pos));
                self.gesture.map(|g| PointerAction::Press(g.coord()))
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let gesture = self.gesture.as_mut()?;
                let dir = gesture.update(to_world(event.column, event.row))?;
                Some(PointerAction::Drag(gesture.coord(), dir))
            }
            MouseEventKind::Up(MouseButton::Left) => match self.gesture.take()?.release() {
                GestureEnd::Click(c) => Some(PointerAction::Click(c)),
                GestureEnd::Dragged => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    // Two screen columns per cell, screen rows grow downward over a 4x4 board.
    fn to_world(column: u16, row: u16) -> WorldPos {
        WorldPos::new(f32::from(column) / 2.0, 3.0 - f32::from(row))
    }

    fn cell_at(pos: WorldPos) -> Option<Coord> {
        let c = Coord::new(pos.x.floor() as i32, pos.y.round() as i32);
        (0..4).contains(&c.x).then_some(c).filter(|c| (0..4).contains(&c.y))
    }

    fn feed(h: &mut PointerHandler, kind: MouseEventKind, column: u16, row: u16) -> Option<PointerAction> {
        h.handle_mouse_event(mouse(kind, column, row), to_world, cell_at)
    }

    #[test]
    fn test_press_release_is_click() {
        let mut h = PointerHandler::new();
        let down = MouseEventKind::Down(MouseButton::Left);
        let up = MouseEventKind::Up(MouseButton::Left);

        assert_eq!(feed(&mut h, down, 2, 3), Some(PointerAction::Press(Coord::new(1, 0))));
        assert!(h.is_pressed());
        assert_eq!(feed(&mut h, up, 2, 3), Some(PointerAction::Click(Coord::new(1, 0))));
        assert!(!h.is_pressed());
    }

    #[test]
    fn test_drag_fires_once_then_release_is_silent() {
        let mut h = PointerHandler::new();
        let drag = MouseEventKind::Drag(MouseButton::Left);

        feed(&mut h, MouseEventKind::Down(MouseButton::Left), 2, 3);
        assert_eq!(
            feed(&mut h, drag, 2, 2),
            Some(PointerAction::Drag(Coord::new(1, 0), Direction::Up))
        );
        assert_eq!(feed(&mut h, drag, 2, 1), None);
        assert_eq!(feed(&mut h, MouseEventKind::Up(MouseButton::Left), 2, 1), None);
    }

    #[test]
    fn test_press_off_board_starts_nothing() {
        let mut h = PointerHandler::new();
        assert_eq!(feed(&mut h, MouseEventKind::Down(MouseButton::Left), 40, 3), None);
        assert_eq!(feed(&mut h, MouseEventKind::Drag(MouseButton::Left), 2, 3), None);
        assert_eq!(feed(&mut h, MouseEventKind::Up(MouseButton::Left), 2, 3), None);
    }
}
