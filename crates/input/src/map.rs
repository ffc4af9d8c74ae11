//! Key mapping from terminal events to board actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::Direction;

/// A keyboard intent, before it is applied at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    /// Move the cursor one cell
    MoveCursor(Direction),
    /// Select the piece under the cursor
    Select,
    /// Swap the piece under the cursor towards a direction
    Drag(Direction),
    /// Show a hint
    Hint,
    NextLevel,
    PreviousLevel,
    /// Throw the board away and populate a fresh one
    Repopulate,
}

fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

/// Map keyboard input to board actions.
pub fn handle_key_event(key: KeyEvent) -> Option<BoardAction> {
    if let Some(dir) = arrow(key.code) {
        return Some(if key.modifiers.contains(KeyModifiers::SHIFT) {
            BoardAction::Drag(dir)
        } else {
            BoardAction::MoveCursor(dir)
        });
    }

    match key.code {
        // Cursor
        KeyCode::Char('h') => Some(BoardAction::MoveCursor(Direction::Left)),
        KeyCode::Char('j') => Some(BoardAction::MoveCursor(Direction::Down)),
        KeyCode::Char('k') => Some(BoardAction::MoveCursor(Direction::Up)),
        KeyCode::Char('l') => Some(BoardAction::MoveCursor(Direction::Right)),

        // Drag
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('K') => {
            Some(BoardAction::Drag(Direction::Up))
        }
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('J') => {
            Some(BoardAction::Drag(Direction::Down))
        }
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('H') => {
            Some(BoardAction::Drag(Direction::Left))
        }
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('L') => {
            Some(BoardAction::Drag(Direction::Right))
        }

        // Actions
        KeyCode::Char(' ') | KeyCode::Enter => Some(BoardAction::Select),
        KeyCode::Char('?') => Some(BoardAction::Hint),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(BoardAction::NextLevel),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(BoardAction::PreviousLevel),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(BoardAction::Repopulate),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
