//! Pointer drag resolution.
//!
//! A press over a piece starts a gesture. Once the pointer has travelled more
//! than [`SWAP_DRAG_THRESHOLD`] world units the gesture fires a swap
//! direction, exactly once. Releasing without having fired is a click.

use crate::types::{Coord, Direction, WorldPos, SWAP_DRAG_THRESHOLD};

/// What a finished gesture amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEnd {
    /// Released before travelling past the threshold
    Click(Coord),
    /// A swap direction already fired during the drag
    Dragged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    coord: Coord,
    start: WorldPos,
    threshold: f32,
    fired: bool,
}

impl DragGesture {
    /// Start a gesture on the piece at `coord`, pressed at world position `start`
    pub fn begin(coord: Coord, start: WorldPos) -> Self {
        Self::with_threshold(coord, start, SWAP_DRAG_THRESHOLD)
    }

    pub fn with_threshold(coord: Coord, start: WorldPos, threshold: f32) -> Self {
        Self {
            coord,
            start,
            threshold,
            fired: false,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Feed a pointer position; returns the swap direction the first time the
    /// drag crosses the threshold, `None` otherwise.
    pub fn update(&mut self, pos: WorldPos) -> Option<Direction> {
        if self.fired || self.start.distance(pos) <= self.threshold {
            return None;
        }

        let direction = Direction::from_vector(pos.x - self.start.x, pos.y - self.start.y)?;
        self.fired = true;
        Some(direction)
    }

    pub fn release(self) -> GestureEnd {
        if self.fired {
            GestureEnd::Dragged
        } else {
            GestureEnd::Click(self.coord)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_motion_is_click() {
        let c = Coord::new(3, 3);
        let mut g = DragGesture::begin(c, WorldPos::new(0.0, 0.0));
        assert_eq!(g.update(WorldPos::new(0.2, 0.3)), None);
        assert_eq!(g.release(), GestureEnd::Click(c));
    }

    #[test]
    fn test_fires_once_with_dominant_axis() {
        let mut g = DragGesture::begin(Coord::new(0, 0), WorldPos::new(1.0, 1.0));
        assert_eq!(g.update(WorldPos::new(1.1, 0.3)), Some(Direction::Down));
        assert_eq!(g.update(WorldPos::new(3.0, 0.3)), None);
        assert!(g.has_fired());
        assert_eq!(g.release(), GestureEnd::Dragged);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut g = DragGesture::begin(Coord::new(0, 0), WorldPos::new(0.0, 0.0));
        assert_eq!(g.update(WorldPos::new(SWAP_DRAG_THRESHOLD, 0.0)), None);
        assert_eq!(g.update(WorldPos::new(-0.6, 0.0)), Some(Direction::Left));
    }
}
