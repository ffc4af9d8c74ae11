//! Scene: the renderer's own model of what is on screen.
//!
//! The board rules never hand the renderer a grid. Instead the renderer
//! keeps one sprite per piece, created by spawn effects, moved by move and
//! drop effects and deleted by remove effects. Sprites live in world space,
//! so in-flight pieces can sit between cells.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::core::{Piece, PieceSpec, ScoreProgress};
use crate::fb::Rgb;
use crate::types::{Coord, PieceId, PieceTypeId, SoundCue, WorldPos};

/// One drawn piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: PieceTypeId,
    pub pos: WorldPos,
    /// 1.0 fully visible, 0.0 gone
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Shake {
    id: PieceId,
    started: Instant,
    duration: Duration,
}

/// Linear interpolation between two world positions
pub fn lerp(a: WorldPos, b: WorldPos, t: f32) -> WorldPos {
    let t = t.clamp(0.0, 1.0);
    WorldPos::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

#[derive(Debug, Clone)]
pub struct Scene {
    width: u16,
    height: u16,
    origin: Coord,
    sprites: BTreeMap<PieceId, Sprite>,
    highlight: Option<PieceId>,
    shake: Option<Shake>,
}

impl Scene {
    pub fn new(width: u16, height: u16, origin: Coord) -> Self {
        Self {
            width,
            height,
            origin,
            sprites: BTreeMap::new(),
            highlight: None,
            shake: None,
        }
    }

    /// Forget every sprite and take on a new board's geometry
    pub fn reset(&mut self, width: u16, height: u16, origin: Coord) {
        *self = Self::new(width, height, origin);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn world_of(&self, c: Coord) -> WorldPos {
        WorldPos::new(
            (self.origin.x + c.x) as f32,
            (self.origin.y + c.y) as f32,
        )
    }

    /// Add a sprite for `piece` at its cell
    pub fn insert(&mut self, piece: &Piece, scale: f32) {
        let sprite = Sprite {
            kind: piece.kind(),
            pos: self.world_of(piece.coord()),
            scale,
        };
        self.sprites.insert(piece.id(), sprite);
    }

    pub fn remove(&mut self, id: PieceId) -> Option<Sprite> {
        if self.highlight == Some(id) {
            self.highlight = None;
        }
        self.sprites.remove(&id)
    }

    pub fn sprite(&self, id: PieceId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    pub fn sprite_mut(&mut self, id: PieceId) -> Option<&mut Sprite> {
        self.sprites.get_mut(&id)
    }

    pub fn sprites(&self) -> impl Iterator<Item = (PieceId, &Sprite)> {
        self.sprites.iter().map(|(id, s)| (*id, s))
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn set_highlight(&mut self, id: Option<PieceId>) {
        self.highlight = id;
    }

    pub fn highlight(&self) -> Option<PieceId> {
        self.highlight
    }

    pub fn start_shake(&mut self, id: PieceId, duration: Duration) {
        self.shake = Some(Shake {
            id,
            started: Instant::now(),
            duration,
        });
    }

    /// Horizontal jitter, in screen columns, for `id` at `now`
    pub fn shake_offset(&self, id: PieceId, now: Instant) -> i16 {
        match self.shake {
            Some(shake) if shake.id == id => {
                let elapsed = now.saturating_duration_since(shake.started);
                if elapsed >= shake.duration {
                    0
                } else if (elapsed.as_millis() / 40) % 2 == 0 {
                    1
                } else {
                    -1
                }
            }
            _ => 0,
        }
    }
}

/// Piece colours by catalog asset name
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<(PieceTypeId, Rgb)>,
}

const FALLBACK: [Rgb; 8] = [
    Rgb::new(80, 120, 220),
    Rgb::new(100, 220, 120),
    Rgb::new(200, 120, 220),
    Rgb::new(220, 80, 80),
    Rgb::new(240, 220, 80),
    Rgb::new(80, 220, 220),
    Rgb::new(255, 165, 0),
    Rgb::new(230, 230, 230),
];

impl Palette {
    pub fn from_specs(specs: &[PieceSpec]) -> Self {
        let colors = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let rgb = match spec.asset.as_str() {
                    "blue" => FALLBACK[0],
                    "green" => FALLBACK[1],
                    "violet" | "purple" => FALLBACK[2],
                    "red" => FALLBACK[3],
                    "yellow" => FALLBACK[4],
                    "cyan" => FALLBACK[5],
                    "orange" => FALLBACK[6],
                    "white" => FALLBACK[7],
                    _ => FALLBACK[i % FALLBACK.len()],
                };
                (spec.id, rgb)
            })
            .collect();
        Self { colors }
    }

    pub fn color(&self, kind: PieceTypeId) -> Rgb {
        self.colors
            .iter()
            .find(|(id, _)| *id == kind)
            .map(|(_, rgb)| *rgb)
            .unwrap_or(FALLBACK[kind.0 as usize % FALLBACK.len()])
    }
}

/// Everything around the board: level, score, cursor, feedback
#[derive(Debug, Clone)]
pub struct Hud {
    pub level_name: String,
    pub level_index: usize,
    pub level_count: usize,
    pub progress: ScoreProgress,
    pub cursor: Coord,
    pub hint: Option<Coord>,
    pub message: Option<String>,
    pub last_cue: Option<SoundCue>,
    pub palette: Palette,
}

impl Hud {
    pub fn new(target: u32) -> Self {
        Self {
            level_name: String::new(),
            level_index: 0,
            level_count: 1,
            progress: ScoreProgress::new(target),
            cursor: Coord::default(),
            hint: None,
            message: None,
            last_cue: None,
            palette: Palette::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(id: u64, kind: u32, x: i32, y: i32) -> Piece {
        let mut grid = crate::core::Grid::new(8, 8, Coord::default()).unwrap();
        grid.set(x, y, Piece::new(PieceId(id), PieceTypeId(kind))).unwrap();
        grid.get(x, y).cloned().unwrap()
    }

    #[test]
    fn test_insert_places_sprite_in_world_space() {
        let mut scene = Scene::new(8, 8, Coord::new(-4, -4));
        scene.insert(&piece(1, 2, 3, 1), 0.0);
        let sprite = scene.sprite(PieceId(1)).unwrap();
        assert_eq!(sprite.pos, WorldPos::new(-1.0, -3.0));
        assert_eq!(sprite.kind, PieceTypeId(2));
    }

    #[test]
    fn test_remove_clears_highlight() {
        let mut scene = Scene::new(2, 2, Coord::default());
        scene.insert(&piece(7, 0, 0, 0), 1.0);
        scene.set_highlight(Some(PieceId(7)));
        assert!(scene.remove(PieceId(7)).is_some());
        assert_eq!(scene.highlight(), None);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_lerp_clamps() {
        let a = WorldPos::new(0.0, 0.0);
        let b = WorldPos::new(2.0, -2.0);
        assert_eq!(lerp(a, b, 0.5), WorldPos::new(1.0, -1.0));
        assert_eq!(lerp(a, b, 3.0), b);
    }

    #[test]
    fn test_palette_by_asset_name() {
        let palette = Palette::from_specs(&[PieceSpec::new(4, 1, "red"), PieceSpec::new(9, 1, "")]);
        assert_eq!(palette.color(PieceTypeId(4)), Rgb::new(220, 80, 80));
        assert_eq!(palette.color(PieceTypeId(9)), FALLBACK[1]);
    }
}
