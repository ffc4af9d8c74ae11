//! TermEffects: plays board effects as terminal animations.
//!
//! Every awaited request renders frames on a fixed tick until the animation
//! reaches its end, so the board resumes only once the change is on screen.

use std::cell::RefCell;
use std::io::{Stdout, Write};
use std::rc::Rc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::{sleep, Instant};

use crate::board_view::{BoardView, Viewport};
use crate::core::{AnimationDurations, BoardEffects, Piece, PieceMove};
use crate::fb::FrameBuffer;
use crate::renderer::TerminalRenderer;
use crate::scene::{lerp, Hud, Scene};
use crate::types::{Coord, PieceId, SoundCue, WorldPos};

/// Target frame interval while an animation runs (~60 FPS)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct TermEffects<W: Write = Stdout> {
    scene: Scene,
    view: BoardView,
    renderer: TerminalRenderer<W>,
    fb: FrameBuffer,
    viewport: Viewport,
    durations: AnimationDurations,
    hud: Rc<RefCell<Hud>>,
}

impl<W: Write> TermEffects<W> {
    pub fn new(
        renderer: TerminalRenderer<W>,
        scene: Scene,
        viewport: Viewport,
        durations: AnimationDurations,
        hud: Rc<RefCell<Hud>>,
    ) -> Self {
        Self {
            scene,
            view: BoardView::default(),
            renderer,
            fb: FrameBuffer::new(viewport.width, viewport.height),
            viewport,
            durations,
            hud,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn hud(&self) -> &Rc<RefCell<Hud>> {
        &self.hud
    }

    pub fn renderer_mut(&mut self) -> &mut TerminalRenderer<W> {
        &mut self.renderer
    }

    /// Prepare for a new board: no sprites, new geometry and timings
    pub fn reset_scene(
        &mut self,
        width: u16,
        height: u16,
        origin: Coord,
        durations: AnimationDurations,
    ) {
        self.scene.reset(width, height, origin);
        self.durations = durations;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.renderer.invalidate();
        }
    }

    /// Draw one frame. Terminal errors are logged, never surfaced to the board.
    pub fn draw(&mut self, busy: bool) {
        let hud = self.hud.borrow();
        self.view
            .render_into(&self.scene, &hud, busy, self.viewport, &mut self.fb);
        drop(hud);
        if let Err(err) = self.renderer.draw_swap(&mut self.fb) {
            warn!("frame draw failed: {:#}", err);
        }
    }

    /// Run `step` with progress `t` in `[0, 1]` on every frame for `ms` milliseconds
    async fn animate(&mut self, ms: u32, mut step: impl FnMut(&mut Scene, f32)) {
        let duration = Duration::from_millis(u64::from(ms));
        let start = Instant::now();
        loop {
            let t = if duration.is_zero() {
                1.0
            } else {
                (start.elapsed().as_secs_f32() / duration.as_secs_f32()).min(1.0)
            };
            step(&mut self.scene, t);
            self.draw(true);
            if t >= 1.0 {
                break;
            }
            let remaining = duration.saturating_sub(start.elapsed());
            sleep(FRAME_INTERVAL.min(remaining)).await;
        }
    }

    async fn grow_in(&mut self, piece: &Piece, ms: u32) {
        let id = piece.id();
        self.scene.insert(piece, 0.0);
        self.animate(ms, |scene, t| set_scale(scene, id, t)).await;
    }
}

fn set_scale(scene: &mut Scene, id: PieceId, scale: f32) {
    if let Some(sprite) = scene.sprite_mut(id) {
        sprite.scale = scale;
    }
}

impl<W: Write> BoardEffects for TermEffects<W> {
    async fn request_moves(&mut self, moves: &[PieceMove<'_>]) {
        let mut paths: Vec<(PieceId, WorldPos, WorldPos)> = Vec::with_capacity(moves.len());
        for m in moves {
            let id = m.piece.id();
            if self.scene.sprite(id).is_none() {
                self.scene.insert(m.piece, 1.0);
            }
            let from = self
                .scene
                .sprite(id)
                .map_or_else(|| self.scene.world_of(m.piece.coord()), |s| s.pos);
            paths.push((id, from, m.target));
        }

        let ms = self.durations.swap;
        self.animate(ms, |scene, t| {
            for &(id, from, to) in &paths {
                if let Some(sprite) = scene.sprite_mut(id) {
                    sprite.pos = lerp(from, to, t);
                }
            }
        })
        .await;
    }

    async fn request_spawn_effect(&mut self, piece: &Piece) {
        let ms = self.durations.spawn;
        self.grow_in(piece, ms).await;
    }

    async fn request_populate_effect(&mut self, piece: &Piece) {
        let ms = self.durations.populate_spawn;
        self.grow_in(piece, ms).await;
    }

    async fn request_remove_effect(&mut self, piece: &Piece) {
        let id = piece.id();
        let ms = self.durations.remove;
        self.animate(ms, |scene, t| set_scale(scene, id, 1.0 - t)).await;
        self.scene.remove(id);
    }

    async fn request_drop_effect(&mut self, piece: &Piece, rows: u32) {
        let id = piece.id();
        let from = self.scene.world_of(piece.coord());
        let to = WorldPos::new(from.x, from.y - rows as f32);
        let ms = self.durations.drop_per_row.saturating_mul(rows);
        self.animate(ms, |scene, t| {
            if let Some(sprite) = scene.sprite_mut(id) {
                sprite.pos = lerp(from, to, t);
            }
        })
        .await;
    }

    async fn settle(&mut self) {
        sleep(Duration::from_millis(u64::from(self.durations.settle))).await;
    }

    fn request_shake_effect(&mut self, piece: &Piece) {
        let duration = Duration::from_millis(u64::from(self.durations.shake));
        self.scene.start_shake(piece.id(), duration);
    }

    fn request_highlight(&mut self, piece: &Piece) {
        self.scene.set_highlight(Some(piece.id()));
    }

    fn clear_highlight(&mut self) {
        self.scene.set_highlight(None);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        debug!("sound: {}", cue.as_str());
        self.hud.borrow_mut().last_cue = Some(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Grid, LevelConfig, MatchBoard, SwapOutcome};
    use crate::types::PieceTypeId;

    fn headless(width: u16, height: u16, origin: Coord) -> TermEffects<Vec<u8>> {
        TermEffects::new(
            TerminalRenderer::with_writer(Vec::new()),
            Scene::new(width, height, origin),
            Viewport::new(60, 20),
            AnimationDurations::default(),
            Rc::new(RefCell::new(Hud::new(50))),
        )
    }

    fn placed(grid: &mut Grid, id: u64, kind: u32, x: i32, y: i32) -> Piece {
        grid.set(x, y, Piece::new(PieceId(id), PieceTypeId(kind)))
            .unwrap();
        grid.get(x, y).cloned().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_grows_sprite_to_full_scale() {
        let mut grid = Grid::new(3, 3, Coord::default()).unwrap();
        let mut fx = headless(3, 3, grid.origin());
        let piece = placed(&mut grid, 1, 0, 1, 1);

        let start = Instant::now();
        fx.request_spawn_effect(&piece).await;
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(fx.scene().sprite(PieceId(1)).map(|s| s.scale), Some(1.0));
        assert!(!fx.renderer.writer().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn remove_deletes_sprite_after_shrinking() {
        let mut grid = Grid::new(3, 3, Coord::default()).unwrap();
        let mut fx = headless(3, 3, grid.origin());
        let piece = placed(&mut grid, 1, 0, 0, 0);
        fx.request_populate_effect(&piece).await;

        fx.request_remove_effect(&piece).await;
        assert!(fx.scene().sprite(PieceId(1)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_lands_rows_below() {
        let mut grid = Grid::new(3, 4, Coord::default()).unwrap();
        let mut fx = headless(3, 4, grid.origin());
        let piece = placed(&mut grid, 5, 2, 2, 3);
        fx.request_populate_effect(&piece).await;

        let start = Instant::now();
        fx.request_drop_effect(&piece, 3).await;
        assert!(start.elapsed() >= Duration::from_millis(180));
        let expected = grid.world_position(Coord::new(2, 0));
        assert_eq!(fx.scene().sprite(PieceId(5)).map(|s| s.pos), Some(expected));
    }

    #[tokio::test(start_paused = true)]
    async fn moves_arrive_together() {
        let mut grid = Grid::new(2, 1, Coord::default()).unwrap();
        let mut fx = headless(2, 1, grid.origin());
        let a = placed(&mut grid, 1, 0, 0, 0);
        let b = placed(&mut grid, 2, 1, 1, 0);
        let (pa, pb) = (grid.world_position(a.coord()), grid.world_position(b.coord()));

        fx.request_moves(&[
            PieceMove { piece: &a, target: pb },
            PieceMove { piece: &b, target: pa },
        ])
        .await;

        assert_eq!(fx.scene().sprite(PieceId(1)).map(|s| s.pos), Some(pb));
        assert_eq!(fx.scene().sprite(PieceId(2)).map(|s| s.pos), Some(pa));
    }

    #[tokio::test(start_paused = true)]
    async fn sound_is_shown_on_hud() {
        let mut fx = headless(1, 1, Coord::default());
        fx.play_sound(SoundCue::MatchSuccess);
        assert_eq!(fx.hud().borrow().last_cue, Some(SoundCue::MatchSuccess));
    }

    #[tokio::test(start_paused = true)]
    async fn board_scene_tracks_grid_through_a_cascade() {
        let level = LevelConfig {
            width: 3,
            height: 3,
            ..LevelConfig::default()
        };
        let grid = Grid::new(3, 3, level.center_coord()).unwrap();
        let fx = headless(3, 3, grid.origin());
        let mut board = MatchBoard::new(&level, fx, 7).unwrap();

        board.populate().await;
        assert_eq!(board.effects().scene().len(), 9);

        board.set_layout(&["012", "120", "002"]).unwrap();
        // The layout bypasses effects; rebuild sprites for the new pieces.
        let pieces: Vec<Piece> = board.grid().pieces().cloned().collect();
        board.effects_mut().reset_scene(3, 3, grid.origin(), AnimationDurations::default());
        for piece in &pieces {
            board.effects_mut().request_populate_effect(piece).await;
        }

        let outcome = board.swap(Coord::new(2, 0), Coord::new(2, 1)).await;
        assert!(matches!(outcome, SwapOutcome::Matched(_)));

        let scene = board.effects().scene();
        assert_eq!(scene.len(), board.grid().piece_count());
        for piece in board.grid().pieces() {
            let sprite = scene.sprite(piece.id()).unwrap();
            assert_eq!(sprite.pos, board.grid().world_position(piece.coord()));
            assert_eq!(sprite.scale, 1.0);
        }
    }
}
