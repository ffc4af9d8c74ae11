//! BoardView: maps a [`Scene`] and [`Hud`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Board row 0 is drawn at the bottom of the frame; screen rows grow
//! downward, so the vertical axis flips between world and screen.

use tokio::time::Instant;

use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::scene::{Hud, Scene};
use crate::types::{Coord, WorldPos};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Where the board frame sits on screen, for drawing and hit testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    /// Top-left corner of the border
    pub frame_x: u16,
    pub frame_y: u16,
    pub cell_w: u16,
    pub cell_h: u16,
    pub width: u16,
    pub height: u16,
    pub origin: Coord,
}

impl BoardLayout {
    pub fn frame_w(&self) -> u16 {
        self.width * self.cell_w + 2
    }

    pub fn frame_h(&self) -> u16 {
        self.height * self.cell_h + 2
    }

    /// Screen position of the top-left character of cell `c`
    pub fn cell_to_screen(&self, c: Coord) -> (i32, i32) {
        let col = i32::from(self.frame_x) + 1 + c.x * i32::from(self.cell_w);
        let row = i32::from(self.frame_y)
            + 1
            + (i32::from(self.height) - 1 - c.y) * i32::from(self.cell_h);
        (col, row)
    }

    /// Screen position of the top-left character of a sprite at `pos`
    pub fn world_to_screen(&self, pos: WorldPos) -> (i32, i32) {
        let fx = pos.x - self.origin.x as f32;
        let fy = pos.y - self.origin.y as f32;
        let col = f32::from(self.frame_x) + 1.0 + fx * f32::from(self.cell_w);
        let row = f32::from(self.frame_y)
            + 1.0
            + (f32::from(self.height) - 1.0 - fy) * f32::from(self.cell_h);
        (col.round() as i32, row.round() as i32)
    }

    /// World position under a screen cell.
    ///
    /// Every character of a board cell maps within half a unit of that
    /// cell's world position, so rounding recovers the cell.
    pub fn screen_to_world(&self, column: u16, row: u16) -> WorldPos {
        let dx = (f32::from(column) - f32::from(self.frame_x) - 1.0 + 0.5) / f32::from(self.cell_w) - 0.5;
        let dy = (f32::from(row) - f32::from(self.frame_y) - 1.0 + 0.5) / f32::from(self.cell_h) - 0.5;
        WorldPos::new(
            self.origin.x as f32 + dx,
            self.origin.y as f32 + f32::from(self.height) - 1.0 - dy,
        )
    }
}

/// A lightweight terminal renderer for the board.
pub struct BoardView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for BoardView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const CURSOR_BG: Rgb = Rgb::new(70, 70, 95);
const HIGHLIGHT_BG: Rgb = Rgb::new(110, 100, 40);
const HINT_BG: Rgb = Rgb::new(40, 90, 60);

impl BoardView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn layout(&self, scene: &Scene, viewport: Viewport) -> BoardLayout {
        let mut layout = BoardLayout {
            frame_x: 0,
            frame_y: 0,
            cell_w: self.cell_w,
            cell_h: self.cell_h,
            width: scene.width(),
            height: scene.height(),
            origin: scene.origin(),
        };
        layout.frame_x = viewport.width.saturating_sub(layout.frame_w()) / 2;
        layout.frame_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(layout.frame_h()) / 2,
            AnchorY::Top => 0,
        };
        layout
    }

    /// Render into an existing framebuffer
    pub fn render_into(
        &self,
        scene: &Scene,
        hud: &Hud,
        busy: bool,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let layout = self.layout(scene, viewport);
        let border = CellStyle::fg(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        self.draw_border(fb, &layout, border);

        // Cell backgrounds: cursor, hint, highlight.
        let highlight_cell = scene
            .highlight()
            .and_then(|id| scene.sprite(id))
            .map(|s| {
                Coord::new(
                    (s.pos.x - scene.origin().x as f32).round() as i32,
                    (s.pos.y - scene.origin().y as f32).round() as i32,
                )
            });
        for y in 0..i32::from(scene.height()) {
            for x in 0..i32::from(scene.width()) {
                let c = Coord::new(x, y);
                let bg = if highlight_cell == Some(c) {
                    HIGHLIGHT_BG
                } else if hud.hint == Some(c) {
                    HINT_BG
                } else if hud.cursor == c {
                    CURSOR_BG
                } else {
                    BOARD_BG
                };
                let style = CellStyle::fg(Rgb::new(90, 90, 100), bg).dim();
                self.fill_cell(fb, layout.cell_to_screen(c), '·', style);
            }
        }

        // Sprites.
        let now = Instant::now();
        for (id, sprite) in scene.sprites() {
            let glyph = match sprite.scale {
                s if s >= 0.75 => '█',
                s if s >= 0.45 => '▓',
                s if s >= 0.15 => '░',
                _ => continue,
            };
            let (col, row) = layout.world_to_screen(sprite.pos);
            let col = col + i32::from(scene.shake_offset(id, now));
            let bright = scene.highlight() == Some(id);
            let fg = hud.palette.color(sprite.kind);
            self.fill_sprite(fb, &layout, (col, row), glyph, fg, bright);
        }

        self.draw_side_panel(fb, hud, busy, viewport, &layout);

        if let Some(msg) = hud.message.as_deref() {
            let y = layout.frame_y.saturating_add(layout.frame_h());
            let text_w = msg.chars().count() as u16;
            let x = layout
                .frame_x
                .saturating_add(layout.frame_w().saturating_sub(text_w) / 2);
            let style = CellStyle::fg(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
            fb.put_str(x, y, msg, style);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, scene: &Scene, hud: &Hud, busy: bool, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(scene, hud, busy, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, layout: &BoardLayout, style: CellStyle) {
        let (x, y, w, h) = (layout.frame_x, layout.frame_y, layout.frame_w(), layout.frame_h());

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, (col, row): (i32, i32), ch: char, style: CellStyle) {
        if let (Ok(x), Ok(y)) = (u16::try_from(col), u16::try_from(row)) {
            fb.fill_rect(x, y, self.cell_w, self.cell_h, ch, style);
        }
    }

    /// Draw a sprite over the cell backgrounds, clipped to the board interior
    fn fill_sprite(
        &self,
        fb: &mut FrameBuffer,
        layout: &BoardLayout,
        (col, row): (i32, i32),
        glyph: char,
        fg: Rgb,
        bright: bool,
    ) {
        let left = i32::from(layout.frame_x) + 1;
        let top = i32::from(layout.frame_y) + 1;
        let right = left + i32::from(layout.width * layout.cell_w);
        let bottom = top + i32::from(layout.height * layout.cell_h);

        for dy in 0..i32::from(self.cell_h) {
            for dx in 0..i32::from(self.cell_w) {
                let (x, y) = (col + dx, row + dy);
                if x < left || x >= right || y < top || y >= bottom {
                    continue;
                }
                let (x, y) = (x as u16, y as u16);
                let bg = fb.get(x, y).map_or(BOARD_BG, |c| c.style.bg);
                let mut style = CellStyle::fg(fg, bg);
                if bright {
                    style = style.bold();
                }
                fb.put_char(x, y, glyph, style);
            }
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        hud: &Hud,
        busy: bool,
        viewport: Viewport,
        layout: &BoardLayout,
    ) {
        let panel_x = layout
            .frame_x
            .saturating_add(layout.frame_w())
            .saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::fg(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0)).bold();
        let value = CellStyle::fg(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = value.dim();

        let mut y = layout.frame_y;
        fb.put_str(panel_x, y, "LEVEL", label);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, &hud.level_name, value);
        y = y.saturating_add(1);
        fb.put_str(
            panel_x,
            y,
            &format!("{}/{}", hud.level_index + 1, hud.level_count),
            dim,
        );
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        fb.put_str(
            panel_x,
            y,
            &format!("{} / {}", hud.progress.current, hud.progress.target),
            value,
        );
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, &progress_bar(hud.progress.fraction(), 10), value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "STATUS", label);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, if busy { "resolving" } else { "ready" }, value);
        y = y.saturating_add(1);
        if let Some(cue) = hud.last_cue {
            fb.put_str(panel_x, y, &format!("~ {}", cue.as_str()), dim);
        }
        y = y.saturating_add(2);

        for line in [
            "hjkl  cursor",
            "spc   select",
            "wasd  swap",
            "?     hint",
            "n/p   level",
            "r     shuffle",
            "q     quit",
        ] {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, line, dim);
            y = y.saturating_add(1);
        }
    }
}

/// `[#####.....]` style bar, `width` cells inside the brackets
pub fn progress_bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
