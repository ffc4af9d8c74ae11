//! MatchBoard - the player-facing selection state machine
//!
//! Owns the grid, the cascade resolver and the effect collaborator, and turns
//! player intents into swaps:
//!
//! ```text
//! Idle --select--> FirstSelected --select adjacent--> SwapInFlight --settled--> Idle
//!  ^                 |  |
//!  +---select same---+  +--select non-adjacent--> FirstSelected (moved)
//! ```
//!
//! `input_enabled` is false from swap confirmation until the cascade (or the
//! revert) has fully settled, and during population. While it is false every
//! entry point is a no-op, so the grid is only ever mutated by one swap at a
//! time.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cascade::{CascadeReport, CascadeResolver};
use crate::config::{AnimationDurations, LevelConfig};
use crate::effects::{BoardEffects, PieceMove};
use crate::error::{ConfigError, GridError};
use crate::factory::PieceFactory;
use crate::grid::Grid;
use crate::matcher::{self, Hint};
use crate::piece::Piece;
use crate::types::{Coord, Direction, PieceId, SoundCue};

/// Selection state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    #[default]
    Idle,
    FirstSelected,
    SwapInFlight,
}

/// Result of a [`MatchBoard::select`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Input disabled or the cell is empty
    Ignored,
    /// Became the first pick
    Selected,
    /// Picked the selected piece again
    Deselected,
    /// Picked a non-adjacent piece, which replaced the first pick
    Reselected,
    /// Picked an adjacent piece and swapped with it
    Swapped(SwapOutcome),
}

/// Result of a swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Input disabled, a cell is empty, or the cells are not adjacent
    Ignored,
    /// The swap matched and the cascade ran to a stable board
    Matched(CascadeReport),
    /// No match; the pieces were swapped back
    Reverted,
    /// No match; the swap was kept
    Kept,
    /// Drag towards an empty or off-board cell
    NoNeighbor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    id: PieceId,
    coord: Coord,
}

pub struct MatchBoard<E, R = ChaCha8Rng> {
    grid: Grid,
    resolver: CascadeResolver<R>,
    effects: E,
    selection: Option<Selection>,
    phase: SelectionPhase,
    input_enabled: bool,
    revert_if_no_match: bool,
    durations: AnimationDurations,
    score: u32,
}

impl<E: BoardEffects> MatchBoard<E, ChaCha8Rng> {
    /// Build an unpopulated board with a seeded ChaCha8 generator
    pub fn new(level: &LevelConfig, effects: E, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(level, effects, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<E: BoardEffects, R: Rng> MatchBoard<E, R> {
    /// Build an unpopulated board drawing pieces from `rng`.
    ///
    /// Input stays disabled until [`MatchBoard::populate`] or
    /// [`MatchBoard::set_layout`] fills the grid.
    pub fn with_rng(level: &LevelConfig, effects: E, rng: R) -> Result<Self, ConfigError> {
        level.validate()?;
        let grid = Grid::new(level.width, level.height, level.center_coord())?;
        let factory = PieceFactory::with_rng(level.catalog()?, rng);

        log::info!(
            "level {:?} loaded: {}x{}, {} piece types, target {}",
            level.name,
            level.width,
            level.height,
            level.pieces.len(),
            level.target_score
        );

        Ok(Self {
            grid,
            resolver: CascadeResolver::new(factory, level.auto_refill),
            effects,
            selection: None,
            phase: SelectionPhase::Idle,
            input_enabled: false,
            revert_if_no_match: level.revert_if_no_match,
            durations: level.durations,
            score: 0,
        })
    }

    /// Report each clear phase's score to `on_score`
    pub fn with_score_callback(mut self, on_score: impl FnMut(u32) + 'static) -> Self {
        self.resolver.set_score_callback(on_score);
        self
    }

    pub fn set_score_callback(&mut self, on_score: impl FnMut(u32) + 'static) {
        self.resolver.set_score_callback(on_score);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut E {
        &mut self.effects
    }

    /// Tear the board down, handing back its effects for the next level
    pub fn into_effects(self) -> E {
        self.effects
    }

    pub fn resolver(&self) -> &CascadeResolver<R> {
        &self.resolver
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn durations(&self) -> &AnimationDurations {
        &self.durations
    }

    pub fn revert_if_no_match(&self) -> bool {
        self.revert_if_no_match
    }

    /// Score accumulated over every cascade on this board
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn selected(&self) -> Option<&Piece> {
        self.selection.and_then(|sel| self.grid.get_at(sel.coord))
    }

    fn enter(&mut self, phase: SelectionPhase) {
        if self.phase != phase {
            log::debug!("selection {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    fn mark(&mut self, at: Coord) {
        if let Some(piece) = self.grid.get_mut(at) {
            piece.selected = true;
            self.selection = Some(Selection {
                id: piece.id(),
                coord: at,
            });
        }
    }

    fn unmark(&mut self) {
        if let Some(sel) = self.selection.take() {
            if let Some(piece) = self.grid.get_mut(sel.coord) {
                piece.selected = false;
            }
        }
    }

    /// Fill the grid with fresh pieces, then enable input.
    ///
    /// Cells are filled row-major with the refill exclusion rule, so the new
    /// board holds no match.
    pub async fn populate(&mut self) {
        self.input_enabled = false;
        self.unmark();
        self.enter(SelectionPhase::Idle);
        self.effects.clear_highlight();
        self.grid.clear_all();

        for c in self.grid.coords() {
            let excluded = self.grid.refill_exclusions(c.x, c.y);
            let piece = self.resolver.factory_mut().spawn(&excluded);
            if let Err(err) = self.grid.set(c.x, c.y, piece) {
                log::error!("populate rejected: {}", err);
                continue;
            }
            self.effects.play_sound(SoundCue::Spawn);
            if let Some(piece) = self.grid.get_at(c) {
                self.effects.request_populate_effect(piece).await;
            }
        }

        log::info!(
            "board populated with {} pieces",
            self.grid.piece_count()
        );
        self.input_enabled = true;
    }

    /// Start over with a freshly populated board.
    ///
    /// This is the way out when an effect never completed and the previous
    /// swap future was dropped with input still disabled.
    pub async fn repopulate(&mut self) {
        log::warn!(
            "repopulating board (input_enabled={}, phase={:?})",
            self.input_enabled,
            self.phase
        );
        self.populate().await;
    }

    /// Load a fixed layout in [`Grid::to_text`] format and enable input.
    ///
    /// No effects are issued and no matches are resolved.
    pub fn set_layout(&mut self, rows: &[&str]) -> Result<(), GridError> {
        self.unmark();
        self.enter(SelectionPhase::Idle);
        let factory = self.resolver.factory_mut();
        self.grid.fill_from_text(rows, |kind| factory.spawn_kind(kind))?;
        self.input_enabled = true;
        Ok(())
    }

    /// Pointer-down feedback: highlight the piece at `at` when nothing is selected
    pub fn highlight(&mut self, at: Coord) -> bool {
        if !self.input_enabled || self.selection.is_some() {
            return false;
        }
        match self.grid.get_at(at) {
            Some(piece) => {
                self.effects.request_highlight(piece);
                true
            }
            None => false,
        }
    }

    /// Pick the piece at `at`
    pub async fn select(&mut self, at: Coord) -> SelectOutcome {
        if !self.input_enabled {
            log::debug!("select {} ignored: input disabled", at);
            return SelectOutcome::Ignored;
        }
        let Some(picked) = self.grid.get_at(at).map(Piece::id) else {
            log::warn!("select {} ignored: empty cell", at);
            return SelectOutcome::Ignored;
        };

        match self.selection {
            None => {
                self.pick(at);
                SelectOutcome::Selected
            }
            Some(sel) if sel.id == picked => {
                self.unmark();
                self.effects.clear_highlight();
                self.enter(SelectionPhase::Idle);
                SelectOutcome::Deselected
            }
            Some(sel) if !Grid::is_adjacent(sel.coord, at) => {
                self.unmark();
                self.pick(at);
                SelectOutcome::Reselected
            }
            Some(sel) => SelectOutcome::Swapped(self.swap(sel.coord, at).await),
        }
    }

    fn pick(&mut self, at: Coord) {
        self.mark(at);
        if let Some(piece) = self.grid.get_at(at) {
            self.effects.request_highlight(piece);
        }
        self.effects.play_sound(SoundCue::Select);
        self.enter(SelectionPhase::FirstSelected);
    }

    /// Swap two adjacent pieces and resolve the result.
    ///
    /// Input is disabled until the cascade or the revert has settled.
    pub async fn swap(&mut self, a: Coord, b: Coord) -> SwapOutcome {
        if !self.input_enabled {
            log::debug!("swap {} <-> {} ignored: input disabled", a, b);
            return SwapOutcome::Ignored;
        }
        if !Grid::is_adjacent(a, b) {
            log::warn!("swap {} <-> {} ignored: not adjacent", a, b);
            return SwapOutcome::Ignored;
        }
        if self.grid.get_at(a).is_none() || self.grid.get_at(b).is_none() {
            log::warn!("swap {} <-> {} ignored: empty cell", a, b);
            return SwapOutcome::Ignored;
        }

        self.input_enabled = false;
        self.enter(SelectionPhase::SwapInFlight);
        self.effects.clear_highlight();
        self.effects.play_sound(SoundCue::Swap);

        self.animate_swap(a, b).await;

        let matched = matcher::scan_board(&self.grid);
        let outcome = if matched.has_match() {
            self.unmark();
            let report = self
                .resolver
                .resolve(&mut self.grid, &mut self.effects, matched)
                .await;
            self.score = self.score.saturating_add(report.score);
            SwapOutcome::Matched(report)
        } else if self.revert_if_no_match {
            self.effects.play_sound(SoundCue::InvalidMove);
            self.animate_swap(a, b).await;
            SwapOutcome::Reverted
        } else {
            SwapOutcome::Kept
        };

        self.unmark();
        self.effects.settle().await;
        self.enter(SelectionPhase::Idle);
        self.input_enabled = true;
        log::debug!("swap {} <-> {} settled: {:?}", a, b, outcome);
        outcome
    }

    /// Await both move effects, then exchange the cells
    async fn animate_swap(&mut self, a: Coord, b: Coord) {
        let to_b = self.grid.world_position(b);
        let to_a = self.grid.world_position(a);
        if let (Some(pa), Some(pb)) = (self.grid.get_at(a), self.grid.get_at(b)) {
            let moves = [
                PieceMove {
                    piece: pa,
                    target: to_b,
                },
                PieceMove {
                    piece: pb,
                    target: to_a,
                },
            ];
            self.effects.request_moves(&moves).await;
        }

        if let Err(err) = self.grid.swap(a, b) {
            log::error!("swap {} <-> {} rejected: {}", a, b, err);
        }
        // The selection follows its piece.
        if let Some(sel) = self.selection.as_mut() {
            if sel.coord == a {
                sel.coord = b;
            } else if sel.coord == b {
                sel.coord = a;
            }
        }
    }

    /// Resolve a drag from the piece at `at` towards `direction`.
    ///
    /// With no piece in that direction the dragged piece shakes and nothing
    /// changes.
    pub async fn swap_by_direction(&mut self, at: Coord, direction: Direction) -> SwapOutcome {
        if !self.input_enabled {
            log::debug!("drag {} {} ignored: input disabled", at, direction.as_str());
            return SwapOutcome::Ignored;
        }
        let Some(piece) = self.grid.get_at(at) else {
            log::warn!("drag {} ignored: empty cell", at);
            return SwapOutcome::Ignored;
        };

        let target = at.step(direction);
        if self.grid.get_at(target).is_none() {
            log::warn!("drag {} {} has no neighbour", at, direction.as_str());
            self.effects.request_shake_effect(piece);
            self.effects.play_sound(SoundCue::InvalidMove);
            return SwapOutcome::NoNeighbor;
        }

        self.swap(at, target).await
    }

    /// First piece with a matching swap
    pub fn find_hint(&self) -> Option<&Piece> {
        matcher::find_hint(&self.grid)
    }

    /// First matching swap
    pub fn find_hint_move(&self) -> Option<Hint> {
        matcher::find_hint_move(&self.grid)
    }
}

impl<E: std::fmt::Debug, R> std::fmt::Debug for MatchBoard<E, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchBoard")
            .field("grid", &self.grid)
            .field("effects", &self.effects)
            .field("selection", &self.selection)
            .field("phase", &self.phase)
            .field("input_enabled", &self.input_enabled)
            .field("score", &self.score)
            .finish()
    }
}
