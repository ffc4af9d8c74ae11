//! Cascade resolver - the clear, drop, refill, recheck loop
//!
//! One call to [`CascadeResolver::resolve`] runs a committed swap's matches to
//! a stable board:
//!
//! ```text
//! Idle -> Clearing -> Dropping -> Refilling -> Rechecking -+-> Idle
//!            ^                                             |
//!            +------------------ match found --------------+
//! ```
//!
//! Every effect request is awaited before the next grid mutation, so the
//! collaborator always sees the board in the order the rules change it.
//! Score is reported through the callback once per clear phase.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::effects::BoardEffects;
use crate::factory::PieceFactory;
use crate::grid::Grid;
use crate::matcher::{scan_board, MatchSet};
use crate::types::SoundCue;

/// Upper bound on clear phases in one cascade
pub const MAX_CASCADE_ITERATIONS: u32 = 256;

/// Receives each clear phase's score
pub type ScoreCallback = Box<dyn FnMut(u32)>;

/// Cascade state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadePhase {
    #[default]
    Idle,
    Clearing,
    Dropping,
    Refilling,
    Rechecking,
}

/// Summary of one completed cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    /// Clear phases run
    pub iterations: u32,
    /// Score summed over every clear phase
    pub score: u32,
    /// Pieces removed over every clear phase
    pub cleared: usize,
}

pub struct CascadeResolver<R = ChaCha8Rng> {
    factory: PieceFactory<R>,
    auto_refill: bool,
    on_score: Option<ScoreCallback>,
    phase: CascadePhase,
}

impl<R> std::fmt::Debug for CascadeResolver<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeResolver")
            .field("auto_refill", &self.auto_refill)
            .field("phase", &self.phase)
            .field("has_score_callback", &self.on_score.is_some())
            .finish()
    }
}

impl<R: Rng> CascadeResolver<R> {
    pub fn new(factory: PieceFactory<R>, auto_refill: bool) -> Self {
        Self {
            factory,
            auto_refill,
            on_score: None,
            phase: CascadePhase::Idle,
        }
    }

    pub fn with_score_callback(mut self, on_score: impl FnMut(u32) + 'static) -> Self {
        self.on_score = Some(Box::new(on_score));
        self
    }

    pub fn set_score_callback(&mut self, on_score: impl FnMut(u32) + 'static) {
        self.on_score = Some(Box::new(on_score));
    }

    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    pub fn auto_refill(&self) -> bool {
        self.auto_refill
    }

    pub fn factory(&self) -> &PieceFactory<R> {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut PieceFactory<R> {
        &mut self.factory
    }

    fn enter(&mut self, phase: CascadePhase) {
        if self.phase != phase {
            log::debug!("cascade {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Resolve `matched` and every match it leads to.
    ///
    /// An empty `matched` is a no-op returning an empty report.
    pub async fn resolve<E: BoardEffects>(
        &mut self,
        grid: &mut Grid,
        effects: &mut E,
        matched: MatchSet,
    ) -> CascadeReport {
        let mut report = CascadeReport::default();
        if matched.is_empty() {
            return report;
        }

        let mut matched = matched;
        loop {
            if report.iterations >= MAX_CASCADE_ITERATIONS {
                log::error!(
                    "cascade exceeded {} clear phases, stopping with {} cells still matched",
                    MAX_CASCADE_ITERATIONS,
                    matched.len()
                );
                break;
            }

            report.iterations += 1;
            report.cleared += matched.len();
            report.score += self.clear_matches(grid, effects, &matched).await;

            self.drop_pieces(grid, effects).await;

            if self.auto_refill {
                self.refill(grid, effects).await;
            }

            self.enter(CascadePhase::Rechecking);
            matched = scan_board(grid);
            if !matched.has_match() {
                break;
            }
        }

        self.enter(CascadePhase::Idle);
        log::debug!(
            "cascade settled after {} iterations, score {}",
            report.iterations,
            report.score
        );
        report
    }

    /// Remove every matched piece and report the phase's score.
    ///
    /// Each removal effect completes before any cell is cleared. Returns the
    /// phase score.
    pub async fn clear_matches<E: BoardEffects>(
        &mut self,
        grid: &mut Grid,
        effects: &mut E,
        matched: &MatchSet,
    ) -> u32 {
        self.enter(CascadePhase::Clearing);

        let catalog = self.factory.catalog();
        let mut total = 0u32;
        for c in matched.iter() {
            if let Some(piece) = grid.get_at(c) {
                total = total.saturating_add(catalog.score_of(piece.kind()));
                effects.request_remove_effect(piece).await;
            }
        }

        for c in matched.iter() {
            grid.clear(c.x, c.y);
        }

        if total > 0 {
            effects.play_sound(SoundCue::MatchSuccess);
            if let Some(on_score) = self.on_score.as_mut() {
                on_score(total);
            }
        }
        total
    }

    /// Let every piece fall onto the piece or floor below it.
    ///
    /// Sweeps bottom-up from row 1 so each piece moves at most once. Returns
    /// the number of pieces moved.
    pub async fn drop_pieces<E: BoardEffects>(&mut self, grid: &mut Grid, effects: &mut E) -> usize {
        self.enter(CascadePhase::Dropping);

        let mut moved = 0;
        for y in 1..i32::from(grid.height()) {
            for x in 0..i32::from(grid.width()) {
                if grid.is_empty_at(x, y) || !grid.can_drop(x, y) {
                    continue;
                }

                let target = match grid.drop_target(x, y) {
                    Ok(target) => target,
                    Err(err) => {
                        log::error!("drop stopped in place: {}", err);
                        continue;
                    }
                };

                if let Some(piece) = grid.get(x, y) {
                    effects.request_drop_effect(piece, target.rows).await;
                }

                if let Some(piece) = grid.clear(x, y) {
                    if let Err(err) = grid.set(x, target.row, piece) {
                        log::error!("drop target rejected: {}", err);
                        continue;
                    }
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Fill every empty cell with a new piece, row-major.
    ///
    /// Returns the number of pieces spawned.
    pub async fn refill<E: BoardEffects>(&mut self, grid: &mut Grid, effects: &mut E) -> usize {
        self.enter(CascadePhase::Refilling);

        let mut spawned = 0;
        for c in grid.coords() {
            if !grid.is_empty_at(c.x, c.y) {
                continue;
            }

            let excluded = grid.refill_exclusions(c.x, c.y);
            let piece = self.factory.spawn(&excluded);
            if let Err(err) = grid.set(c.x, c.y, piece) {
                log::error!("refill rejected: {}", err);
                continue;
            }

            effects.play_sound(SoundCue::Spawn);
            if let Some(piece) = grid.get_at(c) {
                effects.request_spawn_effect(piece).await;
            }
            spawned += 1;
        }
        spawned
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::catalog::{PieceCatalog, PieceSpec};
    use crate::effects::{EffectEvent, NoopEffects, RecordingEffects};
    use crate::piece::Piece;
    use crate::types::{Coord, PieceId, PieceTypeId};

    fn catalog(n: u32) -> PieceCatalog {
        PieceCatalog::new((0..n).map(|i| PieceSpec::new(i, i + 1, "")).collect()).unwrap()
    }

    /// Text rows, top first; digits are types, `.` is empty.
    fn grid_from(rows: &[&str]) -> Grid {
        let height = rows.len() as u16;
        let width = rows[0].len() as u16;
        let mut grid = Grid::new(width, height, Coord::default()).unwrap();
        let mut next = 1000u64;
        for (r, row) in rows.iter().enumerate() {
            let y = i32::from(height) - 1 - r as i32;
            for (x, ch) in row.chars().enumerate() {
                if let Some(d) = ch.to_digit(10) {
                    grid.set(x as i32, y, Piece::new(PieceId(next), PieceTypeId(d)))
                        .unwrap();
                    next += 1;
                }
            }
        }
        grid
    }

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    #[test]
    fn test_empty_match_set_is_noop() {
        let mut grid = grid_from(&["012", "120"]);
        let before = grid.clone();
        let mut resolver = CascadeResolver::new(PieceFactory::seeded(catalog(3), 1), true);
        let report = block_on(resolver.resolve(&mut grid, &mut NoopEffects, MatchSet::new()));
        assert_eq!(report, CascadeReport::default());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_clear_scores_and_reports_once() {
        let mut grid = grid_from(&["201", "222"]);
        let matched = scan_board(&grid);
        let reported = Rc::new(RefCell::new(Vec::new()));
        let sink = reported.clone();
        let mut resolver = CascadeResolver::new(PieceFactory::seeded(catalog(3), 1), false)
            .with_score_callback(move |amount| sink.borrow_mut().push(amount));
        let mut effects = RecordingEffects::new();

        let score = block_on(resolver.clear_matches(&mut grid, &mut effects, &matched));

        // Type 2 scores 3 in this catalog.
        assert_eq!(score, 9);
        assert_eq!(*reported.borrow(), vec![9]);
        assert_eq!(grid.piece_count(), 3);
        assert_eq!(
            effects.count(|e| matches!(e, EffectEvent::Remove { .. })),
            3
        );
        assert_eq!(effects.sounds(), vec![SoundCue::MatchSuccess]);
    }

    #[test]
    fn test_removals_in_column_order() {
        let mut grid = grid_from(&["1..", "1..", "111"]);
        let matched = scan_board(&grid);
        let mut resolver = CascadeResolver::new(PieceFactory::seeded(catalog(3), 1), false);
        let mut effects = RecordingEffects::new();
        block_on(resolver.clear_matches(&mut grid, &mut effects, &matched));

        let order: Vec<Coord> = effects
            .events
            .iter()
            .filter_map(|e| match e {
                EffectEvent::Remove { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert_eq!(
            order,
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(0, 2),
                Coord::new(1, 0),
                Coord::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_drop_settles_stacked_gaps() {
        let mut grid = grid_from(&["1", "2", ".", ".", "3"]);
        let before = grid.kind_histogram();
        let mut resolver = CascadeResolver::new(PieceFactory::seeded(catalog(4), 1), false);
        let mut effects = RecordingEffects::new();

        let moved = block_on(resolver.drop_pieces(&mut grid, &mut effects));

        assert_eq!(moved, 2);
        assert_eq!(grid.to_text(), ".\n.\n1\n2\n3");
        assert_eq!(grid.kind_histogram(), before);
        assert!(effects
            .events
            .iter()
            .all(|e| matches!(e, EffectEvent::Drop { rows: 2, .. })));
    }

    #[test]
    fn test_refill_fills_every_empty_cell() {
        let mut grid = grid_from(&["..", "0."]);
        let mut resolver = CascadeResolver::new(PieceFactory::seeded(catalog(5), 3), true);
        let mut effects = RecordingEffects::new();

        let spawned = block_on(resolver.refill(&mut grid, &mut effects));

        assert_eq!(spawned, 3);
        assert_eq!(grid.piece_count(), 4);
        let spawn_cells: Vec<Coord> = effects
            .events
            .iter()
            .filter_map(|e| match e {
                EffectEvent::Spawn { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert_eq!(
            spawn_cells,
            vec![Coord::new(1, 0), Coord::new(0, 1), Coord::new(1, 1)]
        );
    }

    #[test]
    fn test_without_refill_cells_stay_empty() {
        let mut grid = grid_from(&["2", "1", "1", "1"]);
        let matched = scan_board(&grid);
        let mut resolver = CascadeResolver::new(PieceFactory::seeded(catalog(3), 1), false);
        let report = block_on(resolver.resolve(&mut grid, &mut NoopEffects, matched));

        assert_eq!(report.iterations, 1);
        assert_eq!(report.cleared, 3);
        assert_eq!(grid.to_text(), ".\n.\n.\n2");
        assert_eq!(resolver.phase(), CascadePhase::Idle);
    }

    #[test]
    fn test_resolve_converges() {
        let mut grid = grid_from(&["0120", "1201", "0000"]);
        let matched = scan_board(&grid);
        let mut resolver = CascadeResolver::new(PieceFactory::seeded(catalog(3), 42), true);
        let report = block_on(resolver.resolve(&mut grid, &mut NoopEffects, matched));

        assert!(report.iterations >= 1);
        assert!(report.score >= 4);
        assert!(!scan_board(&grid).has_match());
        assert_eq!(grid.piece_count(), 12);
    }
}
