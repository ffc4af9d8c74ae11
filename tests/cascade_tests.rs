//! Cascade tests - clear, drop, refill ordering across chained matches

use std::cell::RefCell;
use std::rc::Rc;

use tokio_test::block_on;

use match_board::core::{
    scan_board, CascadePhase, CascadeResolver, EffectEvent, Grid, LevelConfig, PieceFactory,
    RecordingEffects,
};
use match_board::types::{Coord, SoundCue};

/// Column 0 holds a vertical run; the piece above it lands to complete row 0.
const CHAIN: [&str; 4] = ["200", "143", "134", "122"];

fn resolver(seed: u64, refill: bool) -> CascadeResolver {
    let catalog = LevelConfig::default().catalog().unwrap();
    CascadeResolver::new(PieceFactory::seeded(catalog, seed), refill)
}

fn grid_from(rows: &[&str], resolver: &mut CascadeResolver) -> Grid {
    let width = rows[0].len() as u16;
    let mut grid = Grid::new(width, rows.len() as u16, Coord::default()).unwrap();
    let factory = resolver.factory_mut();
    grid.fill_from_text(rows, |kind| factory.spawn_kind(kind))
        .unwrap();
    grid
}

/// Effect log without piece ids, which depend on spawn order
fn shape(events: &[EffectEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            EffectEvent::Remove { at, .. } => Some(format!("remove {}", at)),
            EffectEvent::Drop { from, rows, .. } => Some(format!("drop {} {}", from, rows)),
            EffectEvent::Spawn { at, .. } => Some(format!("spawn {}", at)),
            EffectEvent::Sound(cue) => Some(format!("sound {}", cue.as_str())),
            _ => None,
        })
        .collect()
}

#[test]
fn test_chained_match_runs_two_phases() {
    let mut resolver = resolver(1, false);
    let mut grid = grid_from(&CHAIN, &mut resolver);
    let mut effects = RecordingEffects::new();

    let scores = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&scores);
    resolver.set_score_callback(move |points| sink.borrow_mut().push(points));

    let matched = scan_board(&grid);
    assert_eq!(matched.len(), 3);
    let report = block_on(resolver.resolve(&mut grid, &mut effects, matched));

    assert_eq!(report.iterations, 2);
    assert_eq!(report.cleared, 6);
    assert_eq!(report.score, 6);
    assert_eq!(*scores.borrow(), vec![3, 3]);
    assert_eq!(resolver.phase(), CascadePhase::Idle);
    assert_eq!(grid.to_text(), "...\n.00\n.43\n.34");

    assert_eq!(
        shape(&effects.events),
        vec![
            "remove (0, 0)",
            "remove (0, 1)",
            "remove (0, 2)",
            "sound matchSuccess",
            "drop (0, 3) 3",
            "remove (0, 0)",
            "remove (1, 0)",
            "remove (2, 0)",
            "sound matchSuccess",
            "drop (1, 1) 1",
            "drop (2, 1) 1",
            "drop (1, 2) 1",
            "drop (2, 2) 1",
            "drop (1, 3) 1",
            "drop (2, 3) 1",
        ]
    );
}

#[test]
fn test_removed_piece_is_still_on_grid_during_its_effect() {
    // Every removal is reported with the coordinate the piece occupied.
    let mut resolver = resolver(1, false);
    let mut grid = grid_from(&CHAIN, &mut resolver);
    let ids: Vec<_> = (0..3)
        .map(|y| grid.get(0, y).unwrap().id())
        .collect();
    let mut effects = RecordingEffects::new();

    let matched = scan_board(&grid);
    block_on(resolver.clear_matches(&mut grid, &mut effects, &matched));

    let removed: Vec<_> = effects
        .events
        .iter()
        .filter_map(|e| match e {
            EffectEvent::Remove { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(removed, ids);
    assert!((0..3).all(|y| grid.is_empty_at(0, y)));
}

#[test]
fn test_refill_leaves_a_full_stable_board() {
    for seed in 0..20 {
        let mut resolver = resolver(seed, true);
        let mut grid = grid_from(&CHAIN, &mut resolver);
        let mut effects = RecordingEffects::new();

        let matched = scan_board(&grid);
        let report = block_on(resolver.resolve(&mut grid, &mut effects, matched));

        assert!(report.iterations >= 2, "seed {}", seed);
        assert_eq!(grid.piece_count(), 12, "seed {}", seed);
        assert!(!scan_board(&grid).has_match(), "seed {}", seed);
        assert_eq!(
            effects.count(|e| matches!(e, EffectEvent::Spawn { .. })),
            report.cleared,
            "seed {}",
            seed
        );
    }
}

#[test]
fn test_refill_follows_drop_in_each_phase() {
    let mut resolver = resolver(3, true);
    let mut grid = grid_from(&CHAIN, &mut resolver);
    let mut effects = RecordingEffects::new();

    let matched = scan_board(&grid);
    block_on(resolver.resolve(&mut grid, &mut effects, matched));

    let log = shape(&effects.events);
    // First phase: three removals, the landing drop, then three spawns in
    // the emptied column, bottom row first.
    assert_eq!(
        &log[..8],
        &[
            "remove (0, 0)",
            "remove (0, 1)",
            "remove (0, 2)",
            "sound matchSuccess",
            "drop (0, 3) 3",
            "sound spawn",
            "spawn (0, 1)",
            "sound spawn",
        ]
    );
    assert_eq!(log[8], "spawn (0, 2)");
}

#[test]
fn test_resolve_empty_set_is_noop() {
    let mut resolver = resolver(1, true);
    let mut grid = grid_from(&["012", "120", "012"], &mut resolver);
    let before = grid.clone();
    let mut effects = RecordingEffects::new();

    let matched = scan_board(&grid);
    let report = block_on(resolver.resolve(&mut grid, &mut effects, matched));

    assert_eq!(report.iterations, 0);
    assert_eq!(report.score, 0);
    assert_eq!(grid, before);
    assert!(effects.events.is_empty());
    assert!(!effects.sounds().contains(&SoundCue::MatchSuccess));
}
