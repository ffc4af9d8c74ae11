//! Terminal match board runner (default binary).
//!
//! Drives a [`MatchBoard`] on a single-threaded tokio runtime. Each board
//! call is awaited to completion while [`TermEffects`] animates it, so the
//! loop only reads input between resolved moves.

use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;

use match_board::core::{
    AnimationDurations, GameConfig, Grid, LevelSet, MatchBoard, SelectOutcome, SwapOutcome,
};
use match_board::input::{handle_key_event, should_quit, BoardAction, PointerAction, PointerHandler};
use match_board::term::{Hud, Palette, Scene, TermEffects, TerminalRenderer, Viewport, FRAME_INTERVAL};
use match_board::types::{Coord, Direction};

type Board = MatchBoard<TermEffects>;

fn main() -> Result<()> {
    let config = GameConfig::from_env()?;
    init_logging(&config)?;
    let levels = config.load_levels()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("starting with {} levels, seed {}", levels.len(), seed);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = runtime.block_on(run(term, levels, seed));

    // Always try to restore terminal state.
    let _ = TerminalRenderer::new().exit();
    if let Err(err) = &result {
        log::error!("exiting with error: {:#}", err);
    }
    result
}

/// Log to a file when one is configured; a raw-mode terminal has no room for log lines.
fn init_logging(config: &GameConfig) -> Result<()> {
    if let Some(path) = &config.log_path {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
    Ok(())
}

async fn run(term: TerminalRenderer, mut levels: LevelSet, seed: u64) -> Result<()> {
    let hud = Rc::new(RefCell::new(Hud::new(levels.current().target_score)));
    let (w, h) = terminal::size().unwrap_or((80, 24));
    let effects = TermEffects::new(
        term,
        Scene::new(0, 0, Coord::default()),
        Viewport::new(w, h),
        AnimationDurations::default(),
        Rc::clone(&hud),
    );

    let mut board = load_level(&levels, effects, seed, &hud)?;
    board.populate().await;
    let mut pointer = PointerHandler::new();

    loop {
        if hud.borrow().progress.is_complete() {
            let finished = hud.borrow().level_name.clone();
            levels.next();
            board = load_level(&levels, board.into_effects(), seed, &hud)?;
            hud.borrow_mut().message = Some(format!("{} complete!", finished));
            board.populate().await;
            continue;
        }

        let (w, h) = terminal::size().unwrap_or((80, 24));
        let busy = !board.is_input_enabled();
        board.effects_mut().set_viewport(Viewport::new(w, h));
        board.effects_mut().draw(busy);

        if !event::poll(FRAME_INTERVAL)? {
            continue;
        }

        let awaited = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    return Ok(());
                }
                match handle_key_event(key) {
                    Some(BoardAction::NextLevel) => {
                        levels.next();
                        board = load_level(&levels, board.into_effects(), seed, &hud)?;
                        board.populate().await;
                        true
                    }
                    Some(BoardAction::PreviousLevel) => {
                        levels.previous();
                        board = load_level(&levels, board.into_effects(), seed, &hud)?;
                        board.populate().await;
                        true
                    }
                    Some(action) => apply_action(&mut board, &hud, action).await,
                    None => false,
                }
            }
            Event::Mouse(mouse) => {
                let effects = board.effects();
                let layout = effects.view().layout(effects.scene(), effects.viewport());
                let grid = board.grid();
                let action = pointer.handle_mouse_event(
                    mouse,
                    |column, row| layout.screen_to_world(column, row),
                    |pos| grid.coord_at_world(pos),
                );
                match action {
                    Some(action) => apply_pointer(&mut board, &hud, action).await,
                    None => false,
                }
            }
            Event::Resize(..) => {
                board.effects_mut().renderer_mut().invalidate();
                false
            }
            _ => false,
        };

        // Input that arrived while the board was busy is stale.
        if awaited {
            pointer.cancel();
            if drain_stale_events()? {
                return Ok(());
            }
        }
    }
}

/// Build the board for the current level, reusing the terminal effects
fn load_level(
    levels: &LevelSet,
    mut effects: TermEffects,
    seed: u64,
    hud: &Rc<RefCell<Hud>>,
) -> Result<Board> {
    let level = levels.current();
    let origin = Grid::new(level.width, level.height, level.center_coord())?.origin();
    effects.reset_scene(level.width, level.height, origin, level.durations);

    {
        let mut hud = hud.borrow_mut();
        hud.level_name = level.name.clone();
        hud.level_index = levels.index();
        hud.level_count = levels.len();
        hud.progress.reset(level.target_score);
        hud.palette = Palette::from_specs(&level.pieces);
        hud.cursor = Coord::new(i32::from(level.width) / 2, i32::from(level.height) / 2);
        hud.hint = None;
        hud.message = None;
        hud.last_cue = None;
    }

    let progress = Rc::clone(hud);
    let board = MatchBoard::new(level, effects, seed.wrapping_add(levels.index() as u64))?
        .with_score_callback(move |points| progress.borrow_mut().progress.add(points));
    Ok(board)
}

/// Apply a keyboard action; returns whether the board awaited effects
async fn apply_action(board: &mut Board, hud: &Rc<RefCell<Hud>>, action: BoardAction) -> bool {
    match action {
        BoardAction::MoveCursor(dir) => {
            let mut hud = hud.borrow_mut();
            if let Some(next) = board.grid().neighbor(hud.cursor, dir) {
                hud.cursor = next;
            }
            false
        }
        BoardAction::Select => {
            let at = hud.borrow().cursor;
            let outcome = board.select(at).await;
            report_select(hud, outcome);
            true
        }
        BoardAction::Drag(dir) => {
            let at = hud.borrow().cursor;
            let outcome = board.swap_by_direction(at, dir).await;
            follow_swap(board, hud, at, dir, &outcome);
            report_swap(hud, outcome);
            true
        }
        BoardAction::Hint => {
            let hint = board.find_hint_move();
            let mut hud = hud.borrow_mut();
            hud.hint = hint.map(|h| h.from);
            hud.message = match hint {
                Some(h) => Some(format!("try {} {}", h.from, h.direction.as_str())),
                None => Some("no moves left, press r to shuffle".to_string()),
            };
            false
        }
        BoardAction::Repopulate => {
            board.repopulate().await;
            let mut hud = hud.borrow_mut();
            hud.hint = None;
            hud.message = Some("shuffled".to_string());
            true
        }
        // Level changes rebuild the board in the run loop.
        BoardAction::NextLevel | BoardAction::PreviousLevel => false,
    }
}

async fn apply_pointer(board: &mut Board, hud: &Rc<RefCell<Hud>>, action: PointerAction) -> bool {
    match action {
        PointerAction::Press(at) => {
            hud.borrow_mut().cursor = at;
            board.highlight(at);
            false
        }
        PointerAction::Click(at) => {
            let outcome = board.select(at).await;
            report_select(hud, outcome);
            true
        }
        PointerAction::Drag(at, dir) => {
            let outcome = board.swap_by_direction(at, dir).await;
            follow_swap(board, hud, at, dir, &outcome);
            report_swap(hud, outcome);
            true
        }
    }
}

/// Keep the cursor on the dragged piece when it stays where it moved
fn follow_swap(board: &Board, hud: &Rc<RefCell<Hud>>, at: Coord, dir: Direction, outcome: &SwapOutcome) {
    if matches!(outcome, SwapOutcome::Matched(_) | SwapOutcome::Kept) {
        if let Some(next) = board.grid().neighbor(at, dir) {
            hud.borrow_mut().cursor = next;
        }
    }
}

fn report_select(hud: &Rc<RefCell<Hud>>, outcome: SelectOutcome) {
    match outcome {
        SelectOutcome::Swapped(swap) => report_swap(hud, swap),
        SelectOutcome::Ignored => {}
        _ => hud.borrow_mut().hint = None,
    }
}

fn report_swap(hud: &Rc<RefCell<Hud>>, outcome: SwapOutcome) {
    let mut hud = hud.borrow_mut();
    hud.hint = None;
    hud.message = match outcome {
        SwapOutcome::Matched(report) if report.iterations > 1 => {
            Some(format!("+{} ({} chain)", report.score, report.iterations))
        }
        SwapOutcome::Matched(report) => Some(format!("+{}", report.score)),
        SwapOutcome::Reverted => Some("no match".to_string()),
        SwapOutcome::NoNeighbor => Some("nothing there".to_string()),
        SwapOutcome::Kept | SwapOutcome::Ignored => None,
    };
}

/// Discard queued input; returns true when a quit key was among it
fn drain_stale_events() -> Result<bool> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && should_quit(key) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
