use match_board::core::{Grid, LevelConfig, Piece, ScoreProgress};
use match_board::term::{AnchorY, BoardView, Hud, Palette, Scene, Viewport};
use match_board::types::{Coord, PieceId, PieceTypeId, SoundCue};

fn scene_of(rows: &[&str]) -> (Grid, Scene) {
    let mut grid = Grid::new(rows[0].len() as u16, rows.len() as u16, Coord::default()).unwrap();
    let mut next = 0;
    grid.fill_from_text(rows, |kind| {
        next += 1;
        Piece::new(PieceId(next), kind)
    })
    .unwrap();

    let mut scene = Scene::new(grid.width(), grid.height(), grid.origin());
    for piece in grid.pieces() {
        scene.insert(piece, 1.0);
    }
    (grid, scene)
}

fn hud() -> Hud {
    let mut hud = Hud::new(50);
    hud.level_name = "Classic".to_string();
    hud.palette = Palette::from_specs(&LevelConfig::default().pieces);
    hud
}

#[test]
fn term_view_renders_border_corners() {
    let (_, scene) = scene_of(&["01234", "12340", "23401", "34012"]);
    let view = BoardView::default();

    // 5 cells * 2 columns + border = 12 wide, 4 rows + border = 6 high.
    let fb = view.render(&scene, &hud(), false, Viewport::new(12, 6));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(11, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 5).unwrap().ch, '└');
    assert_eq!(fb.get(11, 5).unwrap().ch, '┘');
}

#[test]
fn term_view_draws_pieces_two_chars_wide_in_type_colour() {
    let (_, scene) = scene_of(&["..", "3."]);
    let hud = hud();
    let fb = BoardView::default().render(&scene, &hud, false, Viewport::new(6, 4));

    // Bottom-left cell is the last board row on screen.
    let left = fb.get(1, 2).unwrap();
    let right = fb.get(2, 2).unwrap();
    assert_eq!(left.ch, '█');
    assert_eq!(right.ch, '█');
    assert_eq!(left.style.fg, hud.palette.color(PieceTypeId(3)));
    assert_eq!(fb.get(3, 2).unwrap().ch, '·');
}

#[test]
fn term_view_marks_cursor_hint_and_highlight() {
    let (grid, mut scene) = scene_of(&["012", "120", "002"]);
    let mut hud = hud();
    hud.cursor = Coord::new(0, 0);
    hud.hint = Some(Coord::new(2, 0));
    scene.set_highlight(grid.get(1, 2).map(Piece::id));

    let view = BoardView::default().with_anchor_y(AnchorY::Top);
    let vp = Viewport::new(8, 5);
    let fb = view.render(&scene, &hud, false, vp);
    let layout = view.layout(&scene, vp);

    let bg = |c: Coord| {
        let (x, y) = layout.cell_to_screen(c);
        fb.get(x as u16, y as u16).unwrap().style.bg
    };
    let plain = bg(Coord::new(1, 1));
    assert_ne!(bg(Coord::new(0, 0)), plain);
    assert_ne!(bg(Coord::new(2, 0)), plain);
    assert_ne!(bg(Coord::new(1, 2)), plain);
    assert_ne!(bg(Coord::new(0, 0)), bg(Coord::new(2, 0)));

    let (x, y) = layout.cell_to_screen(Coord::new(1, 2));
    assert!(fb.get(x as u16, y as u16).unwrap().style.bold);
}

#[test]
fn term_view_draws_side_panel_when_wide_enough() {
    let (_, scene) = scene_of(&["012", "120", "002"]);
    let mut hud = hud();
    hud.progress = ScoreProgress { current: 21, target: 50 };
    hud.last_cue = Some(SoundCue::MatchSuccess);
    hud.level_index = 1;
    hud.level_count = 3;

    let fb = BoardView::default()
        .with_anchor_y(AnchorY::Top)
        .render(&scene, &hud, true, Viewport::new(40, 24));
    let text: Vec<String> = (0..24).map(|y| fb.row_text(y)).collect();

    assert!(text.iter().any(|row| row.contains("LEVEL")));
    assert!(text.iter().any(|row| row.contains("Classic")));
    assert!(text.iter().any(|row| row.contains("2/3")));
    assert!(text.iter().any(|row| row.contains("21 / 50")));
    assert!(text.iter().any(|row| row.contains("[####......]")));
    assert!(text.iter().any(|row| row.contains("resolving")));
    assert!(text.iter().any(|row| row.contains("matchSuccess")));
}

#[test]
fn term_view_omits_side_panel_when_narrow() {
    let (_, scene) = scene_of(&["012", "120", "002"]);
    let fb = BoardView::default()
        .with_anchor_y(AnchorY::Top)
        .render(&scene, &hud(), false, Viewport::new(12, 10));
    let text: Vec<String> = (0..10).map(|y| fb.row_text(y)).collect();
    assert!(!text.iter().any(|row| row.contains("SCORE")));
}

#[test]
fn term_view_shows_message_under_board() {
    let (_, scene) = scene_of(&["012", "120", "002"]);
    let mut hud = hud();
    hud.message = Some("+3".to_string());

    let fb = BoardView::default()
        .with_anchor_y(AnchorY::Top)
        .render(&scene, &hud, false, Viewport::new(8, 6));
    // Frame is 5 rows tall, so row 5 sits just below it.
    assert!(fb.row_text(5).contains("+3"));
}

#[test]
fn term_view_hit_test_maps_every_cell_column() {
    let (grid, scene) = scene_of(&["0123", "1230", "2301"]);
    let view = BoardView::default();
    let layout = view.layout(&scene, Viewport::new(30, 12));

    for c in grid.coords() {
        let (x, y) = layout.cell_to_screen(c);
        for dx in 0..2 {
            let world = layout.screen_to_world((x + dx) as u16, y as u16);
            assert_eq!(grid.coord_at_world(world), Some(c));
        }
    }
    // The border is off the board.
    let world = layout.screen_to_world(layout.frame_x, layout.frame_y);
    assert_eq!(grid.coord_at_world(world), None);
}
