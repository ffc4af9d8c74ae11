use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokio_test::block_on;

use match_board::core::{
    find_hint_move, scan_board, CascadeResolver, LevelConfig, MatchBoard, NoopEffects,
    PieceFactory,
};

fn populated_board() -> MatchBoard<NoopEffects> {
    let mut board = MatchBoard::new(&LevelConfig::default(), NoopEffects, 12345).unwrap();
    block_on(board.populate());
    board
}

fn bench_scan(c: &mut Criterion) {
    let board = populated_board();

    c.bench_function("scan_board_8x8", |b| {
        b.iter(|| scan_board(black_box(board.grid())))
    });
}

fn bench_hint(c: &mut Criterion) {
    let board = populated_board();

    c.bench_function("find_hint_8x8", |b| {
        b.iter(|| find_hint_move(black_box(board.grid())))
    });
}

fn bench_populate(c: &mut Criterion) {
    let mut board = populated_board();

    c.bench_function("populate_8x8", |b| {
        b.iter(|| block_on(board.populate()))
    });
}

fn bench_cascade(c: &mut Criterion) {
    let level = LevelConfig::default();
    let rows = [
        "01230123", "12301230", "23012301", "30123012", "01230123", "12301230", "23012301",
        "44401234",
    ];
    let mut seed = 0;

    c.bench_function("cascade_from_bottom_run", |b| {
        b.iter(|| {
            seed += 1;
            let catalog = level.catalog().unwrap();
            let mut resolver = CascadeResolver::new(PieceFactory::seeded(catalog, seed), true);
            let mut board = MatchBoard::new(&level, NoopEffects, seed).unwrap();
            board.set_layout(&rows).unwrap();
            let mut grid = board.grid().clone();
            let matched = scan_board(&grid);
            block_on(resolver.resolve(&mut grid, &mut NoopEffects, matched))
        })
    });
}

criterion_group!(benches, bench_scan, bench_hint, bench_populate, bench_cascade);
criterion_main!(benches);
