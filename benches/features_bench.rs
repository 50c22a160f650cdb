use criterion::{criterion_group, criterion_main, Criterion, black_box};
use brainmate::{features, goals, EngineEvaluation, Position};

fn bench_features(c: &mut Criterion) {
    let p = Position::from_fen("r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 w kq - 4 5").unwrap();
    let e = EngineEvaluation::with_best_move(30, "Nc3");
    c.bench_function("extract_italian", |ben| {
        ben.iter(|| black_box(features::extract(black_box(&p), Some(&e))))
    });
    let f = features::extract(&p, Some(&e));
    c.bench_function("build_goals_italian", |ben| {
        ben.iter(|| black_box(goals::build(black_box(&f), p.side_to_move())))
    });
}

criterion_group!(benches, bench_features);
criterion_main!(benches);
