use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use xiangqi_core::Position;
use xiangqi_core::eval::evaluate;
use xiangqi_core::movegen::generate_legal;
use xiangqi_core::perft::perft;

fn bench_perft(c: &mut Criterion) {
    c.bench_function("perft_startpos_d3", |b| {
        let mut pos = Position::startpos();
        b.iter(|| black_box(perft(&mut pos, 3)))
    });
}

fn bench_movegen(c: &mut Criterion) {
    let pos =
        Position::from_fen("r2akab2/9/2n1b1n2/p2c4p/2p3p2/9/P1P3P1P/2NC2N2/9/R1BAKAB1R w - - 0 8").unwrap_or_else(
            |e| panic!("bench position: {e}"),
        );
    c.bench_function("generate_legal_middlegame", |b| b.iter(|| black_box(generate_legal(&pos))));
    c.bench_function("evaluate_middlegame", |b| b.iter(|| black_box(evaluate(&pos))));
}

criterion_group!(benches, bench_perft, bench_movegen);
criterion_main!(benches);
