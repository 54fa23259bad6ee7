use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use lib::chess::Fen;
use lib::render::{Highlights, Renderer};
use std::hint::black_box;

fn crit(c: &mut Criterion) {
    let renderer = Renderer::default();
    let highlights = Highlights::parse("e2,e4");

    let fens = [
        ("empty", "8/8/8/8/8/8/8/8"),
        ("initial", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
        ("kiwipete", "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R"),
    ];

    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Elements(1));

    for (name, placement) in fens {
        let fen = match Fen::from_partial(placement) {
            Ok(fen) => fen,
            Err(e) => panic!("invalid placement `{}`: {}", placement, e),
        };

        group.bench_function(format!("draw/{}", name), |b| {
            b.iter(|| renderer.draw(black_box(&fen), black_box(&highlights)))
        });

        group.bench_function(format!("png/{}", name), |b| {
            b.iter(|| renderer.render(black_box(&fen), black_box(&highlights)))
        });
    }

    group.finish();
}

criterion_group!(benches, crit);
criterion_main!(benches);
