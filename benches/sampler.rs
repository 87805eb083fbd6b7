use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use switchwatch::{Sampler, SwitchPosition, TickOutcome};

fn bench_idle_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");
    group.throughput(Throughput::Elements(1));

    group.bench_function("idle_tick", |b| {
        let mut sampler = Sampler::new(500);
        let mut now = 0i64;
        b.iter(|| {
            now += 10;
            black_box(sampler.tick(black_box(now), None))
        });
    });

    group.finish();
}

fn bench_click_sequence_cycle(c: &mut Criterion) {
    // One full detection cycle: three clicks 50ms apart, idle ticks until
    // the 500ms quiet gap flushes the sequence.
    c.bench_function("sampler/burst_and_flush", |b| {
        b.iter(|| {
            let mut sampler = Sampler::new(500);
            let mut flushed = 0;

            for at in [1_000, 1_050, 1_100] {
                sampler.tick(black_box(at), Some(SwitchPosition::Down));
            }

            let mut now = 1_110;
            while flushed == 0 {
                if let TickOutcome::Flush(events) = sampler.tick(black_box(now), None) {
                    flushed = events.len();
                }
                now += 10;
            }

            black_box(flushed)
        });
    });
}

criterion_group!(benches, bench_idle_ticks, bench_click_sequence_cycle);
criterion_main!(benches);
