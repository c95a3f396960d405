use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rm_engine::{AudioBuffer, RingModEngine};

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    for block in [64usize, 256, 1024] {
        group.bench_with_input(BenchmarkId::new("stereo_planar", block), &block, |b, &block| {
            let mut engine = RingModEngine::default();
            engine.prepare(48000.0, block).unwrap();
            let mut buf = AudioBuffer::new(2, block);
            b.iter(|| {
                buf.channel_mut(0).fill(0.5);
                buf.channel_mut(1).fill(-0.5);
                engine.process(black_box(&mut buf));
            });
        });

        group.bench_with_input(BenchmarkId::new("stereo_interleaved", block), &block, |b, &block| {
            let mut engine = RingModEngine::default();
            engine.prepare(48000.0, block).unwrap();
            let mut data = vec![0.0f32; block * 2];
            b.iter(|| {
                data.fill(0.5);
                engine.process_interleaved(black_box(&mut data), 2);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_process);
criterion_main!(benches);
