use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use powerrs::{Activity, Block, PowerAnalyzer, PowerCurveAnalyzer, Workout, WorkoutSynthesizer};

/// Performance benchmarks for the metric pipeline
///
/// Sizes range from a short interval session to a long endurance ride.

fn create_power_series(seconds: usize) -> Vec<u16> {
    (0..seconds).map(|i| 180 + ((i * 37) % 140) as u16).collect()
}

fn create_benchmark_workout() -> Workout {
    Workout::new(vec![
        Block::warmup(600, 0.5, 0.75),
        Block::steady_state(1200, 0.85),
        Block::interval(6, 120, 1.15, 180, 0.55),
        Block::free_ride(600),
        Block::ramp(300, 0.6, 1.0),
        Block::cooldown(600, 0.7, 0.4),
    ])
}

fn bench_normalized_power(c: &mut Criterion) {
    let mut group = c.benchmark_group("Normalized Power");

    for &seconds in &[360, 3600, 36000] {
        let power = create_power_series(seconds);

        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(BenchmarkId::new("window_30", seconds), &power, |b, power| {
            b.iter(|| PowerAnalyzer::calculate_normalized_power(black_box(power), 30));
        });
    }

    group.finish();
}

fn bench_power_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("Power Duration Curve");
    group.sample_size(10);

    // 30 min to 4 hours
    for &seconds in &[1800, 3600, 7200, 14400] {
        let power = create_power_series(seconds);

        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(BenchmarkId::new("sequential", seconds), &power, |b, power| {
            b.iter(|| PowerCurveAnalyzer::calculate_power_duration_curve(black_box(power)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", seconds), &power, |b, power| {
            b.iter(|| {
                PowerCurveAnalyzer::calculate_power_duration_curve_with_threshold(
                    black_box(power),
                    1,
                )
            });
        });
    }

    group.finish();
}

fn bench_synthesis(c: &mut Criterion) {
    let workout = create_benchmark_workout();
    let mut group = c.benchmark_group("Workout Synthesis");

    group.bench_function("expand_blocks", |b| {
        b.iter(|| WorkoutSynthesizer::synthesize(black_box(workout.blocks()), 250));
    });
    group.sample_size(10);
    group.bench_function("synthesize_with_metrics", |b| {
        b.iter(|| Activity::from_workout(black_box(&workout), 250));
    });

    group.finish();
}

criterion_group!(benches, bench_normalized_power, bench_power_curve, bench_synthesis);
criterion_main!(benches);
