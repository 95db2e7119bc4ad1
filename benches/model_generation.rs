//! Benchmarks for social golfer model generation
//!
//! Model construction grows with weeks × groups × golfers², so these cover a
//! few classic instance sizes without invoking an engine.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use golfer::Instance;
use golfer::model::GolferModel;
use golfer::schedule::Schedule;

/// (name, groups, group size, weeks)
const INSTANCES: &[(&str, usize, usize, usize)] = &[
    ("3-2-2", 3, 2, 2),
    ("4-3-3", 4, 3, 3),
    ("5-3-7", 5, 3, 7),
    ("8-4-5", 8, 4, 5),
];

fn instances() -> impl Iterator<Item = (&'static str, Instance)> {
    INSTANCES.iter().filter_map(|&(name, groups, size, weeks)| {
        Instance::new(groups, size, weeks).map(|instance| (name, instance))
    })
}

/// Benchmark building the full model
fn bench_model_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_build");

    for (name, instance) in instances() {
        let meetings = instance.weeks() * instance.groups() * instance.pairs();
        group.throughput(Throughput::Elements(meetings as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &instance, |b, instance| {
            b.iter(|| GolferModel::build(black_box(instance)))
        });
    }

    group.finish();
}

/// Round-robin schedule: golfer p plays in group (p + week) % groups
fn rotating_schedule(instance: &Instance) -> Schedule {
    let groups: Vec<Vec<usize>> = (0..instance.weeks())
        .flat_map(|w| {
            (0..instance.groups()).map(move |g| {
                (0..instance.golfers())
                    .filter(|p| (p + w) % instance.groups() == g)
                    .collect::<Vec<usize>>()
            })
        })
        .collect();
    Schedule::new(*instance, groups).expect("one entry per week and group")
}

/// Benchmark counting meetings on a decoded schedule
fn bench_meeting_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("meeting_counts");

    for (name, instance) in instances() {
        let schedule = rotating_schedule(&instance);
        group.bench_with_input(BenchmarkId::from_parameter(name), &schedule, |b, schedule| {
            b.iter(|| black_box(schedule).redundant_meetings())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_model_build, bench_meeting_counts);
criterion_main!(benches);
