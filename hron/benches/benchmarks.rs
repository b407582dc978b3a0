use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hron::{cron, parser, Schedule};
use jiff::Zoned;

const COMPLEX: &str = "every 2 weeks on mon, wed at 09:00, 14:00 except dec 25 \
                       until 2027-12-31 starting 2026-01-05 in America/New_York";

fn friday_noon() -> Zoned {
    "2026-02-06T12:00:00+00:00[UTC]".parse().unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, input) in [
        ("simple", "every day at 09:00"),
        ("ordinal", "last friday of every 3 months at 17:00 in Europe/Paris"),
        ("complex", COMPLEX),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| parser::parse(black_box(input)).unwrap())
        });
    }
    group.finish();
}

fn bench_next(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_from");
    let now = friday_noon();
    for (name, input) in [
        ("day", "every weekday at 09:00"),
        ("days_aligned", "every 3 days at 09:00 starting 2026-01-01"),
        ("interval", "every 15 min from 09:00 to 17:00 on weekday"),
        ("interval_dst", "every 30 min from 00:00 to 23:30 in America/New_York"),
        ("week", "every 2 weeks on tue, thu at 10:00"),
        ("month", "every month on the 1st, 15th at 09:00"),
        ("nearest", "every month on the next nearest weekday to 1st at 09:00"),
        ("ordinal", "first monday of every month at 10:00"),
        ("year", "every year on the last weekday of dec at 17:00"),
        ("during", "every day at 09:00 during jul"),
        ("complex", COMPLEX),
    ] {
        let schedule = Schedule::parse(input).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| schedule.next_from(black_box(&now)).unwrap())
        });
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let schedule = Schedule::parse("every weekday at 09:00, 17:00 in America/New_York").unwrap();
    let now = friday_noon();
    c.bench_function("occurrences_100", |b| {
        b.iter(|| schedule.occurrences(black_box(&now)).take(100).count())
    });
    c.bench_function("previous_from", |b| {
        b.iter(|| schedule.previous_from(black_box(&now)).unwrap())
    });
}

fn bench_display(c: &mut Criterion) {
    let schedule = Schedule::parse(COMPLEX).unwrap();
    c.bench_function("to_string", |b| b.iter(|| black_box(&schedule).to_string()));
}

fn bench_cron(c: &mut Criterion) {
    let mut group = c.benchmark_group("cron");
    let schedule = Schedule::parse("every weekday at 09:00").unwrap();
    group.bench_function("to_cron", |b| {
        b.iter(|| black_box(&schedule).to_cron().unwrap())
    });
    for input in ["0 9 * * 1-5", "*/15 9-17 * 1-6 mon-fri", "0 17 * * 5L"] {
        group.bench_with_input(BenchmarkId::new("from_cron", input), input, |b, input| {
            b.iter(|| cron::from_cron(black_box(input)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_next,
    bench_iterate,
    bench_display,
    bench_cron
);
criterion_main!(benches);
