use criterion::{Criterion, criterion_group, criterion_main};
use nedkit::types::{GeoPoint, NedPoint, Origin};
use nedkit::{GeoEngine, ReferenceOracle};
use std::hint::black_box;

/// Points on a `n x n` grid spanning ±1° around the origin.
fn make_grid(origin: &Origin, n: usize) -> Vec<GeoPoint> {
    let mut points = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let dlat = -1.0 + 2.0 * i as f64 / (n - 1) as f64;
            let dlon = -1.0 + 2.0 * j as f64 / (n - 1) as f64;
            points.push(GeoPoint::new(
                origin.latitude_deg + dlat,
                origin.longitude_deg + dlon,
                100.0 * (i % 10) as f64,
            ));
        }
    }
    points
}

fn bench_geo_to_ned(c: &mut Criterion) {
    let origin = Origin::new(32.0, 34.0);
    let points = make_grid(&origin, 100);

    c.bench_function("geo_to_ned_10k", |b| {
        b.iter(|| {
            for p in &points {
                black_box(nedkit::geo_to_ned(&origin, black_box(p)).ok());
            }
        });
    });
}

fn bench_ned_to_geo(c: &mut Criterion) {
    let origin = Origin::new(32.0, 34.0);
    let offsets: Vec<NedPoint> = (0..10_000)
        .map(|i| {
            let t = i as f64;
            NedPoint::new(5000.0 * (t * 0.37).sin(), 5000.0 * (t * 0.11).cos(), 500.0 * (t * 0.05).sin())
        })
        .collect();

    c.bench_function("ned_to_geo_bowring_10k", |b| {
        b.iter(|| {
            for n in &offsets {
                black_box(nedkit::ned_to_geo(&origin, black_box(n)).ok());
            }
        });
    });

    let oracle = ReferenceOracle::new();
    c.bench_function("ned_to_geo_heikkinen_10k", |b| {
        b.iter(|| {
            for n in &offsets {
                black_box(oracle.ned_to_geo(&origin, black_box(n)).ok());
            }
        });
    });
}

criterion_group!(benches, bench_geo_to_ned, bench_ned_to_geo);
criterion_main!(benches);
