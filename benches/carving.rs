use criterion::{black_box, criterion_group, criterion_main, Criterion};
use liquidseam::{Carver, CarverConfig, EnergyFunction};

fn scene(width: usize, height: usize) -> Vec<u8> {
    (0..width * height * 3)
        .map(|i| ((i / 3 % width) * 7 + (i / 3 / width) * 3 + i % 3 * 40) as u8)
        .collect()
}

fn shrink(c: &mut Criterion) {
    let pixels = scene(160, 120);
    c.bench_function("shrink 160x120 by 40 columns", |b| {
        b.iter(|| {
            let mut carver = Carver::new(&pixels, 160, 120, 3, CarverConfig::default()).unwrap();
            carver.resize(black_box(120), 120).unwrap();
            carver
        })
    });

    let config = CarverConfig::new()
        .with_energy(EnergyFunction::SumAbs)
        .with_rigidity(0.5)
        .with_delta_x(2);
    c.bench_function("shrink 160x120 both axes, rigid", |b| {
        b.iter(|| {
            let mut carver = Carver::new(&pixels, 160, 120, 3, config.clone()).unwrap();
            carver.resize(black_box(130), black_box(100)).unwrap();
            carver
        })
    });
}

fn enlarge(c: &mut Criterion) {
    let pixels = scene(120, 90);
    c.bench_function("enlarge 120x90 by 60 columns", |b| {
        b.iter(|| {
            let mut carver = Carver::new(&pixels, 120, 90, 3, CarverConfig::default()).unwrap();
            carver.resize(black_box(180), 90).unwrap();
            carver
        })
    });
}

criterion_group!(benches, shrink, enlarge);
criterion_main!(benches);
