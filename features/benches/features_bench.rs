use criterion::{black_box, criterion_group, criterion_main, Criterion};
use voiceguard_audio::Waveform;
use voiceguard_features::{Extractor, FeatureConfig};

fn make_sine(freq_hz: f64, n_samples: usize, sample_rate: u32) -> Waveform {
    let samples = (0..n_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (0.5 * (freq_hz * 2.0 * std::f64::consts::PI * t).sin()) as f32
        })
        .collect();
    Waveform::new(samples, sample_rate).expect("non-empty")
}

fn bench_extract_1s(c: &mut Criterion) {
    let ex = Extractor::new(FeatureConfig::default()).expect("default config");
    let wave = make_sine(440.0, 16000, 16000);

    c.bench_function("features_extract_1s_16k", |b| {
        b.iter(|| {
            let _ = black_box(ex.extract(black_box(&wave)));
        });
    });
}

fn bench_extract_3s_44k(c: &mut Criterion) {
    let ex = Extractor::new(FeatureConfig::default()).expect("default config");
    let wave = make_sine(440.0, 3 * 44100, 44100);

    c.bench_function("features_extract_3s_44k", |b| {
        b.iter(|| {
            let _ = black_box(ex.extract(black_box(&wave)));
        });
    });
}

criterion_group!(benches, bench_extract_1s, bench_extract_3s_44k);
criterion_main!(benches);
