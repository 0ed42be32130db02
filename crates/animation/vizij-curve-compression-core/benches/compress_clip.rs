use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vizij_curve_compression::{
    compress, ChannelBinding, Compressor, SampleCurve, ThresholdHierarchy,
};

const FRAMES: usize = 600;

fn sampled(f: impl Fn(f32) -> f32) -> SampleCurve {
    let samples: Vec<(f32, f32)> = (0..FRAMES)
        .map(|i| {
            let t = i as f32 / 60.0;
            (t, f(t))
        })
        .collect();
    SampleCurve::from_samples(&samples).unwrap()
}

fn rig(bones: usize) -> Vec<(ChannelBinding, SampleCurve)> {
    let mut out = Vec::with_capacity(bones * 10);
    for bone in 0..bones {
        let path = format!("Rig/Bone{bone}");
        let phase = bone as f32 * 0.37;
        let half = move |t: f32| (t * 1.3 + phase).sin() * 0.6;
        let channels: [(&str, Box<dyn Fn(f32) -> f32>); 10] = [
            ("m_LocalRotation.x", Box::new(move |t| half(t).sin() * 0.3)),
            ("m_LocalRotation.y", Box::new(move |t| half(t).sin() * 0.95)),
            ("m_LocalRotation.z", Box::new(|_| 0.0)),
            ("m_LocalRotation.w", Box::new(move |t| half(t).cos())),
            ("m_LocalPosition.x", Box::new(move |t| (t * 2.0 + phase).sin())),
            ("m_LocalPosition.y", Box::new(move |t| (t * 3.0).cos() * 0.1)),
            ("m_LocalPosition.z", Box::new(|t| t * 0.5)),
            ("m_LocalScale.x", Box::new(|_| 1.0)),
            ("m_LocalScale.y", Box::new(|t| 1.0 + 0.1 * (t * 4.0).sin())),
            ("m_LocalScale.z", Box::new(|_| 1.0)),
        ];
        for (property, f) in channels {
            out.push((
                ChannelBinding::new(path.as_str(), property, "Transform"),
                sampled(f),
            ));
        }
    }
    out
}

fn bench_compress(c: &mut Criterion) {
    let wave = sampled(|t| (t * 5.0).sin() + 0.2 * (t * 17.0).cos());
    c.bench_function("scalar_600_frames", |b| {
        b.iter(|| compress(black_box(&wave), 0.01).unwrap())
    });

    let clip = rig(20);
    let overrides = ThresholdHierarchy::new();
    let compressor = Compressor::default();
    c.bench_function("rig_20_bones", |b| {
        b.iter(|| {
            compressor
                .compress(black_box(clip.clone()), &overrides)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_compress);
criterion_main!(benches);
