use vizij_curve_compression::{
    compress, compress_curve_set, max_deviation, ChannelBinding, ChannelRole, CompressionConfig,
    Compressor, CurveError, PropertyPattern, RoleKind, RotationMetric, SampleCurve,
    ThresholdHierarchy,
};

fn times() -> Vec<f32> {
    (0..61).map(|i| i as f32 / 60.0).collect()
}

fn curve(f: impl Fn(f32) -> f32) -> SampleCurve {
    let samples: Vec<(f32, f32)> = times().into_iter().map(|t| (t, f(t))).collect();
    SampleCurve::from_samples(&samples).expect("valid samples")
}

fn wiggle(phase: f32) -> SampleCurve {
    curve(move |t| (t * 7.0 + phase).sin() * 0.3 + (t * 19.0).cos() * 0.02)
}

fn b(path: &str, property: &str, ty: &str) -> ChannelBinding {
    ChannelBinding::new(path, property, ty)
}

fn transform_channels(path: &str) -> Vec<(ChannelBinding, SampleCurve)> {
    let half = |t: f32| (120.0f32 * t).to_radians() * 0.5;
    vec![
        (b(path, "m_LocalRotation.x", "Transform"), curve(|_| 0.0)),
        (b(path, "m_LocalRotation.y", "Transform"), curve(move |t| half(t).sin())),
        (b(path, "m_LocalRotation.z", "Transform"), curve(|_| 0.0)),
        (b(path, "m_LocalRotation.w", "Transform"), curve(move |t| half(t).cos())),
        (b(path, "m_LocalPosition.x", "Transform"), wiggle(0.0)),
        (b(path, "m_LocalPosition.y", "Transform"), wiggle(1.0)),
        (b(path, "m_LocalPosition.z", "Transform"), wiggle(2.0)),
        (b(path, "m_LocalScale.x", "Transform"), curve(|t| 1.0 + t)),
        (b(path, "m_LocalScale.y", "Transform"), curve(|t| 1.0 + t)),
        (b(path, "m_LocalScale.z", "Transform"), curve(|t| 1.0 + 0.5 * t)),
    ]
}

fn renderer_channels(path: &str) -> Vec<(ChannelBinding, SampleCurve)> {
    vec![
        (b(path, "material._Color.r", "MeshRenderer"), curve(|t| 1.0 - 0.5 * t)),
        (b(path, "material._Color.g", "MeshRenderer"), curve(|t| 0.2 * t)),
        (b(path, "material._Color.b", "MeshRenderer"), curve(|_| 0.1)),
        (b(path, "material._Color.a", "MeshRenderer"), curve(|t| 1.0 - t)),
        (b(path, "m_Intensity", "Light"), wiggle(0.5)),
    ]
}

#[test]
fn every_binding_gets_exactly_one_output_with_its_role() {
    let mut input = transform_channels("Rig/Arm");
    input.extend(renderer_channels("Rig/Arm/Lamp"));
    let bindings: Vec<ChannelBinding> = input.iter().map(|(b, _)| b.clone()).collect();

    let out = compress_curve_set(input, &ThresholdHierarchy::new(), &CompressionConfig::default())
        .expect("compress");
    assert_eq!(out.len(), bindings.len());
    for binding in &bindings {
        let curve = out.get(binding).expect("output curve");
        assert!(!curve.is_empty());
    }

    let role = |path: &str, prop: &str, ty: &str| out.role(&b(path, prop, ty));
    assert_eq!(
        role("Rig/Arm", "m_LocalRotation.w", "Transform"),
        Some(ChannelRole::RotationW)
    );
    assert_eq!(
        role("Rig/Arm", "m_LocalPosition.y", "Transform"),
        Some(ChannelRole::PositionY)
    );
    assert_eq!(
        role("Rig/Arm", "m_LocalScale.z", "Transform"),
        Some(ChannelRole::ScaleZ)
    );
    assert_eq!(
        role("Rig/Arm/Lamp", "material._Color.g", "MeshRenderer"),
        Some(ChannelRole::ColorG)
    );
    assert_eq!(
        role("Rig/Arm/Lamp", "material._Color.a", "MeshRenderer"),
        Some(ChannelRole::ColorA)
    );
    assert_eq!(
        role("Rig/Arm/Lamp", "m_Intensity", "Light"),
        Some(ChannelRole::Generic)
    );

    assert_eq!(out.stats.kind(RoleKind::Rotation).channels, 4);
    assert_eq!(out.stats.kind(RoleKind::Position).channels, 3);
    assert_eq!(out.stats.kind(RoleKind::Scale).channels, 3);
    assert_eq!(out.stats.kind(RoleKind::Color).channels, 3);
    assert_eq!(out.stats.kind(RoleKind::Alpha).channels, 1);
    assert_eq!(out.stats.kind(RoleKind::Generic).channels, 1);
    let total = out.stats.total();
    assert!(total.keys_out < total.keys_in);
}

#[test]
fn rotation_group_honours_default_angle() {
    let input = transform_channels("Root");
    let originals: Vec<SampleCurve> = input[..4].iter().map(|(_, c)| c.clone()).collect();
    let quat: Vec<ChannelBinding> = input[..4].iter().map(|(b, _)| b.clone()).collect();

    let out = Compressor::default()
        .compress(input, &ThresholdHierarchy::new())
        .expect("compress");
    let reduced: Vec<SampleCurve> = quat
        .iter()
        .map(|b| out.get(b).expect("rotation channel").clone())
        .collect();
    let metric = RotationMetric::new(1.0).expect("metric");
    let d = max_deviation(&metric, &originals, &reduced, (0.0, 1.0)).expect("deviation");
    assert!(d <= 1.0, "angle {d}");
}

#[test]
fn incomplete_position_falls_through_to_generic() {
    let x = wiggle(0.0);
    let z = wiggle(2.0);
    let input = vec![
        (b("Hand", "m_LocalPosition.x", "Transform"), x.clone()),
        (b("Hand", "m_LocalPosition.z", "Transform"), z.clone()),
    ];
    let cfg = CompressionConfig::default();
    let out = compress_curve_set(input, &ThresholdHierarchy::new(), &cfg).expect("compress");

    let bx = b("Hand", "m_LocalPosition.x", "Transform");
    let bz = b("Hand", "m_LocalPosition.z", "Transform");
    assert_eq!(out.role(&bx), Some(ChannelRole::Generic));
    assert_eq!(out.role(&bz), Some(ChannelRole::Generic));
    let generic = cfg.thresholds.generic;
    assert_eq!(out.get(&bx), Some(&compress(&x, generic).expect("x")));
    assert_eq!(out.get(&bz), Some(&compress(&z, generic).expect("z")));
}

#[test]
fn quaternion_without_w_is_treated_as_position() {
    let input: Vec<(ChannelBinding, SampleCurve)> = transform_channels("Root")
        .into_iter()
        .filter(|(b, _)| b.property != "m_LocalRotation.w")
        .collect();
    let out = Compressor::default()
        .compress(input, &ThresholdHierarchy::new())
        .expect("compress");
    assert_eq!(
        out.role(&b("Root", "m_LocalRotation.x", "Transform")),
        Some(ChannelRole::PositionX)
    );
    assert_eq!(out.stats.kind(RoleKind::Rotation).channels, 0);
    assert_eq!(out.stats.kind(RoleKind::Position).channels, 6);
}

#[test]
fn incomplete_rgb_falls_through_to_generic() {
    let input = vec![
        (b("Lamp", "material._Color.r", "MeshRenderer"), wiggle(0.0)),
        (b("Lamp", "material._Color.g", "MeshRenderer"), wiggle(1.0)),
    ];
    let out = Compressor::default()
        .compress(input, &ThresholdHierarchy::new())
        .expect("compress");
    assert_eq!(out.stats.kind(RoleKind::Generic).channels, 2);
    assert_eq!(out.stats.kind(RoleKind::Color).channels, 0);
}

#[test]
fn nearest_scope_override_wins() {
    let intensity = wiggle(0.3);
    let input = vec![
        (b("Rig/Arm/Lamp", "m_Intensity", "Light"), intensity.clone()),
        (b("Rig/Leg", "m_Intensity", "Light"), intensity.clone()),
        (b("Other", "m_Intensity", "Light"), intensity.clone()),
    ];
    let hierarchy = ThresholdHierarchy::from_tuples([
        ("Rig/Arm", "m_Intensity", 0.0),
        ("Rig", "m_Intensity", 0.2),
    ]);
    let out = Compressor::default()
        .compress(input, &hierarchy)
        .expect("compress");

    let exact = compress(&intensity, 0.0).expect("exact");
    let loose = compress(&intensity, 0.2).expect("loose");
    let fallback = compress(&intensity, 0.05).expect("default");
    assert_eq!(out.get(&b("Rig/Arm/Lamp", "m_Intensity", "Light")), Some(&exact));
    assert_eq!(out.get(&b("Rig/Leg", "m_Intensity", "Light")), Some(&loose));
    assert_eq!(out.get(&b("Other", "m_Intensity", "Light")), Some(&fallback));
}

#[test]
fn position_override_uses_base_property() {
    let input = transform_channels("Rig/Hand");
    let xyz: Vec<SampleCurve> = input[4..7].iter().map(|(_, c)| c.clone()).collect();
    let hierarchy = ThresholdHierarchy::from_tuples([("Rig", "m_LocalPosition", 0.1)]);
    let out = Compressor::default()
        .compress(input, &hierarchy)
        .expect("compress");
    let expected = vizij_curve_compression::compress_positions(&xyz, 0.1).expect("positions");
    assert_eq!(
        out.get(&b("Rig/Hand", "m_LocalPosition.x", "Transform")),
        Some(&expected[0])
    );
}

#[test]
fn role_rules_are_configurable() {
    let mut cfg = CompressionConfig::default();
    cfg.roles.position = vec![PropertyPattern::Contains("Position".into())];
    let input = vec![
        (b("Root", "m_EulerHint.x", "Transform"), wiggle(0.0)),
        (b("Root", "m_EulerHint.y", "Transform"), wiggle(1.0)),
        (b("Root", "m_EulerHint.z", "Transform"), wiggle(2.0)),
    ];
    let out = Compressor::new(cfg)
        .expect("valid config")
        .compress(input, &ThresholdHierarchy::new())
        .expect("compress");
    assert_eq!(out.stats.kind(RoleKind::Generic).channels, 3);
}

#[test]
fn duplicate_bindings_are_rejected() {
    let binding = b("Root", "m_Intensity", "Light");
    let input = vec![(binding.clone(), wiggle(0.0)), (binding.clone(), wiggle(1.0))];
    let err = Compressor::default()
        .compress(input, &ThresholdHierarchy::new())
        .unwrap_err();
    assert_eq!(err, CurveError::DuplicateBinding(binding));
}

#[test]
fn empty_curve_is_an_invalid_argument() {
    let input = vec![(b("Root", "m_Intensity", "Light"), SampleCurve::new())];
    let err = Compressor::default()
        .compress(input, &ThresholdHierarchy::new())
        .unwrap_err();
    assert_eq!(err, CurveError::EmptyCurve);
    assert!(err.is_invalid_argument());
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut cfg = CompressionConfig::default();
    cfg.thresholds.position = -1.0;
    assert!(matches!(
        Compressor::new(cfg),
        Err(CurveError::InvalidThreshold { name: "position", .. })
    ));
}

#[test]
fn scale_ignores_absolute_error_overrides() {
    let mut input: Vec<(ChannelBinding, SampleCurve)> = transform_channels("Rig/Arm")
        .into_iter()
        .filter(|(b, _)| b.property.starts_with("m_LocalScale"))
        .collect();
    let scales: Vec<SampleCurve> = input.iter().map(|(_, c)| c.clone()).collect();
    input.push((b("Rig/Arm", "m_Intensity", "Light"), wiggle(0.5)));
    let hierarchy = ThresholdHierarchy::from_tuples([("Rig", "m_LocalScale", 0.05)]);

    let out = Compressor::default()
        .compress(input, &hierarchy)
        .expect("scale override must not abort the batch");
    assert_eq!(out.len(), 4);
    let cfg = CompressionConfig::default();
    let expected =
        vizij_curve_compression::compress_scales(&scales, cfg.thresholds.scale).expect("scales");
    assert_eq!(
        out.get(&b("Rig/Arm", "m_LocalScale.y", "Transform")),
        Some(&expected[1])
    );
}

#[test]
fn invalid_override_is_rejected_before_any_pass() {
    let input = vec![
        (b("Rig", "m_Intensity", "Light"), wiggle(0.0)),
        (b("Rig", "m_Range", "Light"), wiggle(1.0)),
    ];
    let hierarchy = ThresholdHierarchy::from_tuples([("Rig", "m_Range", -1.0)]);
    let err = Compressor::default()
        .compress(input, &hierarchy)
        .unwrap_err();
    assert_eq!(
        err,
        CurveError::InvalidThreshold {
            name: "override",
            value: -1.0
        }
    );
    assert!(err.is_invalid_argument());
}
