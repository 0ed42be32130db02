//! Groups recorded channels by semantic role and compresses each group.
//!
//! Passes run in a fixed order and every binding is claimed by exactly one of
//! them:
//! 1. rotation quaternions (`.x/.y/.z/.w`),
//! 2. scale components (`.x/.y/.z` under a scale property),
//! 3. position triples (`.x/.y/.z`),
//! 4. RGB colours (`.r/.g/.b`),
//! 5. alpha (`.a`),
//! 6. everything left, as generic scalars.
//!
//! A group with a missing sibling is not an error; its members stay unclaimed
//! and fall through to the later passes.

use hashbrown::HashMap;
use log::debug;
use serde::Serialize;

use crate::binding::{ChannelBinding, ChannelRole, RoleKind, Suffix, RGB, XYZ, XYZW};
use crate::compress::{
    compress, compress_colors_hsv, compress_positions, compress_rotations, compress_scale,
    compress_scales,
};
use crate::config::CompressionConfig;
use crate::curve::SampleCurve;
use crate::error::CurveError;
use crate::threshold::ThresholdHierarchy;

/// Key counts for one role kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub channels: usize,
    pub keys_in: usize,
    pub keys_out: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CompressionStats {
    pub per_kind: HashMap<RoleKind, KindStats>,
}

impl CompressionStats {
    fn record(&mut self, kind: RoleKind, keys_in: usize, keys_out: usize) {
        let entry = self.per_kind.entry(kind).or_default();
        entry.channels += 1;
        entry.keys_in += keys_in;
        entry.keys_out += keys_out;
    }

    pub fn kind(&self, kind: RoleKind) -> KindStats {
        self.per_kind.get(&kind).copied().unwrap_or_default()
    }

    pub fn total(&self) -> KindStats {
        self.per_kind
            .values()
            .fold(KindStats::default(), |acc, s| KindStats {
                channels: acc.channels + s.channels,
                keys_in: acc.keys_in + s.keys_in,
                keys_out: acc.keys_out + s.keys_out,
            })
    }
}

/// Compressed curves keyed by binding, with the role each was compressed as.
#[derive(Clone, Debug, Default)]
pub struct CompressionOutput {
    pub curves: HashMap<ChannelBinding, SampleCurve>,
    pub roles: HashMap<ChannelBinding, ChannelRole>,
    pub stats: CompressionStats,
}

impl CompressionOutput {
    pub fn get(&self, binding: &ChannelBinding) -> Option<&SampleCurve> {
        self.curves.get(binding)
    }

    pub fn role(&self, binding: &ChannelBinding) -> Option<ChannelRole> {
        self.roles.get(binding).copied()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Curves ordered by binding (path, property, type).
    pub fn sorted(&self) -> Vec<(&ChannelBinding, &SampleCurve)> {
        let mut v: Vec<_> = self.curves.iter().collect();
        v.sort_by(|a, b| {
            (&a.0.path, &a.0.property, &a.0.type_name).cmp(&(
                &b.0.path,
                &b.0.property,
                &b.0.type_name,
            ))
        });
        v
    }
}

/// Runs the grouping passes with one configuration.
#[derive(Clone, Debug, Default)]
pub struct Compressor {
    config: CompressionConfig,
}

impl Compressor {
    pub fn new(config: CompressionConfig) -> Result<Self, CurveError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress every curve. Each input binding gets exactly one output curve.
    ///
    /// Overrides are validated before any channel is compressed. Scale channels
    /// ignore overrides and always use `thresholds.scale`.
    pub fn compress(
        &self,
        curves: Vec<(ChannelBinding, SampleCurve)>,
        hierarchy: &ThresholdHierarchy,
    ) -> Result<CompressionOutput, CurveError> {
        hierarchy.validate()?;
        let mut run = Run::new(&self.config, hierarchy, curves)?;
        run.rotations()?;
        run.scales()?;
        run.positions()?;
        run.colors()?;
        run.alphas()?;
        run.generics()?;
        run.finish()
    }
}

/// Convenience wrapper over [`Compressor`].
pub fn compress_curve_set(
    curves: Vec<(ChannelBinding, SampleCurve)>,
    hierarchy: &ThresholdHierarchy,
    config: &CompressionConfig,
) -> Result<CompressionOutput, CurveError> {
    Compressor::new(config.clone())?.compress(curves, hierarchy)
}

/// State of one compression run.
struct Run<'a> {
    config: &'a CompressionConfig,
    hierarchy: &'a ThresholdHierarchy,
    /// Input order, used to keep pass iteration deterministic.
    order: Vec<ChannelBinding>,
    pending: HashMap<ChannelBinding, SampleCurve>,
    output: CompressionOutput,
}

impl<'a> Run<'a> {
    fn new(
        config: &'a CompressionConfig,
        hierarchy: &'a ThresholdHierarchy,
        curves: Vec<(ChannelBinding, SampleCurve)>,
    ) -> Result<Self, CurveError> {
        let mut order = Vec::with_capacity(curves.len());
        let mut pending = HashMap::with_capacity(curves.len());
        for (binding, curve) in curves {
            if pending.contains_key(&binding) {
                return Err(CurveError::DuplicateBinding(binding));
            }
            order.push(binding.clone());
            pending.insert(binding, curve);
        }
        Ok(Self {
            config,
            hierarchy,
            order,
            pending,
            output: CompressionOutput::default(),
        })
    }

    /// Pending bindings whose suffix is in `suffixes` and whose base property
    /// passes `rule`, in input order.
    fn candidates(
        &self,
        suffixes: &[Suffix],
        rule: impl Fn(&str) -> bool,
    ) -> Vec<(ChannelBinding, String, Suffix)> {
        self.order
            .iter()
            .filter(|b| self.pending.contains_key(*b))
            .filter_map(|b| {
                let (base, suffix) = b.split_property();
                let suffix = suffix.filter(|s| suffixes.contains(s))?;
                rule(base).then(|| (b.clone(), base.to_string(), suffix))
            })
            .collect()
    }

    /// Remove the whole `base.{suffixes}` group if every member is pending.
    fn claim(
        &mut self,
        binding: &ChannelBinding,
        base: &str,
        suffixes: &[Suffix],
    ) -> Option<(Vec<ChannelBinding>, Vec<SampleCurve>)> {
        let members: Vec<ChannelBinding> = suffixes
            .iter()
            .map(|s| binding.sibling(base, *s))
            .collect();
        if !members.iter().all(|m| self.pending.contains_key(m)) {
            return None;
        }
        let curves = members
            .iter()
            .filter_map(|m| self.pending.remove(m))
            .collect();
        Some((members, curves))
    }

    fn emit(
        &mut self,
        members: Vec<ChannelBinding>,
        originals: &[SampleCurve],
        compressed: Vec<SampleCurve>,
        roles: impl Fn(usize) -> ChannelRole,
    ) -> Result<(), CurveError> {
        for (i, ((binding, original), curve)) in members
            .into_iter()
            .zip(originals)
            .zip(compressed)
            .enumerate()
        {
            let role = roles(i);
            self.output
                .stats
                .record(role.kind(), original.len(), curve.len());
            self.output.roles.insert(binding.clone(), role);
            if self.output.curves.insert(binding.clone(), curve).is_some() {
                return Err(CurveError::CoverageViolation(binding));
            }
        }
        Ok(())
    }

    fn rotations(&mut self) -> Result<(), CurveError> {
        let config = self.config;
        for (binding, base, _) in self.candidates(&XYZW, |b| config.roles.is_rotation(b)) {
            let Some((members, curves)) = self.claim(&binding, &base, &XYZW) else {
                if self.pending.contains_key(&binding) {
                    debug!(
                        "rotation {}/{}: incomplete quaternion, falling through",
                        binding.path, base
                    );
                }
                continue;
            };
            let max_angle =
                self.hierarchy
                    .resolve_or(&binding.path, &base, self.config.thresholds.rotation);
            debug!("rotation {}/{}: max angle {}", binding.path, base, max_angle);
            let compressed = compress_rotations(&curves, max_angle)?;
            self.emit(members, &curves, compressed, |i| {
                ChannelRole::rotation(XYZW[i])
            })?;
        }
        Ok(())
    }

    fn scales(&mut self) -> Result<(), CurveError> {
        let config = self.config;
        for (binding, base, suffix) in self.candidates(&XYZ, |b| config.roles.is_scale(b)) {
            if !self.pending.contains_key(&binding) {
                continue;
            }
            // Overrides hold absolute errors; scale always uses the configured ratio.
            let ratio = self.config.thresholds.scale;
            if let Some((members, curves)) = self.claim(&binding, &base, &XYZ) {
                debug!("scale {}/{}: ratio {}", binding.path, base, ratio);
                let compressed = compress_scales(&curves, ratio)?;
                self.emit(members, &curves, compressed, |i| ChannelRole::scale(XYZ[i]))?;
                continue;
            }
            // Lone scale components keep the ratio metric on their own.
            if let Some(curve) = self.pending.remove(&binding) {
                debug!("scale {}: single component, ratio {}", binding, ratio);
                let compressed = compress_scale(&curve, ratio)?;
                self.emit(
                    vec![binding],
                    std::slice::from_ref(&curve),
                    vec![compressed],
                    |_| ChannelRole::scale(suffix),
                )?;
            }
        }
        Ok(())
    }

    fn positions(&mut self) -> Result<(), CurveError> {
        let config = self.config;
        for (binding, base, _) in self.candidates(&XYZ, |b| config.roles.is_position(b)) {
            let Some((members, curves)) = self.claim(&binding, &base, &XYZ) else {
                if self.pending.contains_key(&binding) {
                    debug!(
                        "position {}/{}: incomplete triple, falling through",
                        binding.path, base
                    );
                }
                continue;
            };
            let max_distance =
                self.hierarchy
                    .resolve_or(&binding.path, &base, self.config.thresholds.position);
            debug!("position {}/{}: max distance {}", binding.path, base, max_distance);
            let compressed = compress_positions(&curves, max_distance)?;
            self.emit(members, &curves, compressed, |i| {
                ChannelRole::position(XYZ[i])
            })?;
        }
        Ok(())
    }

    fn colors(&mut self) -> Result<(), CurveError> {
        for (binding, base, _) in self.candidates(&RGB, |_| true) {
            let Some((members, curves)) = self.claim(&binding, &base, &RGB) else {
                continue;
            };
            let t = &self.config.thresholds;
            let (hue, saturation, value) = match self.hierarchy.resolve(&binding.path, &base) {
                Some(e) => (e, e, e),
                None => (t.hue, t.saturation, t.value),
            };
            debug!(
                "color {}/{}: hsv tolerance ({}, {}, {})",
                binding.path, base, hue, saturation, value
            );
            let compressed = compress_colors_hsv(&curves, hue, saturation, value)?;
            self.emit(members, &curves, compressed, |i| ChannelRole::color(RGB[i]))?;
        }
        Ok(())
    }

    fn alphas(&mut self) -> Result<(), CurveError> {
        for (binding, _, _) in self.candidates(&[Suffix::A], |_| true) {
            let Some(curve) = self.pending.remove(&binding) else {
                continue;
            };
            let max_error = self.hierarchy.resolve_or(
                &binding.path,
                &binding.property,
                self.config.thresholds.alpha,
            );
            let compressed = compress(&curve, max_error)?;
            self.emit(
                vec![binding],
                std::slice::from_ref(&curve),
                vec![compressed],
                |_| ChannelRole::ColorA,
            )?;
        }
        Ok(())
    }

    fn generics(&mut self) -> Result<(), CurveError> {
        let remaining: Vec<ChannelBinding> = self
            .order
            .iter()
            .filter(|b| self.pending.contains_key(*b))
            .cloned()
            .collect();
        for binding in remaining {
            let Some(curve) = self.pending.remove(&binding) else {
                continue;
            };
            let max_error = self.hierarchy.resolve_or(
                &binding.path,
                &binding.property,
                self.config.thresholds.generic,
            );
            let compressed = compress(&curve, max_error)?;
            self.emit(
                vec![binding],
                std::slice::from_ref(&curve),
                vec![compressed],
                |_| ChannelRole::Generic,
            )?;
        }
        Ok(())
    }

    fn finish(self) -> Result<CompressionOutput, CurveError> {
        if let Some(b) = self
            .order
            .iter()
            .find(|b| !self.output.curves.contains_key(*b))
        {
            return Err(CurveError::CoverageViolation(b.clone()));
        }
        let total = self.output.stats.total();
        debug!(
            "compressed {} channel(s): {} keys -> {} keys",
            total.channels, total.keys_in, total.keys_out
        );
        Ok(self.output)
    }
}
