//! Append-only capture of per-frame channel values.
//!
//! A session collects one raw curve per binding while recording. `finish`
//! applies a lossless reduction and drops curves that never changed, producing
//! the [`RecordedClip`] the [`crate::Compressor`] consumes.

use hashbrown::HashMap;
use log::debug;

use crate::binding::ChannelBinding;
use crate::compress::compress;
use crate::curve::SampleCurve;
use crate::error::CurveError;
use crate::threshold::ThresholdHierarchy;

/// Raw curves of one recording plus the overrides declared in the recorded
/// hierarchy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedClip {
    pub name: String,
    pub curves: Vec<(ChannelBinding, SampleCurve)>,
    pub overrides: ThresholdHierarchy,
}

impl RecordedClip {
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn get(&self, binding: &ChannelBinding) -> Option<&SampleCurve> {
        self.curves
            .iter()
            .find(|(b, _)| b == binding)
            .map(|(_, c)| c)
    }
}

#[derive(Debug, Default)]
pub struct RecordingSession {
    name: String,
    start_time: f32,
    order: Vec<ChannelBinding>,
    curves: HashMap<ChannelBinding, SampleCurve>,
    overrides: ThresholdHierarchy,
}

impl RecordingSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self::starting_at(name, 0.0)
    }

    /// Session whose recorded times are relative to `start_time`.
    pub fn starting_at(name: impl Into<String>, start_time: f32) -> Self {
        Self {
            name: name.into(),
            start_time,
            ..Self::default()
        }
    }

    /// Overrides travel with the clip to the compression step.
    pub fn set_overrides(&mut self, overrides: ThresholdHierarchy) {
        self.overrides = overrides;
    }

    /// Append one sample. Times must strictly increase per binding.
    pub fn record(
        &mut self,
        binding: &ChannelBinding,
        time: f32,
        value: f32,
    ) -> Result<(), CurveError> {
        let t = time - self.start_time;
        if let Some(curve) = self.curves.get_mut(binding) {
            return curve.add_key(t, value);
        }
        let mut curve = SampleCurve::new();
        curve.add_key(t, value)?;
        self.order.push(binding.clone());
        self.curves.insert(binding.clone(), curve);
        Ok(())
    }

    /// Append one frame worth of samples at `time`.
    pub fn record_frame<'b>(
        &mut self,
        time: f32,
        samples: impl IntoIterator<Item = (&'b ChannelBinding, f32)>,
    ) -> Result<(), CurveError> {
        for (binding, value) in samples {
            self.record(binding, time, value)?;
        }
        Ok(())
    }

    pub fn channel_count(&self) -> usize {
        self.order.len()
    }

    /// End the session: drop redundant keys (tolerance `f32::EPSILON`) and
    /// discard curves that are constant.
    pub fn finish(mut self) -> Result<RecordedClip, CurveError> {
        let mut curves = Vec::with_capacity(self.order.len());
        for binding in self.order {
            let Some(raw) = self.curves.remove(&binding) else {
                continue;
            };
            let curve = compress(&raw, f32::EPSILON)?;
            if curve.is_constant() {
                debug!("recording {}: dropping constant channel {}", self.name, binding);
                continue;
            }
            curves.push((binding, curve));
        }
        Ok(RecordedClip {
            name: self.name,
            curves,
            overrides: self.overrides,
        })
    }
}
