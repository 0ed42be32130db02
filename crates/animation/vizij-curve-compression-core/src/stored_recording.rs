use serde::Deserialize;
use serde_json::json;

use crate::binding::ChannelBinding;
use crate::curve::{Keyframe, SampleCurve};
use crate::error::CurveError;
use crate::orchestrator::CompressionOutput;
use crate::recording::RecordedClip;
use crate::threshold::{OverrideScope, ThresholdHierarchy};

/// Public API: parse a stored recording (raw curves plus override scopes) into a
/// [`RecordedClip`].
///
/// Notes:
/// - Keys may be `[time, value]` pairs or `{ time, value, inTangent?, outTangent? }` objects;
///   both forms may be mixed within one curve.
/// - Times must strictly increase per curve; curves must not be empty.
/// - `overrides` is optional and lists scopes innermost first; values must be
///   finite and non-negative.
pub fn parse_recorded_clip_json(s: &str) -> Result<RecordedClip, CurveError> {
    let sr: StoredRecording =
        serde_json::from_str(s).map_err(|e| CurveError::Parse(format!("parse error: {e}")))?;

    let mut curves = Vec::with_capacity(sr.curves.len());
    for sc in sr.curves {
        let keys: Vec<Keyframe> = sc
            .keys
            .into_iter()
            .map(|k| match k {
                RawKey::Pair([time, value]) => Keyframe::new(time, value),
                RawKey::Full(k) => k,
            })
            .collect();
        if keys.is_empty() {
            return Err(CurveError::EmptyCurve);
        }
        let curve = SampleCurve::from_keys(keys)?;
        curves.push((
            ChannelBinding {
                path: sc.path,
                property: sc.property,
                type_name: sc.type_name,
            },
            curve,
        ));
    }

    let overrides = ThresholdHierarchy {
        scopes: sr.overrides,
    };
    overrides.validate()?;

    Ok(RecordedClip {
        name: sr.name,
        curves,
        overrides,
    })
}

/// Export compressed curves as serde_json::Value (stable order by path, then
/// property).
pub fn export_compressed_json(output: &CompressionOutput) -> serde_json::Value {
    let curves: Vec<serde_json::Value> = output
        .sorted()
        .into_iter()
        .map(|(binding, curve)| {
            json!({
                "path": binding.path,
                "property": binding.property,
                "type": binding.type_name,
                "role": output.role(binding),
                "keys": curve.keys(),
            })
        })
        .collect();
    json!({
        "curves": curves,
        "stats": output.stats,
    })
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct StoredRecording {
    #[serde(default)]
    pub name: String,
    pub curves: Vec<StoredCurve>,
    #[serde(default)]
    pub overrides: Vec<OverrideScope>,
}

#[derive(Debug, Deserialize)]
struct StoredCurve {
    #[serde(default)]
    pub path: String,
    pub property: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    pub keys: Vec<RawKey>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawKey {
    Pair([f32; 2]),
    Full(Keyframe),
}
