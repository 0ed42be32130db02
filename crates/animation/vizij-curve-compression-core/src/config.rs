//! Global compression defaults.

use serde::{Deserialize, Serialize};

use crate::binding::RoleRules;
use crate::error::CurveError;

/// Fallback tolerances per semantic kind, used when no override applies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thresholds {
    /// Euclidean distance, in position units.
    pub position: f32,
    /// Angle in degrees.
    pub rotation: f32,
    /// Largest acceptable `max/min` ratio; at least 1.
    pub scale: f32,
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
    pub alpha: f32,
    pub generic: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            position: 0.005,
            rotation: 1.0,
            scale: 1.1,
            hue: 0.05,
            saturation: 0.05,
            value: 0.05,
            alpha: 0.05,
            generic: 0.05,
        }
    }
}

/// Configuration for one compression run.
/// Keep this minimal; expand as needed without breaking the JSON shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub thresholds: Thresholds,
    pub roles: RoleRules,
}

impl CompressionConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, CurveError> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| CurveError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject negative or non-finite tolerances and scale ratios below 1.
    pub fn validate(&self) -> Result<(), CurveError> {
        let t = &self.thresholds;
        let checks = [
            ("position", t.position),
            ("rotation", t.rotation),
            ("hue", t.hue),
            ("saturation", t.saturation),
            ("value", t.value),
            ("alpha", t.alpha),
            ("generic", t.generic),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(CurveError::InvalidThreshold { name, value });
            }
        }
        if !t.scale.is_finite() || t.scale < 1.0 {
            return Err(CurveError::InvalidThreshold {
                name: "scale",
                value: t.scale,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = CompressionConfig::from_json(r#"{"thresholds":{"rotation":0.5}}"#)
            .expect("config parses");
        assert_eq!(cfg.thresholds.rotation, 0.5);
        assert_eq!(cfg.thresholds.position, 0.005);
        assert_eq!(cfg.roles, RoleRules::default());
    }

    #[test]
    fn scale_below_one_is_rejected() {
        let err = CompressionConfig::from_json(r#"{"thresholds":{"scale":0.5}}"#).unwrap_err();
        assert_eq!(
            err,
            CurveError::InvalidThreshold {
                name: "scale",
                value: 0.5
            }
        );
    }
}
