//! Channel bindings and semantic role classification.
//!
//! A binding names one animated float: the object path, the property and the
//! owning component type. Vector-valued properties are recorded as one binding
//! per component (`m_LocalPosition.x`, `.y`, `.z`), so grouping works from the
//! component suffix plus a configurable rule on the base property name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the target a curve animates.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelBinding {
    /// Object path relative to the recording root, `/`-separated ("" is the root).
    pub path: String,
    /// Property name including any component suffix.
    pub property: String,
    /// Owning component/type name.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ChannelBinding {
    pub fn new(
        path: impl Into<String>,
        property: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            property: property.into(),
            type_name: type_name.into(),
        }
    }

    /// Split `prop.x` into (`prop`, Some(X)). Unknown or missing suffixes return
    /// the whole property and `None`.
    pub fn split_property(&self) -> (&str, Option<Suffix>) {
        match self.property.rsplit_once('.') {
            Some((base, tail)) if !base.is_empty() => match Suffix::parse(tail) {
                Some(s) => (base, Some(s)),
                None => (self.property.as_str(), None),
            },
            _ => (self.property.as_str(), None),
        }
    }

    /// The binding sharing this one's path and type with `base.suffix`.
    pub fn sibling(&self, base: &str, suffix: Suffix) -> ChannelBinding {
        ChannelBinding {
            path: self.path.clone(),
            property: format!("{base}.{}", suffix.as_str()),
            type_name: self.type_name.clone(),
        }
    }
}

impl fmt::Display for ChannelBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.path, self.type_name, self.property)
    }
}

/// Component suffix of a vector or colour property.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Suffix {
    X,
    Y,
    Z,
    W,
    R,
    G,
    B,
    A,
}

impl Suffix {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "x" => Suffix::X,
            "y" => Suffix::Y,
            "z" => Suffix::Z,
            "w" => Suffix::W,
            "r" => Suffix::R,
            "g" => Suffix::G,
            "b" => Suffix::B,
            "a" => Suffix::A,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Suffix::X => "x",
            Suffix::Y => "y",
            Suffix::Z => "z",
            Suffix::W => "w",
            Suffix::R => "r",
            Suffix::G => "g",
            Suffix::B => "b",
            Suffix::A => "a",
        }
    }
}

pub const XYZ: [Suffix; 3] = [Suffix::X, Suffix::Y, Suffix::Z];
pub const XYZW: [Suffix; 4] = [Suffix::X, Suffix::Y, Suffix::Z, Suffix::W];
pub const RGB: [Suffix; 3] = [Suffix::R, Suffix::G, Suffix::B];

/// Semantic role a channel was compressed under.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ChannelRole {
    Generic,
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    RotationW,
    ScaleX,
    ScaleY,
    ScaleZ,
    ColorR,
    ColorG,
    ColorB,
    ColorA,
}

impl ChannelRole {
    pub fn rotation(suffix: Suffix) -> Self {
        match suffix {
            Suffix::X => ChannelRole::RotationX,
            Suffix::Y => ChannelRole::RotationY,
            Suffix::Z => ChannelRole::RotationZ,
            _ => ChannelRole::RotationW,
        }
    }

    pub fn position(suffix: Suffix) -> Self {
        match suffix {
            Suffix::X => ChannelRole::PositionX,
            Suffix::Y => ChannelRole::PositionY,
            _ => ChannelRole::PositionZ,
        }
    }

    pub fn scale(suffix: Suffix) -> Self {
        match suffix {
            Suffix::X => ChannelRole::ScaleX,
            Suffix::Y => ChannelRole::ScaleY,
            _ => ChannelRole::ScaleZ,
        }
    }

    pub fn color(suffix: Suffix) -> Self {
        match suffix {
            Suffix::R => ChannelRole::ColorR,
            Suffix::G => ChannelRole::ColorG,
            Suffix::B => ChannelRole::ColorB,
            _ => ChannelRole::ColorA,
        }
    }

    /// Coarse kind used for statistics and default thresholds.
    pub fn kind(self) -> RoleKind {
        match self {
            ChannelRole::Generic => RoleKind::Generic,
            ChannelRole::PositionX | ChannelRole::PositionY | ChannelRole::PositionZ => {
                RoleKind::Position
            }
            ChannelRole::RotationX
            | ChannelRole::RotationY
            | ChannelRole::RotationZ
            | ChannelRole::RotationW => RoleKind::Rotation,
            ChannelRole::ScaleX | ChannelRole::ScaleY | ChannelRole::ScaleZ => RoleKind::Scale,
            ChannelRole::ColorR | ChannelRole::ColorG | ChannelRole::ColorB => RoleKind::Color,
            ChannelRole::ColorA => RoleKind::Alpha,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Rotation,
    Scale,
    Position,
    Color,
    Alpha,
    Generic,
}

/// Match rule on a base property name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "text", rename_all = "lowercase")]
pub enum PropertyPattern {
    Any,
    Contains(String),
    Exact(String),
}

impl PropertyPattern {
    pub fn matches(&self, base_property: &str) -> bool {
        match self {
            PropertyPattern::Any => true,
            PropertyPattern::Contains(s) => base_property.contains(s.as_str()),
            PropertyPattern::Exact(s) => base_property == s,
        }
    }
}

/// Which base properties may form rotation, position and scale groups.
/// A role with no patterns is disabled; its channels fall through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleRules {
    pub rotation: Vec<PropertyPattern>,
    pub scale: Vec<PropertyPattern>,
    pub position: Vec<PropertyPattern>,
}

impl Default for RoleRules {
    fn default() -> Self {
        Self {
            rotation: vec![PropertyPattern::Any],
            scale: vec![PropertyPattern::Contains("LocalScale".into())],
            position: vec![PropertyPattern::Any],
        }
    }
}

impl RoleRules {
    pub fn is_rotation(&self, base: &str) -> bool {
        any_match(&self.rotation, base)
    }

    pub fn is_scale(&self, base: &str) -> bool {
        any_match(&self.scale, base)
    }

    pub fn is_position(&self, base: &str) -> bool {
        any_match(&self.position, base)
    }
}

fn any_match(patterns: &[PropertyPattern], base: &str) -> bool {
    patterns.iter().any(|p| p.matches(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_property_variants() {
        let b = ChannelBinding::new("Arm/Hand", "m_LocalPosition.x", "Transform");
        assert_eq!(b.split_property(), ("m_LocalPosition", Some(Suffix::X)));
        let b = ChannelBinding::new("", "m_Enabled", "Light");
        assert_eq!(b.split_property(), ("m_Enabled", None));
        let b = ChannelBinding::new("", "material._Glow.q", "Renderer");
        assert_eq!(b.split_property(), ("material._Glow.q", None));
        let b = ChannelBinding::new("", ".x", "Renderer");
        assert_eq!(b.split_property(), (".x", None));
    }

    #[test]
    fn default_rules() {
        let rules = RoleRules::default();
        assert!(rules.is_scale("m_LocalScale"));
        assert!(!rules.is_scale("m_LocalPosition"));
        assert!(rules.is_position("anything"));
    }

    #[test]
    fn pattern_serde_shape() {
        let p: PropertyPattern =
            serde_json::from_str(r#"{"match":"contains","text":"Position"}"#).expect("pattern");
        assert_eq!(p, PropertyPattern::Contains("Position".into()));
        let any: PropertyPattern = serde_json::from_str(r#"{"match":"any"}"#).expect("any");
        assert_eq!(any, PropertyPattern::Any);
    }
}
