//! Per-property error overrides resolved through an ownership hierarchy.
//!
//! Scopes are listed innermost first. A scope applies to a binding when its path
//! is the binding's object path or one of its ancestors; the empty path is the
//! root and applies to everything. The first applicable scope that names the
//! property wins.

use serde::{Deserialize, Serialize};

use crate::error::CurveError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyOverride {
    pub property: String,
    #[serde(rename = "maxError")]
    pub max_error: f32,
}

/// Override table declared on one object of the hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideScope {
    pub scope: String,
    #[serde(default)]
    pub overrides: Vec<PropertyOverride>,
}

impl OverrideScope {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            overrides: Vec::new(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, max_error: f32) -> Self {
        self.overrides.push(PropertyOverride {
            property: property.into(),
            max_error,
        });
        self
    }

    /// True when this scope owns `path` (same object or an ancestor).
    pub fn applies_to(&self, path: &str) -> bool {
        let scope = self.scope.trim_matches('/');
        let path = path.trim_matches('/');
        if scope.is_empty() || scope == path {
            return true;
        }
        path.strip_prefix(scope)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    fn lookup(&self, property: &str) -> Option<f32> {
        self.overrides
            .iter()
            .find(|o| o.property == property)
            .map(|o| o.max_error)
    }
}

/// Ordered override scopes, innermost to outermost.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdHierarchy {
    pub scopes: Vec<OverrideScope>,
}

impl ThresholdHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from flat `(scope, property, max_error)` tuples. Tuples sharing a
    /// scope are merged into that scope in first-seen order.
    pub fn from_tuples<S, P>(tuples: impl IntoIterator<Item = (S, P, f32)>) -> Self
    where
        S: Into<String>,
        P: Into<String>,
    {
        let mut scopes: Vec<OverrideScope> = Vec::new();
        for (scope, property, max_error) in tuples {
            let scope = scope.into();
            let entry = match scopes.iter().position(|s| s.scope == scope) {
                Some(i) => &mut scopes[i],
                None => {
                    scopes.push(OverrideScope::new(scope));
                    let last = scopes.len() - 1;
                    &mut scopes[last]
                }
            };
            entry.overrides.push(PropertyOverride {
                property: property.into(),
                max_error,
            });
        }
        Self { scopes }
    }

    pub fn push(&mut self, scope: OverrideScope) {
        self.scopes.push(scope);
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.iter().all(|s| s.overrides.is_empty())
    }

    /// Reject negative or non-finite override values.
    pub fn validate(&self) -> Result<(), CurveError> {
        for o in self.scopes.iter().flat_map(|s| &s.overrides) {
            if !o.max_error.is_finite() || o.max_error < 0.0 {
                return Err(CurveError::InvalidThreshold {
                    name: "override",
                    value: o.max_error,
                });
            }
        }
        Ok(())
    }

    /// Nearest override for `property` on the object at `path`.
    pub fn resolve(&self, path: &str, property: &str) -> Option<f32> {
        self.scopes
            .iter()
            .filter(|s| s.applies_to(path))
            .find_map(|s| s.lookup(property))
    }

    /// [`Self::resolve`] with a fallback default.
    pub fn resolve_or(&self, path: &str, property: &str, default: f32) -> f32 {
        self.resolve(path, property).unwrap_or(default)
    }
}
