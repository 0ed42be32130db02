//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

use crate::binding::ChannelBinding;

/// Errors produced while building, compressing or loading curves.
///
/// Every variant except [`CurveError::CoverageViolation`] and
/// [`CurveError::Parse`] is an invalid-argument condition raised by the caller's
/// input; none of them leave partially written output behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("key time {time} must be greater than the last key time {last}")]
    NonMonotonicKey { time: f32, last: f32 },
    #[error("key ({time}, {value}) is not finite")]
    NonFinite { time: f32, value: f32 },
    #[error("cannot compress an empty curve")]
    EmptyCurve,
    #[error("{group} compression needs {expected} channels, got {actual}")]
    ChannelCount {
        group: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid {name} threshold {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
    #[error("binding {0} appears more than once in the input")]
    DuplicateBinding(ChannelBinding),
    #[error("binding {0} was not written exactly once during compression")]
    CoverageViolation(ChannelBinding),
    #[error("recording json: {0}")]
    Parse(String),
}

impl CurveError {
    /// True for the argument-validation family of errors.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(
            self,
            CurveError::CoverageViolation(_) | CurveError::Parse(_)
        )
    }
}
