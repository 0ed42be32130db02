//! Interpolation and tangent helpers.
//!
//! Curves evaluate cubic Hermite segments (linear when a segment carries no
//! tangents). The compressor estimates missing tangents from the native samples
//! and checks candidate spans with the same segment evaluator.

pub mod functions;

pub use functions::{estimate_tangents, hermite_segment, lerp_f32};
