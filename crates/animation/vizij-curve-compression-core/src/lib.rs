//! Vizij Curve Compression Core (engine-agnostic)
//!
//! Reduces densely recorded animation curves to a minimal set of keyframes
//! within per-channel error tolerances. Channels are grouped by semantic role
//! (rotation quaternion, position, scale, colour, alpha, generic), each group is
//! compressed with a matching error metric, and tolerances can be overridden per
//! property through an ownership hierarchy.

pub mod binding;
pub mod compress;
pub mod config;
pub mod curve;
pub mod error;
pub mod interp;
pub mod metric;
pub mod orchestrator;
pub mod recording;
pub mod stored_recording;
pub mod threshold;

// Re-exports for consumers (hosts)
pub use binding::{ChannelBinding, ChannelRole, PropertyPattern, RoleKind, RoleRules, Suffix};
pub use compress::{
    compress, compress_channels, compress_colors_hsv, compress_positions, compress_rotations,
    compress_scale, compress_scales,
};
pub use config::{CompressionConfig, Thresholds};
pub use curve::{Keyframe, SampleCurve};
pub use error::CurveError;
pub use metric::{
    max_deviation, quat_angle_degrees, ColorHsvMetric, ErrorMetric, PositionMetric,
    RotationMetric, ScalarMetric, ScaleMetric,
};
pub use orchestrator::{compress_curve_set, CompressionOutput, CompressionStats, Compressor};
pub use recording::{RecordedClip, RecordingSession};
pub use stored_recording::{export_compressed_json, parse_recorded_clip_json};
pub use threshold::{OverrideScope, PropertyOverride, ThresholdHierarchy};
