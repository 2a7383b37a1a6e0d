// crates/dashview-core/src/error.rs
//
// Leaf error types for the pure layer. None of these are fatal: a NameError
// drops one file from a scan, a SpeedError rejects one command.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("path has no usable file name")]
    NoFileName,

    #[error("'{stem}' does not match a dashcam clip name")]
    Unrecognized { stem: String },

    #[error("unknown camera angle token '{token}'")]
    UnknownAngle { token: String },

    #[error("'{key}' is not a valid date/time")]
    InvalidTimestamp { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SpeedError {
    #[error("{0}x is not a supported playback speed")]
    Unsupported(f32),
}
