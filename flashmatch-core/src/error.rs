//! Error types for flashmatch-core.

use thiserror::Error;

/// Result type alias for flashmatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for flashmatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A track needs at least one trajectory point.
    #[error("track has no trajectory points")]
    EmptyTrack,

    /// Per-channel vector does not match the detector's channel count.
    #[error("channel count mismatch: expected {expected}, found {found}")]
    ChannelCountMismatch { expected: usize, found: usize },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Pulse reconstruction aborted a waveform.
    #[error("pulse reconstruction error: {0}")]
    PulseReco(#[from] PulseRecoError),
}

/// Unrecoverable failures raised while scanning a single waveform.
///
/// Any of these aborts the waveform being processed; the pulses found so far
/// for that waveform are discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PulseRecoError {
    /// The presample window would start after the crossing sample.
    #[error("negative presample offset at sample {sample} (previous pulse ended at {previous_end})")]
    NegativePresampleOffset { sample: usize, previous_end: usize },

    /// Pedestal mean/sigma do not cover every waveform sample.
    #[error("pedestal length mismatch: {samples} samples, {mean} means, {sigma} sigmas")]
    PedestalLengthMismatch {
        samples: usize,
        mean: usize,
        sigma: usize,
    },
}
