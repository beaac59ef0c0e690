//! Compatibility verdicts, cosmic tags and flash-matched T0s.

use crate::track::Point3;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cosmic tag type written by the beam-flash track matcher.
pub const BEAM_FLASH_TAG_TYPE: i32 = 10;

/// Trigger type written on photon-counter T0s.
pub const PHOTON_COUNTER_TRIGGER_TYPE: i32 = 1;

/// Outcome of comparing a light hypothesis against one flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompatibilityVerdict {
    /// The flash can accommodate the hypothesis.
    Compatible,
    /// One channel predicts far more light than was seen.
    SingleChannelExcess,
    /// Too many channels predict moderately more light than was seen.
    CumulativeChannelExcess,
    /// The summed prediction is far above the summed flash.
    IntegralExcess,
}

impl CompatibilityVerdict {
    /// Returns true for [`CompatibilityVerdict::Compatible`].
    #[must_use]
    pub fn is_compatible(self) -> bool {
        self == Self::Compatible
    }
}

impl fmt::Display for CompatibilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compatible => "compatible",
            Self::SingleChannelExcess => "single-channel excess",
            Self::CumulativeChannelExcess => "cumulative-channel excess",
            Self::IntegralExcess => "integral excess",
        };
        f.write_str(name)
    }
}

/// Cosmic classification attached to one track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CosmicTag {
    /// First trajectory point of the tagged track.
    pub begin_point: Point3,
    /// Last trajectory point of the tagged track.
    pub end_point: Point3,
    /// 0.0 if some in-gate flash explains the track, 1.0 otherwise.
    pub score: f32,
    /// Tagging algorithm identifier.
    pub type_id: i32,
}

impl CosmicTag {
    /// Returns true if the track was tagged as cosmic.
    #[must_use]
    pub fn is_cosmic(&self) -> bool {
        self.score > 0.5
    }
}

/// A cosmic tag paired with the index of the track it describes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggedTrack {
    /// Index into the input track list.
    pub track_index: usize,
    /// The tag.
    pub tag: CosmicTag,
}

/// Event time assigned to a track from its best-matching flash.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlashT0 {
    /// Index into the input track list.
    pub track_index: usize,
    /// Matched flash time (nanoseconds).
    pub time: f64,
    /// Trigger type identifier.
    pub trigger_type: i32,
    /// Index into the input flash list.
    pub flash_index: usize,
    /// Match figure of merit (smaller is better).
    pub fit_param: f64,
}
