//! flashmatch-core: Core types and traits for optical reconstruction.
//!
//! This crate provides the data model shared by the pulse finder, the
//! hit builder and the beam-flash matcher, together with the detector
//! collaborator interfaces they consume.
//!

pub mod config;
pub mod error;
pub mod flash;
pub mod pulse;
pub mod services;
pub mod tag;
pub mod track;
pub mod visibility;
pub mod waveform;

pub use config::{
    CompatibilityCuts, HitFinderConfig, MatchCriteria, PulseFinderConfig, T0MatchConfig,
    TaggerConfig, YieldParams,
};
pub use error::{Error, PulseRecoError, Result};
pub use flash::{HypothesisVector, OpticalFlash};
pub use pulse::{OpticalHit, Pulse};
pub use services::{
    Calibration, Clock, DetectorGeometry, Geometry, OpticalClock, SpeCalibration, Visibility,
};
pub use tag::{
    CompatibilityVerdict, CosmicTag, FlashT0, TaggedTrack, BEAM_FLASH_TAG_TYPE,
    PHOTON_COUNTER_TRIGGER_TYPE,
};
pub use track::{Point3, Track, TrackTiming};
pub use visibility::VisibilityLibrary;
pub use waveform::{AdcCount, PedestalTrack, Waveform};
