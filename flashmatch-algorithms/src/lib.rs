//! flashmatch-algorithms: Optical reconstruction and flash matching.
//!
//! This crate provides:
//! - **`SlidingWindow`** pulse finding over baseline-subtracted waveforms
//! - **`HitFinder`** pulse to calibrated optical-hit conversion
//! - **`BeamFlashTagger`** cosmic tagging from light hypotheses
//! - **`PhotonCounterMatcher`** track T0 assignment from flashes
//!
#![warn(missing_docs)]

mod compatibility;
mod cosmic_tagger;
mod hit_finder;
mod hypothesis;
mod pedestal;
mod pulse_finder;
mod t0_matching;

pub use compatibility::{
    check_compatibility, ChannelComparison, FlashComparison, MIN_HYPOTHESIS_PE,
};
pub use cosmic_tagger::{in_drift_window, BeamFlashTagger};
pub use hit_finder::{construct_hit, HitFinder};
pub use hypothesis::predict;
pub use pedestal::estimate_flat_pedestal;
pub use pulse_finder::{PulseFinder, SlidingWindow};
pub use t0_matching::{min_yz_separation, FlashCandidate, PhotonCounterMatcher};

// Re-export the configuration types the algorithms consume
pub use flashmatch_core::config::{
    CompatibilityCuts, HitFinderConfig, MatchCriteria, PulseFinderConfig, T0MatchConfig,
    TaggerConfig, YieldParams,
};
