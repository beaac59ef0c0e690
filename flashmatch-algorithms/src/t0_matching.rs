//! Track T0 assignment from photon-counter flashes.
//!
//! The drift distance implied by a track-flash time separation is compared
//! with the distance predicted from the flash brightness, and the flash
//! centre is compared with the track in the YZ plane. The flash with the
//! best figure of merit gives the track its T0.

use flashmatch_core::config::{MatchCriteria, T0MatchConfig};
use flashmatch_core::flash::OpticalFlash;
use flashmatch_core::tag::{FlashT0, PHOTON_COUNTER_TRIGGER_TYPE};
use flashmatch_core::track::{Point3, Track};
use rayon::prelude::*;

/// Per-flash quantities entering the match figure of merit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashCandidate {
    /// Index into the flash list.
    pub flash_index: usize,
    /// Track time centre minus flash time (microseconds).
    pub time_separation: f64,
    /// Drift distance predicted from the flash PE (cm).
    pub predicted_x: f64,
    /// |drift distance from time separation - predicted_x| (cm).
    pub delta_x: f64,
    /// Smallest YZ distance of the flash centre from the track (cm).
    pub min_yz_separation: f64,
    /// Figure of merit, smaller is better.
    pub fit_param: f64,
}

/// Distance of `(y, z)` from the YZ line through `a` and `b`.
///
/// Degenerate segments fall back to the distance from `a`.
fn yz_distance(a: &Point3, b: &Point3, y: f64, z: f64) -> f64 {
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    let length = dy.hypot(dz);
    if length <= f64::EPSILON {
        return (y - a.y).hypot(z - a.z);
    }
    ((z - a.z) * dy - (y - a.y) * dz).abs() / length
}

/// Smallest YZ distance of a flash centre from the segments of `track`.
#[must_use]
pub fn min_yz_separation(track: &Track, flash: &OpticalFlash) -> f64 {
    let (y, z) = (flash.y_center, flash.z_center);
    if track.num_points() == 1 {
        let p = track.start();
        return (y - p.y).hypot(z - p.z);
    }
    track
        .segments()
        .map(|(a, b)| yz_distance(&a, &b, y, z))
        .fold(f64::INFINITY, f64::min)
}

/// Matches tracks to flashes by drift time and flash position.
#[derive(Debug, Clone, Default)]
pub struct PhotonCounterMatcher {
    config: T0MatchConfig,
}

impl PhotonCounterMatcher {
    /// Create a matcher with the given configuration.
    #[must_use]
    pub fn new(config: T0MatchConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &T0MatchConfig {
        &self.config
    }

    /// Algorithm name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "PhotonCounterT0Matching"
    }

    /// Drift distance predicted from a flash's total PE.
    #[must_use]
    pub fn predicted_x(&self, total_pe: f64) -> f64 {
        let c = &self.config;
        c.predicted_x_constant / total_pe.powf(c.predicted_x_power)
            + (c.predicted_exp_constant + c.predicted_exp_gradient * total_pe).exp()
    }

    /// Evaluates one flash against a track whose hit time centre is `track_time`.
    ///
    /// Returns `None` if the flash is after the track, further back than the
    /// drift window, or dimmer than the PE threshold.
    #[must_use]
    pub fn evaluate(
        &self,
        track: &Track,
        track_time: f64,
        flash_index: usize,
        flash: &OpticalFlash,
    ) -> Option<FlashCandidate> {
        let c = &self.config;
        let time_separation = track_time - flash.time;
        if time_separation < 0.0 || time_separation > c.drift_window {
            return None;
        }
        if flash.total_pe < c.pe_threshold {
            return None;
        }

        let predicted_x = self.predicted_x(flash.total_pe);
        let delta_x = (time_separation * c.drift_velocity - predicted_x).abs();
        let min_yz = min_yz_separation(track, flash);
        let fit_param = match c.match_criteria {
            MatchCriteria::Combined => {
                (delta_x * delta_x + min_yz * min_yz * c.weight_of_delta_yz).sqrt()
            }
            MatchCriteria::YzSeparation => min_yz,
            MatchCriteria::DeltaX => delta_x,
        };

        Some(FlashCandidate {
            flash_index,
            time_separation,
            predicted_x,
            delta_x,
            min_yz_separation: min_yz,
            fit_param,
        })
    }

    /// Best flash for one track, if it has timing and any candidate.
    fn match_track(
        &self,
        track_index: usize,
        track: &Track,
        flashes: &[OpticalFlash],
    ) -> Option<FlashT0> {
        let Some(timing) = track.timing() else {
            log::trace!("track {track_index} has no hit timing");
            return None;
        };
        let centre = timing.centre();

        let best = flashes
            .iter()
            .enumerate()
            .filter_map(|(i, flash)| self.evaluate(track, centre, i, flash))
            .inspect(|cand| {
                log::trace!(
                    "track {track_index} flash {}: delta_x={} min_yz={} -> {}",
                    cand.flash_index,
                    cand.delta_x,
                    cand.min_yz_separation,
                    cand.fit_param
                );
            })
            .fold(None::<FlashCandidate>, |best, cand| match best {
                Some(b) if b.fit_param <= cand.fit_param => Some(b),
                _ => Some(cand),
            })?;

        // T0 is reported in nanoseconds.
        Some(FlashT0 {
            track_index,
            time: flashes[best.flash_index].time * 1.0e3,
            trigger_type: PHOTON_COUNTER_TRIGGER_TYPE,
            flash_index: best.flash_index,
            fit_param: best.fit_param,
        })
    }

    /// Assigns a T0 to every track that has a candidate flash, in track order.
    #[must_use]
    pub fn match_tracks(&self, tracks: &[Track], flashes: &[OpticalFlash]) -> Vec<FlashT0> {
        tracks
            .iter()
            .enumerate()
            .filter_map(|(i, track)| self.match_track(i, track, flashes))
            .collect()
    }

    /// Parallel variant of [`PhotonCounterMatcher::match_tracks`].
    #[must_use]
    pub fn match_tracks_par(&self, tracks: &[Track], flashes: &[OpticalFlash]) -> Vec<FlashT0> {
        tracks
            .par_iter()
            .enumerate()
            .filter_map(|(i, track)| self.match_track(i, track, flashes))
            .collect()
    }
}
