//! Beam-flash cosmic tagging.
//!
//! A track that no in-gate flash can explain did not come from the beam
//! spill and is tagged as cosmic.

use crate::compatibility::{check_compatibility, FlashComparison};
use crate::hypothesis::predict;
use flashmatch_core::config::TaggerConfig;
use flashmatch_core::flash::OpticalFlash;
use flashmatch_core::services::{Geometry, Visibility};
use flashmatch_core::tag::{CosmicTag, TaggedTrack, BEAM_FLASH_TAG_TYPE};
use flashmatch_core::track::Track;
use rayon::prelude::*;

/// Returns true if both endpoint x coordinates lie in `[0, 2 * half_width]`.
#[inline]
#[must_use]
pub fn in_drift_window(start_x: f64, end_x: f64, half_width: f64) -> bool {
    let max_x = 2.0 * half_width;
    (0.0..=max_x).contains(&start_x) && (0.0..=max_x).contains(&end_x)
}

/// Tags tracks by comparing their light hypothesis with in-gate flashes.
#[derive(Debug, Clone, Default)]
pub struct BeamFlashTagger {
    config: TaggerConfig,
}

impl BeamFlashTagger {
    /// Create a tagger with the given configuration.
    #[must_use]
    pub fn new(config: TaggerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Algorithm name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "BeamFlashTrackMatch"
    }

    /// Tags one track, or returns `None` if it leaves the drift window.
    fn tag_track<G, V>(
        &self,
        track_index: usize,
        track: &Track,
        beam_flashes: &[&OpticalFlash],
        geometry: &G,
        visibility: &V,
    ) -> Option<TaggedTrack>
    where
        G: Geometry + ?Sized,
        V: Visibility + ?Sized,
    {
        let begin = track.start();
        let end = track.end();
        if !in_drift_window(begin.x, end.x, geometry.detector_half_width()) {
            log::trace!("track {track_index} outside drift window, not tagged");
            return None;
        }

        let hypothesis = predict(
            track,
            visibility,
            geometry.optical_channel_count(),
            &self.config.yields,
            0.0,
        );

        // every flash is compared so that debug output covers the full set
        let mut compatible = false;
        for flash in beam_flashes {
            let verdict = check_compatibility(&hypothesis, flash, &self.config.cuts);
            compatible |= verdict.is_compatible();
            if self.config.debug {
                log::debug!(
                    "track {track_index}\n{track}\n{flash}\n{}",
                    FlashComparison::new(&hypothesis, flash, &self.config.cuts)
                );
            }
        }

        Some(TaggedTrack {
            track_index,
            tag: CosmicTag {
                begin_point: begin,
                end_point: end,
                score: if compatible { 0.0 } else { 1.0 },
                type_id: BEAM_FLASH_TAG_TYPE,
            },
        })
    }

    /// Tags every track inside the drift window, in track order.
    ///
    /// Only flashes flagged `on_beam_time` take part. Tracks with an endpoint
    /// outside the drift window get no tag.
    pub fn tag_tracks<G, V>(
        &self,
        tracks: &[Track],
        flashes: &[OpticalFlash],
        geometry: &G,
        visibility: &V,
    ) -> Vec<TaggedTrack>
    where
        G: Geometry + ?Sized,
        V: Visibility + ?Sized,
    {
        let beam_flashes = beam_gate(flashes);
        tracks
            .iter()
            .enumerate()
            .filter_map(|(i, track)| self.tag_track(i, track, &beam_flashes, geometry, visibility))
            .collect()
    }

    /// Parallel variant of [`BeamFlashTagger::tag_tracks`] with identical output.
    pub fn tag_tracks_par<G, V>(
        &self,
        tracks: &[Track],
        flashes: &[OpticalFlash],
        geometry: &G,
        visibility: &V,
    ) -> Vec<TaggedTrack>
    where
        G: Geometry + ?Sized,
        V: Visibility + ?Sized,
    {
        let beam_flashes = beam_gate(flashes);
        tracks
            .par_iter()
            .enumerate()
            .filter_map(|(i, track)| self.tag_track(i, track, &beam_flashes, geometry, visibility))
            .collect()
    }
}

fn beam_gate(flashes: &[OpticalFlash]) -> Vec<&OpticalFlash> {
    let gated: Vec<_> = flashes.iter().filter(|f| f.on_beam_time).collect();
    log::debug!("{} of {} flashes on beam time", gated.len(), flashes.len());
    gated
}
