//! JSON event files.
//!
//! An event holds the raw optical waveforms together with the tracks and
//! flashes reconstructed for the same readout. Every list is optional.

use crate::Result;
use flashmatch_core::{OpticalFlash, Track, Waveform};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One readout's worth of reconstruction input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    /// Digitized optical waveforms.
    pub waveforms: Vec<Waveform>,
    /// Reconstructed tracks.
    pub tracks: Vec<Track>,
    /// Reconstructed optical flashes.
    pub flashes: Vec<OpticalFlash>,
}

impl EventRecord {
    /// Load an event from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid event.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let event: Self = serde_json::from_reader(reader)?;
        log::debug!(
            "loaded {}: {} waveforms, {} tracks, {} flashes",
            path.as_ref().display(),
            event.waveforms.len(),
            event.tracks.len(),
            event.flashes.len()
        );
        Ok(event)
    }

    /// Parse an event from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid event.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the event as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of samples over all waveforms.
    #[must_use]
    pub fn total_samples(&self) -> usize {
        self.waveforms.iter().map(Waveform::len).sum()
    }

    /// Smallest and largest flash time, if there are flashes.
    #[must_use]
    pub fn flash_time_range(&self) -> Option<(f64, f64)> {
        self.flashes.iter().map(|f| f.time).fold(None, |range, t| {
            Some(match range {
                Some((lo, hi)) => (f64::min(lo, t), f64::max(hi, t)),
                None => (t, t),
            })
        })
    }
}
