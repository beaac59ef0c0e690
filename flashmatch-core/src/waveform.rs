//! Digitized optical waveforms and their pedestal tracks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw ADC count as delivered by the optical digitizer.
pub type AdcCount = i16;

/// One readout window of one optical channel.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waveform {
    /// Optical channel identifier.
    pub channel: u32,
    /// Time of the first sample (microseconds, electronics clock).
    pub timestamp: f64,
    /// ADC samples in readout order.
    pub samples: Vec<AdcCount>,
}

impl Waveform {
    /// Creates a waveform.
    #[must_use]
    pub fn new(channel: u32, timestamp: f64, samples: Vec<AdcCount>) -> Self {
        Self {
            channel,
            timestamp,
            samples,
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the waveform holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Running baseline and noise estimate, one entry per waveform sample.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PedestalTrack {
    /// Baseline mean per sample.
    pub mean: Vec<f64>,
    /// Baseline sigma per sample.
    pub sigma: Vec<f64>,
}

impl PedestalTrack {
    /// Creates a pedestal track from parallel mean/sigma vectors.
    #[must_use]
    pub fn new(mean: Vec<f64>, sigma: Vec<f64>) -> Self {
        Self { mean, sigma }
    }

    /// Creates a constant pedestal covering `len` samples.
    #[must_use]
    pub fn flat(len: usize, mean: f64, sigma: f64) -> Self {
        Self {
            mean: vec![mean; len],
            sigma: vec![sigma; len],
        }
    }

    /// Returns true if both vectors cover exactly `len` samples.
    #[must_use]
    pub fn covers(&self, len: usize) -> bool {
        self.mean.len() == len && self.sigma.len() == len
    }
}
