//! Optical flashes and per-channel light hypotheses.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A clustered multi-channel light burst.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpticalFlash {
    /// Flash time (microseconds).
    pub time: f64,
    /// True if the flash lies inside the beam gate.
    pub on_beam_time: bool,
    /// Photoelectrons per optical channel.
    pub pe_per_channel: Vec<f64>,
    /// Summed photoelectrons.
    pub total_pe: f64,
    /// PE-weighted y centre; zero when the producer did not cluster in YZ.
    #[cfg_attr(feature = "serde", serde(default))]
    pub y_center: f64,
    /// PE-weighted y width.
    #[cfg_attr(feature = "serde", serde(default))]
    pub y_width: f64,
    /// PE-weighted z centre.
    #[cfg_attr(feature = "serde", serde(default))]
    pub z_center: f64,
    /// PE-weighted z width.
    #[cfg_attr(feature = "serde", serde(default))]
    pub z_width: f64,
}

impl OpticalFlash {
    /// Creates a flash from its per-channel photoelectrons; the total is summed.
    #[must_use]
    pub fn new(time: f64, on_beam_time: bool, pe_per_channel: Vec<f64>) -> Self {
        let total_pe = pe_per_channel.iter().sum();
        Self {
            time,
            on_beam_time,
            pe_per_channel,
            total_pe,
            ..Self::default()
        }
    }

    /// Sets the YZ centre and widths.
    #[must_use]
    pub fn with_yz(mut self, y_center: f64, y_width: f64, z_center: f64, z_width: f64) -> Self {
        self.y_center = y_center;
        self.y_width = y_width;
        self.z_center = z_center;
        self.z_width = z_width;
        self
    }

    /// Photoelectrons on `channel`; channels the flash does not list read as zero.
    #[inline]
    #[must_use]
    pub fn pe(&self, channel: usize) -> f64 {
        self.pe_per_channel.get(channel).copied().unwrap_or(0.0)
    }
}

impl fmt::Display for OpticalFlash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Flash properties:")?;
        writeln!(f, "\tTime={}", self.time)?;
        writeln!(f, "\tOnBeamTime={}", self.on_beam_time)?;
        writeln!(
            f,
            "\ty position (center,width)=({},{})",
            self.y_center, self.y_width
        )?;
        writeln!(
            f,
            "\tz position (center,width)=({},{})",
            self.z_center, self.z_width
        )?;
        write!(f, "\tTotal PE={}", self.total_pe)
    }
}

/// Expected photoelectrons per optical channel for one track hypothesis.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HypothesisVector(Vec<f64>);

impl HypothesisVector {
    /// Wraps per-channel expectations.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// An all-zero hypothesis over `channels` channels.
    #[must_use]
    pub fn zeros(channels: usize) -> Self {
        Self(vec![0.0; channels])
    }

    /// Number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the hypothesis covers no channels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Per-channel values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Sum over all channels.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Unwraps the per-channel values.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Index<usize> for HypothesisVector {
    type Output = f64;

    fn index(&self, channel: usize) -> &f64 {
        &self.0[channel]
    }
}

impl From<Vec<f64>> for HypothesisVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_total_and_missing_channels() {
        let flash = OpticalFlash::new(1.0, true, vec![1.0, 2.5, 3.5]);
        assert!((flash.total_pe - 7.0).abs() < 1e-12);
        assert!((flash.pe(1) - 2.5).abs() < 1e-12);
        assert!(flash.pe(10).abs() < 1e-12);
    }

    #[test]
    fn test_hypothesis_vector() {
        let hyp = HypothesisVector::new(vec![1.0, 2.0]);
        assert_eq!(hyp.len(), 2);
        assert!((hyp[1] - 2.0).abs() < 1e-12);
        assert!((hyp.total() - 3.0).abs() < 1e-12);
        assert!(HypothesisVector::zeros(0).is_empty());
    }
}
