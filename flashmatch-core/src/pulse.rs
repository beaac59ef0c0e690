//! Reconstructed pulses and calibrated optical hits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A contiguous above-threshold region of a waveform plus its presamples.
///
/// Indices are sample positions in the source waveform. `peak` and `area`
/// are baseline subtracted in the configured polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pulse {
    /// First sample, including presamples.
    pub t_start: usize,
    /// Last sample belonging to the pulse.
    pub t_end: usize,
    /// Sample holding the maximum.
    pub t_max: usize,
    /// Maximum baseline-subtracted amplitude.
    pub peak: f64,
    /// Summed baseline-subtracted amplitude.
    pub area: f64,
    /// Baseline at the start crossing.
    pub ped_mean: f64,
    /// Baseline sigma at the start crossing.
    pub ped_sigma: f64,
}

impl Pulse {
    /// Number of samples spanned by the pulse.
    #[inline]
    #[must_use]
    pub fn len_samples(&self) -> usize {
        self.t_end - self.t_start + 1
    }
}

/// Calibrated, timed optical hit derived from one pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpticalHit {
    /// Optical channel.
    pub channel: u32,
    /// Peak time relative to the trigger (microseconds).
    pub peak_time: f64,
    /// Absolute peak time (microseconds).
    pub peak_time_abs: f64,
    /// Optical clock frame of the waveform timestamp.
    pub frame: i64,
    /// Pulse width (microseconds).
    pub width: f64,
    /// Pulse area (ADC x ticks).
    pub area: f64,
    /// Pulse amplitude (ADC).
    pub amplitude: f64,
    /// Calibrated photoelectrons.
    pub pe: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_len() {
        let pulse = Pulse {
            t_start: 10,
            t_end: 14,
            ..Pulse::default()
        };
        assert_eq!(pulse.len_samples(), 5);
    }
}
