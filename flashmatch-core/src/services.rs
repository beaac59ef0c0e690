//! Detector collaborator interfaces and their standard implementations.
#![allow(clippy::cast_possible_truncation)]

use crate::track::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Detector description needed by the optical reconstruction.
pub trait Geometry: Send + Sync {
    /// Number of optical channels.
    fn optical_channel_count(&self) -> usize;

    /// Half width of the drift volume (cm).
    fn detector_half_width(&self) -> f64;

    /// Returns true if `channel` is read out by this detector.
    fn is_valid_channel(&self, channel: u32) -> bool;
}

/// Position to per-channel visibility lookup.
pub trait Visibility: Send + Sync {
    /// Visibility of every optical channel from `point`.
    ///
    /// Returns an empty slice when the point lies outside the supported volume.
    fn visibility_at(&self, point: &Point3) -> &[f64];
}

/// ADC to photoelectron conversion.
pub trait Calibration: Send + Sync {
    /// True if pulse area (rather than amplitude) is calibrated.
    fn uses_area(&self) -> bool;

    /// Photoelectrons for `amplitude` on `channel`.
    fn photoelectrons(&self, amplitude: f64, channel: u32) -> f64;
}

/// Optical readout clock.
pub trait Clock: Send + Sync {
    /// Sample period (microseconds).
    fn tick_period(&self) -> f64;

    /// Trigger time (microseconds).
    fn trigger_time(&self) -> f64;

    /// Clock frame containing `timestamp`.
    fn frame_index(&self, timestamp: f64) -> i64;
}

/// Fixed detector description.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorGeometry {
    /// Number of optical channels.
    pub channel_count: usize,
    /// Half width of the drift volume (cm).
    pub half_width: f64,
    /// Channels present in the numbering but not read out.
    pub excluded_channels: Vec<u32>,
}

impl Default for DetectorGeometry {
    fn default() -> Self {
        Self {
            channel_count: 32,
            half_width: 128.175,
            excluded_channels: Vec::new(),
        }
    }
}

impl DetectorGeometry {
    /// Creates a geometry with every channel read out.
    #[must_use]
    pub fn new(channel_count: usize, half_width: f64) -> Self {
        Self {
            channel_count,
            half_width,
            excluded_channels: Vec::new(),
        }
    }
}

impl Geometry for DetectorGeometry {
    fn optical_channel_count(&self) -> usize {
        self.channel_count
    }

    fn detector_half_width(&self) -> f64 {
        self.half_width
    }

    fn is_valid_channel(&self, channel: u32) -> bool {
        (channel as usize) < self.channel_count && !self.excluded_channels.contains(&channel)
    }
}

/// Optical digitizer clock with a fixed frame length.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OpticalClock {
    /// Sample period (microseconds).
    pub tick_period: f64,
    /// Trigger time (microseconds).
    pub trigger_time: f64,
    /// Frame length (microseconds).
    pub frame_period: f64,
}

impl Default for OpticalClock {
    fn default() -> Self {
        // 64 MHz digitizer, 1.6 ms frames
        Self {
            tick_period: 0.015_625,
            trigger_time: 0.0,
            frame_period: 1600.0,
        }
    }
}

impl Clock for OpticalClock {
    fn tick_period(&self) -> f64 {
        self.tick_period
    }

    fn trigger_time(&self) -> f64 {
        self.trigger_time
    }

    fn frame_index(&self, timestamp: f64) -> i64 {
        if self.frame_period <= 0.0 {
            return 0;
        }
        (timestamp / self.frame_period).floor() as i64
    }
}

/// Single-photoelectron size calibration with optional per-channel gains.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpeCalibration {
    /// Calibrate pulse area instead of amplitude.
    pub use_area: bool,
    /// Area of a single photoelectron (ADC x ticks).
    pub spe_area: f64,
    /// Amplitude of a single photoelectron (ADC).
    pub spe_amplitude: f64,
    /// Relative gain per channel; missing channels use 1.0.
    pub channel_gain: Vec<f64>,
}

impl Default for SpeCalibration {
    fn default() -> Self {
        Self {
            use_area: true,
            spe_area: 20.0,
            spe_amplitude: 20.0,
            channel_gain: Vec::new(),
        }
    }
}

impl Calibration for SpeCalibration {
    fn uses_area(&self) -> bool {
        self.use_area
    }

    fn photoelectrons(&self, amplitude: f64, channel: u32) -> f64 {
        let spe = if self.use_area {
            self.spe_area
        } else {
            self.spe_amplitude
        };
        let gain = self
            .channel_gain
            .get(channel as usize)
            .copied()
            .unwrap_or(1.0);
        let scale = spe * gain;
        if scale > 0.0 {
            amplitude / scale
        } else {
            0.0
        }
    }
}
