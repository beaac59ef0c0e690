//! Configuration for pulse finding, hit building and flash matching.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sliding-window pulse finder configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PulseFinderConfig {
    /// Pulses go above the baseline (false: below).
    pub positive: bool,
    /// Minimum start threshold (ADC above baseline).
    pub start_adc_threshold: f64,
    /// Minimum end threshold (ADC above baseline).
    pub end_adc_threshold: f64,
    /// Start threshold in units of pedestal sigma.
    pub start_n_sigma: f64,
    /// End threshold in units of pedestal sigma.
    pub end_n_sigma: f64,
    /// Samples to include before the start crossing.
    pub num_presamples: usize,
    /// Emit per-sample diagnostics at debug level.
    pub verbose: bool,
}

impl Default for PulseFinderConfig {
    fn default() -> Self {
        Self {
            positive: true,
            start_adc_threshold: 5.0,
            end_adc_threshold: 2.0,
            start_n_sigma: 5.0,
            end_n_sigma: 2.0,
            num_presamples: 3,
            verbose: false,
        }
    }
}

impl PulseFinderConfig {
    /// Set polarity.
    #[must_use]
    pub fn with_positive(mut self, positive: bool) -> Self {
        self.positive = positive;
        self
    }

    /// Set ADC floors for the start and end thresholds.
    #[must_use]
    pub fn with_adc_thresholds(mut self, start: f64, end: f64) -> Self {
        self.start_adc_threshold = start;
        self.end_adc_threshold = end;
        self
    }

    /// Set sigma multipliers for the start and end thresholds.
    #[must_use]
    pub fn with_n_sigma(mut self, start: f64, end: f64) -> Self {
        self.start_n_sigma = start;
        self.end_n_sigma = end;
        self
    }

    /// Set the number of presamples.
    #[must_use]
    pub fn with_presamples(mut self, num_presamples: usize) -> Self {
        self.num_presamples = num_presamples;
        self
    }

    /// Enable per-sample diagnostics.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Start threshold for a sample with pedestal sigma `sigma`.
    #[inline]
    #[must_use]
    pub fn start_threshold(&self, sigma: f64) -> f64 {
        self.start_adc_threshold.max(sigma * self.start_n_sigma)
    }

    /// End threshold for a sample with pedestal sigma `sigma`.
    #[inline]
    #[must_use]
    pub fn end_threshold(&self, sigma: f64) -> f64 {
        self.end_adc_threshold.max(sigma * self.end_n_sigma)
    }

    /// Checks the thresholds are finite.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] on non-finite thresholds.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.start_adc_threshold,
            self.end_adc_threshold,
            self.start_n_sigma,
            self.end_n_sigma,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::ConfigError(
                "pulse finder thresholds must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hit finder configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HitFinderConfig {
    /// Pulses with a smaller peak are not turned into hits (ADC).
    pub hit_threshold: f64,
    /// Leading samples used to estimate a flat pedestal.
    pub pedestal_samples: usize,
}

impl Default for HitFinderConfig {
    fn default() -> Self {
        Self {
            hit_threshold: 10.0,
            pedestal_samples: 16,
        }
    }
}

impl HitFinderConfig {
    /// Set the hit threshold.
    #[must_use]
    pub fn with_hit_threshold(mut self, threshold: f64) -> Self {
        self.hit_threshold = threshold;
        self
    }

    /// Set the number of pedestal samples.
    #[must_use]
    pub fn with_pedestal_samples(mut self, samples: usize) -> Self {
        self.pedestal_samples = samples;
        self
    }
}

/// Scintillation yield model for a minimum-ionizing track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct YieldParams {
    /// Photons per unit deposited charge.
    pub yield_per_unit_charge: f64,
    /// Photodetector quantum efficiency.
    pub quantum_efficiency: f64,
    /// Charge deposited per cm.
    pub dqdx: f64,
    /// Fraction of light in the prompt component.
    pub prompt_fraction: f64,
}

impl Default for YieldParams {
    fn default() -> Self {
        Self {
            yield_per_unit_charge: 24000.0,
            quantum_efficiency: 0.01,
            dqdx: 2.1,
            prompt_fraction: 0.25,
        }
    }
}

impl YieldParams {
    /// Detected prompt photoelectrons per cm of track.
    #[inline]
    #[must_use]
    pub fn prompt_yield(&self) -> f64 {
        self.yield_per_unit_charge * self.quantum_efficiency * self.dqdx * self.prompt_fraction
    }
}

/// Cuts applied when comparing a hypothesis with a flash.
///
/// Deviations are in units of the hypothesis' Poisson sigma.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompatibilityCuts {
    /// A single channel above this fails the hypothesis.
    pub single_channel_cut: f64,
    /// Channels above this count towards the cumulative cut.
    pub cumulative_threshold: f64,
    /// This many channels above `cumulative_threshold` fail the hypothesis.
    pub cumulative_channel_count_cut: u32,
    /// The summed deviation above this fails the hypothesis.
    pub integral_cut: f64,
}

impl Default for CompatibilityCuts {
    fn default() -> Self {
        Self {
            single_channel_cut: 5.0,
            cumulative_threshold: 3.0,
            cumulative_channel_count_cut: 5,
            integral_cut: 5.0,
        }
    }
}

impl CompatibilityCuts {
    /// Set the single-channel cut.
    #[must_use]
    pub fn with_single_channel_cut(mut self, cut: f64) -> Self {
        self.single_channel_cut = cut;
        self
    }

    /// Set the cumulative threshold and channel count.
    #[must_use]
    pub fn with_cumulative_cut(mut self, threshold: f64, channels: u32) -> Self {
        self.cumulative_threshold = threshold;
        self.cumulative_channel_count_cut = channels;
        self
    }

    /// Set the integral cut.
    #[must_use]
    pub fn with_integral_cut(mut self, cut: f64) -> Self {
        self.integral_cut = cut;
        self
    }
}

/// Beam-flash cosmic tagger configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TaggerConfig {
    /// Light yield model.
    pub yields: YieldParams,
    /// Compatibility cuts.
    pub cuts: CompatibilityCuts,
    /// Log every track/flash comparison at debug level.
    pub debug: bool,
}

impl TaggerConfig {
    /// Set the compatibility cuts.
    #[must_use]
    pub fn with_cuts(mut self, cuts: CompatibilityCuts) -> Self {
        self.cuts = cuts;
        self
    }

    /// Set the yield model.
    #[must_use]
    pub fn with_yields(mut self, yields: YieldParams) -> Self {
        self.yields = yields;
        self
    }

    /// Enable comparison diagnostics.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Figure of merit used to rank flashes for T0 matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchCriteria {
    /// Quadrature sum of the drift mismatch and weighted YZ separation.
    #[default]
    Combined,
    /// YZ separation only.
    YzSeparation,
    /// Drift mismatch only.
    DeltaX,
}

/// Photon-counter T0 matching configuration.
///
/// The PE-derived drift distance is modelled as
/// `A / pe^power + exp(B + C * pe)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct T0MatchConfig {
    /// `A`
    pub predicted_x_constant: f64,
    /// `power`
    pub predicted_x_power: f64,
    /// `B`
    pub predicted_exp_constant: f64,
    /// `C`
    pub predicted_exp_gradient: f64,
    /// Maximum track-flash time separation (microseconds).
    pub drift_window: f64,
    /// Electron drift velocity (cm/us).
    pub drift_velocity: f64,
    /// Weight of the YZ separation in [`MatchCriteria::Combined`].
    pub weight_of_delta_yz: f64,
    /// Ranking figure of merit.
    pub match_criteria: MatchCriteria,
    /// Flashes below this total are ignored.
    pub pe_threshold: f64,
}

impl Default for T0MatchConfig {
    fn default() -> Self {
        Self {
            predicted_x_constant: 1.0,
            predicted_x_power: 1.0,
            predicted_exp_constant: 5.0,
            predicted_exp_gradient: -0.01,
            drift_window: 2300.0,
            drift_velocity: 0.1114,
            weight_of_delta_yz: 1.0,
            match_criteria: MatchCriteria::Combined,
            pe_threshold: 0.0,
        }
    }
}

impl T0MatchConfig {
    /// Checks the drift parameters.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] for a non-positive drift window or velocity.
    pub fn validate(&self) -> Result<()> {
        if self.drift_window <= 0.0 || self.drift_velocity <= 0.0 {
            return Err(Error::ConfigError(
                "drift window and drift velocity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
