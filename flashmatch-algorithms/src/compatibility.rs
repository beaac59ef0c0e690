//! Statistical comparison of a light hypothesis with an observed flash.
//!
//! A flash fails a hypothesis when one channel, several channels, or the
//! channel sum predict far more light than was recorded. Deviations are
//! scaled by the Poisson sigma of the hypothesis, so a flash brighter than
//! the prediction is never a failure.

use flashmatch_core::config::CompatibilityCuts;
use flashmatch_core::flash::{HypothesisVector, OpticalFlash};
use flashmatch_core::tag::CompatibilityVerdict;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hypothesis values below this many photoelectrons carry no prediction.
pub const MIN_HYPOTHESIS_PE: f64 = 1.0e-6;

#[inline]
fn scaled_difference(hypothesis: f64, observed: f64) -> f64 {
    (hypothesis - observed) / hypothesis.sqrt()
}

/// Tests whether `flash` can accommodate `hypothesis`.
///
/// Channels are scanned in index order and the single- and cumulative-
/// channel cuts stop the scan as soon as they fire. An all-empty hypothesis
/// has no statistical power and is reported compatible.
#[must_use]
pub fn check_compatibility(
    hypothesis: &HypothesisVector,
    flash: &OpticalFlash,
    cuts: &CompatibilityCuts,
) -> CompatibilityVerdict {
    let mut hypothesis_integral = 0.0;
    let mut flash_integral = 0.0;
    let mut cumulative_channels = 0u32;

    for (channel, &expected) in hypothesis.as_slice().iter().enumerate() {
        let observed = flash.pe(channel);
        flash_integral += observed;

        if expected < MIN_HYPOTHESIS_PE {
            continue;
        }

        let diff = scaled_difference(expected, observed);
        if diff > cuts.single_channel_cut {
            return CompatibilityVerdict::SingleChannelExcess;
        }
        if diff > cuts.cumulative_threshold {
            cumulative_channels += 1;
            if cumulative_channels >= cuts.cumulative_channel_count_cut {
                return CompatibilityVerdict::CumulativeChannelExcess;
            }
        }
        // Channels past the cumulative threshold still count toward the integral.
        hypothesis_integral += expected;
    }

    if hypothesis_integral < MIN_HYPOTHESIS_PE {
        return CompatibilityVerdict::Compatible;
    }
    if scaled_difference(hypothesis_integral, flash_integral) > cuts.integral_cut {
        return CompatibilityVerdict::IntegralExcess;
    }
    CompatibilityVerdict::Compatible
}

/// One row of a [`FlashComparison`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelComparison {
    /// Optical channel.
    pub channel: usize,
    /// Expected photoelectrons.
    pub hypothesis: f64,
    /// Observed photoelectrons.
    pub flash: f64,
    /// Scaled difference, absent when the hypothesis is empty.
    pub difference: Option<f64>,
}

/// Full per-channel hypothesis/flash table for diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlashComparison {
    /// Per-channel rows in channel order.
    pub channels: Vec<ChannelComparison>,
    /// Sum of non-empty hypothesis channels.
    pub hypothesis_integral: f64,
    /// Sum of flash channels.
    pub flash_integral: f64,
    /// Scaled integral difference, absent for an empty hypothesis.
    pub integral_difference: Option<f64>,
    /// Verdict of [`check_compatibility`].
    pub verdict: CompatibilityVerdict,
}

impl FlashComparison {
    /// Builds the comparison table for a hypothesis/flash pair.
    #[must_use]
    pub fn new(
        hypothesis: &HypothesisVector,
        flash: &OpticalFlash,
        cuts: &CompatibilityCuts,
    ) -> Self {
        let mut hypothesis_integral = 0.0;
        let mut flash_integral = 0.0;
        let channels = hypothesis
            .as_slice()
            .iter()
            .enumerate()
            .map(|(channel, &expected)| {
                let observed = flash.pe(channel);
                flash_integral += observed;
                let difference = (expected >= MIN_HYPOTHESIS_PE).then(|| {
                    hypothesis_integral += expected;
                    scaled_difference(expected, observed)
                });
                ChannelComparison {
                    channel,
                    hypothesis: expected,
                    flash: observed,
                    difference,
                }
            })
            .collect();

        Self {
            channels,
            hypothesis_integral,
            flash_integral,
            integral_difference: (hypothesis_integral >= MIN_HYPOTHESIS_PE)
                .then(|| scaled_difference(hypothesis_integral, flash_integral)),
            verdict: check_compatibility(hypothesis, flash, cuts),
        }
    }
}

impl fmt::Display for FlashComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hypothesis-flash comparison:")?;
        for row in &self.channels {
            write!(
                f,
                "\n\t pmt_i={}, (hypothesis,flash)=({},{})",
                row.channel, row.hypothesis, row.flash
            )?;
            if let Some(diff) = row.difference {
                write!(f, "  difference={diff}")?;
            }
        }
        write!(
            f,
            "\n\t TOTAL (hypothesis,flash)=({},{})",
            self.hypothesis_integral, self.flash_integral
        )?;
        if let Some(diff) = self.integral_difference {
            write!(f, "  difference={diff}")?;
        }
        write!(f, "\nEnd result={}", self.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cuts() -> CompatibilityCuts {
        CompatibilityCuts {
            single_channel_cut: 5.0,
            cumulative_threshold: 2.0,
            cumulative_channel_count_cut: 3,
            integral_cut: 4.0,
        }
    }

    fn flash(pe: Vec<f64>) -> OpticalFlash {
        OpticalFlash::new(0.0, true, pe)
    }

    #[test]
    fn test_exact_match_is_compatible() {
        let values = vec![100.0, 25.0, 0.0, 400.0];
        let hyp = HypothesisVector::new(values.clone());
        assert_eq!(
            check_compatibility(&hyp, &flash(values), &cuts()),
            CompatibilityVerdict::Compatible
        );
    }

    #[test]
    fn test_brighter_flash_is_compatible() {
        let hyp = HypothesisVector::new(vec![100.0, 100.0]);
        assert_eq!(
            check_compatibility(&hyp, &flash(vec![1000.0, 1000.0]), &cuts()),
            CompatibilityVerdict::Compatible
        );
    }

    #[test]
    fn test_single_channel_excess() {
        // channel 1: (100 - 40) / 10 = 6 sigma
        let hyp = HypothesisVector::new(vec![100.0, 100.0, 100.0]);
        assert_eq!(
            check_compatibility(&hyp, &flash(vec![100.0, 40.0, 100.0]), &cuts()),
            CompatibilityVerdict::SingleChannelExcess
        );
    }

    #[test]
    fn test_cumulative_channel_excess() {
        // three channels at 3 sigma: each above the cumulative threshold only
        let hyp = HypothesisVector::new(vec![100.0; 4]);
        assert_eq!(
            check_compatibility(&hyp, &flash(vec![70.0, 70.0, 70.0, 100.0]), &cuts()),
            CompatibilityVerdict::CumulativeChannelExcess
        );
    }

    #[test]
    fn test_integral_excess() {
        // every channel at 1.5 sigma, but 16 channels add up
        let hyp = HypothesisVector::new(vec![100.0; 16]);
        let verdict = check_compatibility(&hyp, &flash(vec![85.0; 16]), &cuts());
        // (1600 - 1360) / 40 = 6 sigma
        assert_eq!(verdict, CompatibilityVerdict::IntegralExcess);
    }

    #[test]
    fn test_integral_counts_channels_above_cumulative_threshold() {
        // every channel at 2.5 sigma, too few to trip the cumulative cut
        let cuts = CompatibilityCuts {
            cumulative_channel_count_cut: 100,
            ..cuts()
        };
        let hyp = HypothesisVector::new(vec![100.0; 16]);
        let observed = flash(vec![75.0; 16]);

        // (1600 - 1200) / 40 = 10 sigma
        assert_eq!(
            check_compatibility(&hyp, &observed, &cuts),
            CompatibilityVerdict::IntegralExcess
        );

        let cmp = FlashComparison::new(&hyp, &observed, &cuts);
        assert!((cmp.hypothesis_integral - 1600.0).abs() < 1e-9);
        assert!((cmp.integral_difference.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(cmp.verdict, CompatibilityVerdict::IntegralExcess);
    }

    #[test]
    fn test_empty_hypothesis_is_compatible() {
        let hyp = HypothesisVector::zeros(8);
        assert_eq!(
            check_compatibility(&hyp, &flash(vec![50.0; 8]), &cuts()),
            CompatibilityVerdict::Compatible
        );
    }

    #[test]
    fn test_short_flash_reads_missing_channels_as_zero() {
        let hyp = HypothesisVector::new(vec![4.0, 400.0]);
        assert_eq!(
            check_compatibility(&hyp, &flash(vec![4.0]), &cuts()),
            CompatibilityVerdict::SingleChannelExcess
        );
    }

    #[test]
    fn test_comparison_table() {
        let hyp = HypothesisVector::new(vec![100.0, 0.0]);
        let cmp = FlashComparison::new(&hyp, &flash(vec![80.0, 5.0]), &cuts());
        assert_eq!(cmp.channels.len(), 2);
        assert!((cmp.channels[0].difference.unwrap() - 2.0).abs() < 1e-12);
        assert!(cmp.channels[1].difference.is_none());
        assert!((cmp.flash_integral - 85.0).abs() < 1e-12);
        assert!((cmp.integral_difference.unwrap() - 1.5).abs() < 1e-12);
        assert_eq!(cmp.verdict, CompatibilityVerdict::Compatible);

        let text = cmp.to_string();
        assert!(text.contains("pmt_i=1"));
        assert!(text.ends_with("End result=compatible"));
    }
}
