//! Pedestal estimation from the leading samples of a waveform.
#![allow(clippy::cast_precision_loss)]

use flashmatch_core::waveform::{AdcCount, PedestalTrack};

/// Estimates a flat pedestal from the first `num_samples` samples.
///
/// The mean and population sigma of the leading window are applied to every
/// sample. Waveforms shorter than the window use all samples; an empty
/// waveform yields an empty track.
#[must_use]
pub fn estimate_flat_pedestal(samples: &[AdcCount], num_samples: usize) -> PedestalTrack {
    let window = &samples[..num_samples.max(1).min(samples.len())];
    if window.is_empty() {
        return PedestalTrack::default();
    }

    let n = window.len() as f64;
    let mean = window.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|&s| {
            let d = f64::from(s) - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    PedestalTrack::flat(samples.len(), mean, variance.sqrt())
}
