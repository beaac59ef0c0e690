//! Threshold-crossing pulse finder with presample buffering.
//!
//! Key characteristics:
//! - Single left-to-right pass over the waveform
//! - Per-sample start/end thresholds from the pedestal sigma
//! - Start and end thresholds are frozen at the start crossing
//! - A new crossing while in the tail closes the running pulse
#![allow(clippy::doc_markdown)]

use flashmatch_core::config::PulseFinderConfig;
use flashmatch_core::error::PulseRecoError;
use flashmatch_core::pulse::Pulse;
use flashmatch_core::waveform::{AdcCount, PedestalTrack};

/// Trait for waveform pulse reconstruction algorithms.
pub trait PulseFinder: Send + Sync {
    /// Algorithm name.
    fn name(&self) -> &'static str;

    /// Finds pulses in one waveform.
    ///
    /// Pulses are returned in increasing `t_start` order and never share a
    /// sample.
    ///
    /// # Errors
    /// Any [`PulseRecoError`] aborts the waveform.
    fn find_pulses(
        &self,
        samples: &[AdcCount],
        pedestal: &PedestalTrack,
    ) -> Result<Vec<Pulse>, PulseRecoError>;
}

/// A pulse under construction together with its frozen thresholds.
#[derive(Debug, Clone, Copy)]
struct OpenPulse {
    pulse: Pulse,
    start_threshold: f64,
    end_threshold: f64,
}

impl OpenPulse {
    fn accumulate(&mut self, sample: usize, value: f64) {
        self.pulse.area += value;
        if self.pulse.peak < value {
            self.pulse.peak = value;
            self.pulse.t_max = sample;
        }
    }

    fn close(mut self, last_sample: usize) -> Pulse {
        self.pulse.t_end = last_sample.max(self.pulse.t_start);
        self.pulse
    }
}

#[derive(Debug, Clone, Copy)]
enum WindowState {
    Idle,
    Firing(OpenPulse),
    InTail(OpenPulse),
}

impl WindowState {
    fn is_firing(&self) -> bool {
        matches!(self, Self::Firing(_))
    }

    fn open_mut(&mut self) -> Option<&mut OpenPulse> {
        match self {
            Self::Firing(open) | Self::InTail(open) => Some(open),
            Self::Idle => None,
        }
    }

    fn take(&mut self) -> Option<OpenPulse> {
        match std::mem::replace(self, Self::Idle) {
            Self::Firing(open) | Self::InTail(open) => Some(open),
            Self::Idle => None,
        }
    }
}

/// Sliding-window pulse finder.
#[derive(Clone, Debug, Default)]
pub struct SlidingWindow {
    config: PulseFinderConfig,
}

impl SlidingWindow {
    /// Create with custom configuration.
    #[must_use]
    pub fn new(config: PulseFinderConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &PulseFinderConfig {
        &self.config
    }

    /// Baseline-subtracted amplitude in the configured polarity.
    #[inline]
    fn deviation(&self, adc: AdcCount, baseline: f64) -> f64 {
        let adc = f64::from(adc);
        if self.config.positive {
            adc - baseline
        } else {
            baseline - adc
        }
    }

    fn open_pulse(
        &self,
        samples: &[AdcCount],
        pedestal: &PedestalTrack,
        sample: usize,
        previous: Option<&Pulse>,
    ) -> Result<OpenPulse, PulseRecoError> {
        let sigma = pedestal.sigma[sample];
        let baseline = pedestal.mean[sample];

        // presamples never reach back onto the previous pulse
        let first_free = previous.map_or(0, |p| p.t_end + 1);
        let gap = sample
            .checked_sub(first_free)
            .ok_or(PulseRecoError::NegativePresampleOffset {
                sample,
                previous_end: previous.map_or(0, |p| p.t_end),
            })?;
        let t_start = sample - gap.min(self.config.num_presamples);

        let area = samples[t_start..sample]
            .iter()
            .map(|&adc| self.deviation(adc, baseline))
            .filter(|&v| v > 0.0)
            .sum();

        Ok(OpenPulse {
            pulse: Pulse {
                t_start,
                t_end: t_start,
                t_max: sample,
                peak: 0.0,
                area,
                ped_mean: baseline,
                ped_sigma: sigma,
            },
            start_threshold: self.config.start_threshold(sigma),
            end_threshold: self.config.end_threshold(sigma),
        })
    }
}

impl PulseFinder for SlidingWindow {
    fn name(&self) -> &'static str {
        "SlidingWindow"
    }

    fn find_pulses(
        &self,
        samples: &[AdcCount],
        pedestal: &PedestalTrack,
    ) -> Result<Vec<Pulse>, PulseRecoError> {
        if !pedestal.covers(samples.len()) {
            return Err(PulseRecoError::PedestalLengthMismatch {
                samples: samples.len(),
                mean: pedestal.mean.len(),
                sigma: pedestal.sigma.len(),
            });
        }

        let verbose = self.config.verbose;
        let mut pulses = Vec::new();
        let mut state = WindowState::Idle;

        for (i, &adc) in samples.iter().enumerate() {
            let baseline = pedestal.mean[i];
            let value = self.deviation(adc, baseline);
            let start_threshold = self.config.start_threshold(pedestal.sigma[i]);

            if !state.is_firing() && value > start_threshold {
                if let Some(open) = state.take() {
                    pulses.push(open.close(i.saturating_sub(1)));
                    if verbose {
                        log::debug!(
                            "pulse end (retrigger): baseline {baseline} adc above {value} T={i}"
                        );
                    }
                }

                let open = self.open_pulse(samples, pedestal, i, pulses.last())?;
                if verbose {
                    log::debug!(
                        "pulse start: baseline {baseline} threshold {start_threshold} \
                         adc above {value} pre-adc sum {} T={i}",
                        open.pulse.area
                    );
                }
                state = WindowState::Firing(open);
            }

            if verbose {
                match state {
                    WindowState::Firing(_) => log::debug!(
                        "pulsing: baseline {baseline} std {} adc above {value} T={i}",
                        pedestal.sigma[i]
                    ),
                    WindowState::InTail(_) => log::debug!(
                        "pulse ending: baseline {baseline} std {} adc above {value} T={i}",
                        pedestal.sigma[i]
                    ),
                    WindowState::Idle => {}
                }
            }

            if let WindowState::Firing(open) = state {
                if value < open.start_threshold {
                    state = WindowState::InTail(open);
                }
            }

            if state.open_mut().is_some_and(|open| value < open.end_threshold) {
                if let Some(open) = state.take() {
                    let pulse = open.close(i.saturating_sub(1));
                    if verbose {
                        log::debug!(
                            "pulse end: baseline {baseline} adc {value} T={i} area sum {}",
                            pulse.area
                        );
                    }
                    pulses.push(pulse);
                }
            }

            if let Some(open) = state.open_mut() {
                open.accumulate(i, value);
            }
        }

        // a pulse still open at the end of the readout window
        if let Some(open) = state.take() {
            pulses.push(open.close(samples.len() - 1));
        }

        Ok(pulses)
    }
}
