//! Pulse to optical-hit conversion and the per-event hit finder loop.
#![allow(clippy::cast_precision_loss)]

use crate::pedestal::estimate_flat_pedestal;
use crate::pulse_finder::PulseFinder;
use flashmatch_core::config::HitFinderConfig;
use flashmatch_core::error::Result;
use flashmatch_core::pulse::{OpticalHit, Pulse};
use flashmatch_core::services::{Calibration, Clock, Geometry};
use flashmatch_core::waveform::{PedestalTrack, Waveform};
use rayon::prelude::*;

/// Converts one pulse into a calibrated hit.
///
/// Returns `None` when the pulse peak is below `hit_threshold`.
pub fn construct_hit<C, K>(
    pulse: &Pulse,
    channel: u32,
    timestamp: f64,
    clock: &K,
    calibration: &C,
    hit_threshold: f64,
) -> Option<OpticalHit>
where
    C: Calibration + ?Sized,
    K: Clock + ?Sized,
{
    if pulse.peak < hit_threshold {
        return None;
    }

    let tick = clock.tick_period();
    let peak_time_abs = timestamp + pulse.t_max as f64 * tick;
    let amplitude_for_pe = if calibration.uses_area() {
        pulse.area
    } else {
        pulse.peak
    };

    Some(OpticalHit {
        channel,
        peak_time: peak_time_abs - clock.trigger_time(),
        peak_time_abs,
        frame: clock.frame_index(timestamp),
        width: (pulse.t_end - pulse.t_start) as f64 * tick,
        area: pulse.area,
        amplitude: pulse.peak,
        pe: calibration.photoelectrons(amplitude_for_pe, channel),
    })
}

/// Runs pulse finding and hit construction over a set of waveforms.
pub struct HitFinder<'a, P: PulseFinder> {
    pulse_finder: P,
    geometry: &'a dyn Geometry,
    clock: &'a dyn Clock,
    calibration: &'a dyn Calibration,
    config: HitFinderConfig,
}

impl<'a, P: PulseFinder> HitFinder<'a, P> {
    /// Create a hit finder over the given detector services.
    #[must_use]
    pub fn new(
        pulse_finder: P,
        geometry: &'a dyn Geometry,
        clock: &'a dyn Clock,
        calibration: &'a dyn Calibration,
        config: HitFinderConfig,
    ) -> Self {
        Self {
            pulse_finder,
            geometry,
            clock,
            calibration,
            config,
        }
    }

    /// The pulse finder in use.
    #[must_use]
    pub fn pulse_finder(&self) -> &P {
        &self.pulse_finder
    }

    /// Hits from one waveform using an explicit pedestal track.
    ///
    /// # Errors
    /// Propagates pulse reconstruction failures for this waveform.
    pub fn hits_for_waveform(
        &self,
        waveform: &Waveform,
        pedestal: &PedestalTrack,
    ) -> Result<Vec<OpticalHit>> {
        let pulses = self.pulse_finder.find_pulses(&waveform.samples, pedestal)?;
        Ok(pulses
            .iter()
            .filter_map(|pulse| {
                construct_hit(
                    pulse,
                    waveform.channel,
                    waveform.timestamp,
                    self.clock,
                    self.calibration,
                    self.config.hit_threshold,
                )
            })
            .collect())
    }

    /// Hits from one waveform, or `None` if its channel is not read out.
    fn process_waveform(&self, waveform: &Waveform) -> Result<Option<Vec<OpticalHit>>> {
        if !self.geometry.is_valid_channel(waveform.channel) {
            log::error!(
                "unrecognized channel number {}; ignoring waveform",
                waveform.channel
            );
            return Ok(None);
        }
        let pedestal = estimate_flat_pedestal(&waveform.samples, self.config.pedestal_samples);
        self.hits_for_waveform(waveform, &pedestal).map(Some)
    }

    /// Finds hits in every waveform, in waveform order.
    ///
    /// Waveforms on unknown channels are logged and skipped.
    ///
    /// # Errors
    /// A pulse reconstruction failure aborts the whole batch.
    pub fn find_hits(&self, waveforms: &[Waveform]) -> Result<Vec<OpticalHit>> {
        let mut hits = Vec::new();
        for waveform in waveforms {
            if let Some(found) = self.process_waveform(waveform)? {
                hits.extend(found);
            }
        }
        Ok(hits)
    }

    /// Parallel variant of [`HitFinder::find_hits`] with identical output order.
    ///
    /// # Errors
    /// A pulse reconstruction failure aborts the whole batch.
    pub fn find_hits_par(&self, waveforms: &[Waveform]) -> Result<Vec<OpticalHit>> {
        let per_waveform = waveforms
            .par_iter()
            .map(|waveform| self.process_waveform(waveform))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_waveform.into_iter().flatten().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::pulse_finder::SlidingWindow;
    use approx::assert_relative_eq;
    use flashmatch_core::config::PulseFinderConfig;
    use flashmatch_core::services::{DetectorGeometry, OpticalClock, SpeCalibration};

    fn clock() -> OpticalClock {
        OpticalClock {
            tick_period: 0.5,
            trigger_time: 100.0,
            frame_period: 1000.0,
        }
    }

    fn calibration(use_area: bool) -> SpeCalibration {
        SpeCalibration {
            use_area,
            spe_area: 10.0,
            spe_amplitude: 5.0,
            channel_gain: Vec::new(),
        }
    }

    fn pulse() -> Pulse {
        Pulse {
            t_start: 4,
            t_end: 10,
            t_max: 6,
            peak: 25.0,
            area: 120.0,
            ped_mean: 2000.0,
            ped_sigma: 1.0,
        }
    }

    #[test]
    fn test_construct_hit_area_mode() {
        let hit = construct_hit(&pulse(), 3, 2500.0, &clock(), &calibration(true), 10.0).unwrap();
        assert_eq!(hit.channel, 3);
        assert_relative_eq!(hit.peak_time_abs, 2503.0);
        assert_relative_eq!(hit.peak_time, 2403.0);
        assert_eq!(hit.frame, 2);
        assert_relative_eq!(hit.width, 3.0);
        assert_relative_eq!(hit.pe, 12.0);
        assert_eq!(hit.amplitude, 25.0);
        assert_eq!(hit.area, 120.0);
    }

    #[test]
    fn test_construct_hit_peak_mode() {
        let hit = construct_hit(&pulse(), 0, 0.0, &clock(), &calibration(false), 10.0).unwrap();
        assert_relative_eq!(hit.pe, 5.0);
    }

    #[test]
    fn test_construct_hit_below_threshold() {
        assert!(construct_hit(&pulse(), 0, 0.0, &clock(), &calibration(true), 30.0).is_none());
    }

    fn waveform(channel: u32) -> Waveform {
        let mut samples = vec![2000; 64];
        for s in &mut samples[30..34] {
            *s = 2040;
        }
        Waveform::new(channel, 10.0, samples)
    }

    #[test]
    fn test_find_hits_skips_unknown_channels() {
        let geometry = DetectorGeometry::new(2, 100.0);
        let clock = clock();
        let calib = calibration(true);
        let finder = HitFinder::new(
            SlidingWindow::new(PulseFinderConfig::default()),
            &geometry,
            &clock,
            &calib,
            HitFinderConfig::default(),
        );

        let waveforms = vec![waveform(0), waveform(7), waveform(1)];
        let hits = finder.find_hits(&waveforms).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].channel, 0);
        assert_eq!(hits[1].channel, 1);
        assert_relative_eq!(hits[0].peak_time_abs, 10.0 + 30.0 * 0.5);

        let par = finder.find_hits_par(&waveforms).unwrap();
        assert_eq!(hits, par);
    }

    #[test]
    fn test_hit_finder_keeps_its_pulse_finder() {
        let geometry = DetectorGeometry::new(2, 100.0);
        let clock = clock();
        let calib = calibration(true);
        let config = PulseFinderConfig {
            num_presamples: 7,
            ..PulseFinderConfig::default()
        };
        let finder = HitFinder::new(
            SlidingWindow::new(config),
            &geometry,
            &clock,
            &calib,
            HitFinderConfig::default(),
        );
        assert_eq!(finder.pulse_finder().config().num_presamples, 7);
        assert_eq!(finder.pulse_finder().name(), SlidingWindow::default().name());
    }
}
