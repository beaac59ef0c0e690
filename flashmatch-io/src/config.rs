//! Reconstruction configuration files.

use crate::{Error, Result};
use flashmatch_core::{
    DetectorGeometry, HitFinderConfig, OpticalClock, PulseFinderConfig, SpeCalibration,
    T0MatchConfig, TaggerConfig,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Every setting of one reconstruction pass.
///
/// All sections are optional in JSON and fall back to their defaults:
///
/// ```json
/// {
///   "detector": { "channel_count": 32, "half_width": 128.175 },
///   "pulse": { "start_adc_threshold": 5.0, "num_presamples": 3 },
///   "tagger": { "cuts": { "single_channel_cut": 5.0 } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Optical detector geometry.
    pub detector: DetectorGeometry,
    /// Digitizer clock.
    pub clock: OpticalClock,
    /// Single-photoelectron calibration.
    pub calibration: SpeCalibration,
    /// Pulse finder thresholds.
    pub pulse: PulseFinderConfig,
    /// Hit building.
    pub hit: HitFinderConfig,
    /// Beam-flash cosmic tagging.
    pub tagger: TaggerConfig,
    /// Photon-counter T0 matching.
    pub t0: T0MatchConfig,
}

impl ReconstructionConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`ReconstructionConfig::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the string is not valid JSON or fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks values no algorithm can run with.
    ///
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        if self.detector.channel_count == 0 {
            return Err(Error::InvalidFormat(
                "detector.channel_count must be positive".to_string(),
            ));
        }
        if self.clock.tick_period <= 0.0 {
            return Err(Error::InvalidFormat(format!(
                "clock.tick_period must be positive, got {}",
                self.clock.tick_period
            )));
        }
        self.pulse.validate()?;
        self.t0.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use flashmatch_core::MatchCriteria;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ReconstructionConfig::from_json("{}").unwrap();
        assert_eq!(config, ReconstructionConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "detector": { "channel_count": 8 },
            "pulse": { "positive": false, "num_presamples": 5 },
            "tagger": { "cuts": { "integral_cut": 3.5 }, "debug": true },
            "t0": { "match_criteria": "yz_separation" }
        }"#;
        let config = ReconstructionConfig::from_json(json).unwrap();
        assert_eq!(config.detector.channel_count, 8);
        assert_relative_eq!(
            config.detector.half_width,
            DetectorGeometry::default().half_width
        );
        assert!(!config.pulse.positive);
        assert_eq!(config.pulse.num_presamples, 5);
        assert_relative_eq!(config.tagger.cuts.integral_cut, 3.5);
        assert_relative_eq!(
            config.tagger.cuts.single_channel_cut,
            TaggerConfig::default().cuts.single_channel_cut
        );
        assert!(config.tagger.debug);
        assert_eq!(config.t0.match_criteria, MatchCriteria::YzSeparation);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ReconstructionConfig::from_json(r#"{ "detector": { "channel_count": 0 } }"#)
            .is_err());
        assert!(ReconstructionConfig::from_json(r#"{ "clock": { "tick_period": 0.0 } }"#)
            .is_err());
        assert!(ReconstructionConfig::from_json(r#"{ "t0": { "drift_window": -1.0 } }"#)
            .is_err());
        assert!(ReconstructionConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let mut config = ReconstructionConfig::default();
        config.hit.hit_threshold = 42.0;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(config.to_json().unwrap().as_bytes()).unwrap();

        let loaded = ReconstructionConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }
}
