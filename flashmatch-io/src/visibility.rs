//! Photon visibility library files.

use crate::{Error, Result};
use flashmatch_core::VisibilityLibrary;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a visibility library from JSON and check its shape.
///
/// `expected_channels`, when given, must match the library's channel count.
///
/// # Errors
/// Returns an error if the file cannot be read, is not a valid library, or
/// has the wrong number of channels.
pub fn read_visibility_library<P: AsRef<Path>>(
    path: P,
    expected_channels: Option<usize>,
) -> Result<VisibilityLibrary> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let library: VisibilityLibrary = serde_json::from_reader(reader)?;
    check_library(library, expected_channels)
}

/// Parse a visibility library from a JSON string.
///
/// # Errors
/// See [`read_visibility_library`].
pub fn parse_visibility_library(
    json: &str,
    expected_channels: Option<usize>,
) -> Result<VisibilityLibrary> {
    check_library(serde_json::from_str(json)?, expected_channels)
}

fn check_library(
    library: VisibilityLibrary,
    expected_channels: Option<usize>,
) -> Result<VisibilityLibrary> {
    library.validate()?;
    if let Some(expected) = expected_channels {
        if library.channel_count != expected {
            return Err(Error::InvalidFormat(format!(
                "visibility library has {} channels, detector has {expected}",
                library.channel_count
            )));
        }
    }
    let populated = library.voxels.iter().filter(|v| !v.is_empty()).count();
    log::info!(
        "visibility library: {:?} voxels ({populated} populated), {} channels",
        library.divisions,
        library.channel_count
    );
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashmatch_core::services::Visibility;
    use flashmatch_core::Point3;

    const LIBRARY: &str = r#"{
        "min": { "x": 0.0, "y": -10.0, "z": 0.0 },
        "max": { "x": 20.0, "y": 10.0, "z": 10.0 },
        "divisions": [2, 1, 1],
        "channel_count": 2,
        "voxels": [[0.1, 0.2], []]
    }"#;

    #[test]
    fn test_parse_library() {
        let library = parse_visibility_library(LIBRARY, Some(2)).unwrap();
        assert_eq!(library.visibility_at(&Point3::new(5.0, 0.0, 5.0)), &[0.1, 0.2]);
        assert!(library.visibility_at(&Point3::new(15.0, 0.0, 5.0)).is_empty());
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        assert!(matches!(
            parse_visibility_library(LIBRARY, Some(4)),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_bad_shape_rejected() {
        let json = LIBRARY.replace("[2, 1, 1]", "[3, 1, 1]");
        assert!(matches!(
            parse_visibility_library(&json, None),
            Err(Error::CoreError(_))
        ));
    }
}
