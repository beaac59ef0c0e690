//! Expected per-channel light for a minimum-ionizing track.

use flashmatch_core::config::YieldParams;
use flashmatch_core::flash::HypothesisVector;
use flashmatch_core::services::Visibility;
use flashmatch_core::track::Track;

/// Predicts prompt photoelectrons per optical channel for `track`.
///
/// Each trajectory segment contributes `prompt_yield * length` photons,
/// distributed with the visibility at the segment midpoint (shifted by
/// `x_offset` along the drift coordinate). Segments whose midpoint lies
/// outside the visibility map contribute nothing.
#[must_use]
pub fn predict<V>(
    track: &Track,
    visibility: &V,
    channel_count: usize,
    yields: &YieldParams,
    x_offset: f64,
) -> HypothesisVector
where
    V: Visibility + ?Sized,
{
    let prompt_yield = yields.prompt_yield();
    let mut hypothesis = vec![0.0; channel_count];

    for (a, b) in track.segments() {
        let midpoint = a.midpoint(&b).shifted_x(x_offset);
        let light = prompt_yield * a.distance(&b);

        let point_visibility = visibility.visibility_at(&midpoint);
        if point_visibility.len() != channel_count {
            continue;
        }

        for (expected, &vis) in hypothesis.iter_mut().zip(point_visibility) {
            *expected += vis * light;
        }
    }

    HypothesisVector::new(hypothesis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use flashmatch_core::track::Point3;
    use flashmatch_core::visibility::VisibilityLibrary;

    fn library(channels: usize, vis: f64) -> VisibilityLibrary {
        VisibilityLibrary::uniform(
            Point3::new(0.0, -100.0, 0.0),
            Point3::new(100.0, 100.0, 500.0),
            channels,
            vis,
        )
    }

    #[test]
    fn test_single_segment_uniform_visibility() {
        let track = Track::new(vec![
            Point3::new(10.0, 0.0, 10.0),
            Point3::new(10.0, 0.0, 30.0),
        ])
        .unwrap();
        let yields = YieldParams::default();
        let hyp = predict(&track, &library(4, 0.002), 4, &yields, 0.0);

        assert_eq!(hyp.len(), 4);
        for &value in hyp.as_slice() {
            assert_relative_eq!(value, 0.002 * 20.0 * yields.prompt_yield(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_segments_outside_library_are_skipped() {
        let track = Track::new(vec![
            Point3::new(10.0, 0.0, 10.0),
            Point3::new(10.0, 0.0, 20.0),
            Point3::new(10.0, 0.0, 1200.0),
        ])
        .unwrap();
        let yields = YieldParams::default();
        let hyp = predict(&track, &library(2, 0.01), 2, &yields, 0.0);
        // second segment's midpoint z=610 lies beyond the library; the first still counts
        assert_relative_eq!(hyp[0], 0.01 * 10.0 * yields.prompt_yield(), epsilon = 1e-9);
    }

    #[test]
    fn test_x_offset_moves_track_out_of_volume() {
        let track = Track::new(vec![
            Point3::new(90.0, 0.0, 10.0),
            Point3::new(90.0, 0.0, 20.0),
        ])
        .unwrap();
        let hyp = predict(&track, &library(3, 0.01), 3, &YieldParams::default(), 50.0);
        assert_relative_eq!(hyp.total(), 0.0);
    }

    #[test]
    fn test_channel_count_mismatch_contributes_nothing() {
        let track = Track::new(vec![
            Point3::new(10.0, 0.0, 10.0),
            Point3::new(10.0, 0.0, 20.0),
        ])
        .unwrap();
        let hyp = predict(&track, &library(2, 0.01), 5, &YieldParams::default(), 0.0);
        assert_eq!(hyp.len(), 5);
        assert_relative_eq!(hyp.total(), 0.0);
    }
}
