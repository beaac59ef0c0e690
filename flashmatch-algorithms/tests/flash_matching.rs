#![allow(clippy::float_cmp)]
use flashmatch_algorithms::{
    check_compatibility, predict, BeamFlashTagger, CompatibilityCuts, PhotonCounterMatcher,
    TaggerConfig, YieldParams,
};
use flashmatch_core::services::{DetectorGeometry, Geometry};
use flashmatch_core::tag::CompatibilityVerdict;
use flashmatch_core::track::{Point3, Track};
use flashmatch_core::visibility::VisibilityLibrary;
use flashmatch_core::OpticalFlash;

const CHANNELS: usize = 8;

/// Visibility falling off with distance from the anode plane at x=0.
fn library() -> VisibilityLibrary {
    let divisions = [4, 1, 1];
    let voxels = (0..4u32)
        .map(|ix| {
            let scale = 0.02 / f64::from(ix + 1);
            (0..CHANNELS)
                .map(|c| scale * (1.0 + 0.1 * c as f64))
                .collect()
        })
        .collect();
    VisibilityLibrary::new(
        Point3::new(0.0, -100.0, 0.0),
        Point3::new(200.0, 100.0, 400.0),
        divisions,
        CHANNELS,
        voxels,
    )
    .unwrap()
}

fn geometry() -> DetectorGeometry {
    DetectorGeometry::new(CHANNELS, 100.0)
}

fn track_at_x(x: f64) -> Track {
    Track::new(vec![
        Point3::new(x, -50.0, 100.0),
        Point3::new(x, 0.0, 150.0),
        Point3::new(x, 50.0, 200.0),
    ])
    .unwrap()
}

#[test]
fn test_hypothesis_matches_its_own_flash() {
    let track = track_at_x(20.0);
    let hyp = predict(&track, &library(), CHANNELS, &YieldParams::default(), 0.0);
    assert!(hyp.total() > 0.0);

    let flash = OpticalFlash::new(0.0, true, hyp.as_slice().to_vec());
    assert_eq!(
        check_compatibility(&hyp, &flash, &CompatibilityCuts::default()),
        CompatibilityVerdict::Compatible
    );
}

#[test]
fn test_near_anode_track_is_brighter() {
    let near = predict(&track_at_x(20.0), &library(), CHANNELS, &YieldParams::default(), 0.0);
    let far = predict(&track_at_x(180.0), &library(), CHANNELS, &YieldParams::default(), 0.0);
    assert!(near.total() > far.total());

    // shifting the far track towards the anode reproduces the near hypothesis
    let shifted = predict(&track_at_x(180.0), &library(), CHANNELS, &YieldParams::default(), -160.0);
    for c in 0..CHANNELS {
        assert!((shifted[c] - near[c]).abs() < 1e-9);
    }
}

#[test]
fn test_event_tagging() {
    let geometry = geometry();
    let library = library();
    let beam_track = track_at_x(180.0);
    let cosmic_track = track_at_x(20.0);
    let outside = track_at_x(250.0);
    let tracks = vec![beam_track.clone(), cosmic_track, outside];

    // the dim far track is explained by the beam flash; the bright near track is not
    let beam_hyp = predict(
        &beam_track,
        &library,
        geometry.optical_channel_count(),
        &YieldParams::default(),
        0.0,
    );
    let flashes = vec![
        OpticalFlash::new(1.0, true, beam_hyp.as_slice().to_vec()),
        OpticalFlash::new(900.0, false, vec![5000.0; CHANNELS]),
    ];

    let tagger = BeamFlashTagger::new(TaggerConfig::default());
    let tags = tagger.tag_tracks(&tracks, &flashes, &geometry, &library);
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].track_index, 0);
    assert_eq!(tags[0].tag.score, 0.0);
    assert_eq!(tags[1].track_index, 1);
    assert_eq!(tags[1].tag.score, 1.0);

    assert_eq!(tags, tagger.tag_tracks_par(&tracks, &flashes, &geometry, &library));
}

#[test]
fn test_t0_matching_picks_closest_flash() {
    let tracks = vec![track_at_x(20.0).with_timing(500.0, 600.0)];
    let flashes = vec![
        OpticalFlash::new(100.0, true, vec![50.0; CHANNELS]).with_yz(0.0, 10.0, 150.0, 10.0),
        OpticalFlash::new(200.0, true, vec![50.0; CHANNELS]).with_yz(0.0, 10.0, 350.0, 10.0),
    ];
    let t0s = PhotonCounterMatcher::default().match_tracks(&tracks, &flashes);
    assert_eq!(t0s.len(), 1);
    assert_eq!(t0s[0].flash_index, 0);
    assert_eq!(t0s[0].time, 100_000.0);
}
