use glam::Vec2;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tabletop_gaze::Error;
use tabletop_gaze::data_loader::parse_gaze_samples;
use tabletop_gaze::gaze_index::TemporalGazeIndex;
use tabletop_gaze::types::GazeSample;

fn samples(timestamps: &[f64]) -> Vec<GazeSample> {
    timestamps
        .iter()
        .enumerate()
        .map(|(i, t)| GazeSample::new(*t, Vec2::new(i as f32, 0.0)))
        .collect()
}

fn brute_force(samples: &[GazeSample], t: f64) -> usize {
    let mut best = 0;
    for (i, s) in samples.iter().enumerate() {
        if (s.timestamp - t).abs() < (samples[best].timestamp - t).abs() {
            best = i;
        }
    }
    best
}

#[test]
fn test_empty_sequence_fails() {
    assert!(matches!(
        TemporalGazeIndex::new(Vec::new()),
        Err(Error::EmptyGazeSequence)
    ));
}

#[test]
fn test_before_first_and_after_last() {
    let mut index = TemporalGazeIndex::new(samples(&[1.0, 2.0, 3.0])).unwrap();
    assert_eq!(index.nearest(-5.0).timestamp, 1.0);
    assert_eq!(index.nearest(100.0).timestamp, 3.0);
    assert_eq!(index.cursor(), 2);
}

#[test]
fn test_last_sample_is_reachable() {
    let mut index = TemporalGazeIndex::new(samples(&[0.0, 0.1])).unwrap();
    assert_eq!(index.nearest(0.1).timestamp, 0.1);
}

#[test]
fn test_tie_prefers_earlier_sample() {
    let contents = r#"{"type":"gaze","timestamp":0.0,"data":{"gaze2d":[0.2,0.3]}}
{"type":"gaze","timestamp":0.1,"data":{"gaze2d":[0.25,0.3]}}
{"type":"gaze","timestamp":0.2,"data":{"gaze2d":[]}}
"#;
    let loaded = parse_gaze_samples(contents).unwrap();
    assert_eq!(loaded.len(), 2);

    // both samples are exactly 0.05 away
    assert_eq!((0.0f64 - 0.05).abs(), (0.1f64 - 0.05).abs());
    let mut index = TemporalGazeIndex::new(loaded).unwrap();
    let nearest = *index.nearest(0.05);
    assert_eq!(nearest.timestamp, 0.0);
    assert!((nearest.gaze - Vec2::new(0.2, 0.3)).length() < 1e-6);
    assert_eq!(index.cursor(), 0);
}

#[test]
fn test_exact_tie_with_representable_values() {
    let mut index = TemporalGazeIndex::new(samples(&[0.0, 0.5, 1.0])).unwrap();
    assert_eq!(index.nearest(0.25).timestamp, 0.0);
    assert_eq!(index.nearest(0.75).timestamp, 0.5);
}

#[test]
fn test_duplicate_timestamps_do_not_stop_search() {
    let mut index = TemporalGazeIndex::new(samples(&[0.0, 1.0, 1.0, 2.0])).unwrap();
    assert_eq!(index.nearest(2.0).timestamp, 2.0);
    assert_eq!(index.cursor(), 3);
}

#[test]
fn test_matches_brute_force_on_monotonic_queries() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut t = 0.0;
    let mut timestamps = Vec::new();
    for _ in 0..500 {
        t += rng.random_range(0.001..0.02);
        timestamps.push(t);
    }
    let all = samples(&timestamps);
    let mut index = TemporalGazeIndex::new(all.clone()).unwrap();

    let mut q = -0.1;
    while q < t + 0.1 {
        let expected = brute_force(&all, q);
        let found = index.nearest(q);
        assert_eq!(found.timestamp, all[expected].timestamp, "query {}", q);
        q += rng.random_range(0.0..0.05);
    }
}

#[test]
fn test_backward_query_rescans() {
    let all = samples(&[0.0, 1.0, 2.0, 3.0, 4.0]);
    let mut index = TemporalGazeIndex::new(all).unwrap();
    assert_eq!(index.nearest(3.9).timestamp, 4.0);
    assert_eq!(index.nearest(1.1).timestamp, 1.0);
    assert_eq!(index.cursor(), 1);
}
