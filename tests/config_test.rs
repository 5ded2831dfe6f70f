use tabletop_gaze::Error;
use tabletop_gaze::config::SessionConfig;
use tabletop_gaze::io::{object_from_json, object_to_json};
use tabletop_gaze::registry::MarkerConfig;

#[test]
fn test_default_config_is_valid() {
    let config = SessionConfig::default();
    config.validate().unwrap();
    assert_eq!(config.table.markers.len(), 4);
    assert_eq!(config.table.scale_calibration, 50.0);
    assert_eq!(config.estimator.smoothing_rate, 10.0);
    assert!(config.projector.max_distance.is_none());
}

#[test]
fn test_config_json_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let path = path.to_str().unwrap();

    let mut config = SessionConfig::default();
    config.detector.tag_family = "t25h9".to_string();
    config.projector.max_distance = Some(25.0);
    object_to_json(path, &config).unwrap();

    let loaded: SessionConfig = object_from_json(path).unwrap();
    assert_eq!(loaded.detector.tag_family, "t25h9");
    assert_eq!(loaded.projector.max_distance, Some(25.0));
    assert_eq!(loaded.table.markers, config.table.markers);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config: SessionConfig =
        serde_json::from_str(r#"{"table":{"scale_calibration":30.0},"camera":{"vertical_fov_deg":45.0}}"#)
            .unwrap();
    assert_eq!(config.table.scale_calibration, 30.0);
    assert_eq!(config.table.markers.len(), 4);
    assert_eq!(config.camera.vertical_fov_deg, 45.0);
    assert_eq!(config.detector.resolution, [1920, 1080]);
}

#[test]
fn test_invalid_configs() {
    let cases: Vec<Box<dyn Fn(&mut SessionConfig)>> = vec![
        Box::new(|c: &mut SessionConfig| c.table.surface_dimensions.x = 0.0),
        Box::new(|c: &mut SessionConfig| c.table.scale_calibration = -1.0),
        Box::new(|c: &mut SessionConfig| c.detector.marker_size = 0.0),
        Box::new(|c: &mut SessionConfig| c.detector.decimation = 0),
        Box::new(|c: &mut SessionConfig| c.detector.resolution = [0, 1080]),
        Box::new(|c: &mut SessionConfig| c.camera.vertical_fov_deg = 180.0),
        Box::new(|c: &mut SessionConfig| c.projector.surface_layer = 32),
    ];
    for mutate in cases {
        let mut config = SessionConfig::default();
        mutate(&mut config);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}

#[test]
fn test_duplicate_marker_in_config() {
    let mut config = SessionConfig::default();
    let first = config.table.markers[0].clone();
    config.table.markers.push(MarkerConfig::new(first.id, first.offset * 0.5));
    assert!(matches!(config.validate(), Err(Error::DuplicateMarkerId(0))));
}
