use powerrs::{Block, CalculationConfig, ParseError, PowerRsError, Workout};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_structured_workout_blocks() {
    let workout = Workout::from_file(&fixture("structured_workout.zwo")).unwrap();

    assert_eq!(workout.name.as_deref(), Some("Threshold Builder"));
    assert_eq!(workout.author.as_deref(), Some("powerrs"));
    assert!(workout.description.is_some());
    assert_eq!(
        workout.blocks(),
        &[
            Block::warmup(300, 0.5, 0.75),
            Block::steady_state(600, 0.75),
            Block::interval(4, 60, 1.2, 120, 0.55),
            Block::free_ride(300),
            Block::ramp(120, 0.6, 0.9),
            Block::cooldown(300, 0.7, 0.4),
        ]
    );
    assert_eq!(workout.planned_duration(), 2340);
    assert!(workout.metrics().is_none());
}

#[test]
fn test_structured_workout_metrics_at_ftp() {
    let workout = Workout::from_file(&fixture("structured_workout.zwo"))
        .unwrap()
        .with_ftp(250)
        .unwrap();
    let power = workout.activity().unwrap().power();

    assert_eq!(power.len(), 2040);
    assert_eq!(power[0], 125);
    assert_eq!(power[299], 187);
    assert_eq!(power[300], 188);
    assert_eq!(power[900], 300);
    assert_eq!(power[960], 138);
    assert_eq!(power[1619], 138);
    // Ramp starts right after the last interval; the free ride left no samples
    assert_eq!(power[1620], 150);
    assert_eq!(power[1740], 175);
    assert_eq!(*power.last().unwrap(), 100);

    let metrics = workout.metrics().unwrap();
    assert!((metrics.average_power - 177.26911764705883).abs() < 1e-9);
    assert_eq!(metrics.total_work, 361_629);
    assert_eq!(metrics.max_power, 300);
    assert_eq!(metrics.normalized_power, 197.0);
    assert!((metrics.intensity_factor - 0.788).abs() < 1e-12);
    assert!((metrics.training_stress_score - 35.18682666666667).abs() < 1e-9);
    assert!((metrics.variability_index - 1.1113046796578814).abs() < 1e-9);

    let profile: Vec<(u32, u16)> = metrics.power_profile.iter().map(|(&d, &p)| (d, p)).collect();
    assert_eq!(profile, vec![(5, 300), (60, 300), (300, 213), (1200, 195)]);
}

#[test]
fn test_workout_with_custom_config() {
    let config = CalculationConfig::from_toml_str(
        r#"
        [calculation]
        np_window_seconds = 10
        power_profile_durations = [30, 600]
        "#,
    )
    .unwrap();

    let workout = Workout::from_file(&fixture("structured_workout.zwo"))
        .unwrap()
        .with_config(config)
        .with_ftp(250)
        .unwrap();

    let profile = &workout.metrics().unwrap().power_profile;
    assert_eq!(profile.keys().copied().collect::<Vec<_>>(), vec![30, 600]);
    assert_eq!(workout.activity().unwrap().config().normalized_power.window_seconds, 10);
}

#[test]
fn test_unknown_block_type() {
    let err = Workout::from_file(&fixture("unknown_block.zwo")).unwrap_err();
    match err {
        PowerRsError::Parse(ParseError::MalformedInput { reason, .. }) => {
            assert_eq!(reason, "Unknown block type: MaxEffort");
        }
        other => panic!("expected malformed input, got {:?}", other),
    }
}

#[test]
fn test_unsupported_file_format() {
    let err = Workout::from_file(&fixture("unsupported_file_format.txt")).unwrap_err();
    assert!(err.to_string().contains("Unsupported file type: txt"));
}

#[test]
fn test_missing_workout_file() {
    let err = Workout::from_file(Path::new("file_that_does_not_exist.zwo")).unwrap_err();
    assert!(matches!(err, PowerRsError::Parse(ParseError::FileNotFound { .. })));
    assert!(err.to_string().contains("File not found"));
}

#[test]
fn test_workout_without_blocks() {
    let mut file = Builder::new().suffix(".zwo").tempfile().unwrap();
    file.write_all(b"<workout_file><name>Rest day</name><workout></workout></workout_file>")
        .unwrap();

    let workout = Workout::from_file(file.path()).unwrap().with_ftp(250).unwrap();
    assert!(workout.blocks().is_empty());
    assert!(workout.metrics().unwrap().is_empty());
}

fn zwo_file(content: &[u8]) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(".zwo").tempfile().unwrap();
    file.write_all(content).unwrap();
    file
}

#[test]
fn test_structurally_invalid_workout_files() {
    let cases: [&[u8]; 3] = [b"", b"not xml at all", b"<workout_file><workout>"];
    for content in cases {
        let file = zwo_file(content);
        let err = Workout::from_file(file.path()).unwrap_err();
        assert!(
            matches!(err, PowerRsError::Parse(ParseError::MalformedInput { .. })),
            "{:?} gave {:?}",
            String::from_utf8_lossy(content),
            err
        );
    }
}

#[test]
fn test_undecodable_workout_file_exists() {
    let file = zwo_file(b"\xff\xfe");
    let err = Workout::from_file(file.path()).unwrap_err();
    assert!(matches!(err, PowerRsError::Parse(ParseError::MalformedInput { .. })));
    assert!(!err.to_string().contains("File not found"));
}
