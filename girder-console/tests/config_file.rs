//! Console runs driven by a dashboard configuration file.

use std::io::Write;
use std::time::Duration;

use girder_console::{ConsoleConfig, ConsoleError, ConsoleRunner, RunOutcome, SelectionMode};
use girder_core::{GirderError, SegmentId};
use tempfile::NamedTempFile;

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write config");
    file
}

fn console(file: &NamedTempFile, thickness: Option<f32>) -> ConsoleConfig {
    ConsoleConfig {
        seed: Some(11),
        selection: SelectionMode::Explicit(vec![SegmentId::new(2), SegmentId::new(5)]),
        thickness,
        config_path: Some(file.path().to_path_buf()),
        tick_ms: Some(50),
    }
}

#[tokio::test(start_paused = true)]
async fn test_short_run_from_config_file() {
    let file = config_file(r#"{ "glue_duration_ms": 1000, "initial_thickness": 3.0 }"#);
    let runner = ConsoleRunner::new(&console(&file, None)).expect("runner");
    assert!((runner.session().dashboard().thickness() - 3.0).abs() < f32::EPSILON);

    let summary = runner
        .run_until(std::future::pending())
        .await
        .expect("run");

    match summary.outcome {
        RunOutcome::Completed(done) => {
            assert_eq!(done.segment_count, 2);
            assert!((done.thickness - 3.0).abs() < f32::EPSILON);
        }
        RunOutcome::Interrupted => panic!("run should complete"),
    }
    assert_eq!(
        summary.alerts[0].message,
        "Glue application completed: 2 segments, 3mm thickness"
    );
}

#[tokio::test]
async fn test_thickness_override_is_validated() {
    let file = config_file("{}");
    let runner = ConsoleRunner::new(&console(&file, Some(-1.0))).expect("runner");
    let result = runner.run_until(std::future::pending()).await;
    assert!(matches!(
        result,
        Err(ConsoleError::Rejected(girder_core::GlueRejection::InvalidThickness))
    ));
}

#[test]
fn test_malformed_config_file() {
    let file = config_file("{ not json");
    let result = ConsoleRunner::new(&console(&file, None));
    assert!(matches!(
        result,
        Err(ConsoleError::Config(GirderError::Serialization(_)))
    ));
}

#[test]
fn test_invalid_ranges_are_refused() {
    let file = config_file(r#"{ "min_thickness": 5.0, "max_thickness": 1.0 }"#);
    let result = ConsoleRunner::new(&console(&file, None));
    assert!(matches!(
        result,
        Err(ConsoleError::Config(GirderError::InvalidConfig(_)))
    ));
}

#[test]
fn test_tick_defaults_to_configured_progress_interval() {
    let file = config_file(r#"{ "progress_interval_ms": 500 }"#);
    let config = ConsoleConfig {
        tick_ms: None,
        ..console(&file, None)
    };
    let runner = ConsoleRunner::new(&config).expect("runner");
    assert_eq!(runner.tick_interval(), Duration::from_millis(500));

    let runner = ConsoleRunner::new(&console(&file, None)).expect("runner");
    assert_eq!(runner.tick_interval(), Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_run_ticks_on_configured_interval() {
    let file = config_file(r#"{ "glue_duration_ms": 1000, "progress_interval_ms": 250 }"#);
    let config = ConsoleConfig {
        tick_ms: None,
        ..console(&file, None)
    };
    let runner = ConsoleRunner::new(&config).expect("runner");
    let started = tokio::time::Instant::now();
    let summary = runner
        .run_until(std::future::pending())
        .await
        .expect("run");

    assert!(matches!(summary.outcome, RunOutcome::Completed(_)));
    // Completion lands on the first 250ms tick at or past 1000ms.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(1250), "{elapsed:?}");
}
