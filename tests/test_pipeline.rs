//! Integration tests for the process action.
//!
//! Tests cover:
//! - The `plate.jpg` -> `plate_result.jpg` scenario
//! - The temporary working file lifecycle
//! - Detector failures propagating to the caller
//! - Running the pipeline on a blocking worker

mod common;

use std::sync::Arc;

use common::*;
use steelscan::{DetectorConfig, YoloDetector};

#[test]
fn test_process_plate_writes_result_beside_input() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = create_test_image(dir.path(), "plate.jpg", 320, 240);
    let img = image::open(&source)?;

    let detector = Arc::new(ScriptedDetector::new(vec![
        det(12.5, 20.0, 80.25, 90.75, 0.87, 0),
        det(150.0, 100.0, 210.0, 180.0, 0.5312, 3),
    ]));
    let pipeline = Pipeline::new(detector.clone());

    let outcome = pipeline.run(&source, &img)?;

    let expected = dir.path().join("plate_result.jpg");
    assert_eq!(outcome.output_path, expected);
    assert!(expected.exists());

    let saved = image::open(&expected)?;
    assert_eq!((saved.width(), saved.height()), (320, 240));

    assert_eq!(outcome.report.lines.len(), 2);
    assert!(outcome.report.lines[0].contains("(12.50, 20.00), (80.25, 90.75)"));
    assert!(outcome.report.lines[0].contains("Класс дефекта: 1"));
    assert!(outcome.report.lines[0].ends_with("Вероятность: 0.87"));
    assert!(outcome.report.lines[1].contains("Класс дефекта: 4"));
    assert!(outcome.report.lines[1].ends_with("Вероятность: 0.53"));

    Ok(())
}

#[test]
fn test_working_file_exists_only_during_detection() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = create_test_image(dir.path(), "sheet.jpg", 64, 64);
    let img = image::open(&source)?;

    let detector = Arc::new(ScriptedDetector::new(Vec::new()));
    Pipeline::new(detector.clone()).run(&source, &img)?;

    let calls = detector.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].existed, "working file should exist while detecting");
    assert!(!calls[0].path.exists(), "working file should be removed afterwards");
    assert_ne!(calls[0].path, source);

    Ok(())
}

#[test]
fn test_zero_detections_still_saves_result() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = create_test_image(dir.path(), "clean.jpg", 48, 48);
    let img = image::open(&source)?;

    let outcome = Pipeline::new(Arc::new(ScriptedDetector::new(Vec::new()))).run(&source, &img)?;

    assert!(outcome.report.is_empty());
    assert_eq!(outcome.report.annotated.as_bytes(), img.as_bytes());
    assert!(dir.path().join("clean_result.jpg").exists());

    Ok(())
}

#[test]
fn test_detector_failure_propagates() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = create_test_image(dir.path(), "plate.jpg", 32, 32);
    let img = image::open(&source)?;

    let result = Pipeline::new(Arc::new(FailingDetector)).run(&source, &img);

    assert!(matches!(
        result,
        Err(ProcessError::Detect(DetectError::MissingWeights(_)))
    ));
    assert!(!dir.path().join("plate_result.jpg").exists());

    Ok(())
}

#[test]
fn test_missing_weights_are_reported() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = create_test_image(dir.path(), "plate.jpg", 32, 32);
    let img = image::open(&source)?;

    let config = DetectorConfig::default().with_model_path(dir.path().join("best_mod.rten"));
    let result = Pipeline::new(Arc::new(YoloDetector::new(config))).run(&source, &img);

    match result {
        Err(ProcessError::Detect(DetectError::MissingWeights(path))) => {
            assert_eq!(path, dir.path().join("best_mod.rten"));
        }
        other => panic!("expected missing weights, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_process_on_blocking_worker() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = create_test_image(dir.path(), "plate.jpg", 100, 80);
    let img = image::open(&source)?;

    let pipeline = Pipeline::new(Arc::new(ScriptedDetector::new(vec![det(
        1.0, 2.0, 30.0, 40.0, 0.66, 1,
    )])));

    let task_source = source.clone();
    let outcome =
        tokio::task::spawn_blocking(move || pipeline.run(&task_source, &img)).await??;

    assert_eq!(outcome.report.lines.len(), 1);
    assert!(outcome.report.lines[0].contains("Класс дефекта: 2"));
    assert_eq!(outcome.output_path, dir.path().join("plate_result.jpg"));

    Ok(())
}
