//! Integration tests for the window's application state.
//!
//! Tests cover:
//! - Process requests with and without a loaded image
//! - Toggling between the original and annotated image
//! - Clearing after a process run
//! - Late results for replaced images

#![cfg(feature = "gui")]

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::*;
use steelscan::gui::{AppState, StateError, ViewMode};
use steelscan::{ProcessOutcome, report::DetectionReport};

fn outcome_for(img: &image::DynamicImage, lines: usize) -> ProcessOutcome {
    let items = (0..lines)
        .map(|i| det(i as f32, i as f32, i as f32 + 5.0, i as f32 + 5.0, 0.8, 0))
        .collect();
    ProcessOutcome {
        report: build_report(img, &Detections::new(items)),
        output_path: PathBuf::from("plate_result.jpg"),
    }
}

fn loaded_state() -> (AppState, image::DynamicImage) {
    let img = gradient_image(32, 32);
    let state = AppState::new().load(PathBuf::from("plate.jpg"), img.clone());
    (state, img)
}

#[test]
fn test_process_without_image_is_rejected() {
    let (state, request) = AppState::new().begin_process();

    assert_eq!(request.unwrap_err(), StateError::NoImageLoaded);
    assert!(!state.is_processing());
    assert!(state.can_process());
}

#[test]
fn test_load_shows_original_and_disables_toggle() {
    let (state, img) = loaded_state();

    assert_eq!(state.view(), ViewMode::Original);
    assert!(!state.can_toggle());
    assert_eq!(state.report(), "");
    assert_eq!(state.displayed_image().unwrap().as_bytes(), img.as_bytes());
}

#[test]
fn test_finished_process_shows_annotated_image() {
    let (state, img) = loaded_state();
    let (state, request) = state.begin_process();
    let request = request.unwrap();

    assert!(state.is_processing());
    assert!(!state.can_process());
    assert_eq!(request.path, PathBuf::from("plate.jpg"));

    let outcome = outcome_for(&img, 2);
    let state = state.finish_process(request.generation, outcome);

    assert!(!state.is_processing());
    assert!(state.can_toggle());
    assert_eq!(state.view(), ViewMode::Annotated);
    assert_eq!(state.report().lines().count(), 2);
    assert!(Arc::ptr_eq(
        state.displayed_image().unwrap(),
        &state.processed().unwrap().annotated
    ));
}

#[test]
fn test_toggle_twice_returns_to_start() {
    let (state, img) = loaded_state();
    let (state, request) = state.begin_process();
    let state = state.finish_process(request.unwrap().generation, outcome_for(&img, 1));

    let once = state.clone().toggle();
    assert_eq!(once.view(), ViewMode::Original);
    assert!(Arc::ptr_eq(
        once.displayed_image().unwrap(),
        &once.original().unwrap().image
    ));

    let twice = once.toggle();
    assert_eq!(twice.view(), state.view());
    assert!(Arc::ptr_eq(
        twice.displayed_image().unwrap(),
        state.displayed_image().unwrap()
    ));
}

#[test]
fn test_toggle_without_result_is_a_no_op() {
    let (state, _) = loaded_state();
    let state = state.toggle();

    assert_eq!(state.view(), ViewMode::Original);
}

#[test]
fn test_clear_after_process_resets_report_and_toggle() {
    let (state, img) = loaded_state();
    let (state, request) = state.begin_process();
    let state = state.finish_process(request.unwrap().generation, outcome_for(&img, 3));
    assert!(!state.report().is_empty());

    let state = state.clear();

    assert_eq!(state.report(), "");
    assert!(!state.can_toggle());
    assert!(state.displayed_image().is_none());
    assert!(state.original().is_none());
}

#[test]
fn test_saved_path_follows_the_processed_result() {
    let (state, img) = loaded_state();
    assert!(state.output_path().is_none());

    let (state, request) = state.begin_process();
    let state = state.finish_process(request.unwrap().generation, outcome_for(&img, 1));
    assert_eq!(
        state.output_path(),
        Some(std::path::Path::new("plate_result.jpg"))
    );

    let state = state.load(PathBuf::from("other.jpg"), img.clone());
    assert!(state.output_path().is_none());
}

#[test]
fn test_second_process_while_running_is_busy() {
    let (state, _) = loaded_state();
    let (state, first) = state.begin_process();
    assert!(first.is_ok());

    let (state, second) = state.begin_process();
    assert_eq!(second.unwrap_err(), StateError::Busy);
    assert!(state.is_processing());
}

#[test]
fn test_result_for_replaced_image_is_dropped() {
    let (state, img) = loaded_state();
    let (state, request) = state.begin_process();
    let stale = request.unwrap().generation;

    let state = state.load(PathBuf::from("other.jpg"), gradient_image(16, 16));
    let state = state.finish_process(stale, outcome_for(&img, 1));

    assert!(state.processed().is_none());
    assert_eq!(state.report(), "");
    assert_eq!(state.view(), ViewMode::Original);
}

#[test]
fn test_result_after_clear_is_dropped() {
    let (state, img) = loaded_state();
    let (state, request) = state.begin_process();
    let generation = request.unwrap().generation;

    let state = state.clear().finish_process(generation, outcome_for(&img, 1));

    assert!(state.processed().is_none());
    assert!(!state.can_toggle());
}

#[test]
fn test_failed_process_keeps_previous_result() {
    let (state, img) = loaded_state();
    let (state, request) = state.begin_process();
    let state = state.finish_process(request.unwrap().generation, outcome_for(&img, 1));
    let report = state.report().to_string();

    let (state, request) = state.begin_process();
    let state = state.fail_process(request.unwrap().generation);

    assert!(!state.is_processing());
    assert!(state.can_toggle());
    assert_eq!(state.report(), report);
}

#[test]
fn test_report_text_matches_builder() {
    let img = gradient_image(32, 32);
    let report: DetectionReport = build_report(
        &img,
        &Detections::new(vec![det(1.0, 2.0, 3.0, 4.0, 0.87, 9)]),
    );

    assert_eq!(
        report.text(),
        "Координаты: (1.00, 2.00), (3.00, 4.00) // Класс дефекта: Unknown // Вероятность: 0.87\n"
    );
}
