use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;

use crate::pipeline::ProcessOutcome;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Please load an image before processing.")]
    NoImageLoaded,
    #[error("Processing is already running.")]
    Busy,
}

/// Which image the display area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Original,
    Annotated,
}

impl ViewMode {
    pub fn flipped(self) -> Self {
        match self {
            ViewMode::Original => ViewMode::Annotated,
            ViewMode::Annotated => ViewMode::Original,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub image: Arc<DynamicImage>,
}

#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub annotated: Arc<DynamicImage>,
    pub output_path: PathBuf,
}

/// What a background process run needs
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Load generation the request was issued for
    pub generation: u64,
    pub path: PathBuf,
    pub image: Arc<DynamicImage>,
}

/// Everything the window shows, updated only through the handlers below.
///
/// Each handler consumes the state and returns the next one.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    original: Option<LoadedImage>,
    processed: Option<ProcessedImage>,
    report: String,
    view: ViewMode,
    processing: bool,
    /// Bumped on every load and clear so late results can be discarded
    generation: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new image replaces everything derived from the previous one
    pub fn load(self, path: PathBuf, image: impl Into<Arc<DynamicImage>>) -> Self {
        Self {
            original: Some(LoadedImage {
                path,
                image: image.into(),
            }),
            processed: None,
            report: String::new(),
            view: ViewMode::Original,
            processing: false,
            generation: self.generation + 1,
        }
    }

    /// Mark a process run as started and hand out its inputs
    pub fn begin_process(mut self) -> (Self, Result<ProcessRequest, StateError>) {
        if self.processing {
            return (self, Err(StateError::Busy));
        }

        let request = match &self.original {
            Some(loaded) => ProcessRequest {
                generation: self.generation,
                path: loaded.path.clone(),
                image: loaded.image.clone(),
            },
            None => return (self, Err(StateError::NoImageLoaded)),
        };

        self.processing = true;
        (self, Ok(request))
    }

    /// Show the annotated result of a finished run.
    ///
    /// Results for an image that has since been replaced or cleared are
    /// dropped.
    pub fn finish_process(mut self, generation: u64, outcome: ProcessOutcome) -> Self {
        if generation != self.generation || self.original.is_none() {
            return self;
        }

        self.report = outcome.report.text();
        self.processed = Some(ProcessedImage {
            annotated: Arc::new(outcome.report.annotated),
            output_path: outcome.output_path,
        });
        self.view = ViewMode::Annotated;
        self.processing = false;
        self
    }

    /// A run failed; everything shown before it stays as it was
    pub fn fail_process(mut self, generation: u64) -> Self {
        if generation == self.generation {
            self.processing = false;
        }
        self
    }

    /// Switch between the original and the annotated image
    pub fn toggle(mut self) -> Self {
        if self.can_toggle() {
            self.view = self.view.flipped();
        }
        self
    }

    pub fn clear(self) -> Self {
        Self {
            generation: self.generation + 1,
            ..Self::default()
        }
    }

    pub fn can_toggle(&self) -> bool {
        self.processed.is_some()
    }

    pub fn can_process(&self) -> bool {
        !self.processing
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn report(&self) -> &str {
        &self.report
    }

    pub fn original(&self) -> Option<&LoadedImage> {
        self.original.as_ref()
    }

    pub fn processed(&self) -> Option<&ProcessedImage> {
        self.processed.as_ref()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.original.as_ref().map(|loaded| loaded.path.as_path())
    }

    /// Where the last annotated copy was written
    pub fn output_path(&self) -> Option<&Path> {
        self.processed
            .as_ref()
            .map(|processed| processed.output_path.as_path())
    }

    /// Image currently in the display area
    pub fn displayed_image(&self) -> Option<&Arc<DynamicImage>> {
        match (self.view, &self.processed) {
            (ViewMode::Annotated, Some(processed)) => Some(&processed.annotated),
            _ => self.original.as_ref().map(|loaded| &loaded.image),
        }
    }
}
