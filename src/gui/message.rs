use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;

use crate::pipeline::ProcessOutcome;

/// One variant per user action, plus the results of background work
#[derive(Debug, Clone)]
pub enum Message {
    LoadImage,
    ImagePicked(Option<PathBuf>),
    ImageDecoded(PathBuf, Result<Arc<DynamicImage>, String>),
    Process,
    Processed(u64, Result<ProcessOutcome, String>),
    Clear,
    Toggle,
    Exit,
    DialogClosed,
}
