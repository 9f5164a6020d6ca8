//! Session data model.
//!
//! The wizard follows a three-phase state machine:
//! `Ready` -> `Processing` -> `Result`, with `Processing` -> `Ready` on
//! failure and any phase -> `Ready` on reset.

use crate::encoding::mime_type_for_path;
use std::path::{Path, PathBuf};

pub const UPLOADING_MESSAGE: &str = "Analyzing portrait geometry...";
pub const COMPLETED_MESSAGE: &str = "Enhancement complete.";
pub const ENHANCE_FAILED_MESSAGE: &str = "Failed to enhance image. Please try a different photo.";
pub const READ_FAILED_MESSAGE: &str = "Failed to read the selected photo. Please try a different file.";

/// Top-level wizard step. Authoritative for what the UI shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Ready,
    Processing,
    Result,
}

/// Display-only progress marker; never gates a transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusStep {
    #[default]
    Idle,
    Uploading,
    Enhancing,
    Completed,
    Error,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Status {
    pub step: StatusStep,
    pub message: String,
}

impl Status {
    pub fn new(step: StatusStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusStep::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.step == StatusStep::Error
    }
}

/// A file the user picked, with the MIME type it declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub mime_type: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Declares the MIME type from the file extension. No whitelist is
    /// applied; the model decides what it accepts.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::new(path, mime_type_for_path(path))
    }
}

/// Both images of a successful run, as data URIs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnhancementResult {
    pub enhanced_encoding: String,
    pub original_encoding: String,
}

/// Everything the wizard displays. `Session::default()` is the initial shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub phase: Phase,
    pub status: Status,
    pub selected_input: Option<SelectedFile>,
    pub preview_encoding: Option<String>,
    /// Only ever set while `phase == Phase::Result`.
    pub result: Option<EnhancementResult>,
}

impl Session {
    /// Whether "Render Enhancement" would do anything right now.
    pub fn can_start(&self) -> bool {
        self.phase == Phase::Ready && self.selected_input.is_some() && self.preview_encoding.is_some()
    }
}
