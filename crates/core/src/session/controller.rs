//! The session state controller.
//!
//! [`SessionController`] is the only writer of the [`Session`]. State lives in
//! a `tokio::sync::watch` channel so the wizard and the CLI can observe every
//! transition. Work that outlives a call (preview encoding, narration timers,
//! the model request) is tagged with an epoch; anything finishing under an
//! outdated epoch is discarded instead of applied.

use super::narration::{NARRATION, NarrationTimers};
use super::state::{
    COMPLETED_MESSAGE, ENHANCE_FAILED_MESSAGE, EnhancementResult, Phase, READ_FAILED_MESSAGE,
    SelectedFile, Session, Status, StatusStep, UPLOADING_MESSAGE,
};
use crate::encoding::read_as_data_uri;
use crate::error::{AppError, Result};
use crate::gemini::Enhancer;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How a call to [`SessionController::start_enhancement`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnhancementOutcome {
    /// Preconditions did not hold; nothing changed and no request was sent.
    Skipped,
    /// The session moved to `Result`.
    Completed,
    /// The session went back to `Ready` with an error status.
    Failed,
    /// The session was reset while the request was in flight.
    Discarded,
}

/// Message shown to the user for a failed enhancement.
///
/// Every cause collapses to the same text; the cause itself only goes to
/// the log.
pub fn failure_message(err: &AppError) -> &'static str {
    match err {
        AppError::Transport(_)
        | AppError::EmptyResult
        | AppError::Encoding(_)
        | AppError::Config(_)
        | AppError::Ui(_)
        | AppError::Io(_)
        | AppError::Json(_) => ENHANCE_FAILED_MESSAGE,
    }
}

pub struct SessionController<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for SessionController<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<E> {
    state: watch::Sender<Session>,
    /// Only changed while holding the watch lock.
    epoch: AtomicU64,
    enhancer: E,
}

impl<E: Enhancer> SessionController<E> {
    pub fn new(enhancer: E) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: watch::Sender::new(Session::default()),
                epoch: AtomicU64::new(0),
                enhancer,
            }),
        }
    }

    /// Current session state.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified after every transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn enhancer(&self) -> &E {
        &self.inner.enhancer
    }

    /// Stores the selection and starts encoding its preview in the background.
    ///
    /// Ignored outside `Ready`. The returned handle completes once the
    /// preview is in place (or the read has failed); awaiting it is optional.
    /// Must be called from within a tokio runtime.
    pub fn select_file(&self, file: SelectedFile) -> JoinHandle<()> {
        let mut accepted = None;
        self.inner.state.send_if_modified(|session| {
            if session.phase != Phase::Ready {
                return false;
            }
            accepted = Some(self.inner.bump_epoch());
            session.selected_input = Some(file.clone());
            session.preview_encoding = None;
            true
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let Some(epoch) = accepted else {
                debug!(path = %file.path.display(), "Ignoring file selection outside the Ready phase");
                return;
            };
            debug!(path = %file.path.display(), mime_type = %file.mime_type, "Encoding preview");
            let encoded = read_as_data_uri(&file.path, &file.mime_type).await;
            inner.finish_encoding(epoch, encoded);
        })
    }

    /// Drops the current selection and its preview. Only allowed in `Ready`.
    ///
    /// Returns whether anything changed.
    pub fn clear_selection(&self) -> bool {
        self.inner.state.send_if_modified(|session| {
            if session.phase != Phase::Ready {
                return false;
            }
            if session.selected_input.is_none() && session.preview_encoding.is_none() {
                return false;
            }
            // Invalidates an encoding that is still running
            self.inner.bump_epoch();
            session.selected_input = None;
            session.preview_encoding = None;
            true
        })
    }

    /// Runs one enhancement of the selected portrait.
    ///
    /// A no-op unless the session is `Ready` with both a selection and its
    /// preview, which also rules out two enhancements in flight at once.
    pub async fn start_enhancement(&self) -> EnhancementOutcome {
        let mut request = None;
        self.inner.state.send_if_modified(|session| {
            if session.phase != Phase::Ready {
                return false;
            }
            let (Some(input), Some(preview)) = (&session.selected_input, &session.preview_encoding)
            else {
                return false;
            };
            request = Some((
                self.inner.bump_epoch(),
                preview.clone(),
                input.mime_type.clone(),
            ));
            session.phase = Phase::Processing;
            session.status = Status::new(StatusStep::Uploading, UPLOADING_MESSAGE);
            true
        });

        let Some((epoch, preview, mime_type)) = request else {
            debug!("Enhancement preconditions not met; ignoring");
            return EnhancementOutcome::Skipped;
        };
        info!(epoch, mime_type = %mime_type, "Starting enhancement");

        let narration = NarrationTimers::schedule(&NARRATION, {
            let inner = Arc::clone(&self.inner);
            move |message| inner.narrate(epoch, message)
        });
        let outcome = self.inner.enhancer.enhance(&preview, &mime_type).await;
        narration.cancel();

        self.inner.finish_enhancement(epoch, preview, outcome)
    }

    /// Returns the session to its initial state from any phase.
    ///
    /// An enhancement still in flight is not aborted; its result is
    /// discarded when it arrives.
    pub fn reset(&self) {
        self.inner.state.send_modify(|session| {
            self.inner.bump_epoch();
            *session = Session::default();
        });
        debug!("Session reset");
    }
}

impl<E> Inner<E> {
    fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn finish_encoding(&self, epoch: u64, encoded: Result<String>) {
        if let Err(e) = &encoded {
            warn!(error = %e, "Failed to encode selected file");
        }

        let applied = self.state.send_if_modified(|session| {
            if !self.is_current(epoch) || session.phase != Phase::Ready {
                return false;
            }
            match encoded {
                Ok(uri) => session.preview_encoding = Some(uri),
                Err(_) => {
                    session.selected_input = None;
                    session.preview_encoding = None;
                    session.status = Status::error(READ_FAILED_MESSAGE);
                }
            }
            true
        });

        if !applied {
            debug!(epoch, "Discarding stale preview encoding");
        }
    }

    fn narrate(&self, epoch: u64, message: &'static str) {
        self.state.send_if_modified(|session| {
            if !self.is_current(epoch) || session.phase != Phase::Processing {
                return false;
            }
            session.status = Status::new(StatusStep::Enhancing, message);
            true
        });
    }

    fn finish_enhancement(
        &self,
        epoch: u64,
        original: String,
        outcome: Result<String>,
    ) -> EnhancementOutcome {
        if let Err(e) = &outcome {
            error!(error = %e, "Enhancement failed");
        }

        let mut result = EnhancementOutcome::Discarded;
        self.state.send_if_modified(|session| {
            if !self.is_current(epoch) || session.phase != Phase::Processing {
                return false;
            }
            match outcome {
                Ok(enhanced) => {
                    session.result = Some(EnhancementResult {
                        enhanced_encoding: enhanced,
                        original_encoding: original,
                    });
                    session.phase = Phase::Result;
                    session.status = Status::new(StatusStep::Completed, COMPLETED_MESSAGE);
                    result = EnhancementOutcome::Completed;
                }
                Err(e) => {
                    session.phase = Phase::Ready;
                    session.status = Status::error(failure_message(&e));
                    result = EnhancementOutcome::Failed;
                }
            }
            true
        });

        match result {
            EnhancementOutcome::Discarded => debug!(epoch, "Session moved on; discarding enhancement result"),
            outcome => info!(epoch, ?outcome, "Enhancement finished"),
        }
        result
    }
}
