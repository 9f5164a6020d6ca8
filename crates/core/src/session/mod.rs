//! Upload -> processing -> result session handling.
//!
//! - [`state`]: the session data model
//! - [`narration`]: cosmetic, cancellable progress messages
//! - [`controller`]: the state machine that owns the session

mod controller;
mod narration;
mod state;

pub use controller::{EnhancementOutcome, SessionController, failure_message};
pub use narration::{NARRATION, NarrationStep};
pub use state::{
    COMPLETED_MESSAGE, ENHANCE_FAILED_MESSAGE, EnhancementResult, Phase, READ_FAILED_MESSAGE,
    SelectedFile, Session, Status, StatusStep, UPLOADING_MESSAGE,
};
