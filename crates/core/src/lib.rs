//! Alpha Portrait Core Library
//!
//! This library provides the core of the alpha-portrait tool: a portrait
//! photo is sent to a Gemini image model with a fixed enhancement prompt and
//! the re-rendered result is shown next to the original.
//!
//! # Overview
//!
//! - **Session**: the upload → processing → result state machine via [`session`]
//! - **Enhancement Client**: the single `generateContent` call via [`gemini`]
//! - **Encoding**: data-URI helpers via [`encoding`]
//! - **User Interface**: the desktop wizard via [`ui`]
//!
//! # Quick Start
//!
//! ```ignore
//! use portrait_core::{AlphaPortrait, SelectedFile};
//!
//! let app = AlphaPortrait::new()?;
//! let controller = app.controller()?;
//!
//! // The handle resolves once the preview is encoded; a read failure leaves
//! // no preview behind and is reported through the session status.
//! controller.select_file(SelectedFile::from_path("me.jpg")).await?;
//! if controller.snapshot().preview_encoding.is_some() {
//!     controller.start_enhancement().await;
//! }
//! println!("{:?}", controller.snapshot().phase);
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Configuration loading and management
//! - [`encoding`]: Data URI conversion
//! - [`error`]: Error types and result aliases
//! - [`gemini`]: Enhancement client for the Gemini image model
//! - [`session`]: Session state controller
//! - [`ui`]: User interface components

pub mod config;
pub mod encoding;
pub mod error;
pub mod gemini;
pub mod session;
pub mod ui;

// Re-export primary types for convenience
pub use config::Config;
pub use error::{AppError, Result};
pub use gemini::{Enhancer, GeminiClient};
pub use session::{EnhancementOutcome, Phase, SelectedFile, Session, SessionController};

/// Main entry point for the alpha-portrait application.
///
/// Holds the configuration and hands out controllers wired to the Gemini
/// client, for both the headless and the interactive workflow.
pub struct AlphaPortrait {
    config: Config,
}

impl AlphaPortrait {
    /// Creates an instance configured from environment variables
    /// (including `.env` files).
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self { config })
    }

    /// Creates an instance with custom configuration, e.g. a different model
    /// or an injected API key.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Builds a fresh session controller backed by the Gemini client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn controller(&self) -> Result<SessionController<GeminiClient>> {
        let client = GeminiClient::new(&self.config)?;
        Ok(SessionController::new(client))
    }

    /// Launches the desktop wizard and blocks until its window closes.
    ///
    /// Background work runs on `runtime`.
    pub fn run_interactive(&self, runtime: tokio::runtime::Handle) -> Result<()> {
        ui::run_wizard(self.config.clone(), runtime)
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Loads `.env` files if present. Call once at application startup.
pub fn init() {
    let _ = dotenvy::dotenv();
}
