//! Desktop front-end for alpha-portrait.
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`wizard`]: the `eframe::App` rendering the upload, processing and result screens
//! - [`textures`]: data URI to texture conversion with per-slot caching
//! - [`export`]: saving or copying the enhanced image
//!
//! All state lives in the [`SessionController`]; the wizard only renders
//! snapshots and forwards button presses.
//!
//! # Usage
//!
//! ```ignore
//! use portrait_core::{ui, Config};
//!
//! let runtime = tokio::runtime::Runtime::new()?;
//! ui::run_wizard(Config::load()?, runtime.handle().clone())?;
//! ```

mod export;
mod textures;
mod wizard;

pub use export::{copy_to_clipboard, export_to_file};
pub use wizard::PortraitWizard;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::gemini::GeminiClient;
use crate::session::SessionController;
use eframe::egui;
use tokio::runtime::Handle;

/// Opens the wizard window and blocks until it is closed.
///
/// Background work is spawned onto `runtime`, which must outlive the call.
pub fn run_wizard(config: Config, runtime: Handle) -> Result<()> {
    let client = GeminiClient::new(&config)?;
    let controller = SessionController::new(client);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Alpha Portrait")
            .with_inner_size([1100.0, 780.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Alpha Portrait",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(PortraitWizard::new(controller, runtime, &config)) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))?;

    Ok(())
}
