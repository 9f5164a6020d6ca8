use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use portrait_core::{
    AlphaPortrait, EnhancementOutcome, Phase, SelectedFile,
    config::Config,
    encoding::{DEFAULT_EXPORT_FILENAME, save_data_uri},
    init,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Portrait to enhance. Opens the desktop wizard when omitted
    image: Option<PathBuf>,

    /// Where to write the enhanced image
    #[arg(short, long, default_value = DEFAULT_EXPORT_FILENAME)]
    output: PathBuf,

    /// Override the model defined in .env
    #[arg(short, long)]
    model: Option<String>,

    /// Declared MIME type of the input (guessed from the extension by default)
    #[arg(long)]
    mime: Option<String>,
}

fn main() -> Result<()> {
    // Setup
    init();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portrait_core=info,alpha_portrait=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    let args = Args::parse();

    // Load config and override model if specified via CLI
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(m) = args.model.clone() {
        config = config
            .to_builder()
            .with_model(m)
            .build()
            .context("Invalid --model")?;
    }
    let app = AlphaPortrait::with_config(config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match args.image.clone() {
        Some(image) => runtime.block_on(enhance_file(&app, image, &args)),
        None => app
            .run_interactive(runtime.handle().clone())
            .context("Failed to run the wizard"),
    }
}

async fn enhance_file(app: &AlphaPortrait, image: PathBuf, args: &Args) -> Result<()> {
    let controller = app.controller().context("Failed to create enhancement client")?;

    let file = match &args.mime {
        Some(mime) => SelectedFile::new(&image, mime.as_str()),
        None => SelectedFile::from_path(&image),
    };
    controller
        .select_file(file)
        .await
        .context("Preview encoding task failed")?;

    let session = controller.snapshot();
    if session.preview_encoding.is_none() {
        bail!("{}", session.status.message);
    }

    // Mirror the session's status narration on a spinner
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Rendering with {}...", app.config().model_name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut updates = controller.subscribe();
    let narrator = {
        let spinner = spinner.clone();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let session = updates.borrow_and_update().clone();
                if session.phase != Phase::Processing {
                    break;
                }
                spinner.set_message(session.status.message);
            }
        })
    };

    let outcome = controller.start_enhancement().await;
    narrator.abort();
    spinner.finish_and_clear();

    let session = controller.snapshot();
    match (outcome, session.result) {
        (EnhancementOutcome::Completed, Some(result)) => {
            save_data_uri(&result.enhanced_encoding, &args.output)
                .with_context(|| format!("Failed to write {}", args.output.display()))?;
            info!(output = %args.output.display(), "Enhancement saved");
            println!("Enhanced portrait written to {}", args.output.display());
            Ok(())
        }
        _ => bail!("{}", session.status.message),
    }
}
