//! CardioPredict: cardiovascular risk assessment
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiopredict::adapters::sanitize::SanitizingMakeWriter;
use cardiopredict::adapters::HttpPredictor;
use cardiopredict::config::Settings;
use cardiopredict::tui::App;

fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    // Writing logs to the terminal would corrupt the TUI (alternate screen).
    let interactive = std::io::stdout().is_terminal();

    let (writer, _guard) = if settings.log_mode.use_file(interactive) {
        if let Some(parent) = settings.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!(
        api_url = %settings.api_url,
        timeout_secs = settings.request_timeout.as_secs(),
        "Starting CardioPredict..."
    );

    let predictor = HttpPredictor::new(&settings.api_url, settings.request_timeout)?;

    let mut app = App::new(Arc::new(predictor));
    app.run()?;

    tracing::info!("CardioPredict shutdown complete.");
    Ok(())
}
