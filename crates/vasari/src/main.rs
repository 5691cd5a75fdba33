//! Vasari - batch generation for multi-turn dialogs.

use clap::Parser;
use tracing::{info, warn};
use vasari::cli::{Args, Settings, execute};
use vasari_core::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.debug, args.log_format)?;
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let metrics = init_metrics("vasari", 60)?;
    args.warn_unsupported();
    let settings = Settings::resolve(&args)?;

    let outcome = execute(&settings).await;
    metrics.shutdown();
    let summary = outcome?;

    if *summary.failed() > 0 {
        warn!(%summary, "Some dialogs failed; rerun on the output file to retry them");
    } else {
        info!(%summary, "All dialogs processed");
    }
    Ok(())
}
