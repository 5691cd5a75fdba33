//! Wiring the pieces together for one run.

use crate::cli::{Settings, build_generator, select_template};
use tracing::{info, instrument};
use vasari_error::VasariResult;
use vasari_runner::{DialogStore, RunSummary, Runner};

/// Loads the input, builds the backend and processes every dialog.
///
/// # Errors
///
/// Fails on setup problems (unreadable input, unknown template, backend
/// construction) and if the final write of the output file fails.
/// Per-dialog generation failures are logged and counted, not returned.
#[instrument(skip_all, fields(input = %settings.input_path().display(), output = %settings.output_path().display()))]
pub async fn execute(settings: &Settings) -> VasariResult<RunSummary> {
    let mut dialogs = DialogStore::load(settings.input_path()).await?;
    let template = select_template(settings)?;
    let generator = build_generator(settings).await?;
    info!(
        provider = generator.provider_name(),
        config = ?settings.generation(),
        "Backend ready"
    );

    let runner = Runner::new(
        generator,
        template,
        settings.generation().clone(),
        DialogStore::new(settings.output_path()),
    )
    .with_role_policy(*settings.role_policy());

    runner.run(&mut dialogs).await
}
