//! The sequential generation loop.

use crate::{DialogState, DialogStore, RunMetrics, RunSummary};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use vasari_core::{Dialog, GenerationConfig};
use vasari_error::VasariResult;
use vasari_models::TextGenerator;
use vasari_template::{ConversationTemplate, RolePolicy, dialog_to_prompt};

/// Generates a response for every pending dialog, one at a time.
///
/// Each dialog is rendered from a fresh copy of the base template, so no
/// turns carry over between dialogs. Failures are logged with the prompt
/// and the loop moves on; nothing is retried.
#[derive(Debug)]
pub struct Runner<G> {
    generator: G,
    template: ConversationTemplate,
    policy: RolePolicy,
    config: GenerationConfig,
    store: DialogStore,
    metrics: RunMetrics,
}

impl<G: TextGenerator> Runner<G> {
    /// Creates a runner with strict role alternation.
    pub fn new(
        generator: G,
        template: ConversationTemplate,
        config: GenerationConfig,
        store: DialogStore,
    ) -> Self {
        Self {
            generator,
            template,
            policy: RolePolicy::default(),
            config,
            store,
            metrics: RunMetrics::new(),
        }
    }

    /// Sets how input turns are mapped onto template roles.
    pub fn with_role_policy(mut self, policy: RolePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The backend in use.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Processes every dialog in order and writes the output file.
    ///
    /// The output is rewritten after each successful generation and once
    /// more after the loop. A failed intermediate write is logged; only the
    /// final write is fatal.
    ///
    /// # Errors
    ///
    /// Returns an error only if the final write fails.
    #[instrument(
        skip_all,
        fields(
            provider = self.generator.provider_name(),
            model = self.generator.model_name(),
            total = dialogs.len()
        )
    )]
    pub async fn run(&self, dialogs: &mut [Dialog]) -> VasariResult<RunSummary> {
        let total = dialogs.len();
        let mut summary = RunSummary::new(total);
        info!(template = %self.template.name(), policy = %self.policy, "Starting run");

        for index in 0..total {
            let state = self.process(index, &mut dialogs[index]).await;
            summary.record(state);

            if state == DialogState::Done {
                if let Err(e) = self.store.save(dialogs).await {
                    warn!(index, error = %e, "Failed to write progress, continuing");
                }
            }
            info!(index, total, %state, "Dialog processed");
        }

        self.store.save(dialogs).await?;
        info!(%summary, "Run complete");
        Ok(summary)
    }

    async fn process(&self, index: usize, dialog: &mut Dialog) -> DialogState {
        if dialog.is_done() {
            debug!(index, "Already generated, skipping");
            self.metrics.record_skipped();
            return DialogState::Skipped;
        }

        let prompt = dialog_to_prompt(self.template.clone(), dialog.messages(), self.policy);
        debug!(index, state = %DialogState::Generating, prompt_chars = prompt.len());

        let start = Instant::now();
        match self.generator.generate(&prompt, &self.config).await {
            Ok(text) => {
                let elapsed = start.elapsed();
                debug!(
                    index,
                    chars = text.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Generation stored"
                );
                dialog.set_generation(text);
                self.metrics
                    .record_generated(self.generator.provider_name(), elapsed.as_secs_f64());
                DialogState::Done
            }
            Err(e) => {
                let prompt_too_long = e
                    .as_generation()
                    .is_some_and(|g| g.is_prompt_too_long());
                error!(index, error = %e, prompt = %prompt, "Generation failed");
                self.metrics
                    .record_failed(self.generator.provider_name(), prompt_too_long);
                DialogState::Failed
            }
        }
    }
}
