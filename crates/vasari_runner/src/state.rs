//! Per-dialog outcomes and the run tally.

use derive_getters::Getters;

/// Where a dialog is in its lifecycle during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DialogState {
    /// Not yet attempted
    Pending,
    /// Prompt sent to the generator
    Generating,
    /// Generation stored on the dialog
    Done,
    /// Generation failed; dialog left unchanged
    Failed,
    /// Already had a generation on input
    Skipped,
}

/// Counts of dialog outcomes for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct RunSummary {
    /// Dialogs in the input
    total: usize,
    /// Dialogs that already had a generation
    skipped: usize,
    /// Dialogs that gained a generation
    generated: usize,
    /// Dialogs whose generation failed
    failed: usize,
}

impl RunSummary {
    /// Starts an empty tally for `total` dialogs.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Counts a dialog's final state.
    pub fn record(&mut self, state: DialogState) {
        match state {
            DialogState::Done => self.generated += 1,
            DialogState::Failed => self.failed += 1,
            DialogState::Skipped => self.skipped += 1,
            DialogState::Pending | DialogState::Generating => {}
        }
    }

    /// Dialogs that carry a generation after the run.
    pub fn completed(&self) -> usize {
        self.skipped + self.generated
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} dialogs: {} generated, {} skipped, {} failed",
            self.total, self.generated, self.skipped, self.failed
        )
    }
}
