//! Sequential batch generation over a dialog file.
//!
//! [`DialogStore`] reads the input array and rewrites the output file;
//! [`Runner`] walks the dialogs one at a time, renders each through the
//! conversation template, asks a [`TextGenerator`](vasari_models::TextGenerator)
//! for a response and persists after every success.

mod metrics;
mod runner;
mod state;
mod store;

pub use metrics::RunMetrics;
pub use runner::Runner;
pub use state::{DialogState, RunSummary};
pub use store::DialogStore;
