//! Vasari: batch generation of model responses for multi-turn dialogs.
//!
//! Reads a JSON array of dialogs, renders each through a conversation
//! template, asks a generation backend for the next turn and writes the
//! array back with a `generation` field on every dialog that succeeded.
//!
//! The work is split across crates:
//!
//! - `vasari_error`: error types
//! - `vasari_core`: dialog records, sampling config, logging setup
//! - `vasari_template`: conversation templates and prompt rendering
//! - `vasari_models`: generation backends and tokenizers
//! - `vasari_runner`: the batch loop and file persistence
//!
//! This crate re-exports their public items and hosts the command-line
//! front end.

pub mod cli;

pub use vasari_core::*;
pub use vasari_error::*;
pub use vasari_models::*;
pub use vasari_runner::*;
pub use vasari_template::*;
