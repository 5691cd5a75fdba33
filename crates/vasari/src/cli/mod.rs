//! Command-line front end: argument parsing, configuration layering and
//! backend construction.

mod args;
mod backend;
mod run;
mod settings;

pub use args::Args;
pub use backend::{Backend, TokenizerSource, build_generator, select_template, tokenizer_source};
pub use run::execute;
pub use settings::{
    DEFAULT_MODEL_PATH, DEFAULT_SERVER_URL, FileConfig, GenerationSection, ModelSection, Settings,
};
