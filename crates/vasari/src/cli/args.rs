//! Command-line arguments.

use crate::cli::Backend;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use vasari_core::LogFormat;
use vasari_models::DeviceKind;

/// Batch-generate responses for a JSON file of dialogs.
///
/// Sampling flags left unset fall back to the `--config` file and then to
/// built-in defaults.
#[derive(Parser, Debug, Clone)]
#[command(name = "vasari")]
#[command(version)]
pub struct Args {
    /// Local model directory or Hugging Face hub id
    #[arg(long = "model-path", alias = "model_path")]
    pub model_path: Option<String>,

    /// Hub revision (branch, tag or commit)
    #[arg(long)]
    pub revision: Option<String>,

    /// Device for in-process inference (cpu, cuda, metal)
    #[arg(long)]
    pub device: Option<DeviceKind>,

    /// Number of GPUs (only one is used)
    #[arg(long = "num-gpus", default_value_t = 1)]
    pub num_gpus: usize,

    /// Per-GPU memory cap, e.g. "13GiB" (not supported)
    #[arg(long = "max-gpu-memory")]
    pub max_gpu_memory: Option<String>,

    /// Load weights in 8-bit (not supported)
    #[arg(long = "load-8bit")]
    pub load_8bit: bool,

    /// Offload weights that do not fit on the GPU to CPU (not supported)
    #[arg(long = "cpu-offloading")]
    pub cpu_offloading: bool,

    /// Sampling temperature [default: 0.7]
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Repetition penalty [default: 1.0, or 1.2 for t5 models]
    #[arg(long = "repetition_penalty", alias = "repetition-penalty")]
    pub repetition_penalty: Option<f32>,

    /// Maximum new tokens per response [default: 512]
    #[arg(long = "max-new-tokens", alias = "max_new_tokens")]
    pub max_new_tokens: Option<usize>,

    /// Nucleus sampling threshold [default: 0.9]
    #[arg(long = "top_p", alias = "top-p")]
    pub top_p: Option<f32>,

    /// Prompts must tokenize to fewer tokens than this [default: 1024]
    #[arg(long = "max-prompt-tokens", alias = "max_prompt_tokens")]
    pub max_prompt_tokens: Option<usize>,

    /// Sampling seed [default: 299792458]
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON array of dialogs to read
    #[arg(long = "input_path", alias = "input-path")]
    pub input_path: Option<PathBuf>,

    /// Where to write the dialogs with generations
    #[arg(long = "output_path", alias = "output-path")]
    pub output_path: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    /// Accepted for compatibility with job launchers; unused
    #[arg(long = "dump_dir", alias = "dump-dir")]
    pub dump_dir: Option<String>,

    /// Generation backend
    #[arg(long)]
    pub backend: Option<Backend>,

    /// Base URL of the text-generation-inference server
    #[arg(long = "server-url", env = "VASARI_SERVER_URL")]
    pub server_url: Option<String>,

    /// `tokenizer.json` to use instead of the one next to the model
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,

    /// Conversation template name, overriding detection from the model path
    #[arg(long = "conv-template")]
    pub conv_template: Option<String>,

    /// Place turns under their `role` key instead of strict alternation
    #[arg(long = "honor-roles")]
    pub honor_roles: bool,

    /// TOML file with `[generation]` and `[model]` tables
    #[arg(long, env = "VASARI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Args {
    /// Logs a warning for each accepted option this tool ignores.
    pub fn warn_unsupported(&self) {
        if self.num_gpus > 1 {
            warn!(num_gpus = self.num_gpus, "Multi-GPU loading is not supported, using one device");
        }
        if let Some(limit) = &self.max_gpu_memory {
            warn!(%limit, "--max-gpu-memory is not supported and will be ignored");
        }
        if self.load_8bit {
            warn!("--load-8bit is not supported, loading full-precision weights");
        }
        if self.cpu_offloading {
            warn!("--cpu-offloading is not supported and will be ignored");
        }
    }
}
