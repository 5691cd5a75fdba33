//! Layered configuration: defaults, then the TOML file, then flags.

use crate::cli::{Args, Backend};
use derive_getters::Getters;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use vasari_core::GenerationConfig;
use vasari_error::{ConfigError, StorageError, StorageErrorKind, VasariResult};
use vasari_models::DeviceKind;
use vasari_template::RolePolicy;

/// Model used when neither flags nor the config file name one.
pub const DEFAULT_MODEL_PATH: &str = "lmsys/vicuna-7b-v1.5";

/// Server used when neither flags, environment nor the config file name one.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Sampling table of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSection {
    pub temperature: Option<f32>,
    pub repetition_penalty: Option<f32>,
    pub max_new_tokens: Option<usize>,
    pub top_p: Option<f32>,
    pub max_prompt_tokens: Option<usize>,
    pub seed: Option<u64>,
}

/// Model table of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub model_path: Option<String>,
    pub revision: Option<String>,
    pub device: Option<DeviceKind>,
    pub backend: Option<Backend>,
    pub server_url: Option<String>,
    pub tokenizer: Option<PathBuf>,
    pub conv_template: Option<String>,
    pub honor_roles: Option<bool>,
    pub repeat_last_n: Option<usize>,
}

/// Contents of a `--config` TOML file.
///
/// ```toml
/// [generation]
/// temperature = 0.2
///
/// [model]
/// backend = "tgi"
/// server_url = "http://gpu-box:8080"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub generation: GenerationSection,
    pub model: ModelSection,
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl FileConfig {
    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read and a config error
    /// if it is not valid TOML for this schema.
    pub fn from_file(path: impl AsRef<Path>) -> VasariResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StorageError::new(StorageErrorKind::from_read(path, &e)))?;
        Self::parse(&contents)
            .map_err(|e| ConfigError::new(format!("{}: {}", path.display(), e)).into())
    }

    /// Parses TOML text.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Settings {
    /// Model directory or hub id
    model_path: String,
    /// Hub revision
    revision: String,
    /// Device for in-process inference
    device: DeviceKind,
    /// Generation backend
    backend: Backend,
    /// TGI base URL
    server_url: String,
    /// Explicit tokenizer file
    tokenizer: Option<PathBuf>,
    /// Explicit template name
    conv_template: Option<String>,
    /// How input roles are used
    role_policy: RolePolicy,
    /// Repetition penalty window for in-process decoding
    repeat_last_n: Option<usize>,
    /// Sampling parameters, already adjusted for the model
    generation: GenerationConfig,
    /// Dialogs to read
    input_path: PathBuf,
    /// Where results are written
    output_path: PathBuf,
}

impl Settings {
    /// Resolves settings from flags, reading `--config` if given.
    ///
    /// # Errors
    ///
    /// Fails if the config file is unreadable, a path is missing, or the
    /// sampling parameters are out of range.
    #[instrument(skip_all, fields(config = ?args.config))]
    pub fn resolve(args: &Args) -> VasariResult<Self> {
        let file = match &args.config {
            Some(path) => {
                info!(path = %path.display(), "Loading config file");
                FileConfig::from_file(path)?
            }
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Layers `args` over `file` over built-in defaults.
    pub fn merge(args: &Args, file: FileConfig) -> VasariResult<Self> {
        let FileConfig {
            generation: gen_file,
            model,
            input_path,
            output_path,
        } = file;

        let model_path = args
            .model_path
            .clone()
            .or(model.model_path)
            .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());

        let mut builder = GenerationConfig::builder();
        if let Some(v) = args.temperature.or(gen_file.temperature) {
            builder.temperature(v);
        }
        if let Some(v) = args.repetition_penalty.or(gen_file.repetition_penalty) {
            builder.repetition_penalty(v);
        }
        if let Some(v) = args.max_new_tokens.or(gen_file.max_new_tokens) {
            builder.max_new_tokens(v);
        }
        if let Some(v) = args.top_p.or(gen_file.top_p) {
            builder.top_p(v);
        }
        if let Some(v) = args.max_prompt_tokens.or(gen_file.max_prompt_tokens) {
            builder.max_prompt_tokens(v);
        }
        if let Some(v) = args.seed.or(gen_file.seed) {
            builder.seed(v);
        }
        let generation = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid generation settings: {}", e)))?
            .adjusted_for_model(&model_path);
        generation.check()?;

        let input_path = args
            .input_path
            .clone()
            .or(input_path)
            .ok_or_else(|| ConfigError::new("No input file given (--input_path)"))?;
        let output_path = args
            .output_path
            .clone()
            .or(output_path)
            .ok_or_else(|| ConfigError::new("No output file given (--output_path)"))?;

        let role_policy = if args.honor_roles || model.honor_roles.unwrap_or(false) {
            RolePolicy::FromInput
        } else {
            RolePolicy::Alternate
        };

        let settings = Self {
            model_path,
            revision: args
                .revision
                .clone()
                .or(model.revision)
                .unwrap_or_else(|| "main".to_string()),
            device: args.device.or(model.device).unwrap_or_default(),
            backend: args.backend.or(model.backend).unwrap_or_default(),
            server_url: args
                .server_url
                .clone()
                .or(model.server_url)
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            tokenizer: args.tokenizer.clone().or(model.tokenizer),
            conv_template: args.conv_template.clone().or(model.conv_template),
            role_policy,
            repeat_last_n: model.repeat_last_n,
            generation,
            input_path,
            output_path,
        };
        debug!(?settings, "Settings resolved");
        Ok(settings)
    }
}
