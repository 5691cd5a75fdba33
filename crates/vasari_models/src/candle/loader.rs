//! Locating and loading checkpoints.

use super::CandleOptions;
use super::decode::Architecture;
use crate::{DeviceKind, HfTokenizer};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::{llama, t5};
use derive_getters::Getters;
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vasari_error::{GenerationError, GenerationErrorKind};

fn load_error(message: impl std::fmt::Display) -> GenerationError {
    GenerationError::new(GenerationErrorKind::ModelLoad(message.to_string()))
}

/// Files making up a checkpoint.
#[derive(Debug, Clone, Getters)]
pub(crate) struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: Vec<PathBuf>,
}

/// Opens the requested device, falling back to CPU when the accelerator is
/// not compiled in or not present.
pub(crate) fn device_for(kind: DeviceKind) -> Result<Device, GenerationError> {
    match kind {
        DeviceKind::Cpu => Ok(Device::Cpu),
        DeviceKind::Cuda if candle_core::utils::cuda_is_available() => {
            Device::new_cuda(0).map_err(load_error)
        }
        DeviceKind::Metal if candle_core::utils::metal_is_available() => {
            Device::new_metal(0).map_err(load_error)
        }
        other => {
            warn!(requested = %other, "Accelerator unavailable, running on CPU");
            Ok(Device::Cpu)
        }
    }
}

/// Finds config, tokenizer and weights locally or on the hub.
pub(crate) fn resolve_files(options: &CandleOptions) -> Result<ModelFiles, GenerationError> {
    let local = Path::new(options.model_path());
    if local.is_dir() {
        resolve_local(local, options.tokenizer().as_deref())
    } else {
        resolve_hub(options)
    }
}

fn resolve_local(dir: &Path, tokenizer: Option<&Path>) -> Result<ModelFiles, GenerationError> {
    let config = dir.join("config.json");
    if !config.is_file() {
        return Err(load_error(format!("{} has no config.json", dir.display())));
    }
    let tokenizer = tokenizer
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join("tokenizer.json"));
    if !tokenizer.is_file() {
        return Err(load_error(format!(
            "tokenizer not found at {}; pass --tokenizer with a tokenizer.json",
            tokenizer.display()
        )));
    }

    let mut weights = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(load_error)? {
        let path = entry.map_err(load_error)?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("safetensors") {
            weights.push(path);
        }
    }
    if weights.is_empty() {
        return Err(load_error(format!("{} has no .safetensors files", dir.display())));
    }
    weights.sort();
    debug!(shards = weights.len(), "Resolved local checkpoint");

    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

fn resolve_hub(options: &CandleOptions) -> Result<ModelFiles, GenerationError> {
    let api = Api::new().map_err(load_error)?;
    let repo = api.repo(Repo::with_revision(
        options.model_path().clone(),
        RepoType::Model,
        options.revision().clone(),
    ));

    let config = repo.get("config.json").map_err(load_error)?;
    let tokenizer = match options.tokenizer() {
        Some(path) => path.clone(),
        None => repo.get("tokenizer.json").map_err(load_error)?,
    };
    let weights = match repo.get("model.safetensors.index.json") {
        Ok(index) => hub_shards(&repo, &index)?,
        Err(_) => vec![repo.get("model.safetensors").map_err(load_error)?],
    };
    debug!(shards = weights.len(), "Resolved hub checkpoint");

    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

fn hub_shards(repo: &ApiRepo, index: &Path) -> Result<Vec<PathBuf>, GenerationError> {
    let raw = std::fs::read(index).map_err(load_error)?;
    let index: Value = serde_json::from_slice(&raw).map_err(load_error)?;
    let shards: BTreeSet<&str> = index
        .get("weight_map")
        .and_then(Value::as_object)
        .ok_or_else(|| load_error("safetensors index has no weight_map"))?
        .values()
        .filter_map(Value::as_str)
        .collect();
    shards
        .into_iter()
        .map(|shard| repo.get(shard).map_err(load_error))
        .collect()
}

/// Reads `config.json` and builds the matching model.
pub(crate) fn load_architecture(
    files: &ModelFiles,
    device: &Device,
    tokenizer: &HfTokenizer,
) -> Result<Architecture, GenerationError> {
    let raw = std::fs::read(files.config()).map_err(load_error)?;
    let config: Value = serde_json::from_slice(&raw).map_err(load_error)?;
    let model_type = config
        .get("model_type")
        .and_then(Value::as_str)
        .unwrap_or("llama")
        .to_string();
    let is_encoder_decoder = config
        .get("is_encoder_decoder")
        .and_then(Value::as_bool)
        .unwrap_or(false)
        || model_type == "t5";
    debug!(%model_type, is_encoder_decoder, "Detected architecture");

    if is_encoder_decoder {
        let config: t5::Config = serde_json::from_value(config).map_err(load_error)?;
        // SAFETY: the weight files are not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(files.weights(), DType::F32, device) }
            .map_err(load_error)?;
        let model = t5::T5ForConditionalGeneration::load(vb, &config).map_err(load_error)?;
        return Ok(Architecture::T5 {
            model: Box::new(model),
            config,
        });
    }

    if !matches!(model_type.as_str(), "llama" | "mistral") {
        return Err(GenerationError::new(GenerationErrorKind::Unsupported(format!(
            "model_type '{}' (supported: llama, mistral, t5)",
            model_type
        ))));
    }

    let dtype = if device.is_cpu() { DType::F32 } else { DType::F16 };
    let llama_config: llama::LlamaConfig = serde_json::from_value(config).map_err(load_error)?;
    let config = llama_config.into_config(false);
    // SAFETY: the weight files are not modified while mapped.
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(files.weights(), dtype, device) }
        .map_err(load_error)?;
    let model = llama::Llama::load(vb, &config).map_err(load_error)?;

    let eos = match &config.eos_token_id {
        Some(llama::LlamaEosToks::Single(id)) => vec![*id],
        Some(llama::LlamaEosToks::Multiple(ids)) => ids.clone(),
        None => tokenizer.token_to_id("</s>").into_iter().collect(),
    };

    Ok(Architecture::Llama {
        model,
        config,
        dtype,
        eos,
    })
}
