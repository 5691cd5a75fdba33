//! Token-by-token decoding loops.

use candle_core::{DType, Device, Result, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::{llama, t5};

/// Per-call decoding limits.
pub(crate) struct DecodeParams {
    pub max_new_tokens: usize,
    pub repetition_penalty: f32,
    pub repeat_last_n: Option<usize>,
}

/// A loaded checkpoint.
pub(crate) enum Architecture {
    /// Decoder-only; output echoes the prompt
    Llama {
        model: llama::Llama,
        config: llama::Config,
        dtype: DType,
        eos: Vec<u32>,
    },
    /// Encoder-decoder; output is only the response
    T5 {
        model: Box<t5::T5ForConditionalGeneration>,
        config: t5::Config,
    },
}

impl Architecture {
    pub fn is_encoder_decoder(&self) -> bool {
        matches!(self, Architecture::T5 { .. })
    }

    /// Runs the sampling loop and returns the raw output sequence.
    ///
    /// For Llama this is prompt followed by new tokens; for T5 it is the
    /// decoder start token followed by new tokens. EOS is never included.
    pub fn decode(
        &mut self,
        device: &Device,
        prompt_ids: &[u32],
        params: &DecodeParams,
        processor: &mut LogitsProcessor,
    ) -> Result<Vec<u32>> {
        match self {
            Architecture::Llama {
                model,
                config,
                dtype,
                eos,
            } => {
                let mut cache = llama::Cache::new(true, *dtype, config, device)?;
                let mut tokens = prompt_ids.to_vec();
                let mut index_pos = 0;
                for index in 0..params.max_new_tokens {
                    let context_size = if index > 0 { 1 } else { tokens.len() };
                    let context = &tokens[tokens.len().saturating_sub(context_size)..];
                    let input = Tensor::new(context, device)?.unsqueeze(0)?;
                    let logits = model.forward(&input, index_pos, &mut cache)?.squeeze(0)?;
                    let logits = penalize(logits, params, &tokens)?;
                    index_pos += context.len();

                    let next = processor.sample(&logits)?;
                    if eos.contains(&next) {
                        break;
                    }
                    tokens.push(next);
                }
                Ok(tokens)
            }
            Architecture::T5 { model, config } => {
                model.clear_kv_cache();
                let input = Tensor::new(prompt_ids, device)?.unsqueeze(0)?;
                let encoder_output = model.encode(&input)?;

                let start = config
                    .decoder_start_token_id
                    .unwrap_or(config.pad_token_id) as u32;
                let mut output = vec![start];
                for index in 0..params.max_new_tokens {
                    let decoder_ids = match output.last() {
                        Some(&last) if index > 0 && config.use_cache => {
                            Tensor::new(&[last], device)?.unsqueeze(0)?
                        }
                        _ => Tensor::new(output.as_slice(), device)?.unsqueeze(0)?,
                    };
                    let logits = model.decode(&decoder_ids, &encoder_output)?.squeeze(0)?;
                    let logits = penalize(logits, params, &output)?;

                    let next = processor.sample(&logits)?;
                    if next as usize == config.eos_token_id {
                        break;
                    }
                    output.push(next);
                }
                Ok(output)
            }
        }
    }
}

fn penalize(logits: Tensor, params: &DecodeParams, history: &[u32]) -> Result<Tensor> {
    if (params.repetition_penalty - 1.0).abs() < f32::EPSILON {
        return Ok(logits);
    }
    let start = params
        .repeat_last_n
        .map_or(0, |n| history.len().saturating_sub(n));
    candle_transformers::utils::apply_repeat_penalty(
        &logits,
        params.repetition_penalty,
        &history[start..],
    )
}
