//! Hugging Face text-generation-inference (TGI) backend.

mod client;
mod dto;

pub use client::TgiGenerator;
pub use dto::{
    TgiGeneration, TgiParameters, TgiParametersBuilder, TgiRequest, TgiRequestBuilder, TgiResponse,
};
