//! Embedding Service implementations.
//!
//! `get_default_embedder` picks one from `[embedding]` settings. Setting
//! `APP_USE_FAKE_EMBEDDINGS=1` forces the model-free `HashEmbedder`.

mod device;
mod hash;
mod model;
mod pool;
mod token_mean;
mod tokenize;

use anyhow::{anyhow, ensure, Result};
use tracing::info;

use triage_core::config::{EmbeddingProvider, EmbeddingSettings};
use triage_core::Embedder;

pub use device::select_device;
pub use hash::HashEmbedder;
pub use model::XlmRobertaEmbedder;
pub use pool::masked_mean_l2;
pub use token_mean::TokenMeanEmbedder;
pub use tokenize::{encode_batch, pad_token_id, TokenBatch};

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let provider = if use_fake { EmbeddingProvider::Hash } else { settings.provider };
    ensure!(settings.dim > 0, "embedding.dim must be positive");
    info!(?provider, dim = settings.dim, "selecting embedder");
    match provider {
        EmbeddingProvider::Hash => Ok(Box::new(HashEmbedder::new(settings.dim)?)),
        EmbeddingProvider::TokenMean => {
            let path = settings
                .tokenizer
                .as_deref()
                .ok_or_else(|| anyhow!("embedding.tokenizer must be set for the token_mean provider"))?;
            Ok(Box::new(TokenMeanEmbedder::from_file(path, settings.dim)?))
        }
        EmbeddingProvider::XlmRoberta => Ok(Box::new(XlmRobertaEmbedder::load(settings)?)),
    }
}
