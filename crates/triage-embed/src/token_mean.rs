use anyhow::{anyhow, Result};
use std::path::Path;
use tokenizers::Tokenizer;

use triage_core::Embedder;

/// Embeds text as the mean of its token ids, broadcast across every dimension.
///
/// Category names and queries with similar mean token ids land close together.
/// Text that produces no tokens embeds as the zero vector.
pub struct TokenMeanEmbedder {
    tokenizer: Tokenizer,
    dim: usize,
}

impl TokenMeanEmbedder {
    pub fn new(tokenizer: Tokenizer, dim: usize) -> Self { Self { tokenizer, dim } }

    pub fn from_file(path: &Path, dim: usize) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", path.display(), e))?;
        Ok(Self::new(tokenizer, dim))
    }
}

impl Embedder for TokenMeanEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let enc = self.tokenizer.encode(text, false).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let ids = enc.get_ids();
        if ids.is_empty() {
            return Ok(vec![0.0; self.dim]);
        }
        let mean = ids.iter().map(|&id| id as f64).sum::<f64>() / ids.len() as f64;
        Ok(vec![mean as f32; self.dim])
    }
}
