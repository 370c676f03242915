use anyhow::{anyhow, ensure, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Token ids and attention mask for a batch of texts, row-major `[rows, cols]`.
///
/// Rows are padded to the longest encoding in the batch (never past
/// `max_len`), so a short query is not run through `max_len` positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBatch {
    pub ids: Vec<u32>,
    pub mask: Vec<u32>,
    pub rows: usize,
    pub cols: usize,
}

impl TokenBatch {
    /// `(input_ids, attention_mask)` tensors shaped `[rows, cols]`.
    pub fn to_tensors(&self, device: &Device) -> Result<(Tensor, Tensor)> {
        let shape = (self.rows, self.cols);
        let ids = Tensor::from_slice(&self.ids, shape, device)?;
        let mask = Tensor::from_slice(&self.mask, shape, device)?;
        Ok((ids, mask))
    }
}

/// The tokenizer's padding id: its padding config if set, else the `<pad>`
/// or `[PAD]` token, else 0.
pub fn pad_token_id(tokenizer: &Tokenizer) -> u32 {
    tokenizer
        .get_padding()
        .map(|p| p.pad_id)
        .or_else(|| ["<pad>", "[PAD]"].iter().find_map(|t| tokenizer.token_to_id(t)))
        .unwrap_or(0)
}

/// Encode `texts` with special tokens, truncating each to `max_len` and
/// padding with `pad_id`. Empty batches yield zero rows.
pub fn encode_batch(tokenizer: &Tokenizer, texts: &[&str], max_len: usize, pad_id: u32) -> Result<TokenBatch> {
    ensure!(max_len > 0, "max_len must be positive");
    let mut encoded = Vec::with_capacity(texts.len());
    for text in texts {
        let enc = tokenizer
            .encode(*text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        ids.truncate(max_len);
        encoded.push(ids);
    }
    // At least one column so an all-empty batch still has a valid shape.
    let cols = encoded.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let mut batch = TokenBatch {
        ids: Vec::with_capacity(encoded.len() * cols),
        mask: Vec::with_capacity(encoded.len() * cols),
        rows: encoded.len(),
        cols,
    };
    for ids in encoded {
        let pad = cols - ids.len();
        batch.mask.extend(std::iter::repeat(1).take(ids.len()));
        batch.mask.extend(std::iter::repeat(0).take(pad));
        batch.ids.extend(ids);
        batch.ids.extend(std::iter::repeat(pad_id).take(pad));
    }
    Ok(batch)
}
