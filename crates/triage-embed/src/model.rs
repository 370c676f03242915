use anyhow::{anyhow, ensure, Context as _, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use triage_core::config::EmbeddingSettings;
use triage_core::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::{encode_batch, pad_token_id};

/// Sentence embeddings from a local XLM-RoBERTa checkpoint (e.g. BGE-M3).
///
/// The model directory must contain `tokenizer.json`, `config.json` and
/// `pytorch_model.bin`. The vector width is the checkpoint's `hidden_size`.
pub struct XlmRobertaEmbedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    pad_id: u32,
}

impl XlmRobertaEmbedder {
    pub fn load(settings: &EmbeddingSettings) -> Result<Self> {
        let device = select_device(settings.device);
        let model_dir = resolve_model_dir(settings.model_dir.as_deref())?;
        info!(dir = %model_dir.display(), "loading XLM-RoBERTa embedder");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let dim = hidden_size(&raw)?;
        if dim != settings.dim {
            warn!(configured = settings.dim, model = dim, "embedding.dim ignored, using the model's hidden size");
        }
        let config: XLMRobertaConfig = serde_json::from_str(&raw)?;

        let weights = candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        let pad_id = pad_token_id(&tokenizer);
        info!(dim, max_len = settings.max_len, pad_id, "XLM-RoBERTa embedder ready");
        Ok(Self { model, tokenizer, device, dim, max_len: settings.max_len, pad_id })
    }

    fn forward(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let batch = encode_batch(&self.tokenizer, texts, self.max_len, self.pad_id)?;
        let (input_ids, attention_mask) = batch.to_tensors(&self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        ensure!(
            rows.iter().all(|r| r.len() == self.dim),
            "model produced rows of the wrong width, expected {}",
            self.dim
        );
        Ok(rows)
    }
}

impl Embedder for XlmRobertaEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let emb = self
            .forward(&[text])?
            .pop()
            .ok_or_else(|| anyhow!("model returned no rows"))?;
        if start.elapsed().as_millis() > 100 {
            warn!(elapsed_ms = start.elapsed().as_millis() as u64, "slow embedding");
        }
        Ok(emb)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let rows = self.forward(&refs)?;
        debug!(count = rows.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(rows)
    }
}

/// `hidden_size` from a Hugging Face `config.json`.
fn hidden_size(raw_config: &str) -> Result<usize> {
    let value: serde_json::Value = serde_json::from_str(raw_config)?;
    let size = value
        .get("hidden_size")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| anyhow!("config.json has no numeric hidden_size"))?;
    ensure!(size > 0, "config.json hidden_size is zero");
    Ok(size as usize)
}

fn resolve_model_dir(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = configured {
        if p.exists() { return Ok(p.to_path_buf()); }
        return Err(anyhow!("Configured model dir does not exist: {}", p.display()));
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() { return Ok(p); }
        }
    }
    let local = Path::new("models/bge-m3");
    if local.exists() { return Ok(local.to_path_buf()); }
    Err(anyhow!("Could not locate an XLM-RoBERTa model directory"))
}
