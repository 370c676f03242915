use candle_core::Device;
use tokenizers::Tokenizer;
use triage_embed::{encode_batch, pad_token_id};

const PADDED_VOCAB_TOKENIZER: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [],
  "normalizer": null,
  "pre_tokenizer": { "type": "Whitespace" },
  "post_processor": null,
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": { "[UNK]": 0, "<pad>": 3, "billing": 4, "refund": 8, "shipping": 10 },
    "unk_token": "[UNK]"
  }
}"#;

fn tokenizer() -> Tokenizer {
    Tokenizer::from_bytes(PADDED_VOCAB_TOKENIZER.as_bytes()).expect("tokenizer")
}

#[test]
fn pad_id_comes_from_the_vocabulary() {
    assert_eq!(pad_token_id(&tokenizer()), 3);
}

#[test]
fn batch_pads_to_longest_row() {
    let batch = encode_batch(&tokenizer(), &["billing refund", "shipping", ""], 256, 3).unwrap();
    assert_eq!((batch.rows, batch.cols), (3, 2));
    assert_eq!(batch.ids, vec![4, 8, 10, 3, 3, 3]);
    assert_eq!(batch.mask, vec![1, 1, 1, 0, 0, 0]);
}

#[test]
fn rows_truncate_at_max_len() {
    let batch = encode_batch(&tokenizer(), &["billing refund shipping", "refund"], 2, 3).unwrap();
    assert_eq!(batch.cols, 2);
    assert_eq!(batch.ids, vec![4, 8, 8, 3]);
    assert_eq!(batch.mask, vec![1, 1, 1, 0]);
}

#[test]
fn all_empty_batch_keeps_one_masked_column() {
    let batch = encode_batch(&tokenizer(), &[""], 16, 3).unwrap();
    assert_eq!((batch.rows, batch.cols), (1, 1));
    assert_eq!(batch.ids, vec![3]);
    assert_eq!(batch.mask, vec![0]);
}

#[test]
fn zero_max_len_is_rejected() {
    assert!(encode_batch(&tokenizer(), &["billing"], 0, 3).is_err());
}

#[test]
fn tensors_have_batch_shape() {
    let batch = encode_batch(&tokenizer(), &["billing refund", "shipping"], 8, 3).unwrap();
    let (ids, mask) = batch.to_tensors(&Device::Cpu).unwrap();
    assert_eq!(ids.dims(), &[2, 2]);
    assert_eq!(mask.dims(), &[2, 2]);
    let rows: Vec<Vec<u32>> = ids.to_vec2().unwrap();
    assert_eq!(rows, vec![vec![4, 8], vec![10, 3]]);
}
