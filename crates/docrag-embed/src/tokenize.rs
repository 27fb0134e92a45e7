use anyhow::{anyhow, Result};
use tokenizers::Tokenizer;

/// Token and attention-mask rows truncated/padded to exactly `max_len`.
/// BERT-family models pad with token id 0.
pub fn tokenize_padded(
    tokenizer: &Tokenizer,
    text: &str,
    max_len: usize,
    pad_id: u32,
) -> Result<(Vec<u32>, Vec<u32>)> {
    let enc = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mut ids = enc.get_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    if ids.len() > max_len {
        ids.truncate(max_len);
        mask.truncate(max_len);
    }
    if ids.len() < max_len {
        let pad = max_len - ids.len();
        ids.extend(std::iter::repeat(pad_id).take(pad));
        mask.extend(std::iter::repeat(0).take(pad));
    }
    Ok((ids, mask))
}
