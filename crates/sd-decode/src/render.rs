use sd_model::Tokenizer;
use sd_tensor::Tensor;

use crate::error::{DecodeError, Result};

/// Decoded text, nested to match the id tensor it came from.
///
/// A rank-1 id tensor renders as `Text`; every extra leading axis adds one
/// level of `Batch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    Batch(Vec<Rendered>),
}

impl Rendered {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Rendered::Text(s) => Some(s),
            Rendered::Batch(_) => None,
        }
    }

    pub fn as_batch(&self) -> Option<&[Rendered]> {
        match self {
            Rendered::Text(_) => None,
            Rendered::Batch(items) => Some(items),
        }
    }

    /// Sizes of the nesting levels, outermost first, read along the first
    /// element of each level.
    pub fn shape(&self) -> Vec<usize> {
        let mut dims = Vec::new();
        let mut cur = self;
        while let Rendered::Batch(items) = cur {
            dims.push(items.len());
            match items.first() {
                Some(first) => cur = first,
                None => break,
            }
        }
        dims
    }

    /// Flatten one level of texts, as produced from a `[B, T]` tensor.
    pub fn into_texts(self) -> Option<Vec<String>> {
        match self {
            Rendered::Batch(items) => items
                .into_iter()
                .map(|item| match item {
                    Rendered::Text(s) => Some(s),
                    Rendered::Batch(_) => None,
                })
                .collect(),
            Rendered::Text(_) => None,
        }
    }

    /// Flatten two levels of texts, as produced from a `[B, k, T]` tensor.
    pub fn into_nested_texts(self) -> Option<Vec<Vec<String>>> {
        match self {
            Rendered::Batch(items) => items.into_iter().map(Rendered::into_texts).collect(),
            Rendered::Text(_) => None,
        }
    }
}

/// Render a tensor of token ids as text.
///
/// Each innermost sequence is cut after its first EOS (the EOS itself is
/// passed to the tokenizer) and decoded; sequences without EOS are decoded
/// whole. Higher-rank tensors are rendered item by item along the outermost
/// axis.
pub fn ids_to_strs(ids: &Tensor, tokenizer: &dyn Tokenizer) -> Result<Rendered> {
    let eos_id = tokenizer.eos_id()?;
    render(ids, tokenizer, eos_id)
}

fn render(ids: &Tensor, tokenizer: &dyn Tokenizer, eos_id: u32) -> Result<Rendered> {
    match ids.shape().ndim() {
        0 => Err(DecodeError::InvalidInput(
            "cannot render a rank-0 tensor".to_string(),
        )),
        1 => Ok(Rendered::Text(decode_until_eos(ids.ids()?, tokenizer, eos_id))),
        _ => (0..ids.shape().dim(0))
            .map(|i| render(&ids.index(i)?, tokenizer, eos_id))
            .collect::<Result<Vec<_>>>()
            .map(Rendered::Batch),
    }
}

/// Decode `ids` up to and including the first `eos_id`.
fn decode_until_eos(ids: &[u32], tokenizer: &dyn Tokenizer, eos_id: u32) -> String {
    let end = ids
        .iter()
        .position(|&id| id == eos_id)
        .map_or(ids.len(), |pos| pos + 1);
    tokenizer.decode_ids(&ids[..end])
}
