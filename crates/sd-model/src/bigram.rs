use sd_tensor::{Shape, Tensor};

use crate::error::{ModelError, Result};
use crate::model::{ModelMode, Seq2SeqModel};

/// A causal reference model driven by a token transition table.
///
/// The logits for the token after position `p` depend only on the token at
/// `p`: `logits[b, p, :] = table[prefix[b, p], :]`. The source batch only
/// fixes the batch size. Useful for exercising decoders with known
/// distributions.
#[derive(Debug, Clone)]
pub struct BigramModel {
    /// Transition logits, row-major `[V, V]`.
    table: Tensor,
    n_vocab: usize,
    mode: ModelMode,
}

impl BigramModel {
    /// Create a model from a `[V, V]` logit table.
    pub fn new(table: Tensor) -> Result<Self> {
        let dims = table.shape().dims();
        if dims.len() != 2 || dims[0] != dims[1] {
            return Err(ModelError::Other(format!(
                "bigram table must be square [V, V], got {}",
                table.shape()
            )));
        }
        table.data_f32()?;
        let n_vocab = dims[0];
        Ok(Self {
            table,
            n_vocab,
            mode: ModelMode::default(),
        })
    }

    /// Create a model whose logit for `next` after `prev` is `f(prev, next)`.
    pub fn from_fn<F>(n_vocab: usize, f: F) -> Result<Self>
    where
        F: Fn(u32, u32) -> f32,
    {
        let mut data = Vec::with_capacity(n_vocab * n_vocab);
        for prev in 0..n_vocab as u32 {
            for next in 0..n_vocab as u32 {
                data.push(f(prev, next));
            }
        }
        Self::new(Tensor::new(data, Shape::new(vec![n_vocab, n_vocab])))
    }
}

impl Seq2SeqModel for BigramModel {
    fn forward(
        &mut self,
        src: &Tensor,
        prefix: &Tensor,
        src_lengths: Option<&[usize]>,
        _tgt_lengths: Option<&[usize]>,
    ) -> Result<Tensor> {
        let dims = prefix.shape().dims();
        if dims.len() != 2 {
            return Err(ModelError::Other(format!(
                "prefix must be [B, P], got {}",
                prefix.shape()
            )));
        }
        let (batch, len) = (dims[0], dims[1]);

        let src_batch = src.shape().dims().first().copied().unwrap_or(0);
        if src_batch != batch {
            return Err(sd_tensor::TensorError::ShapeMismatch {
                expected: vec![batch],
                got: vec![src_batch],
            }
            .into());
        }
        if let Some(lengths) = src_lengths {
            if lengths.len() != batch {
                return Err(ModelError::Other(format!(
                    "got {} source lengths for a batch of {}",
                    lengths.len(),
                    batch
                )));
            }
        }

        let table = self.table.data_f32()?;
        let v = self.n_vocab;
        let mut logits = Vec::with_capacity(batch * len * v);
        for &id in prefix.ids()? {
            if id as usize >= v {
                return Err(ModelError::InvalidToken { id, vocab_size: v });
            }
            let row = id as usize * v;
            logits.extend_from_slice(&table[row..row + v]);
        }

        Ok(Tensor::new(logits, Shape::new(vec![batch, len, v])))
    }

    fn mode(&self) -> ModelMode {
        self.mode
    }

    fn set_mode(&mut self, mode: ModelMode) {
        self.mode = mode;
    }
}
