//! Per-step plumbing shared by the decoders.

use sd_tensor::{ComputeBackend, DType, Tensor, TensorError};

use crate::error::{DecodeError, Result};

/// Leading (batch) dimension of the encoded source.
pub(crate) fn batch_size(src: &Tensor) -> Result<usize> {
    src.shape().dims().first().copied().ok_or_else(|| {
        DecodeError::InvalidInput("source tensor needs a leading batch dimension".to_string())
    })
}

/// Reject logits that are not exactly `[batch, positions, vocab_size]` f32.
pub(crate) fn check_logits(
    logits: &Tensor,
    batch: usize,
    positions: usize,
    vocab_size: usize,
) -> Result<()> {
    if logits.dtype() != DType::F32 {
        return Err(TensorError::DTypeMismatch {
            expected: DType::F32.to_string(),
            got: logits.dtype().to_string(),
        }
        .into());
    }
    let expected = [batch, positions, vocab_size];
    if logits.shape().dims() != expected {
        return Err(DecodeError::LogitsShape {
            expected: expected.to_vec(),
            got: logits.shape().dims().to_vec(),
        });
    }
    Ok(())
}

/// The logits of batch item `b` at position `t`.
///
/// NaN and `+inf` have no categorical meaning and fail the step. `-inf` is
/// kept: it masks a token out.
pub(crate) fn valid_lane(logits: &Tensor, b: usize, t: usize) -> Result<&[f32]> {
    let row = logits.lane(&[b, t])?;
    match row.iter().position(|v| v.is_nan() || *v == f32::INFINITY) {
        Some(token) => Err(DecodeError::InvalidLogit {
            item: b,
            position: t,
            token: token as u32,
            value: row[token],
        }),
        None => Ok(row),
    }
}

/// Log-probabilities over the vocabulary at position `t`, one row per batch
/// item.
pub(crate) fn log_probs_at(
    logits: &Tensor,
    t: usize,
    backend: &dyn ComputeBackend,
) -> Result<Vec<Vec<f32>>> {
    let dims = logits.shape().dims();
    let (batch, vocab_size) = (dims[0], dims[2]);
    (0..batch)
        .map(|b| -> Result<Vec<f32>> {
            let row = valid_lane(logits, b, t)?;
            Ok(backend.log_softmax(row, vocab_size)?)
        })
        .collect()
}
