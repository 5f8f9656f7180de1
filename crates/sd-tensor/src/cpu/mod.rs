use crate::backend::ComputeBackend;
use crate::error::{Result, TensorError};

/// Pure-Rust CPU compute backend.
///
/// Implements all operations with straightforward loops optimized for
/// correctness rather than peak performance.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate that `len` splits into whole chunks of `n_vocab` and return the
/// chunk count.
fn chunk_count(op: &str, len: usize, n_vocab: usize) -> Result<usize> {
    if n_vocab == 0 {
        return Err(TensorError::Other(format!("{}: n_vocab must be > 0", op)));
    }
    if len % n_vocab != 0 {
        return Err(TensorError::Other(format!(
            "{}: x.len()={} is not a multiple of n_vocab={}",
            op, len, n_vocab
        )));
    }
    Ok(len / n_vocab)
}

fn chunk_max(chunk: &[f32]) -> f32 {
    chunk.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn softmax(&self, x: &[f32], n_vocab: usize) -> Result<Vec<f32>> {
        chunk_count("softmax", x.len(), n_vocab)?;
        let mut result = vec![0.0f32; x.len()];

        for (chunk, out) in x.chunks(n_vocab).zip(result.chunks_mut(n_vocab)) {
            // Find max for numerical stability
            let max_val = chunk_max(chunk);

            let mut sum = 0.0f32;
            for (o, &v) in out.iter_mut().zip(chunk) {
                *o = (v - max_val).exp();
                sum += *o;
            }
            for o in out.iter_mut() {
                *o /= sum;
            }
        }

        Ok(result)
    }

    fn log_softmax(&self, x: &[f32], n_vocab: usize) -> Result<Vec<f32>> {
        chunk_count("log_softmax", x.len(), n_vocab)?;
        let mut result = vec![0.0f32; x.len()];

        for (chunk, out) in x.chunks(n_vocab).zip(result.chunks_mut(n_vocab)) {
            let max_val = chunk_max(chunk);
            let log_sum = chunk
                .iter()
                .map(|&v| (v - max_val).exp())
                .sum::<f32>()
                .ln();
            for (o, &v) in out.iter_mut().zip(chunk) {
                *o = v - max_val - log_sum;
            }
        }

        Ok(result)
    }

    fn argmax(&self, x: &[f32], n_vocab: usize) -> Result<Vec<u32>> {
        let n_chunks = chunk_count("argmax", x.len(), n_vocab)?;
        let mut result = Vec::with_capacity(n_chunks);

        for chunk in x.chunks(n_vocab) {
            let mut best = 0usize;
            for (i, &v) in chunk.iter().enumerate().skip(1) {
                // Strict comparison keeps the first of equal maxima.
                if v > chunk[best] {
                    best = i;
                }
            }
            result.push(best as u32);
        }

        Ok(result)
    }
}
