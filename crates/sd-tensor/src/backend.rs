use std::fmt::Debug;

use crate::error::Result;

/// Trait for pluggable compute backends.
///
/// Every operation works on contiguous chunks of `n_vocab` elements, one
/// chunk per distribution. Data is passed in as slices and returned as owned
/// vectors.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu").
    fn name(&self) -> &str;

    /// Softmax over chunks of `n_vocab` elements.
    ///
    /// For each chunk: result[i] = exp(x[i] - max(x)) / sum(exp(x[j] - max(x)))
    fn softmax(&self, x: &[f32], n_vocab: usize) -> Result<Vec<f32>>;

    /// Log-softmax over chunks of `n_vocab` elements.
    ///
    /// For each chunk: result[i] = x[i] - max(x) - ln(sum(exp(x[j] - max(x))))
    fn log_softmax(&self, x: &[f32], n_vocab: usize) -> Result<Vec<f32>>;

    /// Index of the largest element of each chunk of `n_vocab` elements.
    ///
    /// Ties resolve to the lowest index.
    fn argmax(&self, x: &[f32], n_vocab: usize) -> Result<Vec<u32>>;
}
