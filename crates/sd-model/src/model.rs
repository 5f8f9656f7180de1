use std::ops::{Deref, DerefMut};

use sd_tensor::Tensor;

/// Whether a model is set up for training or for inference.
///
/// Models that behave differently between the two (dropout, batch-norm
/// statistics) must switch behaviour on `set_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelMode {
    #[default]
    Training,
    Inference,
}

/// Trait for sequence-to-sequence models driven by the decoders.
///
/// Every decoder calls the model through the same `forward` signature: the
/// encoded source batch, the generated-so-far target prefix, and optional
/// per-item source and target lengths.
pub trait Seq2SeqModel: Send + Sync {
    /// Score the next token at every prefix position.
    ///
    /// - `src`: encoded input with a leading batch dimension `[B, ...]`.
    /// - `prefix`: token ids of shape `[B, P]`.
    /// - `src_lengths`: per-item source lengths, if known.
    /// - `tgt_lengths`: per-item target lengths, if known.
    ///
    /// Returns logits of shape `[B, P, V]`, where row `p` scores the token that
    /// follows `prefix[.., ..=p]`.
    fn forward(
        &mut self,
        src: &Tensor,
        prefix: &Tensor,
        src_lengths: Option<&[usize]>,
        tgt_lengths: Option<&[usize]>,
    ) -> crate::Result<Tensor>;

    /// The mode the model is currently in.
    fn mode(&self) -> ModelMode;

    /// Switch the model to `mode`.
    fn set_mode(&mut self, mode: ModelMode);

    /// Switch to inference mode, returning the mode that was active before.
    fn enter_inference(&mut self) -> ModelMode {
        let previous = self.mode();
        self.set_mode(ModelMode::Inference);
        previous
    }

    /// Leave inference mode, going back to `previous`.
    fn exit_inference(&mut self, previous: ModelMode) {
        self.set_mode(previous);
    }
}

/// Holds a model in inference mode for the guard's lifetime.
///
/// The mode that was active at construction is restored on drop, so it is
/// put back on every exit path including `?` returns and panics.
pub struct InferenceGuard<'a, M: Seq2SeqModel + ?Sized> {
    model: &'a mut M,
    previous: ModelMode,
}

impl<'a, M: Seq2SeqModel + ?Sized> InferenceGuard<'a, M> {
    pub fn new(model: &'a mut M) -> Self {
        let previous = model.enter_inference();
        Self { model, previous }
    }
}

impl<M: Seq2SeqModel + ?Sized> Deref for InferenceGuard<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.model
    }
}

impl<M: Seq2SeqModel + ?Sized> DerefMut for InferenceGuard<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        self.model
    }
}

impl<M: Seq2SeqModel + ?Sized> Drop for InferenceGuard<'_, M> {
    fn drop(&mut self) {
        self.model.exit_inference(self.previous);
    }
}
