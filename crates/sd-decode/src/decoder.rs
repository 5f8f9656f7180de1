use std::sync::Arc;

use sd_model::{Seq2SeqModel, Tokenizer};
use sd_tensor::{ComputeBackend, CpuBackend, Tensor};

use crate::beam::{
    beam_search_decode, beam_search_decode_eos, BeamOutput, Hypothesis, ScoredSequence,
};
use crate::config::DecodeConfig;
use crate::error::Result;
use crate::greedy::{greedy_decode, GreedyOutput};

/// A decode configuration bound to a compute backend.
///
/// Thin convenience over the free functions in [`crate::greedy`] and
/// [`crate::beam`].
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecodeConfig,
    backend: Arc<dyn ComputeBackend>,
}

impl Decoder {
    /// Validate `config` and pair it with the CPU backend.
    pub fn new(config: DecodeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend: Arc::new(CpuBackend::new()),
        })
    }

    /// Use `backend` for the distribution math (softmax and argmax for
    /// greedy decoding, log-softmax for beam search).
    pub fn with_backend(mut self, backend: Arc<dyn ComputeBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn ComputeBackend {
        self.backend.as_ref()
    }

    pub fn greedy<M: Seq2SeqModel + ?Sized>(
        &self,
        model: &mut M,
        src: &Tensor,
        tokenizer: &dyn Tokenizer,
    ) -> Result<GreedyOutput> {
        greedy_decode(model, src, tokenizer, &self.config, self.backend.as_ref())
    }

    pub fn beam_search_eos<M: Seq2SeqModel + ?Sized>(
        &self,
        model: &mut M,
        src: &Tensor,
        src_lengths: &[usize],
        tokenizer: &dyn Tokenizer,
        eos_id: u32,
    ) -> Result<BeamOutput<Hypothesis>> {
        beam_search_decode_eos(
            model,
            src,
            src_lengths,
            tokenizer,
            eos_id,
            &self.config,
            self.backend.as_ref(),
        )
    }

    pub fn beam_search<M: Seq2SeqModel + ?Sized>(
        &self,
        model: &mut M,
        src: &Tensor,
        src_lengths: &[usize],
        tokenizer: &dyn Tokenizer,
    ) -> Result<BeamOutput<ScoredSequence>> {
        beam_search_decode(
            model,
            src,
            src_lengths,
            tokenizer,
            &self.config,
            self.backend.as_ref(),
        )
    }
}
