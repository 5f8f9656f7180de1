//! Beam search decoding.
//!
//! Both variants keep up to `k` hypotheses per batch item. Every step each
//! hypothesis is extended with every vocabulary id (k x V candidates per
//! item), and the `k` best candidates by cumulative log-probability become
//! the next beam. The model is called once per beam slot, covering the whole
//! batch.

pub mod fixed;
pub mod hypothesis;
pub mod length_aware;

pub use fixed::beam_search_decode;
pub use hypothesis::{select_top_k, Hypothesis, Scored, ScoredSequence};
pub use length_aware::beam_search_decode_eos;

use sd_model::Tokenizer;
use sd_tensor::{Shape, Tensor};

use crate::config::DecodeConfig;
use crate::error::{DecodeError, Result};
use crate::render::{ids_to_strs, Rendered};
use crate::step::batch_size;

/// Result of a beam search.
#[derive(Debug, Clone)]
pub struct BeamOutput<H> {
    /// `[B][k]` strings, best hypothesis first.
    pub text: Rendered,
    /// Cumulative log-probabilities, `[B, k]`, descending along each row.
    pub scores: Tensor,
    /// Token buffers, `[B, k, max_decode_len]`.
    pub ids: Tensor,
    /// The final beam of each batch item, best first.
    pub beams: Vec<Vec<H>>,
    /// Number of extension steps that ran.
    pub steps: usize,
}

/// Fixed facts about one beam search call.
pub(crate) struct BeamSetup {
    pub batch: usize,
    pub bos_id: u32,
    pub vocab_size: usize,
    pub max_len: usize,
    pub beam_width: usize,
}

impl BeamSetup {
    pub(crate) fn new(
        src: &Tensor,
        src_lengths: &[usize],
        tokenizer: &dyn Tokenizer,
        config: &DecodeConfig,
    ) -> Result<Self> {
        config.validate()?;
        let batch = batch_size(src)?;
        if batch == 0 {
            return Err(DecodeError::InvalidInput(
                "beam search needs at least one batch item".to_string(),
            ));
        }
        if src_lengths.len() != batch {
            return Err(DecodeError::InvalidInput(format!(
                "got {} source lengths for a batch of {}",
                src_lengths.len(),
                batch
            )));
        }
        let vocab_size = tokenizer.vocab_size();
        if config.beam_width > vocab_size {
            return Err(DecodeError::InvalidConfig(format!(
                "beam_width {} exceeds vocabulary size {}",
                config.beam_width, vocab_size
            )));
        }
        Ok(Self {
            batch,
            bos_id: tokenizer.bos_id()?,
            vocab_size,
            max_len: config.max_decode_len,
            beam_width: config.beam_width,
        })
    }
}

/// Stack slot `slot` of every batch item's beam into a `[B, T]` id tensor.
pub(crate) fn gather_slot<H: Scored>(beams: &[Vec<H>], slot: usize, max_len: usize) -> Tensor {
    let mut data = Vec::with_capacity(beams.len() * max_len);
    for beam in beams {
        data.extend_from_slice(beam[slot].tokens());
    }
    Tensor::from_ids(data, Shape::new(vec![beams.len(), max_len]))
}

/// Stack the final beams into id/score tensors and render them.
pub(crate) fn finish<H: Scored>(
    beams: Vec<Vec<H>>,
    max_len: usize,
    steps: usize,
    tokenizer: &dyn Tokenizer,
) -> Result<BeamOutput<H>> {
    let batch = beams.len();
    let width = beams.first().map_or(0, Vec::len);

    let mut ids = Vec::with_capacity(batch * width * max_len);
    let mut scores = Vec::with_capacity(batch * width);
    for beam in &beams {
        for h in beam {
            ids.extend_from_slice(h.tokens());
            scores.push(h.score());
        }
    }

    let ids = Tensor::from_ids(ids, Shape::new(vec![batch, width, max_len]));
    let scores = Tensor::new(scores, Shape::new(vec![batch, width]));
    let text = ids_to_strs(&ids, tokenizer)?;

    Ok(BeamOutput {
        text,
        scores,
        ids,
        beams,
        steps,
    })
}
