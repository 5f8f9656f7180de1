//! `sd-decode` - Inference-time search for sequence-to-sequence models.
//!
//! Turns per-step next-token distributions from a [`Seq2SeqModel`] into
//! complete token sequences under a fixed step budget:
//!
//! - [`greedy_decode`]: one hypothesis per item, argmax or sampled
//! - [`beam_search_decode_eos`]: beam search with per-hypothesis length and
//!   EOS tracking
//! - [`beam_search_decode`]: beam search over a fixed number of steps
//! - [`ids_to_strs`]: renders id tensors of any rank as nested text
//!
//! [`Seq2SeqModel`]: sd_model::Seq2SeqModel

pub mod beam;
pub mod config;
pub mod decoder;
pub mod error;
pub mod greedy;
pub mod render;
mod step;
#[cfg(test)]
mod testing;

pub use beam::{beam_search_decode, beam_search_decode_eos, BeamOutput, Hypothesis, ScoredSequence};
pub use config::{DecodeConfig, EndedMode};
pub use decoder::Decoder;
pub use error::{DecodeError, Result};
pub use greedy::{greedy_decode, GreedyOutput};
pub use render::{ids_to_strs, Rendered};
