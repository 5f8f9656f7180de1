//! `sd-model` - The model and tokenizer seams the decoders are written against.
//!
//! - `Seq2SeqModel`: scores next tokens for a batch of target prefixes
//! - `InferenceGuard`: scoped switch into inference mode
//! - `Tokenizer`: id/piece lookup and text decoding
//! - `VocabTokenizer` and `BigramModel`: small concrete implementations

pub mod bigram;
pub mod error;
pub mod model;
pub mod tokenizer;

pub use bigram::BigramModel;
pub use error::{ModelError, Result};
pub use model::{InferenceGuard, ModelMode, Seq2SeqModel};
pub use tokenizer::{Tokenizer, Vocab, VocabTokenizer};
