pub mod piece;
pub mod vocab;

pub use piece::VocabTokenizer;
pub use vocab::Vocab;

use crate::error::{ModelError, Result};

/// Symbolic piece for the start-of-sequence token.
pub const BOS_PIECE: &str = "<s>";
/// Symbolic piece for the end-of-sequence token.
pub const EOS_PIECE: &str = "</s>";

/// Maps token ids to text for the decoders.
pub trait Tokenizer: Send + Sync {
    /// Look up the id of a vocabulary piece.
    fn piece_to_id(&self, piece: &str) -> Option<u32>;

    /// Number of pieces in the vocabulary.
    fn vocab_size(&self) -> usize;

    /// Decode a sequence of token ids into text.
    fn decode_ids(&self, ids: &[u32]) -> String;

    /// The start-of-sequence id, looked up by its piece.
    fn bos_id(&self) -> Result<u32> {
        self.piece_to_id(BOS_PIECE)
            .ok_or_else(|| ModelError::MissingPiece(BOS_PIECE.to_string()))
    }

    /// The end-of-sequence id, looked up by its piece.
    fn eos_id(&self) -> Result<u32> {
        self.piece_to_id(EOS_PIECE)
            .ok_or_else(|| ModelError::MissingPiece(EOS_PIECE.to_string()))
    }
}
