use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::vocab::Vocab;
use super::Tokenizer;
use crate::error::Result;

/// Word-boundary marker used by SentencePiece vocabularies.
const WORD_BOUNDARY: char = '\u{2581}';

/// Pieces that never appear in decoded text.
const CONTROL_PIECES: [&str; 4] = ["<s>", "</s>", "<pad>", "<unk>"];

/// Piece-level tokenizer over a fixed vocabulary.
///
/// Decoding follows the SentencePiece conventions: control pieces are
/// dropped, `▁` becomes a space (one leading space is stripped), and byte
/// pieces of the form `<0xHH>` are emitted as raw bytes.
#[derive(Debug, Clone)]
pub struct VocabTokenizer {
    /// The piece vocabulary.
    pub vocab: Vocab,
    control_ids: HashSet<u32>,
}

impl VocabTokenizer {
    pub fn new(vocab: Vocab) -> Self {
        let control_ids = CONTROL_PIECES
            .iter()
            .filter_map(|piece| vocab.piece_to_id.get(*piece).copied())
            .collect();
        Self { vocab, control_ids }
    }

    /// Build a tokenizer from pieces listed in id order.
    pub fn from_pieces<I, S>(pieces: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(Vocab::from_pieces(pieces)?))
    }

    /// Load a tokenizer from a SentencePiece-style vocabulary listing.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Ok(Self::new(Vocab::from_reader(reader)?))
    }

    /// Load a tokenizer from a vocabulary file on disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

/// Parse a `<0xHH>` byte piece.
fn byte_piece(piece: &str) -> Option<u8> {
    let hex = piece.strip_prefix("<0x")?.strip_suffix('>')?;
    if hex.len() != 2 {
        return None;
    }
    u8::from_str_radix(hex, 16).ok()
}

impl Tokenizer for VocabTokenizer {
    fn piece_to_id(&self, piece: &str) -> Option<u32> {
        self.vocab.piece_to_id.get(piece).copied()
    }

    fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    fn decode_ids(&self, ids: &[u32]) -> String {
        let mut bytes: Vec<u8> = Vec::new();

        for &id in ids {
            if self.control_ids.contains(&id) {
                continue;
            }
            let Some(piece) = self.vocab.pieces.get(id as usize) else {
                continue;
            };

            if let Some(byte) = byte_piece(piece) {
                bytes.push(byte);
                continue;
            }

            let text = piece.replace(WORD_BOUNDARY, " ");
            bytes.extend_from_slice(text.as_bytes());
        }

        let text = String::from_utf8_lossy(&bytes).into_owned();
        match text.strip_prefix(' ') {
            Some(rest) => rest.to_string(),
            None => text,
        }
    }
}
