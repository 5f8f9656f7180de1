use std::collections::HashMap;
use std::io::BufRead;

use tracing::debug;

use crate::error::{ModelError, Result};

/// Token vocabulary: pieces indexed by id plus the reverse lookup.
#[derive(Debug, Clone)]
pub struct Vocab {
    /// Piece strings, indexed by token ID.
    pub pieces: Vec<String>,
    /// Reverse mapping from piece string to token ID.
    pub piece_to_id: HashMap<String, u32>,
}

impl Vocab {
    /// Build a vocabulary from pieces in id order.
    pub fn from_pieces<I, S>(pieces: I) -> Result<Vocab>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(pieces.into_iter().map(Into::into).collect())
    }

    /// Read a SentencePiece-style vocabulary listing.
    ///
    /// One piece per line, in id order, optionally followed by a tab and a
    /// float score. Scores only matter for encoding, so they are checked for
    /// well-formedness and dropped:
    ///
    /// ```text
    /// <unk>	0
    /// <s>	0
    /// </s>	0
    /// ▁the	-3.21
    /// ```
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Vocab> {
        let mut pieces = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let piece = match line.split_once('\t') {
                Some((piece, score)) => {
                    score.trim().parse::<f32>().map_err(|e| {
                        ModelError::TokenizerError(format!(
                            "line {}: invalid score {:?}: {}",
                            line_no + 1,
                            score,
                            e
                        ))
                    })?;
                    piece
                }
                None => line.as_str(),
            };
            pieces.push(piece.to_string());
        }

        debug!(pieces = pieces.len(), "read vocabulary listing");
        Self::build(pieces)
    }

    fn build(pieces: Vec<String>) -> Result<Vocab> {
        if pieces.is_empty() {
            return Err(ModelError::TokenizerError("empty vocabulary".to_string()));
        }

        let mut piece_to_id = HashMap::with_capacity(pieces.len());
        for (id, piece) in pieces.iter().enumerate() {
            if piece_to_id.insert(piece.clone(), id as u32).is_some() {
                return Err(ModelError::TokenizerError(format!(
                    "duplicate piece {:?} at id {}",
                    piece, id
                )));
            }
        }

        Ok(Vocab {
            pieces,
            piece_to_id,
        })
    }

    /// Number of pieces in the vocabulary.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Returns true if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}
