use crate::config::EndedMode;

/// Anything the top-k pruning can rank.
pub trait Scored {
    /// Cumulative log-probability; higher is better.
    fn score(&self) -> f32;

    /// The full fixed-capacity token buffer.
    fn tokens(&self) -> &[u32];
}

/// A token buffer with its cumulative log-probability.
///
/// The unit of the fixed-length beam search.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSequence {
    pub tokens: Vec<u32>,
    pub score: f32,
}

impl ScoredSequence {
    /// A buffer of `capacity` BOS ids with score zero.
    pub fn new(bos_id: u32, capacity: usize) -> Self {
        Self {
            tokens: vec![bos_id; capacity],
            score: 0.0,
        }
    }

    /// A copy of this sequence with `token` written at `pos`.
    ///
    /// The parent is left untouched, so siblings extended from the same
    /// parent never share a buffer.
    pub fn extend(&self, pos: usize, token: u32, log_prob: f32) -> Self {
        let mut tokens = self.tokens.clone();
        tokens[pos] = token;
        Self {
            tokens,
            score: self.score + log_prob,
        }
    }
}

impl Scored for ScoredSequence {
    fn score(&self) -> f32 {
        self.score
    }

    fn tokens(&self) -> &[u32] {
        &self.tokens
    }
}

/// A length-aware beam hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub seq: ScoredSequence,
    /// Generated length as handed to the model. See [`EndedMode`].
    pub length: usize,
    /// Set once EOS has been emitted; inherited by every descendant.
    pub ended: bool,
}

impl Hypothesis {
    /// The initial hypothesis: all BOS, length 1, score 0, not ended.
    pub fn new(bos_id: u32, capacity: usize) -> Self {
        Self {
            seq: ScoredSequence::new(bos_id, capacity),
            length: 1,
            ended: false,
        }
    }

    /// A copy of this hypothesis with `token` written at `pos`.
    pub fn extend(
        &self,
        pos: usize,
        token: u32,
        log_prob: f32,
        eos_id: u32,
        mode: EndedMode,
    ) -> Self {
        let length = match mode {
            EndedMode::Literal => token as usize,
            EndedMode::Corrected => self.length + 1,
        };
        Self {
            seq: self.seq.extend(pos, token, log_prob),
            length,
            ended: self.ended || token == eos_id,
        }
    }
}

impl Scored for Hypothesis {
    fn score(&self) -> f32 {
        self.seq.score
    }

    fn tokens(&self) -> &[u32] {
        &self.seq.tokens
    }
}

/// Keep the `k` best candidates, best first.
///
/// The sort is stable, so candidates with equal scores keep their expansion
/// order (parent slot, then token id).
pub fn select_top_k<H: Scored>(mut candidates: Vec<H>, k: usize) -> Vec<H> {
    candidates.sort_by(|a, b| b.score().total_cmp(&a.score()));
    candidates.truncate(k);
    candidates
}
