use crate::error::{DecodeError, Result};

/// How the length-aware beam search treats hypotheses that emitted EOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndedMode {
    /// Ended hypotheses keep expanding over the whole vocabulary and keep
    /// accumulating log-probability, and a candidate's length is set to the
    /// id of the token it appended. Matches the historical behaviour.
    #[default]
    Literal,
    /// Ended hypotheses are carried forward unchanged (buffer, length and
    /// score frozen) and live hypotheses grow their length by one per step.
    /// The search stops once every hypothesis has ended.
    Corrected,
}

/// Settings shared by all decoding strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeConfig {
    /// Maximum number of tokens per output sequence, BOS included.
    pub max_decode_len: usize,
    /// Number of hypotheses kept per batch item (beam search only).
    pub beam_width: usize,
    /// Sample from the softmax instead of taking the argmax (greedy only).
    pub sample: bool,
    /// RNG seed for sampling. `None` draws a seed from the OS.
    pub seed: Option<u64>,
    /// EOS handling for the length-aware beam search.
    pub ended_mode: EndedMode,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_decode_len: 20,
            beam_width: 3,
            sample: true,
            seed: None,
            ended_mode: EndedMode::Literal,
        }
    }
}

impl DecodeConfig {
    pub fn with_max_decode_len(mut self, max_decode_len: usize) -> Self {
        self.max_decode_len = max_decode_len;
        self
    }

    pub fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width;
        self
    }

    pub fn with_sample(mut self, sample: bool) -> Self {
        self.sample = sample;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_ended_mode(mut self, ended_mode: EndedMode) -> Self {
        self.ended_mode = ended_mode;
        self
    }

    /// Check the settings that do not depend on the model or tokenizer.
    pub fn validate(&self) -> Result<()> {
        if self.max_decode_len == 0 {
            return Err(DecodeError::InvalidConfig(
                "max_decode_len must be at least 1 (room for BOS)".to_string(),
            ));
        }
        if self.beam_width == 0 {
            return Err(DecodeError::InvalidConfig(
                "beam_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
