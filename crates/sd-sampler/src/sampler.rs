use crate::error::{Result, SamplerError};

/// A token ID paired with its score.
///
/// What the score means depends on the stage of the chain: raw logits for
/// filters, probabilities for the final selector.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenScore {
    pub token_id: u32,
    pub score: f32,
}

/// Trait for samplers that modify or select from a set of scored tokens.
pub trait Sampler: Send {
    /// Returns the name of this sampler.
    fn name(&self) -> &str;

    /// Modify candidates in-place (filtering, selecting).
    ///
    /// Takes `&mut self` so stateful samplers can advance an RNG between
    /// calls.
    fn apply(&mut self, candidates: &mut Vec<TokenScore>) -> Result<()>;
}

/// Composes multiple samplers into a pipeline.
/// The last sampler in the chain should be a selector.
pub struct SamplerChain {
    samplers: Vec<Box<dyn Sampler>>,
}

impl SamplerChain {
    /// Create a new empty sampler chain.
    pub fn new() -> Self {
        Self {
            samplers: Vec::new(),
        }
    }

    /// Add a sampler to the end of the chain. Returns self for builder-style usage.
    pub fn with(mut self, sampler: Box<dyn Sampler>) -> Self {
        self.samplers.push(sampler);
        self
    }

    /// Names of the samplers in order, for diagnostics.
    pub fn names(&self) -> Vec<&str> {
        self.samplers.iter().map(|s| s.name()).collect()
    }

    /// Run all samplers in order on `scores`, return the selected token ID.
    ///
    /// 1. Converts the `&[f32]` scores into `Vec<TokenScore>` (token_id = index).
    /// 2. Applies each sampler in sequence, stopping at the first error.
    /// 3. Returns the first remaining token's id (the selected one).
    pub fn sample(&mut self, scores: &[f32]) -> Result<u32> {
        let mut candidates: Vec<TokenScore> = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| TokenScore {
                token_id: i as u32,
                score,
            })
            .collect();

        for sampler in &mut self.samplers {
            sampler.apply(&mut candidates)?;
        }

        candidates
            .first()
            .map(|t| t.token_id)
            .ok_or(SamplerError::NoCandidates)
    }
}

impl Default for SamplerChain {
    fn default() -> Self {
        Self::new()
    }
}
