use crate::error::{Result, SamplerError};
use crate::sampler::{Sampler, TokenScore};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Distribution-based sampler: draws one token from the categorical
/// distribution given by the candidates' scores.
///
/// Scores are taken as probabilities, as produced by a softmax; any set of
/// non-negative weights with a positive finite sum is accepted. NaN,
/// infinite or negative weights, or an all-zero distribution, are rejected
/// with [`SamplerError::InvalidWeights`].
///
/// The RNG persists across calls, so consecutive draws differ while a fixed
/// seed still reproduces the whole sequence of draws.
pub struct DistSampler {
    rng: StdRng,
}

impl DistSampler {
    /// Create a new distribution sampler with the given seed for reproducibility.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a sampler seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Sampler for DistSampler {
    fn name(&self) -> &str {
        "dist"
    }

    fn apply(&mut self, candidates: &mut Vec<TokenScore>) -> Result<()> {
        if candidates.is_empty() {
            return Err(SamplerError::NoCandidates);
        }

        if let Some(bad) = candidates.iter().find(|t| !t.score.is_finite()) {
            return Err(SamplerError::InvalidWeights(format!(
                "token {} has weight {}",
                bad.token_id, bad.score
            )));
        }

        let dist = WeightedIndex::<f32>::new(candidates.iter().map(|t| t.score))
            .map_err(|e| SamplerError::InvalidWeights(e.to_string()))?;

        let selected = candidates[dist.sample(&mut self.rng)].clone();
        candidates.clear();
        candidates.push(selected);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SamplerChain;

    fn to_candidates(values: &[f32]) -> Vec<TokenScore> {
        values
            .iter()
            .enumerate()
            .map(|(i, &score)| TokenScore {
                token_id: i as u32,
                score,
            })
            .collect()
    }

    #[test]
    fn test_certain_token() {
        let mut chain = SamplerChain::new().with(Box::new(DistSampler::new(7)));
        for _ in 0..20 {
            assert_eq!(chain.sample(&[0.0, 1.0, 0.0]).unwrap(), 1);
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let probs = [1.0 / 16.0; 16];
        let mut a = SamplerChain::new().with(Box::new(DistSampler::new(42)));
        let mut b = SamplerChain::new().with(Box::new(DistSampler::new(42)));
        let draws_a: Vec<u32> = (0..32).map(|_| a.sample(&probs).unwrap()).collect();
        let draws_b: Vec<u32> = (0..32).map(|_| b.sample(&probs).unwrap()).collect();
        assert_eq!(draws_a, draws_b);

        // A persistent RNG does not repeat the same draw every step.
        assert!(draws_a.iter().any(|&t| t != draws_a[0]));
    }

    #[test]
    fn test_frequencies_follow_weights() {
        let probs = [0.75f32, 0.25];
        let mut sampler = DistSampler::new(1234);
        let n = 4000;
        let mut zeros = 0;
        for _ in 0..n {
            let mut c = to_candidates(&probs);
            sampler.apply(&mut c).unwrap();
            if c[0].token_id == 0 {
                zeros += 1;
            }
        }
        let freq = zeros as f32 / n as f32;
        assert!((freq - 0.75).abs() < 0.05, "frequency {} too far from 0.75", freq);
    }

    #[test]
    fn test_entropy_seeded_draws_are_valid() {
        let mut sampler = DistSampler::from_entropy();
        let mut c = to_candidates(&[0.2, 0.3, 0.5]);
        sampler.apply(&mut c).unwrap();
        assert_eq!(c.len(), 1);
        assert!(c[0].token_id < 3);
    }

    #[test]
    fn test_rejects_invalid_weights() {
        let mut sampler = DistSampler::new(1);
        for weights in [
            vec![0.0, 0.0, f32::NAN, 0.5],
            vec![0.5, f32::INFINITY],
            vec![0.5, -0.1],
            vec![0.0, 0.0],
        ] {
            let mut c = to_candidates(&weights);
            let err = sampler.apply(&mut c).unwrap_err();
            assert!(matches!(err, SamplerError::InvalidWeights(_)), "{:?}", weights);
        }
        assert!(matches!(sampler.apply(&mut Vec::new()), Err(SamplerError::NoCandidates)));
    }
}
