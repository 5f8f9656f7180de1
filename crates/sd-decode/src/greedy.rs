use sd_model::{InferenceGuard, Seq2SeqModel, Tokenizer};
use sd_sampler::{DistSampler, SamplerChain};
use sd_tensor::{ComputeBackend, Shape, Tensor};
use tracing::{debug, instrument, trace};

use crate::config::DecodeConfig;
use crate::error::Result;
use crate::render::{ids_to_strs, Rendered};
use crate::step::{batch_size, check_logits, valid_lane};

/// Result of a greedy or sampled decode.
#[derive(Debug, Clone)]
pub struct GreedyOutput {
    /// One string per batch item.
    pub text: Rendered,
    /// Generated ids, `[B, max_decode_len]`, BOS in column 0.
    pub ids: Tensor,
}

/// The sampler chain used when `config.sample` is set, `None` for argmax.
fn sampler_chain(config: &DecodeConfig) -> Option<SamplerChain> {
    if !config.sample {
        return None;
    }
    let sampler = match config.seed {
        Some(seed) => DistSampler::new(seed),
        None => DistSampler::from_entropy(),
    };
    Some(SamplerChain::new().with(Box::new(sampler)))
}

/// Decode one token at a time, keeping a single hypothesis per batch item.
///
/// At step `t` the model sees the whole `[B, max_decode_len]` buffer and the
/// logits at position `t` pick the token written to `t + 1`. With
/// `config.sample` the token is drawn from `backend.softmax` of those logits,
/// otherwise it is `backend.argmax`. The model is held in inference mode for
/// the duration of the call.
///
/// A NaN or `+inf` logit fails the decode with
/// [`DecodeError::InvalidLogit`](crate::DecodeError::InvalidLogit).
#[instrument(skip_all, fields(max_decode_len = config.max_decode_len, sample = config.sample))]
pub fn greedy_decode<M: Seq2SeqModel + ?Sized>(
    model: &mut M,
    src: &Tensor,
    tokenizer: &dyn Tokenizer,
    config: &DecodeConfig,
    backend: &dyn ComputeBackend,
) -> Result<GreedyOutput> {
    config.validate()?;
    let batch = batch_size(src)?;
    let bos_id = tokenizer.bos_id()?;
    let vocab_size = tokenizer.vocab_size();
    let max_len = config.max_decode_len;
    let mut chain = sampler_chain(config);
    debug!(
        batch,
        vocab_size,
        backend = backend.name(),
        samplers = ?chain.as_ref().map(SamplerChain::names),
        "starting greedy decode"
    );

    let mut model = InferenceGuard::new(model);
    let mut ys = Tensor::full_ids(bos_id, Shape::new(vec![batch, max_len]));

    for t in 0..max_len - 1 {
        let logits = model.forward(src, &ys, None, None)?;
        check_logits(&logits, batch, max_len, vocab_size)?;

        let mut next = Vec::with_capacity(batch);
        for b in 0..batch {
            let row = valid_lane(&logits, b, t)?;
            let id = match chain.as_mut() {
                Some(chain) => chain.sample(&backend.softmax(row, vocab_size)?)?,
                None => backend.argmax(row, vocab_size)?[0],
            };
            next.push(id);
        }
        trace!(step = t, ?next, "selected tokens");

        let buffer = ys.ids_mut()?;
        for (b, id) in next.into_iter().enumerate() {
            buffer[b * max_len + t + 1] = id;
        }
    }

    let text = ids_to_strs(&ys, tokenizer)?;
    debug!(batch, "greedy decode finished");
    Ok(GreedyOutput { text, ids: ys })
}
