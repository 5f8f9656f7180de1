use sd_model::{InferenceGuard, Seq2SeqModel, Tokenizer};
use sd_tensor::{ComputeBackend, Tensor};
use tracing::{debug, instrument, trace};

use super::hypothesis::{select_top_k, Hypothesis, Scored};
use super::{finish, gather_slot, BeamOutput, BeamSetup};
use crate::config::{DecodeConfig, EndedMode};
use crate::error::Result;
use crate::step::{check_logits, log_probs_at};

/// Beam search that tracks a length and an ended flag per hypothesis.
///
/// The model sees each slot's buffer without its final position, the source
/// lengths, and the per-hypothesis lengths. A hypothesis is marked ended
/// when it emits `eos_id`. What happens after that depends on
/// `config.ended_mode`:
///
/// - [`EndedMode::Literal`]: ended hypotheses keep expanding and scoring like
///   any other, and lengths are overwritten with the appended token id. The
///   loop always runs `max_decode_len - 1` steps.
/// - [`EndedMode::Corrected`]: ended hypotheses are carried into the next
///   step unchanged, and the loop stops as soon as every hypothesis of every
///   batch item has ended. Stopping early gives the same result as running
///   on, since frozen hypotheses no longer change.
#[instrument(
    skip_all,
    fields(max_decode_len = config.max_decode_len, k = config.beam_width, mode = ?config.ended_mode)
)]
pub fn beam_search_decode_eos<M: Seq2SeqModel + ?Sized>(
    model: &mut M,
    src: &Tensor,
    src_lengths: &[usize],
    tokenizer: &dyn Tokenizer,
    eos_id: u32,
    config: &DecodeConfig,
    backend: &dyn ComputeBackend,
) -> Result<BeamOutput<Hypothesis>> {
    let BeamSetup {
        batch,
        bos_id,
        vocab_size,
        max_len,
        beam_width,
    } = BeamSetup::new(src, src_lengths, tokenizer, config)?;
    let mode = config.ended_mode;
    debug!(batch, vocab_size, eos_id, "starting length-aware beam search");

    let mut model = InferenceGuard::new(model);
    let mut beams: Vec<Vec<Hypothesis>> = vec![vec![Hypothesis::new(bos_id, max_len)]; batch];
    let mut steps = 0;

    for t in 0..max_len - 1 {
        if mode == EndedMode::Corrected && beams.iter().flatten().all(|h| h.ended) {
            debug!(step = t, "every hypothesis has ended, stopping early");
            break;
        }

        let width = beams[0].len();
        let mut candidates: Vec<Vec<Hypothesis>> =
            vec![Vec::with_capacity(width * vocab_size); batch];

        for slot in 0..width {
            let prefix = gather_slot(&beams, slot, max_len).narrow_last(max_len - 1)?;
            let lengths: Vec<usize> = beams.iter().map(|beam| beam[slot].length).collect();

            let logits = model.forward(src, &prefix, Some(src_lengths), Some(&lengths))?;
            check_logits(&logits, batch, max_len - 1, vocab_size)?;
            let log_probs = log_probs_at(&logits, t, backend)?;

            for (b, row) in log_probs.iter().enumerate() {
                let parent = &beams[b][slot];
                if mode == EndedMode::Corrected && parent.ended {
                    candidates[b].push(parent.clone());
                    continue;
                }
                for (token, &log_p) in row.iter().enumerate() {
                    candidates[b].push(parent.extend(t + 1, token as u32, log_p, eos_id, mode));
                }
            }
        }

        beams = candidates
            .into_iter()
            .map(|c| select_top_k(c, beam_width))
            .collect();
        steps += 1;
        trace!(step = t, best = beams[0][0].score(), "pruned beam");
    }

    debug!(steps, "length-aware beam search finished");
    finish(beams, max_len, steps, tokenizer)
}
