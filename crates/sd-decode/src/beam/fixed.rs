use sd_model::{InferenceGuard, Seq2SeqModel, Tokenizer};
use sd_tensor::{ComputeBackend, Tensor};
use tracing::{debug, instrument, trace};

use super::hypothesis::{select_top_k, Scored, ScoredSequence};
use super::{finish, gather_slot, BeamOutput, BeamSetup};
use crate::config::DecodeConfig;
use crate::error::Result;
use crate::step::{check_logits, log_probs_at};

/// Beam search without per-hypothesis length or EOS bookkeeping.
///
/// Every hypothesis is extended for the full `max_decode_len - 1` steps.
/// At step `t` the model sees each slot's first `t + 1` tokens, and one
/// shared length counter (starting at 1, one more per step) is passed as the
/// target length of every batch item, plus one.
#[instrument(skip_all, fields(max_decode_len = config.max_decode_len, k = config.beam_width))]
pub fn beam_search_decode<M: Seq2SeqModel + ?Sized>(
    model: &mut M,
    src: &Tensor,
    src_lengths: &[usize],
    tokenizer: &dyn Tokenizer,
    config: &DecodeConfig,
    backend: &dyn ComputeBackend,
) -> Result<BeamOutput<ScoredSequence>> {
    let BeamSetup {
        batch,
        bos_id,
        vocab_size,
        max_len,
        beam_width,
    } = BeamSetup::new(src, src_lengths, tokenizer, config)?;
    debug!(batch, vocab_size, "starting fixed-length beam search");

    let mut model = InferenceGuard::new(model);
    let mut beams: Vec<Vec<ScoredSequence>> =
        vec![vec![ScoredSequence::new(bos_id, max_len)]; batch];
    let mut generated_len = 1usize;
    let mut steps = 0;

    for t in 0..max_len - 1 {
        let width = beams[0].len();
        let mut candidates: Vec<Vec<ScoredSequence>> =
            vec![Vec::with_capacity(width * vocab_size); batch];
        let tgt_lengths = vec![generated_len + 1; batch];

        for slot in 0..width {
            let prefix = gather_slot(&beams, slot, max_len).narrow_last(t + 1)?;
            let logits = model.forward(src, &prefix, Some(src_lengths), Some(&tgt_lengths))?;
            check_logits(&logits, batch, t + 1, vocab_size)?;
            let log_probs = log_probs_at(&logits, t, backend)?;

            for (b, row) in log_probs.iter().enumerate() {
                let parent = &beams[b][slot];
                for (token, &log_p) in row.iter().enumerate() {
                    candidates[b].push(parent.extend(t + 1, token as u32, log_p));
                }
            }
        }

        beams = candidates
            .into_iter()
            .map(|c| select_top_k(c, beam_width))
            .collect();
        generated_len += 1;
        steps += 1;
        trace!(step = t, best = beams[0][0].score(), "pruned beam");
    }

    debug!(steps, "fixed-length beam search finished");
    finish(beams, max_len, steps, tokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::beam_search_decode_eos;
    use crate::greedy::greedy_decode;
    use crate::testing::{eos_heavy, scrambled, src, tokenizer, Recorder, BOS, EOS};
    use crate::error::DecodeError;
    use sd_model::{BigramModel, ModelMode};
    use sd_tensor::CpuBackend;

    fn config(max_len: usize, k: usize) -> DecodeConfig {
        DecodeConfig::default()
            .with_max_decode_len(max_len)
            .with_beam_width(k)
    }

    #[test]
    fn test_output_shapes_and_sorted_scores() {
        let mut model = scrambled(10, 3);
        let tok = tokenizer(10);
        let backend = CpuBackend::new();
        let out = beam_search_decode(&mut model, &src(2), &[4, 4], &tok, &config(5, 3), &backend)
            .unwrap();

        assert_eq!(out.ids.shape().dims(), &[2, 3, 5]);
        assert_eq!(out.scores.shape().dims(), &[2, 3]);
        assert_eq!(out.text.shape(), vec![2, 3]);
        for b in 0..2 {
            let row = out.scores.lane(&[b]).unwrap();
            assert!(row[0] >= row[1] && row[1] >= row[2], "unsorted {:?}", row);
        }
    }

    #[test]
    fn test_growing_prefix_and_shared_length() {
        let mut recorder = Recorder::new(scrambled(7, 5));
        let tok = tokenizer(7);
        let backend = CpuBackend::new();
        let out = beam_search_decode(&mut recorder, &src(2), &[3, 5], &tok, &config(5, 3), &backend)
            .unwrap();

        assert_eq!(out.steps, 4);
        assert_eq!(recorder.calls.len(), 1 + 3 * 3);

        let mut expected_steps = vec![0];
        for t in 1..4 {
            expected_steps.extend([t; 3]);
        }
        for (call, t) in recorder.calls.iter().zip(expected_steps) {
            assert_eq!(call.prefix.shape().dims(), &[2, t + 1]);
            assert_eq!(call.tgt_lengths.as_deref(), Some(&[t + 2, t + 2][..]));
            assert_eq!(call.src_lengths.as_deref(), Some(&[3, 5][..]));
            assert_eq!(call.mode, ModelMode::Inference);
        }
        assert_eq!(recorder.mode(), ModelMode::Training);
    }

    #[test]
    fn test_keeps_extending_after_eos() {
        let mut recorder = Recorder::new(eos_heavy(8, EOS));
        let tok = tokenizer(8);
        let backend = CpuBackend::new();
        let out = beam_search_decode(&mut recorder, &src(1), &[2], &tok, &config(6, 2), &backend)
            .unwrap();
        assert_eq!(out.steps, 5);
        assert_eq!(recorder.calls.len(), 1 + 2 * 4);
        assert_eq!(out.beams[0][0].tokens, vec![BOS, EOS, EOS, EOS, EOS, EOS]);
    }

    #[test]
    fn test_width_one_matches_greedy_argmax() {
        let tok = tokenizer(13);
        let mut model = scrambled(13, 21);
        let backend = CpuBackend::new();
        let beam = beam_search_decode(&mut model, &src(2), &[1, 1], &tok, &config(8, 1), &backend)
            .unwrap();
        let argmax = config(8, 1).with_sample(false);
        let greedy = greedy_decode(&mut model, &src(2), &tok, &argmax, &backend).unwrap();
        assert_eq!(beam.ids.ids().unwrap(), greedy.ids.ids().unwrap());
        assert_eq!(
            beam.text.into_nested_texts().unwrap(),
            greedy
                .text
                .into_texts()
                .unwrap()
                .into_iter()
                .map(|s| vec![s])
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_agrees_with_literal_length_aware_search_on_causal_model() {
        let tok = tokenizer(9);
        let mut model = scrambled(9, 8);
        let backend = CpuBackend::new();
        let cfg = config(6, 3);
        let fixed = beam_search_decode(&mut model, &src(2), &[2, 2], &tok, &cfg, &backend).unwrap();
        let eos = beam_search_decode_eos(&mut model, &src(2), &[2, 2], &tok, EOS, &cfg, &backend)
            .unwrap();
        assert_eq!(fixed.ids, eos.ids);
        assert_eq!(fixed.scores, eos.scores);
    }

    #[test]
    fn test_nan_logits_fail_the_search() {
        // Row 4 has a NaN for token 1; step 0 puts 4 in the second slot.
        let model = BigramModel::from_fn(6, |prev, next| {
            if prev == 4 && next == 1 {
                f32::NAN
            } else {
                next as f32
            }
        })
        .unwrap();
        let mut recorder = Recorder::new(model);
        let tok = tokenizer(6);
        let backend = CpuBackend::new();
        let err = beam_search_decode(&mut recorder, &src(1), &[1], &tok, &config(4, 3), &backend)
            .unwrap_err();
        assert!(
            matches!(err, DecodeError::InvalidLogit { item: 0, position: 1, token: 1, .. }),
            "{:?}",
            err
        );
        assert_eq!(recorder.calls.len(), 3);
        assert_eq!(recorder.mode(), ModelMode::Training);
    }
}
