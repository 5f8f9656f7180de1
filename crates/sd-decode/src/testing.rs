//! Test doubles shared by the decoder tests.

use std::sync::Mutex;

use sd_model::{BigramModel, ModelError, ModelMode, Seq2SeqModel, Tokenizer, VocabTokenizer};
use sd_tensor::{Shape, Tensor};

pub const BOS: u32 = 1;
pub const EOS: u32 = 2;

/// Tokenizer with `<pad>`, `<s>`, `</s>` at ids 0..3 and `▁tN` pieces after.
pub fn tokenizer(vocab_size: usize) -> VocabTokenizer {
    let mut pieces = vec!["<pad>".to_string(), "<s>".to_string(), "</s>".to_string()];
    for id in 3..vocab_size {
        pieces.push(format!("\u{2581}t{}", id));
    }
    VocabTokenizer::from_pieces(pieces).unwrap()
}

/// Source batch of `batch` items; its content is ignored by the test models.
pub fn src(batch: usize) -> Tensor {
    Tensor::zeros(Shape::new(vec![batch, 4]))
}

/// A bigram model with distinct, seed-dependent logits per row.
pub fn scrambled(vocab_size: usize, seed: u64) -> BigramModel {
    BigramModel::from_fn(vocab_size, |prev, next| {
        let h = (prev as u64)
            .wrapping_mul(2_654_435_761)
            .wrapping_add((next as u64).wrapping_mul(40_503))
            .wrapping_add(seed.wrapping_mul(97_531));
        (h % 1000) as f32 / 100.0 + next as f32 * 1e-4
    })
    .unwrap()
}

/// A bigram model where EOS is by far the most likely next token, except
/// after EOS where `after_eos` is.
pub fn eos_heavy(vocab_size: usize, after_eos: u32) -> BigramModel {
    BigramModel::from_fn(vocab_size, move |prev, next| {
        let favoured = if prev == EOS { after_eos } else { EOS };
        if next == favoured {
            20.0
        } else {
            next as f32 * 0.01
        }
    })
    .unwrap()
}

/// Tokenizer that records every id slice it is asked to decode.
pub struct RecordingTokenizer {
    pub inner: VocabTokenizer,
    pub decoded: Mutex<Vec<Vec<u32>>>,
}

impl RecordingTokenizer {
    pub fn new(vocab_size: usize) -> Self {
        Self {
            inner: tokenizer(vocab_size),
            decoded: Mutex::new(Vec::new()),
        }
    }

    pub fn decoded(&self) -> Vec<Vec<u32>> {
        self.decoded.lock().unwrap().clone()
    }
}

impl Tokenizer for RecordingTokenizer {
    fn piece_to_id(&self, piece: &str) -> Option<u32> {
        self.inner.piece_to_id(piece)
    }

    fn vocab_size(&self) -> usize {
        self.inner.vocab_size()
    }

    fn decode_ids(&self, ids: &[u32]) -> String {
        self.decoded.lock().unwrap().push(ids.to_vec());
        self.inner.decode_ids(ids)
    }
}

/// One recorded `forward` call.
#[derive(Debug, Clone)]
pub struct Call {
    pub prefix: Tensor,
    pub src_lengths: Option<Vec<usize>>,
    pub tgt_lengths: Option<Vec<usize>>,
    pub mode: ModelMode,
}

/// Wraps a model, recording every call and optionally failing on one.
pub struct Recorder<M> {
    pub inner: M,
    pub calls: Vec<Call>,
    pub fail_on_call: Option<usize>,
}

impl<M> Recorder<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            calls: Vec::new(),
            fail_on_call: None,
        }
    }

    pub fn failing_on(inner: M, call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new(inner)
        }
    }
}

impl<M: Seq2SeqModel> Seq2SeqModel for Recorder<M> {
    fn forward(
        &mut self,
        src: &Tensor,
        prefix: &Tensor,
        src_lengths: Option<&[usize]>,
        tgt_lengths: Option<&[usize]>,
    ) -> sd_model::Result<Tensor> {
        self.calls.push(Call {
            prefix: prefix.clone(),
            src_lengths: src_lengths.map(<[usize]>::to_vec),
            tgt_lengths: tgt_lengths.map(<[usize]>::to_vec),
            mode: self.inner.mode(),
        });
        if self.fail_on_call == Some(self.calls.len()) {
            return Err(ModelError::Other("injected failure".to_string()));
        }
        self.inner.forward(src, prefix, src_lengths, tgt_lengths)
    }

    fn mode(&self) -> ModelMode {
        self.inner.mode()
    }

    fn set_mode(&mut self, mode: ModelMode) {
        self.inner.set_mode(mode);
    }
}

/// A model that returns logits with one position too few.
#[derive(Default)]
pub struct ShortLogits {
    pub mode: ModelMode,
}

impl Seq2SeqModel for ShortLogits {
    fn forward(
        &mut self,
        _src: &Tensor,
        prefix: &Tensor,
        _src_lengths: Option<&[usize]>,
        _tgt_lengths: Option<&[usize]>,
    ) -> sd_model::Result<Tensor> {
        let dims = prefix.shape().dims();
        let len = dims[1].saturating_sub(1);
        Ok(Tensor::zeros(Shape::new(vec![dims[0], len, 8])))
    }

    fn mode(&self) -> ModelMode {
        self.mode
    }

    fn set_mode(&mut self, mode: ModelMode) {
        self.mode = mode;
    }
}

/// Scores batch row `b` with `models[b]`, so batch items can follow
/// different distributions.
pub struct PerItem<M> {
    pub models: Vec<M>,
    pub mode: ModelMode,
}

impl<M> PerItem<M> {
    pub fn new(models: Vec<M>) -> Self {
        Self {
            models,
            mode: ModelMode::default(),
        }
    }
}

impl<M: Seq2SeqModel> Seq2SeqModel for PerItem<M> {
    fn forward(
        &mut self,
        _src: &Tensor,
        prefix: &Tensor,
        _src_lengths: Option<&[usize]>,
        _tgt_lengths: Option<&[usize]>,
    ) -> sd_model::Result<Tensor> {
        let len = prefix.shape().dim(1);
        let mut data = Vec::new();
        let mut vocab_size = 0;
        for (b, model) in self.models.iter_mut().enumerate() {
            let row = Tensor::from_ids(prefix.ids_lane(&[b])?.to_vec(), Shape::new(vec![1, len]));
            let logits = model.forward(&src(1), &row, None, None)?;
            vocab_size = logits.shape().dim(2);
            data.extend_from_slice(logits.data_f32()?);
        }
        Ok(Tensor::new(
            data,
            Shape::new(vec![self.models.len(), len, vocab_size]),
        ))
    }

    fn mode(&self) -> ModelMode {
        self.mode
    }

    fn set_mode(&mut self, mode: ModelMode) {
        self.mode = mode;
    }
}
