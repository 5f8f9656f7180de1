use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid decode config: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("model returned logits of shape {got:?}, expected {expected:?}")]
    LogitsShape { expected: Vec<usize>, got: Vec<usize> },
    #[error("model returned logit {value} for token {token} of item {item} at position {position}")]
    InvalidLogit {
        item: usize,
        position: usize,
        token: u32,
        value: f32,
    },
    #[error("sampler error: {0}")]
    Sampler(#[from] sd_sampler::SamplerError),
    #[error("model error: {0}")]
    Model(#[from] sd_model::ModelError),
    #[error("tensor error: {0}")]
    Tensor(#[from] sd_tensor::TensorError),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
