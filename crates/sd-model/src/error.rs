use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tokenizer has no piece {0:?}")]
    MissingPiece(String),
    #[error("tokenizer error: {0}")]
    TokenizerError(String),
    #[error("token id {id} exceeds vocab size {vocab_size}")]
    InvalidToken { id: u32, vocab_size: usize },
    #[error("tensor error: {0}")]
    TensorError(#[from] sd_tensor::TensorError),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
