use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("no candidate left to select from")]
    NoCandidates,
    #[error("invalid sampling weights: {0}")]
    InvalidWeights(String),
}

pub type Result<T> = std::result::Result<T, SamplerError>;
