pub mod dist;
pub mod error;
pub mod sampler;

pub use dist::DistSampler;
pub use error::{Result, SamplerError};
pub use sampler::{Sampler, SamplerChain, TokenScore};
