//! `sd-tensor` - Dense CPU tensors for seq-decode.
//!
//! This crate provides:
//! - A `Tensor` type holding either f32 logits or u32 token ids
//! - A `ComputeBackend` trait for the distribution math the decoders need
//! - A reference `CpuBackend` implementation
//! - Shape utilities (strides, offsets, outer-axis views)

pub mod backend;
pub mod cpu;
pub mod dtype;
pub mod error;
pub mod shape;
pub mod storage;
pub mod tensor;

// Re-export primary types at the crate root for convenience.
pub use backend::ComputeBackend;
pub use cpu::CpuBackend;
pub use dtype::DType;
pub use error::{Result, TensorError};
pub use shape::Shape;
pub use storage::CpuStorage;
pub use tensor::Tensor;
