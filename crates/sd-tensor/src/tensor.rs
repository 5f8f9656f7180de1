use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// A tensor backed by CPU storage.
///
/// Holds contiguous, row-major data with an associated shape. Float tensors
/// carry model logits; `u32` tensors carry token id buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    storage: CpuStorage,
    shape: Shape,
}

impl Tensor {
    /// Create a new float tensor from f32 data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {:?} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor {
            storage: CpuStorage::from_f32_vec(data),
            shape,
        }
    }

    /// Create a token id tensor from u32 data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn from_ids(data: Vec<u32>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "id count {} does not match shape {:?} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor {
            storage: CpuStorage::from_u32_vec(data),
            shape,
        }
    }

    /// Create a token id tensor with every element set to `id`.
    pub fn full_ids(id: u32, shape: Shape) -> Self {
        let n = shape.numel();
        Tensor {
            storage: CpuStorage::from_u32_vec(vec![id; n]),
            shape,
        }
    }

    /// Create a zero-filled float tensor with the given shape.
    pub fn zeros(shape: Shape) -> Self {
        let n = shape.numel();
        Tensor {
            storage: CpuStorage::zeros(DType::F32, n),
            shape,
        }
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Returns the underlying data as an f32 slice.
    pub fn data_f32(&self) -> Result<&[f32]> {
        self.storage.as_f32_slice()
    }

    /// Returns the underlying token ids.
    pub fn ids(&self) -> Result<&[u32]> {
        self.storage.as_u32_slice()
    }

    /// Returns the underlying token ids for in-place writes.
    pub fn ids_mut(&mut self) -> Result<&mut [u32]> {
        self.storage.as_u32_slice_mut()
    }

    /// Copy out the `i`-th sub-tensor along the outermost axis.
    ///
    /// A [B, k, T] tensor indexed at `b` yields a [k, T] tensor.
    pub fn index(&self, i: usize) -> Result<Tensor> {
        if self.shape.ndim() == 0 {
            return Err(TensorError::InvalidAxis { axis: 0, ndim: 0 });
        }
        let start = self.shape.offset(&[i])?;
        let tail = self.shape.tail();
        let end = start + tail.numel();
        Ok(Tensor {
            storage: self.storage.slice(start, end),
            shape: tail,
        })
    }

    /// Keep only the first `len` entries of the last axis.
    ///
    /// Used to hand a model the generated-so-far prefix of a [B, T] buffer.
    pub fn narrow_last(&self, len: usize) -> Result<Tensor> {
        let ndim = self.shape.ndim();
        if ndim == 0 {
            return Err(TensorError::InvalidAxis { axis: 0, ndim: 0 });
        }
        let last = self.shape.dim(ndim - 1);
        if len > last {
            return Err(TensorError::IndexOutOfBounds {
                index: len,
                axis: ndim - 1,
                size: last,
            });
        }
        let rows = if last == 0 { 0 } else { self.shape.numel() / last };
        let mut dims = self.shape.dims().to_vec();
        dims[ndim - 1] = len;

        let storage = match &self.storage {
            CpuStorage::F32(v) => CpuStorage::F32(
                v.chunks(last.max(1))
                    .take(rows)
                    .flat_map(|row| row[..len].iter().copied())
                    .collect(),
            ),
            CpuStorage::U32(v) => CpuStorage::U32(
                v.chunks(last.max(1))
                    .take(rows)
                    .flat_map(|row| row[..len].iter().copied())
                    .collect(),
            ),
        };
        Ok(Tensor {
            storage,
            shape: Shape::new(dims),
        })
    }

    /// The last-axis float slice at the given leading index.
    ///
    /// For logits of shape [B, T, V], `lane(&[b, t])` is the length-V row of
    /// scores the model produced for batch item `b` at position `t`.
    pub fn lane(&self, index: &[usize]) -> Result<&[f32]> {
        let (start, len) = self.lane_bounds(index)?;
        Ok(&self.data_f32()?[start..start + len])
    }

    /// The last-axis id slice at the given leading index.
    pub fn ids_lane(&self, index: &[usize]) -> Result<&[u32]> {
        let (start, len) = self.lane_bounds(index)?;
        Ok(&self.ids()?[start..start + len])
    }

    fn lane_bounds(&self, index: &[usize]) -> Result<(usize, usize)> {
        let ndim = self.shape.ndim();
        if ndim == 0 || index.len() != ndim - 1 {
            return Err(TensorError::InvalidAxis {
                axis: index.len(),
                ndim,
            });
        }
        let start = self.shape.offset(index)?;
        Ok((start, self.shape.dim(ndim - 1)))
    }
}
