use crate::dtype::DType;
use crate::error::{Result, TensorError};

/// CPU-side tensor storage.
///
/// Logits live in `F32` storage, token id buffers in `U32` storage.
#[derive(Debug, Clone, PartialEq)]
pub enum CpuStorage {
    /// 32-bit floating point storage.
    F32(Vec<f32>),
    /// 32-bit unsigned integer storage.
    U32(Vec<u32>),
}

impl CpuStorage {
    /// Returns the data as an f32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F32.
    pub fn as_f32_slice(&self) -> Result<&[f32]> {
        match self {
            CpuStorage::F32(v) => Ok(v.as_slice()),
            other => Err(mismatch(DType::F32, other.dtype())),
        }
    }

    /// Returns the data as a u32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not U32.
    pub fn as_u32_slice(&self) -> Result<&[u32]> {
        match self {
            CpuStorage::U32(v) => Ok(v.as_slice()),
            other => Err(mismatch(DType::U32, other.dtype())),
        }
    }

    /// Returns the data as a mutable u32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not U32.
    pub fn as_u32_slice_mut(&mut self) -> Result<&mut [u32]> {
        match self {
            CpuStorage::U32(v) => Ok(v.as_mut_slice()),
            other => Err(mismatch(DType::U32, other.dtype())),
        }
    }

    /// Create zero-filled storage for the given dtype and element count.
    pub fn zeros(dtype: DType, n: usize) -> Self {
        match dtype {
            DType::F32 => CpuStorage::F32(vec![0.0; n]),
            DType::U32 => CpuStorage::U32(vec![0; n]),
        }
    }

    /// Create storage from an f32 vector.
    pub fn from_f32_vec(data: Vec<f32>) -> Self {
        CpuStorage::F32(data)
    }

    /// Create storage from a u32 vector.
    pub fn from_u32_vec(data: Vec<u32>) -> Self {
        CpuStorage::U32(data)
    }

    /// Copy out the contiguous element range `start..end` into new storage.
    pub(crate) fn slice(&self, start: usize, end: usize) -> Self {
        match self {
            CpuStorage::F32(v) => CpuStorage::F32(v[start..end].to_vec()),
            CpuStorage::U32(v) => CpuStorage::U32(v[start..end].to_vec()),
        }
    }

    /// Returns the dtype of this storage.
    pub fn dtype(&self) -> DType {
        match self {
            CpuStorage::F32(_) => DType::F32,
            CpuStorage::U32(_) => DType::U32,
        }
    }
}

fn mismatch(expected: DType, got: DType) -> TensorError {
    TensorError::DTypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f32_vec() {
        let s = CpuStorage::from_f32_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(s.as_f32_slice().unwrap(), &[1.0, 2.0, 3.0]);
        assert!(s.as_u32_slice().is_err());
    }

    #[test]
    fn test_zeros() {
        let s = CpuStorage::zeros(DType::U32, 5);
        assert_eq!(s.as_u32_slice().unwrap(), &[0; 5]);
        assert_eq!(s.dtype(), DType::U32);
    }

    #[test]
    fn test_mut_slice() {
        let mut s = CpuStorage::from_u32_vec(vec![1, 2]);
        let slice = s.as_u32_slice_mut().unwrap();
        slice[0] = 42;
        assert_eq!(s.as_u32_slice().unwrap()[0], 42);
    }

    #[test]
    fn test_mut_slice_wrong_dtype() {
        let mut s = CpuStorage::from_f32_vec(vec![1.0]);
        match s.as_u32_slice_mut() {
            Err(TensorError::DTypeMismatch { expected, got }) => {
                assert_eq!(expected, "u32");
                assert_eq!(got, "f32");
            }
            other => panic!("expected dtype mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_slice_copies() {
        let s = CpuStorage::from_u32_vec(vec![1, 2, 3, 4]);
        let sub = s.slice(1, 3);
        assert_eq!(sub.as_u32_slice().unwrap(), &[2, 3]);
    }
}
