use crate::error::{Result, TensorError};
use std::fmt;

/// A tensor shape, wrapping a vector of dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Create a shape from a slice of dimensions.
    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The shape with the outermost dimension removed.
    ///
    /// For a shape [d0, d1, d2] this is [d1, d2]. A rank-0 shape has no tail
    /// and is returned unchanged.
    pub fn tail(&self) -> Shape {
        Shape::from_slice(self.dims.get(1..).unwrap_or(&[]))
    }

    /// Computes row-major contiguous strides for this shape.
    ///
    /// For a shape [d0, d1, d2], the strides are [d1*d2, d2, 1].
    pub fn strides(&self) -> Vec<usize> {
        if self.dims.is_empty() {
            return vec![];
        }
        let mut strides = vec![0usize; self.dims.len()];
        strides[self.dims.len() - 1] = 1;
        for i in (0..self.dims.len() - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Flat element offset of a (possibly partial) leading index.
    ///
    /// `index` may address fewer axes than the rank; the remaining axes are
    /// taken as zero, so `[b, t]` on a [B, T, V] shape yields the start of
    /// that length-V lane.
    pub fn offset(&self, index: &[usize]) -> Result<usize> {
        if index.len() > self.dims.len() {
            return Err(TensorError::InvalidAxis {
                axis: index.len() - 1,
                ndim: self.dims.len(),
            });
        }
        let strides = self.strides();
        let mut offset = 0;
        for (axis, (&i, &size)) in index.iter().zip(self.dims.iter()).enumerate() {
            if i >= size {
                return Err(TensorError::IndexOutOfBounds {
                    index: i,
                    axis,
                    size,
                });
            }
            offset += i * strides[axis];
        }
        Ok(offset)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}
