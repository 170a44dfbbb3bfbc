//! Tensor Operations for the Transformer
//!
//! This module provides the small tensor engine the model is built on.
//! Tensors store multi-dimensional arrays with shape and stride information
//! for row-major indexing.
//!
//! ## Core Concepts
//!
//! - **Data**: Flat `Vec<f32>` storing all elements in row-major order
//! - **Shape**: Dimensions of the tensor (e.g., `[seq, n_embd]`)
//! - **Strides**: Step sizes for each dimension to compute flat indices
//!
//! Every tensor owns its storage. There are no views: an operation that reads
//! a tensor allocates a fresh result, and storage is released when the owning
//! value goes out of scope. The only operations that mutate in place are
//! [`Tensor::scale`], [`Tensor::softmax_in_place`] and [`Tensor::set`].
//!
//! ## Example
//!
//! ```rust
//! use chargpt::Tensor;
//!
//! let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3])?;
//! let b = Tensor::new(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0], vec![3, 2])?;
//! let c = a.matmul(&b)?;
//! assert_eq!(c.shape(), &[2, 2]);
//! # Ok::<(), chargpt::Error>(())
//! ```
//!
//! ## Performance
//!
//! Large matrix products use a cache-blocked algorithm with rows split across
//! threads via Rayon. Each output element still accumulates its inner
//! products in ascending `k` order, so the blocked path produces exactly the
//! same bits as the naive triple loop.

use crate::error::{Error, Result};
use rayon::prelude::*;

/// Work threshold (m * n * k) above which matmul switches to the blocked path
const PARALLEL_MATMUL_THRESHOLD: usize = 1_000;

/// A multi-dimensional array of `f32` values
///
/// For shape `[2, 3]`, data is stored as
/// `[r0c0, r0c1, r0c2, r1c0, r1c1, r1c2]` and strides are `[3, 1]`.
///
/// Invariant: `data.len() == shape.iter().product()`, every dimension is
/// positive and the rank is at least one. Fields are private so the
/// invariant cannot be broken from outside.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor with given data and shape
    ///
    /// # Errors
    ///
    /// - `Configuration` if the shape is empty or has a zero dimension
    /// - `ShapeMismatch` if the product of the shape differs from `data.len()`
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self> {
        Self::check_shape(&shape)?;
        let expected_size: usize = shape.iter().product();
        if data.len() != expected_size {
            return Err(Error::shape(format!(
                "data length ({}) doesn't match shape {:?} (expected {})",
                data.len(),
                shape,
                expected_size
            )));
        }

        let strides = Self::compute_strides(&shape);
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Allocate a zero-filled tensor
    ///
    /// ```rust
    /// # use chargpt::Tensor;
    /// let t = Tensor::zeros(&[3, 4])?;
    /// assert_eq!(t.len(), 12);
    /// assert!(t.data().iter().all(|&x| x == 0.0));
    /// # Ok::<(), chargpt::Error>(())
    /// ```
    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::check_shape(shape)?;
        let size: usize = shape.iter().product();
        Self::new(vec![0.0; size], shape.to_vec())
    }

    /// Alias of [`Tensor::zeros`]
    pub fn allocate(shape: &[usize]) -> Result<Self> {
        Self::zeros(shape)
    }

    /// Build an index tensor (token ids stored as floats)
    pub fn from_indices(ids: &[usize], shape: Vec<usize>) -> Result<Self> {
        Self::new(ids.iter().map(|&id| id as f32).collect(), shape)
    }

    fn check_shape(shape: &[usize]) -> Result<()> {
        if shape.is_empty() {
            return Err(Error::config("tensor must have at least one dimension"));
        }
        if shape.contains(&0) {
            return Err(Error::config(format!(
                "tensor dimensions must be positive, got {:?}",
                shape
            )));
        }
        Ok(())
    }

    /// Compute strides from shape (row-major layout)
    ///
    /// For shape `[d0, d1, d2]`, strides are `[d1*d2, d2, 1]`
    fn compute_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![1; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: zero-sized dimensions are rejected at construction
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the flat storage (length is fixed)
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Flat offset of a multi-index, bounds-checked
    fn offset(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.shape.len() {
            return Err(Error::index(format!(
                "expected {} indices for shape {:?}, got {}",
                self.shape.len(),
                self.shape,
                indices.len()
            )));
        }

        let mut offset = 0;
        for (dim, (&idx, &stride)) in indices.iter().zip(&self.strides).enumerate() {
            if idx >= self.shape[dim] {
                return Err(Error::index(format!(
                    "index {} out of range for dimension {} of size {}",
                    idx, dim, self.shape[dim]
                )));
            }
            offset += idx * stride;
        }
        Ok(offset)
    }

    /// Read one element
    pub fn get(&self, indices: &[usize]) -> Result<f32> {
        Ok(self.data[self.offset(indices)?])
    }

    /// Write one element in place
    pub fn set(&mut self, indices: &[usize], value: f32) -> Result<()> {
        let offset = self.offset(indices)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Borrow row `i` of a 2D tensor
    pub fn row(&self, i: usize) -> Result<&[f32]> {
        let (rows, cols) = self.dims2("row")?;
        if i >= rows {
            return Err(Error::index(format!(
                "row {} out of range for {} rows",
                i, rows
            )));
        }
        Ok(&self.data[i * cols..(i + 1) * cols])
    }

    /// `(rows, cols)` of a 2D tensor, or a `ShapeMismatch` naming `op`
    pub(crate) fn dims2(&self, op: &str) -> Result<(usize, usize)> {
        match self.shape.as_slice() {
            &[rows, cols] => Ok((rows, cols)),
            other => Err(Error::shape(format!(
                "{} requires a 2D tensor, got shape {:?}",
                op, other
            ))),
        }
    }

    /// Computes: result[j] += a_val * b[j] for all j
    ///
    /// Written as a plain zip so LLVM can auto-vectorize it.
    #[inline(always)]
    fn matmul_inner_simd(a_val: f32, b: &[f32], result: &mut [f32]) {
        for (r, &b_val) in result.iter_mut().zip(b.iter()) {
            *r += a_val * b_val;
        }
    }

    /// Matrix multiplication of two 2D tensors
    ///
    /// For `A @ B` where `A` is `[m, k]` and `B` is `[k, n]`, the result is
    /// `[m, n]` with `C[i,j] = sum(A[i,l] * B[l,j])`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if either operand is not 2D or the inner dimensions
    /// differ.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor> {
        let (m, k) = self.dims2("matmul")?;
        let (k2, n) = other.dims2("matmul")?;
        if k != k2 {
            return Err(Error::shape(format!(
                "matrix dimensions incompatible: [{}, {}] @ [{}, {}]",
                m, k, k2, n
            )));
        }

        if m * n * k >= PARALLEL_MATMUL_THRESHOLD {
            return self.matmul_parallel_blocked(other, m, n, k);
        }

        let mut result = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0;
                for l in 0..k {
                    sum += self.data[i * k + l] * other.data[l * n + j];
                }
                result[i * n + j] = sum;
            }
        }

        Tensor::new(result, vec![m, n])
    }

    /// Parallel cache-blocked matrix multiplication
    ///
    /// Output rows are split into blocks of 8 and distributed across threads.
    /// Within a block, the `k` loop runs in ascending order for every output
    /// element, matching the sequential summation order.
    fn matmul_parallel_blocked(
        &self,
        other: &Tensor,
        m: usize,
        n: usize,
        k: usize,
    ) -> Result<Tensor> {
        const BLOCK_SIZE: usize = 8;

        let mut result = vec![0.0; m * n];

        result
            .par_chunks_mut(BLOCK_SIZE * n)
            .enumerate()
            .for_each(|(block_i, result_block)| {
                let i_start = block_i * BLOCK_SIZE;
                let i_end = (i_start + BLOCK_SIZE).min(m);

                for j_start in (0..n).step_by(BLOCK_SIZE) {
                    let j_end = (j_start + BLOCK_SIZE).min(n);

                    for k_start in (0..k).step_by(BLOCK_SIZE) {
                        let k_end = (k_start + BLOCK_SIZE).min(k);

                        for i in i_start..i_end {
                            let row_offset = (i - i_start) * n;
                            for k_idx in k_start..k_end {
                                let a_val = self.data[i * k + k_idx];
                                Self::matmul_inner_simd(
                                    a_val,
                                    &other.data[k_idx * n + j_start..k_idx * n + j_end],
                                    &mut result_block[row_offset + j_start..row_offset + j_end],
                                );
                            }
                        }
                    }
                }
            });

        Tensor::new(result, vec![m, n])
    }

    /// Element-wise addition of two tensors with identical shapes
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the shapes differ, even when the element counts agree.
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        if self.shape != other.shape {
            return Err(Error::shape(format!(
                "add requires identical shapes: {:?} + {:?}",
                self.shape, other.shape
            )));
        }
        let result = self
            .data
            .par_iter()
            .zip(&other.data)
            .map(|(a, b)| a + b)
            .collect();
        Tensor::new(result, self.shape.clone())
    }

    /// Broadcast add over the last dimension: `[*, n] + [n]`
    ///
    /// Used for bias addition in linear layers.
    pub fn add_row_broadcast(&self, row: &Tensor) -> Result<Tensor> {
        let last_dim = self.shape[self.shape.len() - 1];
        if row.ndim() != 1 || row.len() != last_dim {
            return Err(Error::shape(format!(
                "cannot broadcast {:?} over last dimension of {:?}",
                row.shape, self.shape
            )));
        }
        let result: Vec<f32> = self
            .data
            .par_chunks(last_dim)
            .flat_map_iter(|chunk| chunk.iter().zip(&row.data).map(|(a, b)| a + b))
            .collect();
        Tensor::new(result, self.shape.clone())
    }

    /// Transpose a 2D tensor
    ///
    /// ```rust
    /// # use chargpt::Tensor;
    /// let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3])?;
    /// let tt = t.transpose()?;
    /// assert_eq!(tt.shape(), &[3, 2]);
    /// assert_eq!(tt.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    /// # Ok::<(), chargpt::Error>(())
    /// ```
    pub fn transpose(&self) -> Result<Tensor> {
        let (rows, cols) = self.dims2("transpose")?;
        let mut result = vec![0.0; rows * cols];

        for i in 0..rows {
            for j in 0..cols {
                result[j * rows + i] = self.data[i * cols + j];
            }
        }

        Tensor::new(result, vec![cols, rows])
    }

    /// Multiply every element by `scalar`, in place
    pub fn scale(&mut self, scalar: f32) {
        self.data.par_iter_mut().for_each(|x| *x *= scalar);
    }

    /// Numerically stable softmax along `dim`, in place
    ///
    /// ```text
    /// softmax(x)[i] = exp(x[i] - max(x)) / sum(exp(x[j] - max(x)))
    /// ```
    ///
    /// The tensor is viewed as `[outer, n, inner]` around `dim`; each of the
    /// `outer * inner` slices of length `n` (stride `inner`) is normalized
    /// independently. Slices along the last axis are contiguous and are
    /// processed in parallel.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `dim` is not a valid axis.
    pub fn softmax_in_place(&mut self, dim: usize) -> Result<()> {
        if dim >= self.shape.len() {
            return Err(Error::shape(format!(
                "softmax axis {} out of range for shape {:?}",
                dim, self.shape
            )));
        }

        let n = self.shape[dim];
        let inner: usize = self.shape[dim + 1..].iter().product();

        if inner == 1 {
            self.data.par_chunks_mut(n).for_each(softmax_slice);
            return Ok(());
        }

        let outer: usize = self.shape[..dim].iter().product();
        let mut slice = vec![0.0; n];
        for o in 0..outer {
            for i in 0..inner {
                let base = o * n * inner + i;
                for (j, v) in slice.iter_mut().enumerate() {
                    *v = self.data[base + j * inner];
                }
                softmax_slice(&mut slice);
                for (j, v) in slice.iter().enumerate() {
                    self.data[base + j * inner] = *v;
                }
            }
        }
        Ok(())
    }

    /// Softmax along `dim`, returning a new tensor
    pub fn softmax(&self, dim: usize) -> Result<Tensor> {
        let mut out = self.clone();
        out.softmax_in_place(dim)?;
        Ok(out)
    }

    /// Concatenate tensors along their last axis
    ///
    /// All inputs must share rank and every dimension except the last. The
    /// multi-head attention uses this to join `[seq, head_size]` outputs
    /// into `[seq, n_embd]`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the list is empty, `dim` is not the last axis, or
    /// the leading dimensions differ.
    pub fn concatenate(tensors: &[Tensor], dim: usize) -> Result<Tensor> {
        let first = tensors
            .first()
            .ok_or_else(|| Error::shape("cannot concatenate an empty list"))?;
        let rank = first.ndim();
        if dim != rank - 1 {
            return Err(Error::shape(format!(
                "concatenation is only supported along the last axis ({}), got {}",
                rank - 1,
                dim
            )));
        }

        let leading = &first.shape[..dim];
        for t in tensors {
            if t.ndim() != rank || &t.shape[..dim] != leading {
                return Err(Error::shape(format!(
                    "cannot concatenate {:?} with {:?} along axis {}",
                    first.shape, t.shape, dim
                )));
            }
        }

        let outer: usize = leading.iter().product();
        let total_last: usize = tensors.iter().map(|t| t.shape[dim]).sum();
        let mut result = Vec::with_capacity(outer * total_last);

        for o in 0..outer {
            for t in tensors {
                let w = t.shape[dim];
                result.extend_from_slice(&t.data[o * w..(o + 1) * w]);
            }
        }

        let mut new_shape = first.shape.clone();
        new_shape[dim] = total_last;
        Tensor::new(result, new_shape)
    }

    /// Reshape to a new shape with the same element count
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Tensor> {
        Self::check_shape(new_shape)?;
        let new_size: usize = new_shape.iter().product();
        if new_size != self.data.len() {
            return Err(Error::shape(format!(
                "cannot reshape {:?} into {:?}: element count mismatch",
                self.shape, new_shape
            )));
        }
        Tensor::new(self.data.clone(), new_shape.to_vec())
    }

    /// Element-wise `max(0, x)`
    ///
    /// NaN inputs map to 0, following `f32::max`, so
    /// a NaN entering a feed-forward layer does not survive this step.
    pub fn relu(&self) -> Tensor {
        let data = self.data.par_iter().map(|&x| x.max(0.0)).collect();
        Tensor {
            data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
        }
    }

    /// Replace values where mask is non-zero with `value`
    ///
    /// Used for causal masking in attention (future positions set to -inf).
    pub fn masked_fill(&self, mask: &Tensor, value: f32) -> Result<Tensor> {
        if self.shape != mask.shape {
            return Err(Error::shape(format!(
                "mask shape {:?} must match tensor shape {:?}",
                mask.shape, self.shape
            )));
        }
        let result = self
            .data
            .par_iter()
            .zip(&mask.data)
            .map(|(&x, &m)| if m != 0.0 { value } else { x })
            .collect();
        Tensor::new(result, self.shape.clone())
    }

    /// True when every element is finite
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

/// Stable softmax over one contiguous slice
fn softmax_slice(row: &mut [f32]) {
    let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let mut sum = 0.0;
    for v in row.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in row.iter_mut() {
        *v /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
        Tensor::new(data, shape).unwrap()
    }

    #[test]
    fn test_strides_row_major() {
        let x = Tensor::zeros(&[2, 3, 4]).unwrap();
        assert_eq!(x.strides(), &[12, 4, 1]);
    }

    #[test]
    fn test_zeros_rejects_zero_dimension() {
        assert!(matches!(
            Tensor::zeros(&[2, 0]),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(Tensor::zeros(&[]), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(matches!(
            Tensor::new(vec![1.0; 5], vec![2, 3]),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_get_set() {
        let mut x = Tensor::zeros(&[2, 3]).unwrap();
        x.set(&[1, 2], 7.5).unwrap();
        assert_eq!(x.get(&[1, 2]).unwrap(), 7.5);
        assert_eq!(x.data()[5], 7.5);
    }

    #[test]
    fn test_get_out_of_range() {
        let x = Tensor::zeros(&[2, 3]).unwrap();
        assert!(matches!(x.get(&[2, 0]), Err(Error::Index(_))));
        assert!(matches!(x.get(&[0, 3]), Err(Error::Index(_))));
        assert!(matches!(x.get(&[0]), Err(Error::Index(_))));
    }

    #[test]
    fn test_matmul_small() {
        let a = t(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = t(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_blocked_matches_naive() {
        let (m, k, n) = (13, 17, 11);
        let a = t((0..m * k).map(|i| (i as f32 * 0.37).sin()).collect(), vec![m, k]);
        let b = t((0..k * n).map(|i| (i as f32 * 0.11).cos()).collect(), vec![k, n]);
        let c = a.matmul(&b).unwrap();

        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0;
                for l in 0..k {
                    sum += a.data()[i * k + l] * b.data()[l * n + j];
                }
                assert_eq!(c.get(&[i, j]).unwrap(), sum);
            }
        }
    }

    #[test]
    fn test_matmul_shape_errors() {
        let a = Tensor::zeros(&[2, 3]).unwrap();
        let b = Tensor::zeros(&[2, 3]).unwrap();
        assert!(matches!(a.matmul(&b), Err(Error::ShapeMismatch(_))));

        let c = Tensor::zeros(&[2, 3, 1]).unwrap();
        assert!(matches!(a.matmul(&c), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_add_requires_same_shape() {
        let a = Tensor::zeros(&[2, 3]).unwrap();
        let b = Tensor::zeros(&[3, 2]).unwrap();
        assert!(matches!(a.add(&b), Err(Error::ShapeMismatch(_))));

        let c = t(vec![1.0; 6], vec![2, 3]);
        assert_eq!(a.add(&c).unwrap().data(), &[1.0; 6]);
    }

    #[test]
    fn test_add_row_broadcast() {
        let x = t(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = t(vec![10.0, 20.0], vec![2]);
        assert_eq!(
            x.add_row_broadcast(&b).unwrap().data(),
            &[11.0, 22.0, 13.0, 24.0]
        );
        let bad = t(vec![1.0, 2.0, 3.0], vec![3]);
        assert!(x.add_row_broadcast(&bad).is_err());
    }

    #[test]
    fn test_transpose_rejects_3d() {
        let x = Tensor::zeros(&[1, 2, 3]).unwrap();
        assert!(matches!(x.transpose(), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_scale_in_place() {
        let mut x = t(vec![1.0, -2.0], vec![2]);
        x.scale(0.5);
        assert_eq!(x.data(), &[0.5, -1.0]);
    }

    #[test]
    fn test_softmax_last_axis() {
        let mut x = t(vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0], vec![2, 3]);
        x.softmax_in_place(1).unwrap();
        let row0: f32 = x.row(0).unwrap().iter().sum();
        assert!((row0 - 1.0).abs() < 1e-6);
        for v in x.row(1).unwrap() {
            assert!((v - 1.0 / 3.0).abs() < 1e-6);
        }
        assert!(x.get(&[0, 2]).unwrap() > x.get(&[0, 1]).unwrap());
    }

    #[test]
    fn test_softmax_first_axis_is_strided() {
        // Columns are normalized, not rows
        let x = t(vec![0.0, 5.0, 0.0, 5.0], vec![2, 2]);
        let y = x.softmax(0).unwrap();
        for v in y.data() {
            assert!((v - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_middle_axis() {
        // [2, 3, 4]: slices along axis 1 have stride 4, two outer blocks
        let data = (0..24).map(|i| (i as f32 * 0.7).sin() * 3.0).collect();
        let y = t(data, vec![2, 3, 4]).softmax(1).unwrap();
        for o in 0..2 {
            for i in 0..4 {
                let sum: f32 = (0..3).map(|j| y.get(&[o, j, i]).unwrap()).sum();
                assert!((sum - 1.0).abs() < 1e-6, "slice ({}, _, {}) sums to {}", o, i, sum);
            }
        }
    }

    #[test]
    fn test_softmax_large_values_stable() {
        let x = t(vec![1000.0, 1001.0], vec![2]);
        let y = x.softmax(0).unwrap();
        assert!(y.all_finite());
        assert!((y.data()[0] + y.data()[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_invalid_axis() {
        let mut x = Tensor::zeros(&[2, 2]).unwrap();
        assert!(matches!(x.softmax_in_place(2), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_concatenate_2d() {
        let a = t(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = t(vec![5.0, 6.0], vec![2, 1]);
        let c = Tensor::concatenate(&[a, b], 1).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(c.data(), &[1.0, 2.0, 5.0, 3.0, 4.0, 6.0]);
    }

    #[test]
    fn test_concatenate_3d() {
        let a = t(vec![1.0, 2.0, 3.0, 4.0], vec![2, 1, 2]);
        let b = t(vec![9.0, 8.0], vec![2, 1, 1]);
        let c = Tensor::concatenate(&[a, b], 2).unwrap();
        assert_eq!(c.shape(), &[2, 1, 3]);
        assert_eq!(c.data(), &[1.0, 2.0, 9.0, 3.0, 4.0, 8.0]);
    }

    #[test]
    fn test_concatenate_errors() {
        let a = Tensor::zeros(&[2, 2]).unwrap();
        let b = Tensor::zeros(&[3, 2]).unwrap();
        assert!(Tensor::concatenate(&[a.clone(), b], 1).is_err());
        assert!(Tensor::concatenate(&[a.clone(), a.clone()], 0).is_err());
        assert!(Tensor::concatenate(&[], 0).is_err());
    }

    #[test]
    fn test_relu_and_masked_fill() {
        let x = t(vec![-1.0, 0.5, -0.0, 2.0], vec![2, 2]);
        assert_eq!(x.relu().data(), &[0.0, 0.5, 0.0, 2.0]);
        assert_eq!(t(vec![f32::NAN], vec![1]).relu().data(), &[0.0]);

        let mask = t(vec![0.0, 1.0, 0.0, 0.0], vec![2, 2]);
        let y = x.masked_fill(&mask, f32::NEG_INFINITY).unwrap();
        assert_eq!(y.data()[1], f32::NEG_INFINITY);
        assert_eq!(y.data()[3], 2.0);
    }

    #[test]
    fn test_reshape() {
        let x = t(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        assert_eq!(x.reshape(&[3, 2]).unwrap().shape(), &[3, 2]);
        assert!(x.reshape(&[4, 2]).is_err());
    }
}
