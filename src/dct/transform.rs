//! Orthonormal 2-D DCT-II and inverse for 8x8 blocks.
//!
//! Cosine values and scale factors are precomputed per table; the 2-D
//! transforms run as separable row/column 1-D passes. No rounding happens
//! here; converting back to integer samples is the caller's job.
use std::f64::consts::PI;

use super::{BLOCK_PIXELS, BLOCK_SIZE};

/// Precomputed cosine table for the fixed 8x8 block size.
///
/// `cos[k][i] = cos(PI * (2i + 1) * k / 16)`; `scale[k]` is the orthonormal
/// weight, `sqrt(1/8)` for k = 0 and `sqrt(2/8)` otherwise.
pub(super) struct CosineTable
{
    cos: [[f64; BLOCK_SIZE]; BLOCK_SIZE],
    scale: [f64; BLOCK_SIZE],
}

impl CosineTable
{
    pub(super) fn new() -> Self
    {
        let n = BLOCK_SIZE as f64;
        let mut cos = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        let mut scale = [0.0; BLOCK_SIZE];

        for k in 0..BLOCK_SIZE
        {
            scale[k] = if k == 0
            {
                (1.0 / n).sqrt()
            }
            else
            {
                (2.0 / n).sqrt()
            };
            for i in 0..BLOCK_SIZE
            {
                cos[k][i] =
                    (PI * (2.0 * i as f64 + 1.0) * k as f64 / (2.0 * n)).cos();
            }
        }

        Self { cos, scale }
    }

    /// 1-D DCT-II of one row or column.
    fn forward_1d(
        &self,
        input: &[f64; BLOCK_SIZE],
        output: &mut [f64; BLOCK_SIZE],
    )
    {
        for k in 0..BLOCK_SIZE
        {
            let mut sum = 0.0;
            for i in 0..BLOCK_SIZE
            {
                sum += input[i] * self.cos[k][i];
            }
            output[k] = self.scale[k] * sum;
        }
    }

    /// 1-D inverse (DCT-III) of one row or column.
    fn inverse_1d(
        &self,
        input: &[f64; BLOCK_SIZE],
        output: &mut [f64; BLOCK_SIZE],
    )
    {
        for i in 0..BLOCK_SIZE
        {
            let mut sum = 0.0;
            for k in 0..BLOCK_SIZE
            {
                sum += self.scale[k] * input[k] * self.cos[k][i];
            }
            output[i] = sum;
        }
    }

    /// 2-D DCT-II of a row-major 8x8 block.
    pub(super) fn forward(&self, block: &[f64; BLOCK_PIXELS])
        -> [f64; BLOCK_PIXELS]
    {
        let mut line = [0.0; BLOCK_SIZE];
        let mut transformed = [0.0; BLOCK_SIZE];

        // Row-wise pass.
        let mut rows = [0.0; BLOCK_PIXELS];
        for r in 0..BLOCK_SIZE
        {
            line.copy_from_slice(&block[r * BLOCK_SIZE..(r + 1) * BLOCK_SIZE]);
            self.forward_1d(&line, &mut transformed);
            rows[r * BLOCK_SIZE..(r + 1) * BLOCK_SIZE]
                .copy_from_slice(&transformed);
        }

        // Column-wise pass.
        let mut result = [0.0; BLOCK_PIXELS];
        for c in 0..BLOCK_SIZE
        {
            for r in 0..BLOCK_SIZE
            {
                line[r] = rows[r * BLOCK_SIZE + c];
            }
            self.forward_1d(&line, &mut transformed);
            for r in 0..BLOCK_SIZE
            {
                result[r * BLOCK_SIZE + c] = transformed[r];
            }
        }
        result
    }

    /// 2-D inverse of a row-major 8x8 coefficient block.
    pub(super) fn inverse(&self, block: &[f64; BLOCK_PIXELS])
        -> [f64; BLOCK_PIXELS]
    {
        let mut line = [0.0; BLOCK_SIZE];
        let mut restored = [0.0; BLOCK_SIZE];

        // Column-wise pass.
        let mut columns = [0.0; BLOCK_PIXELS];
        for c in 0..BLOCK_SIZE
        {
            for r in 0..BLOCK_SIZE
            {
                line[r] = block[r * BLOCK_SIZE + c];
            }
            self.inverse_1d(&line, &mut restored);
            for r in 0..BLOCK_SIZE
            {
                columns[r * BLOCK_SIZE + c] = restored[r];
            }
        }

        // Row-wise pass.
        let mut result = [0.0; BLOCK_PIXELS];
        for r in 0..BLOCK_SIZE
        {
            line.copy_from_slice(
                &columns[r * BLOCK_SIZE..(r + 1) * BLOCK_SIZE],
            );
            self.inverse_1d(&line, &mut restored);
            result[r * BLOCK_SIZE..(r + 1) * BLOCK_SIZE]
                .copy_from_slice(&restored);
        }
        result
    }
}
