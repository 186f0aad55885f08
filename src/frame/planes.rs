// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use enough::Stop;
use jpeg_transforms::{fdct8x8, idct8x8, BLOCK_DIM, BLOCK_SIZE};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::parallel::RowIterator;
use crate::quant::QuantTable;

/// Samples of one component at its own resolution.
pub type SamplePlane = Image<u8>;

/// Quantized coefficients of one component, in natural order. Block
/// `(bx, by)` occupies the 64 values starting at
/// `(by * blocks_x + bx) * 64`, so one block row is contiguous.
#[derive(Debug, Clone)]
pub struct CoefficientPlane {
    blocks: (usize, usize),
    data: Vec<i16>,
}

impl CoefficientPlane {
    pub fn new(blocks: (usize, usize)) -> Result<CoefficientPlane> {
        let len = blocks
            .0
            .checked_mul(blocks.1)
            .and_then(|n| n.checked_mul(BLOCK_SIZE))
            .ok_or(Error::ArithmeticOverflow)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(CoefficientPlane { blocks, data })
    }

    /// Number of blocks horizontally and vertically.
    pub fn blocks(&self) -> (usize, usize) {
        self.blocks
    }

    fn offset(&self, bx: usize, by: usize) -> usize {
        debug_assert!(bx < self.blocks.0 && by < self.blocks.1);
        (by * self.blocks.0 + bx) * BLOCK_SIZE
    }

    pub fn block(&self, bx: usize, by: usize) -> &[i16] {
        let start = self.offset(bx, by);
        &self.data[start..start + BLOCK_SIZE]
    }

    pub fn block_mut(&mut self, bx: usize, by: usize) -> &mut [i16] {
        let start = self.offset(bx, by);
        &mut self.data[start..start + BLOCK_SIZE]
    }
}

fn to_block(values: &[i16]) -> [i16; BLOCK_SIZE] {
    std::array::from_fn(|i| values[i])
}

/// Dequantizes and inverse transforms every block of `coefficients`, one
/// block row per task row. The result covers the whole block grid.
pub fn reconstruct_plane(
    coefficients: &CoefficientPlane,
    table: &QuantTable,
    rows: &RowIterator,
    stop: &dyn Stop,
) -> Result<SamplePlane> {
    let (blocks_x, blocks_y) = coefficients.blocks();
    let width = blocks_x * BLOCK_DIM;
    let mut plane = SamplePlane::new((width, blocks_y * BLOCK_DIM))?;
    rows.for_each_rows_mut(
        plane.as_mut_slice(),
        width * BLOCK_DIM,
        blocks_y,
        0,
        stop,
        |interval, samples, _: &mut [u8]| {
            for (by, block_row) in interval.rows().zip(samples.chunks_exact_mut(width * BLOCK_DIM)) {
                for bx in 0..blocks_x {
                    let mut block = table.dequantize(&to_block(coefficients.block(bx, by)));
                    idct8x8(&mut block);
                    for (y, row) in block.chunks_exact(BLOCK_DIM).enumerate() {
                        let start = y * width + bx * BLOCK_DIM;
                        for (out, &v) in block_row[start..start + BLOCK_DIM].iter_mut().zip(row) {
                            *out = (v + 128.0).round().clamp(0.0, 255.0) as u8;
                        }
                    }
                }
            }
            Ok(())
        },
    )?;
    Ok(plane)
}

/// Forward transforms and quantizes `samples`, whose size must be a whole
/// number of blocks.
pub fn transform_plane(
    samples: &SamplePlane,
    table: &QuantTable,
    rows: &RowIterator,
    stop: &dyn Stop,
) -> Result<CoefficientPlane> {
    let (width, height) = samples.size();
    debug_assert!(width % BLOCK_DIM == 0 && height % BLOCK_DIM == 0);
    let blocks = (width / BLOCK_DIM, height / BLOCK_DIM);
    let mut coefficients = CoefficientPlane::new(blocks)?;
    let stride = blocks.0 * BLOCK_SIZE;
    rows.for_each_rows_mut(
        &mut coefficients.data,
        stride,
        blocks.1,
        0,
        stop,
        |interval, out, _: &mut [u8]| {
            for (by, out_row) in interval.rows().zip(out.chunks_exact_mut(stride)) {
                for (bx, out_block) in out_row.chunks_exact_mut(BLOCK_SIZE).enumerate() {
                    let mut block = [0f32; BLOCK_SIZE];
                    for (y, row) in block.chunks_exact_mut(BLOCK_DIM).enumerate() {
                        let src = &samples.row(by * BLOCK_DIM + y)[bx * BLOCK_DIM..(bx + 1) * BLOCK_DIM];
                        for (v, &s) in row.iter_mut().zip(src) {
                            *v = s as f32 - 128.0;
                        }
                    }
                    fdct8x8(&mut block);
                    out_block.copy_from_slice(&table.quantize(&block));
                }
            }
            Ok(())
        },
    )?;
    Ok(coefficients)
}
