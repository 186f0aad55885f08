// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Chroma plane resampling between component and frame resolution.

use crate::error::Result;
use crate::image::Image;

/// How subsampled components are brought back to full resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaUpsampling {
    /// Replicates each sample.
    #[default]
    NearestNeighbor,
    /// Centre-aligned bilinear interpolation.
    Linear,
}

/// Averages each `factors.0` x `factors.1` group of samples, replicating the
/// last column and row for partial groups at the edges.
pub fn downsample(plane: &Image<u8>, factors: (usize, usize)) -> Result<Image<u8>> {
    let (fx, fy) = factors;
    let (width, height) = plane.size();
    if fx == 1 && fy == 1 {
        return Ok(plane.clone());
    }
    let mut out = Image::new((width.div_ceil(fx), height.div_ceil(fy)))?;
    let count = (fx * fy) as u32;
    let (out_width, out_height) = out.size();
    for oy in 0..out_height {
        let out_row = out.row_mut(oy);
        for (ox, sample) in out_row.iter_mut().enumerate().take(out_width) {
            let mut sum = 0u32;
            for dy in 0..fy {
                let row = plane.row((oy * fy + dy).min(height - 1));
                for dx in 0..fx {
                    sum += row[(ox * fx + dx).min(width - 1)] as u32;
                }
            }
            *sample = ((sum + count / 2) / count) as u8;
        }
    }
    Ok(out)
}

/// Produces full resolution rows from a component plane that was sampled at
/// `1 / factors` of the frame resolution. Only the top-left `valid` samples
/// of the plane are used; the rest is block padding.
#[derive(Debug, Clone, Copy)]
pub struct ChromaUpsampler {
    pub method: ChromaUpsampling,
    pub factors: (usize, usize),
    pub valid: (usize, usize),
}

impl ChromaUpsampler {
    pub fn upsample_row(&self, plane: &Image<u8>, y: usize, out: &mut [u8]) {
        match self.method {
            ChromaUpsampling::NearestNeighbor => {
                upsample_row_nearest(plane, self.valid, self.factors, y, out)
            }
            ChromaUpsampling::Linear => {
                upsample_row_linear(plane, self.valid, self.factors, y, out)
            }
        }
    }
}

pub fn upsample_row_nearest(
    plane: &Image<u8>,
    valid: (usize, usize),
    factors: (usize, usize),
    y: usize,
    out: &mut [u8],
) {
    let row = plane.row((y / factors.1).min(valid.1 - 1));
    if factors.0 == 1 {
        let n = out.len().min(valid.0);
        out[..n].copy_from_slice(&row[..n]);
        out[n..].fill(row[valid.0 - 1]);
        return;
    }
    for (x, sample) in out.iter_mut().enumerate() {
        *sample = row[(x / factors.0).min(valid.0 - 1)];
    }
}

// Maps output sample `o` to the two nearest input samples and the weight of
// the second one.
fn source_position(o: usize, factor: usize, len: usize) -> (usize, usize, f32) {
    let pos = ((o as f32 + 0.5) / factor as f32 - 0.5).max(0.0);
    let first = (pos as usize).min(len - 1);
    let second = (first + 1).min(len - 1);
    (first, second, pos - first as f32)
}

pub fn upsample_row_linear(
    plane: &Image<u8>,
    valid: (usize, usize),
    factors: (usize, usize),
    y: usize,
    out: &mut [u8],
) {
    let (y0, y1, wy) = source_position(y, factors.1, valid.1);
    let (top, bottom) = (plane.row(y0), plane.row(y1));
    for (x, sample) in out.iter_mut().enumerate() {
        let (x0, x1, wx) = source_position(x, factors.0, valid.0);
        let lerp = |a: u8, b: u8, w: f32| a as f32 + (b as f32 - a as f32) * w;
        let upper = lerp(top[x0], top[x1], wx);
        let lower = lerp(bottom[x0], bottom[x1], wx);
        *sample = (upper + (lower - upper) * wy).round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn downsample_averages_groups() -> Result<()> {
        let plane = Image::from_vec((4, 2), vec![10, 20, 30, 41, 10, 20, 30, 40])?;
        let out = downsample(&plane, (2, 2))?;
        assert_eq!(out.size(), (2, 1));
        assert_eq!(out.as_slice(), &[15, 35]);
        let out = downsample(&plane, (2, 1))?;
        assert_eq!(out.as_slice(), &[15, 36, 15, 35]);
        let out = downsample(&plane, (1, 2))?;
        assert_eq!(out.as_slice(), &[10, 20, 30, 41]);
        Ok(())
    }

    #[test]
    fn downsample_replicates_edges() -> Result<()> {
        let plane = Image::from_vec((3, 1), vec![0, 100, 200])?;
        let out = downsample(&plane, (2, 2))?;
        assert_eq!(out.as_slice(), &[50, 200]);
        Ok(())
    }

    #[test]
    fn nearest_replicates() -> Result<()> {
        let plane = Image::from_vec((2, 2), vec![1, 2, 3, 4])?;
        let mut out = [0u8; 4];
        upsample_row_nearest(&plane, (2, 2), (2, 2), 3, &mut out);
        assert_eq!(out, [3, 3, 4, 4]);
        // Padding columns beyond the valid width are not used.
        upsample_row_nearest(&plane, (1, 2), (2, 1), 0, &mut out);
        assert_eq!(out, [1, 1, 1, 1]);
        Ok(())
    }

    #[test]
    fn linear_uses_quarter_weights() -> Result<()> {
        let plane = Image::from_vec((3, 1), vec![0, 100, 200])?;
        let mut out = [0u8; 6];
        upsample_row_linear(&plane, (3, 1), (2, 1), 0, &mut out);
        assert_eq!(out, [0, 25, 75, 125, 175, 200]);
        Ok(())
    }

    #[test]
    fn linear_vertical() -> Result<()> {
        let plane = Image::from_vec((1, 2), vec![0, 200])?;
        let rows: Vec<u8> = (0..4)
            .map(|y| {
                let mut out = [0u8; 1];
                upsample_row_linear(&plane, (1, 2), (1, 2), y, &mut out);
                out[0]
            })
            .collect();
        assert_eq!(rows, vec![0, 50, 150, 200]);
        Ok(())
    }

    #[test]
    fn unit_factors_are_identity() -> Result<()> {
        let plane = Image::from_vec((3, 2), vec![5, 6, 7, 8, 9, 10])?;
        for method in [ChromaUpsampling::NearestNeighbor, ChromaUpsampling::Linear] {
            let upsampler = ChromaUpsampler {
                method,
                factors: (1, 1),
                valid: (3, 2),
            };
            let mut out = [0u8; 3];
            upsampler.upsample_row(&plane, 1, &mut out);
            assert_eq!(out, [8, 9, 10]);
        }
        assert_eq!(downsample(&plane, (1, 1))?.as_slice(), plane.as_slice());
        Ok(())
    }
}
