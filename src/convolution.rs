// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Separable convolution of pixel buffers, through their [`Vector4`] view.

use enough::Stop;

use crate::error::{Error, Result};
use crate::image::{Image, Pixel, PixelBuffer, Vector4};
use crate::parallel::RowIterator;

/// A one dimensional kernel of odd length, centred on its middle weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel1D {
    weights: Vec<f32>,
}

impl Kernel1D {
    pub fn new(weights: Vec<f32>) -> Result<Kernel1D> {
        if weights.len() % 2 == 0 || weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::InvalidKernel(weights.len()));
        }
        Ok(Kernel1D { weights })
    }

    /// Normalised Gaussian truncated at three standard deviations.
    pub fn gaussian(sigma: f32) -> Result<Kernel1D> {
        if !(sigma > 0.0 && sigma.is_finite()) {
            return Err(Error::InvalidKernel(0));
        }
        let radius = (3.0 * sigma).ceil() as isize;
        let weights: Vec<f32> = (-radius..=radius)
            .map(|x| (-((x * x) as f32) / (2.0 * sigma * sigma)).exp())
            .collect();
        let sum: f32 = weights.iter().sum();
        Self::new(weights.into_iter().map(|w| w / sum).collect())
    }

    pub fn box_blur(radius: usize) -> Result<Kernel1D> {
        let len = 2 * radius + 1;
        Self::new(vec![1.0 / len as f32; len])
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }

    /// Output sample `i` reads `samples(i + k - radius)` for each weight `k`,
    /// with indices clamped to `0..len`.
    fn apply_at(&self, i: usize, len: usize, sample: impl Fn(usize) -> Vector4) -> Vector4 {
        let radius = self.radius() as isize;
        let mut acc = [0.0f32; 4];
        for (k, &w) in self.weights.iter().enumerate() {
            let pos = (i as isize + k as isize - radius).clamp(0, len as isize - 1) as usize;
            let v = sample(pos);
            for c in 0..4 {
                acc[c] += w * v[c];
            }
        }
        acc
    }
}

/// A horizontal pass followed by a vertical pass.
#[derive(Debug, Clone)]
pub struct SeparableConvolution {
    pub horizontal: Kernel1D,
    pub vertical: Kernel1D,
}

impl SeparableConvolution {
    pub fn new(horizontal: Kernel1D, vertical: Kernel1D) -> SeparableConvolution {
        SeparableConvolution {
            horizontal,
            vertical,
        }
    }

    pub fn gaussian(sigma: f32) -> Result<SeparableConvolution> {
        let kernel = Kernel1D::gaussian(sigma)?;
        Ok(Self::new(kernel.clone(), kernel))
    }

    /// Filters `image` in place. Edges are extended by clamping.
    pub fn apply<B>(&self, image: &mut B, rows: &RowIterator, stop: &dyn Stop) -> Result<()>
    where
        B: PixelBuffer + Sync,
    {
        let (width, height) = image.size();
        if width == 0 || height == 0 {
            return Ok(());
        }
        let mut horizontal = Image::<Vector4>::new((width, height))?;
        {
            let source: &B = image;
            rows.for_each_rows_mut(
                horizontal.as_mut_slice(),
                width,
                height,
                width,
                stop,
                |interval, out, scratch: &mut [Vector4]| {
                    for (y, out_row) in interval.rows().zip(out.chunks_exact_mut(width)) {
                        for (v, pixel) in scratch.iter_mut().zip(source.row(y)) {
                            *v = pixel.to_vector4();
                        }
                        for (x, out) in out_row.iter_mut().enumerate() {
                            *out = self.horizontal.apply_at(x, width, |i| scratch[i]);
                        }
                    }
                    Ok(())
                },
            )?;
        }
        let horizontal = &horizontal;
        rows.for_each_rows_mut(
            image.rows_mut(),
            width,
            height,
            width,
            stop,
            |interval, out, scratch: &mut [Vector4]| {
                for (y, out_row) in interval.rows().zip(out.chunks_exact_mut(width)) {
                    for (x, v) in scratch.iter_mut().enumerate() {
                        *v = self.vertical.apply_at(y, height, |i| horizontal.row(i)[x]);
                    }
                    for (pixel, &v) in out_row.iter_mut().zip(scratch.iter()) {
                        *pixel = B::Pixel::from_vector4(v);
                    }
                }
                Ok(())
            },
        )
    }
}
