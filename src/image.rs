// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::error::{Error, Result};

mod pixel;

pub use pixel::*;

/// Row access to a pixel buffer. Rows are stored contiguously, `width`
/// pixels each, so that disjoint row ranges can be handed to different
/// workers.
pub trait PixelBuffer {
    type Pixel: Pixel;

    /// Width and height in pixels.
    fn size(&self) -> (usize, usize);

    fn row(&self, y: usize) -> &[Self::Pixel];

    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];

    /// All rows, top to bottom.
    fn rows_mut(&mut self) -> &mut [Self::Pixel];
}

/// An owned, row-major 2D array of samples or pixels.
#[derive(Clone)]
pub struct Image<T> {
    size: (usize, usize),
    data: Vec<T>,
}

impl<T: Copy + Default + Debug> Image<T> {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace"))]
    pub fn new(size: (usize, usize)) -> Result<Image<T>> {
        Self::new_with_value(size, T::default())
    }

    pub fn new_with_value(size: (usize, usize), value: T) -> Result<Image<T>> {
        let len = size.0.checked_mul(size.1).ok_or(Error::ArithmeticOverflow)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, value);
        Ok(Image { size, data })
    }

    /// Wraps row-major `data` of exactly `size.0 * size.1` elements.
    pub fn from_vec(size: (usize, usize), data: Vec<T>) -> Result<Image<T>> {
        if size.0.checked_mul(size.1) != Some(data.len()) {
            return Err(Error::InvalidImageSize(size.0, size.1));
        }
        Ok(Image { size, data })
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }

    pub fn row(&self, y: usize) -> &[T] {
        let w = self.size.0;
        &self.data[y * w..(y + 1) * w]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let w = self.size.0;
        &mut self.data[y * w..(y + 1) * w]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<P: Pixel> PixelBuffer for Image<P> {
    type Pixel = P;

    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn row(&self, y: usize) -> &[P] {
        Image::row(self, y)
    }

    fn row_mut(&mut self, y: usize) -> &mut [P] {
        Image::row_mut(self, y)
    }

    fn rows_mut(&mut self) -> &mut [P] {
        &mut self.data
    }
}

impl<T> Debug for Image<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}x{}",
            std::any::type_name::<T>(),
            self.size.0,
            self.size.1,
        )
    }
}
