// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Zigzag ordering and quantization tables.

use jpeg_transforms::BLOCK_SIZE;

use crate::error::{Error, Result};

/// 64 coefficients in zigzag (stream) order.
pub type ZigzagBlock = [i16; BLOCK_SIZE];
/// 64 coefficients in natural row-major order.
pub type NaturalBlock = [i16; BLOCK_SIZE];

/// Maps a zigzag index to the natural row-major index.
#[rustfmt::skip]
pub const ZIGZAG_TO_NATURAL: [usize; BLOCK_SIZE] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Maps a natural row-major index to the zigzag index.
pub const NATURAL_TO_ZIGZAG: [usize; BLOCK_SIZE] = {
    let mut table = [0usize; BLOCK_SIZE];
    let mut i = 0;
    while i < BLOCK_SIZE {
        table[ZIGZAG_TO_NATURAL[i]] = i;
        i += 1;
    }
    table
};

pub fn zigzag_to_natural<T: Copy + Default>(zigzag: &[T; BLOCK_SIZE]) -> [T; BLOCK_SIZE] {
    let mut natural = [T::default(); BLOCK_SIZE];
    for (z, &value) in zigzag.iter().enumerate() {
        natural[ZIGZAG_TO_NATURAL[z]] = value;
    }
    natural
}

pub fn natural_to_zigzag<T: Copy + Default>(natural: &[T; BLOCK_SIZE]) -> [T; BLOCK_SIZE] {
    let mut zigzag = [T::default(); BLOCK_SIZE];
    for (n, &value) in natural.iter().enumerate() {
        zigzag[NATURAL_TO_ZIGZAG[n]] = value;
    }
    zigzag
}

// Table K.1 and K.2 of T.81, natural order.
#[rustfmt::skip]
const STD_LUMINANCE_STEPS: [u16; BLOCK_SIZE] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

#[rustfmt::skip]
const STD_CHROMINANCE_STEPS: [u16; BLOCK_SIZE] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Quantization steps in natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantTable {
    pub steps: [u16; BLOCK_SIZE],
}

impl QuantTable {
    pub fn from_natural(steps: [u16; BLOCK_SIZE]) -> QuantTable {
        QuantTable { steps }
    }

    /// Builds a table from steps in zigzag order, as stored in a DQT segment.
    pub fn from_zigzag(steps: &[u16; BLOCK_SIZE]) -> QuantTable {
        QuantTable {
            steps: zigzag_to_natural(steps),
        }
    }

    pub fn zigzag_steps(&self) -> [u16; BLOCK_SIZE] {
        natural_to_zigzag(&self.steps)
    }

    /// Fails if any step is zero, since steps are used as divisors.
    pub fn validate(&self) -> Result<()> {
        match self.steps.iter().position(|&s| s == 0) {
            Some(index) => Err(Error::InvalidQuantStep(index)),
            None => Ok(()),
        }
    }

    /// Standard luminance table scaled to `quality` (1..=100), with the
    /// scaling used by the IJG library; steps are limited to 8 bits.
    pub fn luminance(quality: u8) -> Result<QuantTable> {
        Self::scaled(&STD_LUMINANCE_STEPS, quality)
    }

    pub fn chrominance(quality: u8) -> Result<QuantTable> {
        Self::scaled(&STD_CHROMINANCE_STEPS, quality)
    }

    fn scaled(base: &[u16; BLOCK_SIZE], quality: u8) -> Result<QuantTable> {
        if !(1..=100).contains(&quality) {
            return Err(Error::InvalidQuality(quality));
        }
        let quality = quality as u32;
        let scale = if quality < 50 {
            5000 / quality
        } else {
            200 - quality * 2
        };
        Ok(QuantTable {
            steps: base.map(|step| ((step as u32 * scale + 50) / 100).clamp(1, 255) as u16),
        })
    }

    /// Multiplies stream coefficients by their steps. The input is in
    /// natural order, after the zigzag reordering.
    pub fn dequantize(&self, coefficients: &NaturalBlock) -> [f32; BLOCK_SIZE] {
        std::array::from_fn(|i| coefficients[i] as f32 * self.steps[i] as f32)
    }

    /// Divides transform output by the steps and rounds to nearest, ties
    /// away from zero. Results are clamped to the range representable in
    /// baseline 8-bit streams.
    pub fn quantize(&self, coefficients: &[f32; BLOCK_SIZE]) -> NaturalBlock {
        std::array::from_fn(|i| {
            let limit = if i == 0 { 2047.0 } else { 1023.0 };
            (coefficients[i] / self.steps[i] as f32)
                .round()
                .clamp(-limit, limit) as i16
        })
    }
}
