// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use jpeg_transforms::BLOCK_SIZE;

pub use crate::chroma::ChromaUpsampling;
use crate::error::Result;
use crate::quant::QuantTable;

/// Default number of rows below which work is not split further.
pub const DEFAULT_MIN_ROWS_PER_TASK: usize = 16;

/// How row-parallel passes are scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelOptions {
    /// Upper bound on worker threads. `None` uses the available parallelism;
    /// `Some(1)` runs everything on the calling thread.
    pub max_parallelism: Option<usize>,
    /// Minimum number of rows handed to one task.
    pub min_rows_per_task: usize,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            max_parallelism: None,
            min_rows_per_task: DEFAULT_MIN_ROWS_PER_TASK,
        }
    }
}

impl ParallelOptions {
    pub fn sequential() -> Self {
        Self {
            max_parallelism: Some(1),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecoderOptions {
    pub upsampling: ChromaUpsampling,
    pub parallel: ParallelOptions,
    /// Frames with more pixels than this are rejected before any allocation.
    pub pixel_limit: Option<usize>,
}

/// Chroma resolution of encoded YCbCr images, named after the usual
/// J:a:b notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaSubsampling {
    Yuv444,
    Yuv422,
    #[default]
    Yuv420,
    Yuv440,
}

impl ChromaSubsampling {
    /// Sampling factors of the luma component; chroma components use 1x1.
    pub fn luma_sampling(&self) -> (u8, u8) {
        match self {
            ChromaSubsampling::Yuv444 => (1, 1),
            ChromaSubsampling::Yuv422 => (2, 1),
            ChromaSubsampling::Yuv420 => (2, 2),
            ChromaSubsampling::Yuv440 => (1, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeColor {
    #[default]
    YCbCr,
    Grayscale,
}

#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// 1..=100, scaling the standard quantization tables.
    pub quality: u8,
    pub subsampling: ChromaSubsampling,
    /// MCUs between restart markers, 0 for none.
    pub restart_interval: u16,
    pub color: EncodeColor,
    /// Luma and chroma quantization steps in natural order, used instead of
    /// the quality scaled tables.
    pub quant_tables: Option<[[u16; BLOCK_SIZE]; 2]>,
    pub parallel: ParallelOptions,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            quality: 75,
            subsampling: ChromaSubsampling::default(),
            restart_interval: 0,
            color: EncodeColor::default(),
            quant_tables: None,
            parallel: ParallelOptions::default(),
        }
    }
}

impl EncoderOptions {
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    /// Checks the configuration without producing any output.
    pub fn validate(&self) -> Result<()> {
        self.quant_tables().map(|_| ())
    }

    /// Luma and chroma tables this configuration encodes with.
    pub fn quant_tables(&self) -> Result<[QuantTable; 2]> {
        match &self.quant_tables {
            Some([luma, chroma]) => {
                let tables = [
                    QuantTable::from_natural(*luma),
                    QuantTable::from_natural(*chroma),
                ];
                for table in &tables {
                    table.validate()?;
                }
                Ok(tables)
            }
            None => Ok([
                QuantTable::luminance(self.quality)?,
                QuantTable::chrominance(self.quality)?,
            ]),
        }
    }
}
