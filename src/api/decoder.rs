// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use enough::{Stop, Unstoppable};

use super::{DecoderOptions, FrameInfo};
use crate::error::Result;
use crate::frame::FrameDecoder;
use crate::image::{Image, Pixel};
use crate::parallel::RowIterator;

/// Decodes complete in-memory baseline and extended sequential streams.
#[derive(Debug)]
pub struct JpegDecoder {
    options: DecoderOptions,
    rows: RowIterator,
}

impl JpegDecoder {
    pub fn new(options: DecoderOptions) -> JpegDecoder {
        let rows = RowIterator::new(&options.parallel);
        JpegDecoder { options, rows }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Parses the stream up to the frame header.
    pub fn read_header(&self, data: &[u8]) -> Result<FrameInfo> {
        let mut decoder = FrameDecoder::new(data, self.options.pixel_limit)?;
        Ok(FrameInfo::from(decoder.read_header(&Unstoppable)?))
    }

    pub fn decode<P: Pixel>(&self, data: &[u8]) -> Result<Image<P>> {
        self.decode_with_stop(data, &Unstoppable)
    }

    /// Like [`decode`](Self::decode), checking `stop` between MCU rows and
    /// before each row interval. Nothing is returned when stopped.
    pub fn decode_with_stop<P: Pixel>(&self, data: &[u8], stop: &dyn Stop) -> Result<Image<P>> {
        let mut decoder = FrameDecoder::new(data, self.options.pixel_limit)?;
        decoder.decode_scans(stop)?;
        decoder.reconstruct(self.options.upsampling, &self.rows, stop)
    }
}

impl Default for JpegDecoder {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}
