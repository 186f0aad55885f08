// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Write;

use enough::{Stop, Unstoppable};

use super::EncoderOptions;
use crate::error::Result;
use crate::frame::FrameEncoder;
use crate::image::PixelBuffer;
use crate::parallel::RowIterator;

/// Encodes pixel buffers into baseline streams.
///
/// The whole stream is produced in memory before anything is written to the
/// sink, so a failed encode writes nothing.
#[derive(Debug)]
pub struct JpegEncoder {
    options: EncoderOptions,
    rows: RowIterator,
}

impl JpegEncoder {
    /// Fails if `options` are invalid.
    pub fn new(options: EncoderOptions) -> Result<JpegEncoder> {
        options.validate()?;
        let rows = RowIterator::new(&options.parallel);
        Ok(JpegEncoder { options, rows })
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn encode<B, W>(&self, image: &B, sink: &mut W) -> Result<()>
    where
        B: PixelBuffer + Sync,
        W: Write,
    {
        self.encode_with_stop(image, sink, &Unstoppable)
    }

    pub fn encode_to_vec<B>(&self, image: &B) -> Result<Vec<u8>>
    where
        B: PixelBuffer + Sync,
    {
        FrameEncoder::new(&self.options, &self.rows)?.encode(image, &Unstoppable)
    }

    pub fn encode_with_stop<B, W>(&self, image: &B, sink: &mut W, stop: &dyn Stop) -> Result<()>
    where
        B: PixelBuffer + Sync,
        W: Write,
    {
        let data = FrameEncoder::new(&self.options, &self.rows)?.encode(image, stop)?;
        sink.write_all(&data)?;
        sink.flush()?;
        Ok(())
    }
}
