// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod frame_header;
pub mod marker;
pub mod scan_header;
pub mod tables;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use crate::error::{Error, Result};

pub use frame_header::*;
pub use marker::*;
pub use scan_header::*;
pub use tables::*;

/// Maximum number of components in a frame or scan.
pub const MAX_COMPONENTS: usize = 4;
/// Number of table slots per table kind.
pub const MAX_TABLES: usize = 4;

/// A marker segment whose payload can be parsed from and serialized to bytes.
pub trait JpegSegment: Sized {
    const MARKER: u8;

    fn read(reader: &mut SegmentReader) -> Result<Self>;

    fn write_payload(&self, out: &mut Vec<u8>) -> Result<()>;

    /// Writes marker, length and payload.
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut payload = Vec::new();
        self.write_payload(&mut payload)?;
        write_segment(out, Self::MARKER, &payload)
    }
}

pub fn write_segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) -> Result<()> {
    let length = u16::try_from(payload.len() + 2)
        .map_err(|_| Error::InvalidMarkerSegment(marker, u16::MAX))?;
    out.push(0xff);
    out.push(marker);
    out.write_u16::<BigEndian>(length)?;
    out.extend_from_slice(payload);
    Ok(())
}

/// Cursor over the payload of one marker segment. Reading past the payload is
/// reported as a malformed segment.
#[derive(Debug)]
pub struct SegmentReader<'a> {
    marker: u8,
    payload: &'a [u8],
    pos: usize,
}

impl<'a> SegmentReader<'a> {
    pub fn new(marker: u8, payload: &'a [u8]) -> SegmentReader<'a> {
        SegmentReader {
            marker,
            payload,
            pos: 0,
        }
    }

    pub fn marker(&self) -> u8 {
        self.marker
    }

    pub fn error(&self) -> Error {
        Error::InvalidMarkerSegment(self.marker, (self.payload.len() + 2) as u16)
    }

    pub fn remaining(&self) -> usize {
        self.payload.len() - self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.payload.get(self.pos).ok_or_else(|| self.error())?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads a byte holding two 4-bit fields, high nibble first.
    pub fn read_nibbles(&mut self) -> Result<(u8, u8)> {
        let byte = self.read_u8()?;
        Ok((byte >> 4, byte & 0x0f))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(BigEndian::read_u16(bytes))
    }

    pub fn read_bytes(&mut self, num: usize) -> Result<&'a [u8]> {
        if self.remaining() < num {
            return Err(self.error());
        }
        let bytes = &self.payload[self.pos..self.pos + num];
        self.pos += num;
        Ok(bytes)
    }

    /// Fails unless the whole payload has been consumed.
    pub fn finish(&self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(self.error());
        }
        Ok(())
    }
}
