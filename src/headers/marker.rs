// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use byteorder::{BigEndian, ByteOrder};

use super::{
    FrameHeader, HuffmanTables, JpegSegment, QuantizationTables, RestartInterval, ScanHeader,
    SegmentReader,
};
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

/// Marker codes, the byte following `0xff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Start of frame, SOF0..SOF15 except the three codes reused below.
    Sof(u8),
    Dht,
    Jpg,
    Dac,
    /// Restart marker RST0..RST7.
    Rst(u8),
    Soi,
    Eoi,
    Sos,
    Dqt,
    Dnl,
    Dri,
    Dhp,
    Exp,
    /// Application segment APP0..APP15.
    App(u8),
    /// JPG0..JPG13 extensions.
    JpgExtension(u8),
    Com,
    Tem,
    Reserved(u8),
}

impl Marker {
    pub fn from_u8(code: u8) -> Option<Marker> {
        use Marker::*;
        Some(match code {
            0x00 | 0xff => return None,
            0x01 => Tem,
            0x02..=0xbf => Reserved(code),
            0xc4 => Dht,
            0xc8 => Jpg,
            0xcc => Dac,
            0xc0..=0xcf => Sof(code - 0xc0),
            0xd0..=0xd7 => Rst(code - 0xd0),
            0xd8 => Soi,
            0xd9 => Eoi,
            0xda => Sos,
            0xdb => Dqt,
            0xdc => Dnl,
            0xdd => Dri,
            0xde => Dhp,
            0xdf => Exp,
            0xe0..=0xef => App(code - 0xe0),
            0xf0..=0xfd => JpgExtension(code - 0xf0),
            0xfe => Com,
        })
    }

    /// Whether a length field and payload follow the marker.
    pub fn has_length(&self) -> bool {
        !matches!(self, Marker::Rst(_) | Marker::Soi | Marker::Eoi | Marker::Tem)
    }
}

/// A parsed marker segment.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerSegment<'a> {
    StartOfImage,
    App { index: u8, data: &'a [u8] },
    Comment(&'a [u8]),
    QuantizationTables(QuantizationTables),
    HuffmanTables(HuffmanTables),
    StartOfFrame(FrameHeader),
    /// The entropy coded data starts at the reader position.
    StartOfScan(ScanHeader),
    RestartInterval(u16),
    EndOfImage,
    /// A segment this decoder has no use for; its payload was skipped.
    Unknown { marker: u8, data: &'a [u8] },
}

/// Reads marker segments, in byte order, from a complete stream.
#[derive(Debug)]
pub struct MarkerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MarkerReader<'a> {
    pub fn new(data: &'a [u8]) -> MarkerReader<'a> {
        MarkerReader { data, pos: 0 }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves to `pos`, typically the end of the entropy coded data of a
    /// scan.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Returns the next marker segment, or None at the end of the stream.
    pub fn next_marker(&mut self) -> Result<Option<MarkerSegment<'a>>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        if self.data[self.pos] != 0xff {
            return Err(Error::CorruptStream("expected a marker"));
        }
        // Any number of fill bytes may precede the marker code.
        while self.data.get(self.pos + 1) == Some(&0xff) {
            self.pos += 1;
        }
        let code = *self.data.get(self.pos + 1).ok_or(Error::FileTruncated)?;
        let marker = Marker::from_u8(code).ok_or(Error::CorruptStream("invalid marker code"))?;
        self.pos += 2;
        if !marker.has_length() {
            trace!(?marker, pos = self.pos, "marker");
            return match marker {
                Marker::Soi => Ok(Some(MarkerSegment::StartOfImage)),
                Marker::Eoi => Ok(Some(MarkerSegment::EndOfImage)),
                Marker::Tem => Ok(Some(MarkerSegment::Unknown { marker: code, data: &[] })),
                _ => Err(Error::UnexpectedMarker(code)),
            };
        }
        if self.data.len() < self.pos + 2 {
            return Err(Error::FileTruncated);
        }
        let length = BigEndian::read_u16(&self.data[self.pos..]);
        if length < 2 {
            return Err(Error::InvalidMarkerSegment(code, length));
        }
        let end = self.pos + length as usize;
        if end > self.data.len() {
            return Err(Error::FileTruncated);
        }
        let payload = &self.data[self.pos + 2..end];
        self.pos = end;
        trace!(?marker, length, "marker segment");
        let mut reader = SegmentReader::new(code, payload);
        let segment = match marker {
            Marker::App(index) => MarkerSegment::App {
                index,
                data: payload,
            },
            Marker::Com => MarkerSegment::Comment(payload),
            Marker::Dqt => MarkerSegment::QuantizationTables(QuantizationTables::read(&mut reader)?),
            Marker::Dht => MarkerSegment::HuffmanTables(HuffmanTables::read(&mut reader)?),
            Marker::Sof(_) => {
                let frame = FrameHeader::read(&mut reader)?;
                debug!(?frame, "start of frame");
                MarkerSegment::StartOfFrame(frame)
            }
            Marker::Sos => {
                let scan = ScanHeader::read(&mut reader)?;
                debug!(?scan, "start of scan");
                MarkerSegment::StartOfScan(scan)
            }
            Marker::Dri => MarkerSegment::RestartInterval(RestartInterval::read(&mut reader)?.0),
            _ => {
                debug!(?marker, length, "skipping marker segment");
                MarkerSegment::Unknown {
                    marker: code,
                    data: payload,
                }
            }
        };
        Ok(Some(segment))
    }
}
