// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};
use jpeg_transforms::BLOCK_DIM;

use super::{JpegSegment, SegmentReader, MAX_COMPONENTS, MAX_TABLES};
use crate::error::{Error, Result};

/// Coding process signalled by the start-of-frame marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCoding {
    Baseline,
    ExtendedSequential,
    Progressive,
    Lossless,
    Hierarchical,
    Arithmetic,
}

impl FrameCoding {
    /// Returns the coding for a SOFn marker code, or None if `marker` is not
    /// a start-of-frame marker.
    pub fn from_marker(marker: u8) -> Option<FrameCoding> {
        Some(match marker {
            0xc0 => FrameCoding::Baseline,
            0xc1 => FrameCoding::ExtendedSequential,
            0xc2 => FrameCoding::Progressive,
            0xc3 => FrameCoding::Lossless,
            0xc5..=0xc7 => FrameCoding::Hierarchical,
            0xc9..=0xcb | 0xcd..=0xcf => FrameCoding::Arithmetic,
            _ => return None,
        })
    }

    pub fn marker(&self) -> u8 {
        match self {
            FrameCoding::Baseline => 0xc0,
            FrameCoding::ExtendedSequential => 0xc1,
            FrameCoding::Progressive => 0xc2,
            FrameCoding::Lossless => 0xc3,
            FrameCoding::Hierarchical => 0xc5,
            FrameCoding::Arithmetic => 0xc9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub id: u8,
    pub h_samp: u8,
    pub v_samp: u8,
    pub quant_table: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub coding: FrameCoding,
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: Vec<Component>,
}

impl FrameHeader {
    /// Fails with `UnsupportedFeature` for anything but 8-bit sequential
    /// Huffman frames with one or three components.
    pub fn check_supported(&self) -> Result<()> {
        match self.coding {
            FrameCoding::Baseline | FrameCoding::ExtendedSequential => {}
            other => {
                return Err(Error::UnsupportedFeature(format!("{other:?} coding")));
            }
        }
        if self.precision != 8 {
            return Err(Error::UnsupportedFeature(format!(
                "{}-bit sample precision",
                self.precision
            )));
        }
        if self.height == 0 {
            return Err(Error::UnsupportedFeature(
                "height defined by DNL marker".to_string(),
            ));
        }
        if !matches!(self.components.len(), 1 | 3) {
            return Err(Error::UnsupportedFeature(format!(
                "{} components",
                self.components.len()
            )));
        }
        Ok(())
    }

    pub fn max_h_samp(&self) -> usize {
        self.components.iter().map(|c| c.h_samp as usize).max().unwrap_or(1)
    }

    pub fn max_v_samp(&self) -> usize {
        self.components.iter().map(|c| c.v_samp as usize).max().unwrap_or(1)
    }

    /// Width of an MCU of an interleaved scan, in pixels.
    pub fn mcu_width(&self) -> usize {
        self.max_h_samp() * BLOCK_DIM
    }

    pub fn mcu_height(&self) -> usize {
        self.max_v_samp() * BLOCK_DIM
    }

    pub fn mcus_x(&self) -> usize {
        (self.width as usize).div_ceil(self.mcu_width())
    }

    pub fn mcus_y(&self) -> usize {
        (self.height as usize).div_ceil(self.mcu_height())
    }

    pub fn component_index(&self, id: u8) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }

    /// Size of the sample plane of component `index`, before padding.
    pub fn component_size(&self, index: usize) -> (usize, usize) {
        let c = &self.components[index];
        (
            (self.width as usize * c.h_samp as usize).div_ceil(self.max_h_samp()),
            (self.height as usize * c.v_samp as usize).div_ceil(self.max_v_samp()),
        )
    }

    /// Size of the block grid of component `index`, padded to whole MCUs.
    pub fn component_blocks(&self, index: usize) -> (usize, usize) {
        let c = &self.components[index];
        (
            self.mcus_x() * c.h_samp as usize,
            self.mcus_y() * c.v_samp as usize,
        )
    }

    /// Blocks of component `index` actually covered by its samples, which is
    /// what a non-interleaved scan codes.
    pub fn component_covered_blocks(&self, index: usize) -> (usize, usize) {
        let (w, h) = self.component_size(index);
        (w.div_ceil(BLOCK_DIM), h.div_ceil(BLOCK_DIM))
    }
}

impl JpegSegment for FrameHeader {
    const MARKER: u8 = 0xc0;

    fn read(reader: &mut SegmentReader) -> Result<FrameHeader> {
        let coding = FrameCoding::from_marker(reader.marker()).ok_or_else(|| reader.error())?;
        let precision = reader.read_u8()?;
        let height = reader.read_u16()?;
        let width = reader.read_u16()?;
        let num_components = reader.read_u8()? as usize;
        if num_components == 0 || reader.remaining() != 3 * num_components {
            return Err(reader.error());
        }
        if num_components > MAX_COMPONENTS {
            return Err(Error::UnsupportedFeature(format!(
                "{num_components} components"
            )));
        }
        if width == 0 {
            return Err(reader.error());
        }
        let mut components = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            let id = reader.read_u8()?;
            let (h_samp, v_samp) = reader.read_nibbles()?;
            let quant_table = reader.read_u8()?;
            if !(1..=4).contains(&h_samp) || !(1..=4).contains(&v_samp) {
                return Err(Error::InvalidSamplingFactors(h_samp, v_samp));
            }
            if quant_table as usize >= MAX_TABLES {
                return Err(Error::InvalidQuantTable(quant_table));
            }
            if components.iter().any(|c: &Component| c.id == id) {
                return Err(Error::CorruptStream("duplicate component id"));
            }
            components.push(Component {
                id,
                h_samp,
                v_samp,
                quant_table,
            });
        }
        reader.finish()?;
        Ok(FrameHeader {
            coding,
            precision,
            height,
            width,
            components,
        })
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.precision);
        out.write_u16::<BigEndian>(self.height)?;
        out.write_u16::<BigEndian>(self.width)?;
        out.push(self.components.len() as u8);
        for c in &self.components {
            out.extend_from_slice(&[c.id, (c.h_samp << 4) | c.v_samp, c.quant_table]);
        }
        Ok(())
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut payload = Vec::new();
        self.write_payload(&mut payload)?;
        super::write_segment(out, self.coding.marker(), &payload)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    fn header(width: u16, height: u16, sampling: &[(u8, u8)]) -> FrameHeader {
        FrameHeader {
            coding: FrameCoding::Baseline,
            precision: 8,
            height,
            width,
            components: sampling
                .iter()
                .enumerate()
                .map(|(i, &(h, v))| Component {
                    id: i as u8 + 1,
                    h_samp: h,
                    v_samp: v,
                    quant_table: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn mcu_geometry_420() {
        let frame = header(35, 17, &[(2, 2), (1, 1), (1, 1)]);
        assert_eq!((frame.mcu_width(), frame.mcu_height()), (16, 16));
        assert_eq!((frame.mcus_x(), frame.mcus_y()), (3, 2));
        assert_eq!(frame.component_size(0), (35, 17));
        assert_eq!(frame.component_size(1), (18, 9));
        assert_eq!(frame.component_blocks(0), (6, 4));
        assert_eq!(frame.component_blocks(2), (3, 2));
        assert_eq!(frame.component_covered_blocks(0), (5, 3));
        assert_eq!(frame.component_covered_blocks(1), (3, 2));
    }

    #[test]
    fn read_write() -> Result<()> {
        let frame = header(640, 480, &[(2, 1), (1, 1), (1, 1)]);
        let mut payload = Vec::new();
        frame.write_payload(&mut payload)?;
        let parsed = FrameHeader::read(&mut SegmentReader::new(0xc0, &payload))?;
        assert_eq!(parsed, frame);
        Ok(())
    }

    #[test]
    fn bad_sampling_factor() {
        let payload = [8, 0, 8, 0, 8, 1, 1, 0x51, 0];
        assert!(matches!(
            FrameHeader::read(&mut SegmentReader::new(0xc0, &payload)),
            Err(Error::InvalidSamplingFactors(5, 1))
        ));
    }

    #[test]
    fn length_must_match_component_count() {
        let payload = [8, 0, 8, 0, 8, 3, 1, 0x11, 0];
        assert!(matches!(
            FrameHeader::read(&mut SegmentReader::new(0xc0, &payload)),
            Err(Error::InvalidMarkerSegment(0xc0, 11))
        ));
    }

    #[test]
    fn zero_width_is_a_malformed_segment() {
        let payload = [8, 0, 8, 0, 0, 1, 1, 0x11, 0];
        let err = FrameHeader::read(&mut SegmentReader::new(0xc0, &payload)).unwrap_err();
        assert!(matches!(err, Error::InvalidMarkerSegment(0xc0, 11)));
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidMarkerSegment);
    }

    #[test]
    fn unsupported_frames() {
        let mut frame = header(8, 8, &[(1, 1)]);
        frame.coding = FrameCoding::Progressive;
        assert!(matches!(
            frame.check_supported(),
            Err(Error::UnsupportedFeature(_))
        ));
        let mut frame = header(8, 8, &[(1, 1)]);
        frame.precision = 12;
        assert!(matches!(
            frame.check_supported(),
            Err(Error::UnsupportedFeature(_))
        ));
        let frame = header(8, 8, &[(1, 1), (1, 1)]);
        assert!(matches!(
            frame.check_supported(),
            Err(Error::UnsupportedFeature(_))
        ));
        assert!(header(8, 8, &[(1, 1)]).check_supported().is_ok());
    }
}
