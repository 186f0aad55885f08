// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};
use jpeg_transforms::BLOCK_SIZE;
use num_traits::FromPrimitive;

use super::{JpegSegment, SegmentReader, MAX_TABLES};
use crate::entropy_coding::huffman::{HuffmanSpec, TableClass, HUFFMAN_MAX_BITS};
use crate::error::{Error, Result};
use crate::quant::QuantTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantTableDefinition {
    pub index: u8,
    pub table: QuantTable,
}

/// Payload of a DQT segment, which may define several tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTables(pub Vec<QuantTableDefinition>);

impl JpegSegment for QuantizationTables {
    const MARKER: u8 = 0xdb;

    fn read(reader: &mut SegmentReader) -> Result<QuantizationTables> {
        let mut tables = Vec::new();
        while reader.remaining() > 0 {
            let (precision, index) = reader.read_nibbles()?;
            if index as usize >= MAX_TABLES || precision > 1 {
                return Err(Error::InvalidQuantTable(index));
            }
            let mut zigzag = [0u16; BLOCK_SIZE];
            for step in zigzag.iter_mut() {
                *step = if precision == 0 {
                    reader.read_u8()? as u16
                } else {
                    reader.read_u16()?
                };
            }
            let table = QuantTable::from_zigzag(&zigzag);
            table
                .validate()
                .map_err(|_| Error::InvalidQuantTable(index))?;
            tables.push(QuantTableDefinition { index, table });
        }
        if tables.is_empty() {
            return Err(reader.error());
        }
        Ok(QuantizationTables(tables))
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        for def in &self.0 {
            let steps = def.table.zigzag_steps();
            if steps.iter().all(|&s| s <= 255) {
                out.push(def.index);
                out.extend(steps.iter().map(|&s| s as u8));
            } else {
                out.push(0x10 | def.index);
                for s in steps {
                    out.write_u16::<BigEndian>(s)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanDefinition {
    pub class: TableClass,
    pub index: u8,
    pub spec: HuffmanSpec,
}

/// Payload of a DHT segment, which may define several tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTables(pub Vec<HuffmanDefinition>);

impl JpegSegment for HuffmanTables {
    const MARKER: u8 = 0xc4;

    fn read(reader: &mut SegmentReader) -> Result<HuffmanTables> {
        let mut tables = Vec::new();
        while reader.remaining() > 0 {
            let (class, index) = reader.read_nibbles()?;
            let class = TableClass::from_u8(class)
                .ok_or(Error::InvalidHuffmanTable("table class must be 0 or 1"))?;
            if index as usize >= MAX_TABLES {
                return Err(Error::InvalidHuffmanTable("table index must be 0..=3"));
            }
            let mut counts = [0u8; HUFFMAN_MAX_BITS];
            counts.copy_from_slice(reader.read_bytes(HUFFMAN_MAX_BITS)?);
            let total: usize = counts.iter().map(|&c| c as usize).sum();
            if total > reader.remaining() {
                return Err(Error::InvalidHuffmanTable(
                    "code length counts exceed the segment",
                ));
            }
            let symbols = reader.read_bytes(total)?.to_vec();
            let spec = HuffmanSpec::new(counts, symbols)?;
            tables.push(HuffmanDefinition { class, index, spec });
        }
        if tables.is_empty() {
            return Err(reader.error());
        }
        Ok(HuffmanTables(tables))
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        for def in &self.0 {
            out.push(((def.class as u8) << 4) | def.index);
            out.extend_from_slice(&def.spec.counts);
            out.extend_from_slice(&def.spec.symbols);
        }
        Ok(())
    }
}

/// Payload of a DRI segment: MCUs per restart interval, 0 to disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartInterval(pub u16);

impl JpegSegment for RestartInterval {
    const MARKER: u8 = 0xdd;

    fn read(reader: &mut SegmentReader) -> Result<RestartInterval> {
        let interval = reader.read_u16()?;
        reader.finish()?;
        Ok(RestartInterval(interval))
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.write_u16::<BigEndian>(self.0)?;
        Ok(())
    }
}
