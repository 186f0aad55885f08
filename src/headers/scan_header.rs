// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{JpegSegment, SegmentReader, MAX_COMPONENTS, MAX_TABLES};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    pub component_id: u8,
    pub dc_table: u8,
    pub ac_table: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub approx_high: u8,
    pub approx_low: u8,
}

impl ScanHeader {
    /// A scan covering all coefficients of `components` in one pass.
    pub fn sequential(components: Vec<ScanComponent>) -> ScanHeader {
        ScanHeader {
            components,
            spectral_start: 0,
            spectral_end: 63,
            approx_high: 0,
            approx_low: 0,
        }
    }

    /// Sequential scans code the full spectrum without successive
    /// approximation.
    pub fn check_sequential(&self) -> Result<()> {
        if self.spectral_start != 0
            || self.spectral_end != 63
            || self.approx_high != 0
            || self.approx_low != 0
        {
            return Err(Error::UnsupportedFeature(format!(
                "spectral selection {}..={} with approximation {}/{}",
                self.spectral_start, self.spectral_end, self.approx_high, self.approx_low
            )));
        }
        Ok(())
    }

    pub fn is_interleaved(&self) -> bool {
        self.components.len() > 1
    }
}

impl JpegSegment for ScanHeader {
    const MARKER: u8 = 0xda;

    fn read(reader: &mut SegmentReader) -> Result<ScanHeader> {
        let num_components = reader.read_u8()? as usize;
        if num_components == 0
            || num_components > MAX_COMPONENTS
            || reader.remaining() != 2 * num_components + 3
        {
            return Err(reader.error());
        }
        let mut components = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            let component_id = reader.read_u8()?;
            let (dc_table, ac_table) = reader.read_nibbles()?;
            if dc_table as usize >= MAX_TABLES || ac_table as usize >= MAX_TABLES {
                return Err(reader.error());
            }
            if components
                .iter()
                .any(|c: &ScanComponent| c.component_id == component_id)
            {
                return Err(Error::CorruptStream("component repeated in scan"));
            }
            components.push(ScanComponent {
                component_id,
                dc_table,
                ac_table,
            });
        }
        let spectral_start = reader.read_u8()?;
        let spectral_end = reader.read_u8()?;
        let (approx_high, approx_low) = reader.read_nibbles()?;
        reader.finish()?;
        Ok(ScanHeader {
            components,
            spectral_start,
            spectral_end,
            approx_high,
            approx_low,
        })
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.components.len() as u8);
        for c in &self.components {
            out.extend_from_slice(&[c.component_id, (c.dc_table << 4) | c.ac_table]);
        }
        out.extend_from_slice(&[
            self.spectral_start,
            self.spectral_end,
            (self.approx_high << 4) | self.approx_low,
        ]);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn parse_three_component_scan() -> Result<()> {
        let payload = [3, 1, 0x00, 2, 0x11, 3, 0x11, 0, 63, 0];
        let scan = ScanHeader::read(&mut SegmentReader::new(0xda, &payload))?;
        assert!(scan.is_interleaved());
        assert_eq!(
            scan.components[1],
            ScanComponent {
                component_id: 2,
                dc_table: 1,
                ac_table: 1
            }
        );
        scan.check_sequential()?;
        Ok(())
    }

    #[test]
    fn progressive_scan_is_unsupported() -> Result<()> {
        let payload = [1, 1, 0x00, 1, 5, 0x10];
        let scan = ScanHeader::read(&mut SegmentReader::new(0xda, &payload))?;
        assert!(matches!(
            scan.check_sequential(),
            Err(Error::UnsupportedFeature(_))
        ));
        Ok(())
    }

    #[test]
    fn truncated_scan_header() {
        let payload = [2, 1, 0x00, 0, 63, 0];
        assert!(matches!(
            ScanHeader::read(&mut SegmentReader::new(0xda, &payload)),
            Err(Error::InvalidMarkerSegment(0xda, 8))
        ));
    }
}
