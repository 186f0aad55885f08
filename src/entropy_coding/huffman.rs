// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::bit_reader::BitReader;
use crate::bit_writer::BitWriter;
use crate::error::{Error, Result};

pub const HUFFMAN_MAX_BITS: usize = 16;
const LOOKAHEAD_BITS: usize = 9;
const MAX_SYMBOLS: usize = 256;

/// Table class of a DHT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_derive::FromPrimitive)]
pub enum TableClass {
    Dc = 0,
    Ac = 1,
}

/// A Huffman table as transmitted in a DHT segment: the number of codes of
/// each length 1..=16, and the symbols in code order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanSpec {
    pub counts: [u8; HUFFMAN_MAX_BITS],
    pub symbols: Vec<u8>,
}

impl HuffmanSpec {
    pub fn new(counts: [u8; HUFFMAN_MAX_BITS], symbols: Vec<u8>) -> Result<HuffmanSpec> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total > MAX_SYMBOLS {
            return Err(Error::InvalidHuffmanTable("more than 256 symbols"));
        }
        if total != symbols.len() {
            return Err(Error::InvalidHuffmanTable(
                "symbol count does not match code length counts",
            ));
        }
        let spec = HuffmanSpec { counts, symbols };
        spec.build_codes()?;
        Ok(spec)
    }

    /// Assigns canonical codes: codes of one length are consecutive, and the
    /// first code of the next length is the last one plus one, shifted left.
    /// Returns `(code, length)` for each symbol, in symbol list order.
    pub fn build_codes(&self) -> Result<Vec<(u16, u8)>> {
        let mut codes = Vec::with_capacity(self.symbols.len());
        let mut code = 0u32;
        for (len_minus_one, &count) in self.counts.iter().enumerate() {
            let len = len_minus_one + 1;
            for _ in 0..count {
                if code >= (1 << len) {
                    return Err(Error::InvalidHuffmanTable("code space exhausted"));
                }
                codes.push((code as u16, len as u8));
                code += 1;
            }
            code <<= 1;
        }
        Ok(codes)
    }

    pub fn std_dc_luminance() -> HuffmanSpec {
        HuffmanSpec {
            counts: STD_DC_LUMINANCE_COUNTS,
            symbols: STD_DC_SYMBOLS.to_vec(),
        }
    }

    pub fn std_dc_chrominance() -> HuffmanSpec {
        HuffmanSpec {
            counts: STD_DC_CHROMINANCE_COUNTS,
            symbols: STD_DC_SYMBOLS.to_vec(),
        }
    }

    pub fn std_ac_luminance() -> HuffmanSpec {
        HuffmanSpec {
            counts: STD_AC_LUMINANCE_COUNTS,
            symbols: STD_AC_LUMINANCE_SYMBOLS.to_vec(),
        }
    }

    pub fn std_ac_chrominance() -> HuffmanSpec {
        HuffmanSpec {
            counts: STD_AC_CHROMINANCE_COUNTS,
            symbols: STD_AC_CHROMINANCE_SYMBOLS.to_vec(),
        }
    }
}

/// Decoding side of a Huffman table.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    // Indexed by code length; -1 when no code has that length.
    max_code: [i32; HUFFMAN_MAX_BITS + 1],
    val_offset: [i32; HUFFMAN_MAX_BITS + 1],
    symbols: Vec<u8>,
    // (length << 8) | symbol for codes of at most LOOKAHEAD_BITS bits, 0 otherwise.
    lookahead: Vec<u16>,
}

impl HuffmanTable {
    pub fn new(spec: &HuffmanSpec) -> Result<HuffmanTable> {
        let codes = spec.build_codes()?;
        let mut max_code = [-1i32; HUFFMAN_MAX_BITS + 1];
        let mut val_offset = [0i32; HUFFMAN_MAX_BITS + 1];
        let mut lookahead = vec![0u16; 1 << LOOKAHEAD_BITS];

        let mut index = 0usize;
        for (len_minus_one, &count) in spec.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let len = len_minus_one + 1;
            let first_code = codes[index].0 as i32;
            val_offset[len] = index as i32 - first_code;
            index += count as usize;
            max_code[len] = codes[index - 1].0 as i32;
        }

        for (&(code, len), &symbol) in codes.iter().zip(spec.symbols.iter()) {
            let len = len as usize;
            if len > LOOKAHEAD_BITS {
                break;
            }
            let shift = LOOKAHEAD_BITS - len;
            let first = (code as usize) << shift;
            for entry in &mut lookahead[first..first + (1 << shift)] {
                *entry = ((len as u16) << 8) | symbol as u16;
            }
        }

        Ok(HuffmanTable {
            max_code,
            val_offset,
            symbols: spec.symbols.clone(),
            lookahead,
        })
    }

    /// Decodes one symbol.
    pub fn decode(&self, br: &mut BitReader) -> Result<u8> {
        let entry = self.lookahead[br.peek(LOOKAHEAD_BITS) as usize];
        if entry != 0 {
            br.consume((entry >> 8) as usize)?;
            return Ok(entry as u8);
        }
        self.decode_slow(br)
    }

    /// Accumulates one bit at a time until the code matches, as in figure
    /// F.16 of T.81.
    fn decode_slow(&self, br: &mut BitReader) -> Result<u8> {
        let mut code = 0i32;
        for len in 1..=HUFFMAN_MAX_BITS {
            code = (code << 1) | br.read_bit()? as i32;
            if code <= self.max_code[len] {
                let index = (code + self.val_offset[len]) as usize;
                return Ok(self.symbols[index]);
            }
        }
        Err(Error::HuffmanCodeNotFound)
    }
}

/// Encoding side of a Huffman table: `(code, length)` per symbol, length 0
/// for symbols the table cannot represent.
#[derive(Debug, Clone)]
pub struct HuffmanEncoderTable {
    codes: [(u16, u8); MAX_SYMBOLS],
}

impl HuffmanEncoderTable {
    pub fn new(spec: &HuffmanSpec) -> Result<HuffmanEncoderTable> {
        let mut codes = [(0u16, 0u8); MAX_SYMBOLS];
        for (code, &symbol) in spec.build_codes()?.into_iter().zip(spec.symbols.iter()) {
            codes[symbol as usize] = code;
        }
        Ok(HuffmanEncoderTable { codes })
    }

    pub fn code(&self, symbol: u8) -> Option<(u16, u8)> {
        let code = self.codes[symbol as usize];
        (code.1 != 0).then_some(code)
    }

    pub fn encode(&self, bw: &mut BitWriter, symbol: u8) -> Result<()> {
        let (code, len) = self
            .code(symbol)
            .ok_or(Error::InvalidHuffmanTable("symbol has no code"))?;
        bw.write(code as u32, len as usize);
        Ok(())
    }
}

// Tables K.3 to K.6 of T.81.
const STD_DC_LUMINANCE_COUNTS: [u8; HUFFMAN_MAX_BITS] =
    [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const STD_DC_CHROMINANCE_COUNTS: [u8; HUFFMAN_MAX_BITS] =
    [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
const STD_DC_SYMBOLS: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const STD_AC_LUMINANCE_COUNTS: [u8; HUFFMAN_MAX_BITS] =
    [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7d];
#[rustfmt::skip]
const STD_AC_LUMINANCE_SYMBOLS: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08, 0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7,
    0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5,
    0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2,
    0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

const STD_AC_CHROMINANCE_COUNTS: [u8; HUFFMAN_MAX_BITS] =
    [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77];
#[rustfmt::skip]
const STD_AC_CHROMINANCE_SYMBOLS: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, 0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0,
    0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34, 0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26,
    0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5,
    0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3,
    0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda,
    0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

#[cfg(test)]
mod test {
    use arbtest::arbitrary::Unstructured;
    use test_log::test;

    use super::*;

    #[test]
    fn canonical_codes() -> Result<()> {
        // Two 2-bit codes, then three 3-bit codes.
        let mut counts = [0u8; HUFFMAN_MAX_BITS];
        counts[1] = 2;
        counts[2] = 3;
        let spec = HuffmanSpec::new(counts, vec![7, 3, 9, 1, 4])?;
        assert_eq!(
            spec.build_codes()?,
            vec![(0b00, 2), (0b01, 2), (0b100, 3), (0b101, 3), (0b110, 3)]
        );
        Ok(())
    }

    #[test]
    fn construction_is_deterministic() -> Result<()> {
        let spec = HuffmanSpec::std_ac_luminance();
        assert_eq!(spec.build_codes()?, spec.clone().build_codes()?);
        let codes = spec.build_codes()?;
        // 0x01 and 0x02 are the two 2-bit codes; EOB is the first 4-bit code.
        assert_eq!(codes[0], (0b00, 2));
        assert_eq!(codes[1], (0b01, 2));
        assert_eq!(codes[3], (0b1010, 4));
        Ok(())
    }

    #[test]
    fn exhausted_code_space() {
        let mut counts = [0u8; HUFFMAN_MAX_BITS];
        counts[0] = 3;
        assert!(matches!(
            HuffmanSpec::new(counts, vec![0, 1, 2]),
            Err(Error::InvalidHuffmanTable(_))
        ));
    }

    #[test]
    fn no_space_left_for_longer_codes() {
        // Two 1-bit codes use the whole code space, leaving nothing for 2 bits.
        let mut counts = [0u8; HUFFMAN_MAX_BITS];
        counts[0] = 2;
        counts[1] = 1;
        assert!(matches!(
            HuffmanSpec::new(counts, vec![0, 1, 2]),
            Err(Error::InvalidHuffmanTable(_))
        ));
    }

    #[test]
    fn mismatched_symbol_count() {
        let mut counts = [0u8; HUFFMAN_MAX_BITS];
        counts[2] = 4;
        assert!(matches!(
            HuffmanSpec::new(counts, vec![0, 1]),
            Err(Error::InvalidHuffmanTable(_))
        ));
    }

    #[test]
    fn long_codes_use_slow_path() -> Result<()> {
        // One code of each length 1..=15, then two of length 16.
        let mut counts = [1u8; HUFFMAN_MAX_BITS];
        counts[15] = 2;
        let symbols: Vec<u8> = (0..17).collect();
        let spec = HuffmanSpec::new(counts, symbols.clone())?;
        let decoder = HuffmanTable::new(&spec)?;
        let encoder = HuffmanEncoderTable::new(&spec)?;

        let mut bw = BitWriter::new();
        for &s in symbols.iter().rev() {
            encoder.encode(&mut bw, s)?;
        }
        let data = bw.finish();
        let mut br = BitReader::new(&data, 0);
        for &s in symbols.iter().rev() {
            assert_eq!(decoder.decode(&mut br)?, s);
        }
        Ok(())
    }

    #[test]
    fn truncated_code_is_an_error() -> Result<()> {
        let spec = HuffmanSpec::std_ac_luminance();
        let decoder = HuffmanTable::new(&spec)?;
        // 0xfa has a 16-bit code; only 8 bits are present.
        let data = [0xff, 0x00];
        let mut br = BitReader::new(&data, 0);
        assert!(decoder.decode(&mut br).is_err());
        Ok(())
    }

    #[test]
    fn symbol_round_trip() {
        let specs = [
            HuffmanSpec::std_dc_luminance(),
            HuffmanSpec::std_dc_chrominance(),
            HuffmanSpec::std_ac_luminance(),
            HuffmanSpec::std_ac_chrominance(),
        ];
        arbtest::arbtest(|u: &mut Unstructured| {
            let spec = u.choose(&specs)?;
            let decoder = HuffmanTable::new(spec).unwrap();
            let encoder = HuffmanEncoderTable::new(spec).unwrap();
            let len = u.int_in_range(0..=200)?;
            let mut message = Vec::with_capacity(len);
            for _ in 0..len {
                message.push(*u.choose(&spec.symbols)?);
            }
            let mut bw = BitWriter::new();
            for &s in &message {
                encoder.encode(&mut bw, s).unwrap();
            }
            let data = bw.finish();
            let mut br = BitReader::new(&data, 0);
            for &s in &message {
                assert_eq!(decoder.decode(&mut br).unwrap(), s);
            }
            Ok(())
        });
    }
}
