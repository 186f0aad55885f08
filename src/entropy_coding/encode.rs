// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::bit_writer::BitWriter;
use crate::entropy_coding::huffman::HuffmanEncoderTable;
use crate::error::Result;
use crate::quant::ZigzagBlock;

const ZRL: u8 = 0xf0;
const EOB: u8 = 0x00;

/// Number of bits needed for the magnitude of `value`.
/// ```
/// # use jpeg_core::entropy_coding::encode::category;
/// assert_eq!(category(0), 0);
/// assert_eq!(category(-1), 1);
/// assert_eq!(category(255), 8);
/// assert_eq!(category(-1024), 11);
/// ```
pub fn category(value: i32) -> u8 {
    (32 - value.unsigned_abs().leading_zeros()) as u8
}

/// Low `category` bits that represent `value`; negative values are stored as
/// `value - 1` in one's complement form.
fn magnitude_bits(value: i32, category: u8) -> u32 {
    let bits = if value < 0 { value - 1 } else { value };
    bits as u32 & ((1u32 << category) - 1)
}

fn encode_value(bw: &mut BitWriter, value: i32, category: u8) {
    bw.write(magnitude_bits(value, category), category as usize);
}

/// Encodes one block of quantized coefficients given in zigzag order.
/// `prediction` is the component's DC predictor and is updated.
pub fn encode_block(
    bw: &mut BitWriter,
    block: &ZigzagBlock,
    prediction: &mut i32,
    dc_table: &HuffmanEncoderTable,
    ac_table: &HuffmanEncoderTable,
) -> Result<()> {
    let dc = block[0] as i32;
    let diff = dc - *prediction;
    *prediction = dc;
    let dc_category = category(diff);
    dc_table.encode(bw, dc_category)?;
    encode_value(bw, diff, dc_category);

    let mut run = 0u8;
    for &coefficient in &block[1..] {
        if coefficient == 0 {
            run += 1;
            continue;
        }
        while run >= 16 {
            ac_table.encode(bw, ZRL)?;
            run -= 16;
        }
        let value = coefficient as i32;
        let ac_category = category(value);
        ac_table.encode(bw, (run << 4) | ac_category)?;
        encode_value(bw, value, ac_category);
        run = 0;
    }
    if run > 0 {
        ac_table.encode(bw, EOB)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::entropy_coding::huffman::HuffmanSpec;

    #[test]
    fn negative_magnitudes() {
        assert_eq!(magnitude_bits(-3, 2), 0b00);
        assert_eq!(magnitude_bits(-1, 1), 0b0);
        assert_eq!(magnitude_bits(-4, 3), 0b011);
        assert_eq!(magnitude_bits(5, 3), 0b101);
    }

    #[test]
    fn dc_only_block() -> Result<()> {
        let dc = HuffmanEncoderTable::new(&HuffmanSpec::std_dc_luminance())?;
        let ac = HuffmanEncoderTable::new(&HuffmanSpec::std_ac_luminance())?;
        let mut block = [0i16; 64];
        block[0] = 10;
        let mut bw = BitWriter::new();
        let mut pred = 0;
        encode_block(&mut bw, &block, &mut pred, &dc, &ac)?;
        assert_eq!(pred, 10);
        // 101 (category 4) 1010 (10) 1010 (EOB), padded with ones.
        assert_eq!(bw.finish(), vec![0b1011_0101, 0b0101_1111]);
        Ok(())
    }
}
