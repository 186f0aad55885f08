// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::bit_reader::BitReader;
use crate::entropy_coding::huffman::HuffmanTable;
use crate::error::{Error, Result};
use crate::quant::ZigzagBlock;

const MAX_DC_CATEGORY: u8 = 11;
const MAX_AC_CATEGORY: u8 = 10;

/// Decodes one block's coefficients, in zigzag order, from the stream.
///
/// `prediction` is the component's DC predictor; it is updated with the
/// absolute DC value of this block.
pub fn decode_block(
    br: &mut BitReader,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    prediction: &mut i32,
) -> Result<ZigzagBlock> {
    let mut block = [0i16; 64];

    let category = dc_table.decode(br)?;
    if category > MAX_DC_CATEGORY {
        return Err(Error::CorruptStream("DC magnitude category out of range"));
    }
    let dc = *prediction + br.receive_extend(category)?;
    block[0] = i16::try_from(dc).map_err(|_| Error::CoefficientOutOfRange)?;
    *prediction = dc;

    let mut k = 1;
    while k < 64 {
        let rs = ac_table.decode(br)?;
        let run = (rs >> 4) as usize;
        let size = rs & 0x0f;
        if size == 0 {
            if run == 15 {
                // ZRL: sixteen zero coefficients.
                k += 16;
                continue;
            }
            // EOB
            break;
        }
        if size > MAX_AC_CATEGORY {
            return Err(Error::CorruptStream("AC magnitude category out of range"));
        }
        k += run;
        if k > 63 {
            return Err(Error::CoefficientOutOfRange);
        }
        block[k] = br.receive_extend(size)? as i16;
        k += 1;
    }
    Ok(block)
}
