// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Writes entropy coded bits, most significant bit first, stuffing a zero byte
/// after every `0xff`.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    // Pending bits are right aligned.
    bit_buf: u64,
    bits_in_buf: usize,
}

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    /// Appends the `num` low bits of `bits`.
    /// ```
    /// # use jpeg_core::bit_writer::BitWriter;
    /// let mut bw = BitWriter::new();
    /// bw.write(0b1111_1111, 8);
    /// bw.write(0b101, 3);
    /// assert_eq!(bw.finish(), vec![0xff, 0x00, 0b1011_1111]);
    /// ```
    pub fn write(&mut self, bits: u32, num: usize) {
        debug_assert!(num <= 24);
        if num == 0 {
            return;
        }
        self.bit_buf = (self.bit_buf << num) | (bits as u64 & ((1u64 << num) - 1));
        self.bits_in_buf += num;
        while self.bits_in_buf >= 8 {
            let byte = (self.bit_buf >> (self.bits_in_buf - 8)) as u8;
            self.bits_in_buf -= 8;
            self.push_byte(byte);
        }
        self.bit_buf &= (1u64 << self.bits_in_buf) - 1;
    }

    /// Pads the current byte with one bits.
    pub fn pad_to_byte(&mut self) {
        if self.bits_in_buf > 0 {
            let pad = 8 - self.bits_in_buf;
            self.write((1 << pad) - 1, pad);
        }
    }

    /// Pads to a byte boundary and emits `RST<index>`.
    pub fn write_restart(&mut self, index: u8) {
        debug_assert!(index < 8);
        self.pad_to_byte();
        self.out.push(0xff);
        self.out.push(0xd0 + index);
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty() && self.bits_in_buf == 0
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.pad_to_byte();
        self.out
    }

    fn push_byte(&mut self, byte: u8) {
        self.out.push(byte);
        if byte == 0xff {
            self.out.push(0x00);
        }
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::bit_reader::BitReader;
    use crate::error::Result;

    #[test]
    fn restart_marker_is_byte_aligned() {
        let mut bw = BitWriter::new();
        bw.write(0, 2);
        bw.write_restart(5);
        bw.write(0xff, 8);
        assert_eq!(bw.finish(), vec![0b0011_1111, 0xff, 0xd5, 0xff, 0x00]);
    }

    #[test]
    fn reader_reads_back_writer_output() -> Result<()> {
        let values: Vec<(u32, usize)> = (0..200u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 16, 1 + (i as usize % 16)))
            .collect();
        let mut bw = BitWriter::new();
        for &(bits, num) in &values {
            bw.write(bits, num);
        }
        let data = bw.finish();
        let mut br = BitReader::new(&data, 0);
        for &(bits, num) in &values {
            assert_eq!(br.read(num)?, bits & ((1 << num) - 1));
        }
        Ok(())
    }
}
