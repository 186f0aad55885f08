// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{error::Error, util::tracing_wrappers::*};

/// Reads entropy coded bits, most significant bit first, from the data that
/// follows a start-of-scan header.
///
/// `0xff 0x00` is unstuffed to a literal `0xff`. At any other `0xff xx` pair
/// the reader stops loading bytes and remembers the marker, leaving its
/// position on the `0xff`. Restart markers are consumed with
/// [`take_restart`](Self::take_restart); any other marker ends the entropy
/// coded segment, and marker parsing resumes there.
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    // Valid bits are left aligned.
    bit_buf: u64,
    bits_in_buf: usize,
    marker: Option<u8>,
}

impl Debug for BitReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ pos: {}/{}, bits_in_buf: {}, marker: {:?} }}",
            self.pos,
            self.data.len(),
            self.bits_in_buf,
            self.marker
        )
    }
}

pub const MAX_BITS_PER_CALL: usize = 16;

impl<'a> BitReader<'a> {
    /// Constructs a BitReader starting at `pos` in `data`.
    pub fn new(data: &'a [u8], pos: usize) -> BitReader<'a> {
        BitReader {
            data,
            pos: pos.min(data.len()),
            bit_buf: 0,
            bits_in_buf: 0,
            marker: None,
        }
    }

    /// Returns the marker that terminated the entropy coded segment, if one
    /// has been reached.
    pub fn marker(&self) -> Option<u8> {
        self.marker
    }

    /// Returns the next `num` bits without consuming them. Past the end of
    /// the segment the missing bits read as zeros; consuming them fails.
    /// ```
    /// # use jpeg_core::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0b1010_0000], 0);
    /// assert_eq!(br.peek(3), 0b101);
    /// assert_eq!(br.peek(9), 0b1010_0000_0);
    /// ```
    pub fn peek(&mut self, num: usize) -> u32 {
        debug_assert!(num > 0 && num <= MAX_BITS_PER_CALL);
        self.refill();
        (self.bit_buf >> (64 - num)) as u32
    }

    /// Advances by `num` bits, which must be available.
    pub fn consume(&mut self, num: usize) -> Result<(), Error> {
        if self.bits_in_buf < num {
            return Err(Error::OutOfBounds);
        }
        self.bit_buf <<= num;
        self.bits_in_buf -= num;
        Ok(())
    }

    /// Reads `num` bits as an unsigned integer.
    /// ```
    /// # use jpeg_core::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0xff, 0x00, 0x80, 0xff, 0xd9], 0);
    /// assert_eq!(br.read(8)?, 0xff);
    /// assert_eq!(br.read(1)?, 1);
    /// assert!(br.read(8).is_err());
    /// assert_eq!(br.marker(), Some(0xd9));
    /// # Ok::<(), jpeg_core::error::Error>(())
    /// ```
    pub fn read(&mut self, num: usize) -> Result<u32, Error> {
        if num == 0 {
            return Ok(0);
        }
        let ret = self.peek(num);
        self.consume(num)?;
        Ok(ret)
    }

    pub fn read_bit(&mut self) -> Result<bool, Error> {
        Ok(self.read(1)? != 0)
    }

    /// Reads a `size`-bit magnitude and sign extends it as in figure F.12 of
    /// T.81: values with a leading zero bit are negative.
    pub fn receive_extend(&mut self, size: u8) -> Result<i32, Error> {
        if size == 0 {
            return Ok(0);
        }
        let size = size as usize;
        let value = self.read(size)? as i32;
        if value < (1 << (size - 1)) {
            Ok(value - (1 << size) + 1)
        } else {
            Ok(value)
        }
    }

    /// Drops the padding bits of the current byte and consumes the restart
    /// marker `RST<expected>` that must follow.
    pub fn take_restart(&mut self, expected: u8) -> Result<(), Error> {
        self.bit_buf = 0;
        self.bits_in_buf = 0;
        self.skip_to_marker();
        match self.marker {
            Some(m) if m == 0xd0 + expected => {
                trace!(restart = expected, pos = self.pos, "restart marker");
                self.pos += 2;
                self.marker = None;
                Ok(())
            }
            Some(m) => Err(Error::InvalidRestartMarker(expected, m)),
            None => Err(Error::FileTruncated),
        }
    }

    /// Discards what is left of the entropy coded segment and returns the
    /// offset of the `0xff` of the marker that follows it (or the end of the
    /// data). Restart markers do not end the segment and are stepped over.
    pub fn finish(mut self) -> usize {
        self.bit_buf = 0;
        self.bits_in_buf = 0;
        self.skip_to_marker();
        while let Some(m @ 0xd0..=0xd7) = self.marker {
            trace!(marker = m, pos = self.pos, "skipping restart marker");
            self.pos += 2;
            self.marker = None;
            self.skip_to_marker();
        }
        debug!(pos = self.pos, marker = ?self.marker, "entropy segment finished");
        self.pos
    }

    fn skip_to_marker(&mut self) {
        while self.marker.is_none() && self.pos < self.data.len() {
            self.bits_in_buf = 0;
            self.refill();
        }
        self.bit_buf = 0;
        self.bits_in_buf = 0;
    }

    fn refill(&mut self) {
        while self.bits_in_buf <= 56 && self.marker.is_none() {
            let Some(&byte) = self.data.get(self.pos) else {
                return;
            };
            if byte == 0xff {
                // Skip fill bytes; a marker may be preceded by any number of them.
                let mut next = self.pos + 1;
                while self.data.get(next) == Some(&0xff) {
                    next += 1;
                }
                match self.data.get(next) {
                    Some(0x00) => self.pos = next + 1,
                    Some(&m) => {
                        self.pos = next - 1;
                        self.marker = Some(m);
                        return;
                    }
                    None => {
                        self.pos = self.data.len();
                        return;
                    }
                }
            } else {
                self.pos += 1;
            }
            self.bit_buf |= (byte as u64) << (56 - self.bits_in_buf);
            self.bits_in_buf += 8;
        }
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::error::Result;

    #[test]
    fn reads_msb_first() -> Result<()> {
        let mut br = BitReader::new(&[0b1100_1010, 0b0111_0000], 0);
        assert_eq!(br.read(2)?, 0b11);
        assert_eq!(br.read(3)?, 0b001);
        assert_eq!(br.read(5)?, 0b010_01);
        assert_eq!(br.read(6)?, 0b11_0000);
        assert!(br.read(1).is_err());
        Ok(())
    }

    #[test]
    fn unstuffs_ff00() -> Result<()> {
        let mut br = BitReader::new(&[0xff, 0x00, 0x12], 0);
        assert_eq!(br.read(16)?, 0xff12);
        Ok(())
    }

    #[test]
    fn stops_at_marker() -> Result<()> {
        let data = [0xab, 0xff, 0xd9];
        let mut br = BitReader::new(&data, 0);
        assert_eq!(br.read(8)?, 0xab);
        assert!(matches!(br.read(1), Err(Error::OutOfBounds)));
        assert_eq!(br.marker(), Some(0xd9));
        assert_eq!(br.finish(), 1);
        Ok(())
    }

    #[test]
    fn finish_steps_over_restart_markers() {
        let data = [0xab, 0xff, 0xd3, 0x12, 0xff, 0xd7, 0xff, 0xd9];
        let br = BitReader::new(&data, 0);
        assert_eq!(br.finish(), 6);

        let mut br = BitReader::new(&data, 0);
        assert!(br.read(16).is_err());
        assert_eq!(br.marker(), Some(0xd3));
        assert_eq!(br.finish(), 6);
    }

    #[test]
    fn fill_bytes_before_marker() {
        let data = [0x00, 0xff, 0xff, 0xff, 0xd9];
        let br = BitReader::new(&data, 0);
        assert_eq!(br.finish(), 3);
    }

    #[test]
    fn receive_extend_signs() -> Result<()> {
        // 3-bit category: 011 -> -4, 100 -> 4.
        let mut br = BitReader::new(&[0b0111_0000], 0);
        assert_eq!(br.receive_extend(3)?, -4);
        assert_eq!(br.receive_extend(3)?, 4);
        assert_eq!(br.receive_extend(0)?, 0);
        Ok(())
    }

    #[test]
    fn restart_realigns() -> Result<()> {
        let data = [0b1011_1111, 0xff, 0xd0, 0b0100_0000, 0xff, 0xd9];
        let mut br = BitReader::new(&data, 0);
        assert_eq!(br.read(3)?, 0b101);
        br.take_restart(0)?;
        assert_eq!(br.read(2)?, 0b01);
        assert_eq!(br.finish(), 4);
        Ok(())
    }

    #[test]
    fn wrong_restart_index() -> Result<()> {
        let data = [0x00, 0xff, 0xd3];
        let mut br = BitReader::new(&data, 0);
        br.read(8)?;
        assert!(matches!(
            br.take_restart(1),
            Err(Error::InvalidRestartMarker(1, 0xd3))
        ));
        Ok(())
    }
}
