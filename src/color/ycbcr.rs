// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Fixed-point conversion between 8-bit RGB and full-range BT.601 YCbCr, as
//! defined by JFIF.
//!
//! Every output is the sum of three table lookups shifted right by
//! [`SCALE_BITS`]. The rounding bias of each sum, and the +128 offset of the
//! chroma channels, are folded into one of its three terms.

const SCALE_BITS: u32 = 16;
const ONE_HALF: i32 = 1 << (SCALE_BITS - 1);
const CBCR_OFFSET: i32 = 128 << SCALE_BITS;

const fn fix(x: f64) -> i32 {
    (x * (1 << SCALE_BITS) as f64 + 0.5) as i32
}

const TABLE_LEN: usize = 256;

// Offsets of the eight 256-entry ranges of the forward table.
pub const R_Y: usize = 0;
pub const G_Y: usize = TABLE_LEN;
pub const B_Y: usize = 2 * TABLE_LEN;
pub const R_CB: usize = 3 * TABLE_LEN;
pub const G_CB: usize = 4 * TABLE_LEN;
pub const B_CB: usize = 5 * TABLE_LEN;
/// The red contribution to Cr equals the blue contribution to Cb.
pub const R_CR: usize = B_CB;
pub const G_CR: usize = 6 * TABLE_LEN;
pub const B_CR: usize = 7 * TABLE_LEN;
const RGB_TABLE_SIZE: usize = 8 * TABLE_LEN;

/// Lookup tables for RGB to YCbCr conversion. Immutable once built, so one
/// instance can be shared by all worker threads.
#[derive(Clone)]
pub struct RgbToYcbcrTables {
    table: Box<[i32; RGB_TABLE_SIZE]>,
}

impl std::fmt::Debug for RgbToYcbcrTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RgbToYcbcrTables")
    }
}

impl Default for RgbToYcbcrTables {
    fn default() -> Self {
        Self::new()
    }
}

impl RgbToYcbcrTables {
    pub fn new() -> RgbToYcbcrTables {
        let table = array_init::array_init(|index: usize| {
            let i = (index % TABLE_LEN) as i32;
            match index / TABLE_LEN {
                0 => fix(0.29900) * i,
                1 => fix(0.58700) * i,
                2 => fix(0.11400) * i + ONE_HALF,
                3 => -fix(0.16874) * i,
                4 => -fix(0.33126) * i,
                // Using ONE_HALF - 1 keeps the maximum chroma below 256.
                5 => fix(0.50000) * i + CBCR_OFFSET + ONE_HALF - 1,
                6 => -fix(0.41869) * i,
                _ => -fix(0.08131) * i,
            }
        });
        RgbToYcbcrTables {
            table: Box::new(table),
        }
    }

    fn sum(&self, r: u8, g: u8, b: u8, offsets: [usize; 3]) -> u8 {
        let t = &self.table;
        let sum = t[offsets[0] + r as usize] + t[offsets[1] + g as usize] + t[offsets[2] + b as usize];
        (sum >> SCALE_BITS) as u8
    }

    pub fn y(&self, r: u8, g: u8, b: u8) -> u8 {
        self.sum(r, g, b, [R_Y, G_Y, B_Y])
    }

    pub fn cb(&self, r: u8, g: u8, b: u8) -> u8 {
        self.sum(r, g, b, [R_CB, G_CB, B_CB])
    }

    pub fn cr(&self, r: u8, g: u8, b: u8) -> u8 {
        self.sum(r, g, b, [R_CR, G_CR, B_CR])
    }

    pub fn convert(&self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        [self.y(r, g, b), self.cb(r, g, b), self.cr(r, g, b)]
    }
}

/// Lookup tables for YCbCr to RGB conversion.
#[derive(Clone)]
pub struct YcbcrToRgbTables {
    cr_r: [i32; TABLE_LEN],
    cb_b: [i32; TABLE_LEN],
    cr_g: [i32; TABLE_LEN],
    cb_g: [i32; TABLE_LEN],
}

impl std::fmt::Debug for YcbcrToRgbTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "YcbcrToRgbTables")
    }
}

impl Default for YcbcrToRgbTables {
    fn default() -> Self {
        Self::new()
    }
}

impl YcbcrToRgbTables {
    pub fn new() -> YcbcrToRgbTables {
        let centered = |i: usize| i as i32 - 128;
        YcbcrToRgbTables {
            cr_r: array_init::array_init(|i| (fix(1.40200) * centered(i) + ONE_HALF) >> SCALE_BITS),
            cb_b: array_init::array_init(|i| (fix(1.77200) * centered(i) + ONE_HALF) >> SCALE_BITS),
            cr_g: array_init::array_init(|i| -fix(0.71414) * centered(i)),
            cb_g: array_init::array_init(|i| -fix(0.34414) * centered(i) + ONE_HALF),
        }
    }

    /// Rounding can overshoot the sample range, so outputs are clamped.
    pub fn convert(&self, [y, cb, cr]: [u8; 3]) -> [u8; 3] {
        let y = y as i32;
        let (cb, cr) = (cb as usize, cr as usize);
        let r = y + self.cr_r[cr];
        let g = y + ((self.cb_g[cb] + self.cr_g[cr]) >> SCALE_BITS);
        let b = y + self.cb_b[cb];
        [r, g, b].map(|v| v.clamp(0, 255) as u8)
    }
}
