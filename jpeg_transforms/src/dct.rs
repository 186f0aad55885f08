// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Separable 8x8 DCT-II / DCT-III using the Arai-Agui-Nakajima factorization.
//!
//! Both directions use the JPEG normalization, so `idct8x8(fdct8x8(x))`
//! reproduces `x` up to floating point error. The AAN butterflies produce
//! scaled outputs; the per-frequency scale is folded into a pre-multiplication
//! (inverse) or post-multiplication (forward) of the coefficients.

pub const BLOCK_DIM: usize = 8;
pub const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;

/// `cos(k * pi / 16) * sqrt(2)` for `k > 0`, and 1 for `k == 0`.
#[allow(clippy::excessive_precision)]
pub const AAN_SCALES: [f32; BLOCK_DIM] = [
    1.0,
    1.387039845,
    1.306562965,
    1.175875602,
    1.0,
    0.785694958,
    0.541196100,
    0.275899379,
];

#[allow(clippy::excessive_precision)]
const SQRT_2: f32 = 1.414213562;

#[inline(always)]
fn idct1d(input: [f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    // Even part.
    let tmp10 = input[0] + input[4];
    let tmp11 = input[0] - input[4];
    let tmp13 = input[2] + input[6];
    let tmp12 = (input[2] - input[6]) * SQRT_2 - tmp13;

    let tmp0 = tmp10 + tmp13;
    let tmp3 = tmp10 - tmp13;
    let tmp1 = tmp11 + tmp12;
    let tmp2 = tmp11 - tmp12;

    // Odd part.
    let z13 = input[5] + input[3];
    let z10 = input[5] - input[3];
    let z11 = input[1] + input[7];
    let z12 = input[1] - input[7];

    let tmp7 = z11 + z13;
    let tmp11 = (z11 - z13) * SQRT_2;
    let z5 = (z10 + z12) * 1.847759065;
    let tmp10 = 1.082392200 * z12 - z5;
    let tmp12 = -2.613125930 * z10 + z5;

    let tmp6 = tmp12 - tmp7;
    let tmp5 = tmp11 - tmp6;
    let tmp4 = tmp10 + tmp5;

    [
        tmp0 + tmp7,
        tmp1 + tmp6,
        tmp2 + tmp5,
        tmp3 - tmp4,
        tmp3 + tmp4,
        tmp2 - tmp5,
        tmp1 - tmp6,
        tmp0 - tmp7,
    ]
}

#[inline(always)]
fn fdct1d(input: [f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    let tmp0 = input[0] + input[7];
    let tmp7 = input[0] - input[7];
    let tmp1 = input[1] + input[6];
    let tmp6 = input[1] - input[6];
    let tmp2 = input[2] + input[5];
    let tmp5 = input[2] - input[5];
    let tmp3 = input[3] + input[4];
    let tmp4 = input[3] - input[4];

    // Even part.
    let tmp10 = tmp0 + tmp3;
    let tmp13 = tmp0 - tmp3;
    let tmp11 = tmp1 + tmp2;
    let tmp12 = tmp1 - tmp2;
    let z1 = (tmp12 + tmp13) * 0.707106781;

    // Odd part.
    let tmp10o = tmp4 + tmp5;
    let tmp11o = tmp5 + tmp6;
    let tmp12o = tmp6 + tmp7;
    let z5 = (tmp10o - tmp12o) * 0.382683433;
    let z2 = 0.541196100 * tmp10o + z5;
    let z4 = 1.306562965 * tmp12o + z5;
    let z3 = tmp11o * 0.707106781;
    let z11 = tmp7 + z3;
    let z13 = tmp7 - z3;

    [
        tmp10 + tmp11,
        z11 + z4,
        tmp13 + z1,
        z13 - z2,
        tmp10 - tmp11,
        z13 + z2,
        tmp13 - z1,
        z11 - z4,
    ]
}

#[inline(always)]
fn column(data: &[f32; BLOCK_SIZE], x: usize) -> [f32; BLOCK_DIM] {
    std::array::from_fn(|y| data[y * BLOCK_DIM + x])
}

#[inline(always)]
fn set_column(data: &mut [f32; BLOCK_SIZE], x: usize, values: [f32; BLOCK_DIM]) {
    for (y, v) in values.into_iter().enumerate() {
        data[y * BLOCK_DIM + x] = v;
    }
}

/// In-place inverse DCT of a natural-order block of dequantized coefficients.
/// The output is the spatial residual, before the +128 level shift.
pub fn idct8x8(data: &mut [f32; BLOCK_SIZE]) {
    for (i, v) in data.iter_mut().enumerate() {
        *v *= AAN_SCALES[i / BLOCK_DIM] * AAN_SCALES[i % BLOCK_DIM] * 0.125;
    }

    for x in 0..BLOCK_DIM {
        let col = column(data, x);
        if col[1..].iter().all(|&c| c == 0.0) {
            set_column(data, x, [col[0]; BLOCK_DIM]);
        } else {
            set_column(data, x, idct1d(col));
        }
    }

    for row in data.chunks_exact_mut(BLOCK_DIM) {
        let input: [f32; BLOCK_DIM] = std::array::from_fn(|i| row[i]);
        row.copy_from_slice(&idct1d(input));
    }
}

/// In-place forward DCT of a natural-order block of level-shifted samples.
pub fn fdct8x8(data: &mut [f32; BLOCK_SIZE]) {
    for row in data.chunks_exact_mut(BLOCK_DIM) {
        let input: [f32; BLOCK_DIM] = std::array::from_fn(|i| row[i]);
        row.copy_from_slice(&fdct1d(input));
    }

    for x in 0..BLOCK_DIM {
        let col = column(data, x);
        set_column(data, x, fdct1d(col));
    }

    for (i, v) in data.iter_mut().enumerate() {
        *v /= AAN_SCALES[i / BLOCK_DIM] * AAN_SCALES[i % BLOCK_DIM] * 8.0;
    }
}
