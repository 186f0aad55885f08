// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Reference transforms computed straight from the JPEG definition, in f64.
//! Used to check the fast path and as a bench baseline.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::dct::{BLOCK_DIM, BLOCK_SIZE};

#[inline(always)]
fn alpha(u: usize) -> f64 {
    if u == 0 {
        FRAC_1_SQRT_2
    } else {
        1.0
    }
}

fn basis() -> [[f64; BLOCK_DIM]; BLOCK_DIM] {
    let mut matrix = [[0.0f64; BLOCK_DIM]; BLOCK_DIM];
    for (u, row) in matrix.iter_mut().enumerate() {
        for (x, element) in row.iter_mut().enumerate() {
            *element = 0.5 * alpha(u) * ((2 * x + 1) as f64 * u as f64 * PI / 16.0).cos();
        }
    }
    matrix
}

/// `F(v, u) = 1/4 C(u) C(v) sum f(y, x) cos((2x+1)u pi/16) cos((2y+1)v pi/16)`
pub fn fdct8x8_slow(input: &[f64; BLOCK_SIZE]) -> [f64; BLOCK_SIZE] {
    let matrix = basis();
    let mut tmp = [0.0f64; BLOCK_SIZE];
    for y in 0..BLOCK_DIM {
        for u in 0..BLOCK_DIM {
            tmp[y * BLOCK_DIM + u] = (0..BLOCK_DIM)
                .map(|x| matrix[u][x] * input[y * BLOCK_DIM + x])
                .sum();
        }
    }
    let mut out = [0.0f64; BLOCK_SIZE];
    for v in 0..BLOCK_DIM {
        for u in 0..BLOCK_DIM {
            out[v * BLOCK_DIM + u] = (0..BLOCK_DIM)
                .map(|y| matrix[v][y] * tmp[y * BLOCK_DIM + u])
                .sum();
        }
    }
    out
}

/// Exact inverse of [`fdct8x8_slow`].
pub fn idct8x8_slow(input: &[f64; BLOCK_SIZE]) -> [f64; BLOCK_SIZE] {
    let matrix = basis();
    let mut tmp = [0.0f64; BLOCK_SIZE];
    for v in 0..BLOCK_DIM {
        for x in 0..BLOCK_DIM {
            tmp[v * BLOCK_DIM + x] = (0..BLOCK_DIM)
                .map(|u| matrix[u][x] * input[v * BLOCK_DIM + u])
                .sum();
        }
    }
    let mut out = [0.0f64; BLOCK_SIZE];
    for y in 0..BLOCK_DIM {
        for x in 0..BLOCK_DIM {
            out[y * BLOCK_DIM + x] = (0..BLOCK_DIM)
                .map(|v| matrix[v][y] * tmp[v * BLOCK_DIM + x])
                .sum();
        }
    }
    out
}
