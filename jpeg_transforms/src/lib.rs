// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod dct;
pub mod dct_slow;

pub use dct::{fdct8x8, idct8x8, BLOCK_DIM, BLOCK_SIZE};
