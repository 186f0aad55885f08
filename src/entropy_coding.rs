// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod decode;
pub mod encode;
pub mod huffman;

use crate::headers::MAX_COMPONENTS;

/// Running DC value per component, against which the next block's DC
/// coefficient is differentially coded. Reset to zero at the start of every
/// scan and after every restart marker.
#[derive(Debug, Clone, Default)]
pub struct DcPredictors {
    values: [i32; MAX_COMPONENTS],
}

impl DcPredictors {
    pub fn new() -> DcPredictors {
        DcPredictors::default()
    }

    pub fn reset(&mut self) {
        self.values = [0; MAX_COMPONENTS];
    }

    pub fn get_mut(&mut self, component: usize) -> &mut i32 {
        &mut self.values[component]
    }
}
