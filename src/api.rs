// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

mod decoder;
mod encoder;
mod options;

pub use decoder::*;
pub use encoder::*;
pub use options::*;

pub use crate::frame::FrameInfo;
