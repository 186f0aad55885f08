// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod decode;
pub mod encode;
mod planes;

pub use decode::{DecoderState, FrameDecoder, FrameInfo};
pub use encode::FrameEncoder;
pub use planes::*;
