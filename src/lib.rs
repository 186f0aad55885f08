// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![deny(unsafe_code)]
pub mod api;
pub mod bit_reader;
pub mod bit_writer;
pub mod chroma;
pub mod color;
pub mod convolution;
pub mod entropy_coding;
pub mod error;
pub mod frame;
pub mod headers;
pub mod image;
pub mod parallel;
pub mod quant;
pub mod util;

pub use api::{DecoderOptions, EncoderOptions, FrameInfo, JpegDecoder, JpegEncoder};
pub use error::{Error, ErrorKind, Result};
