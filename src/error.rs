// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::entropy_coding::huffman::HUFFMAN_MAX_BITS;

#[derive(Error, Debug)]
pub enum Error {
    // Entropy coded data and marker structure.
    #[error("Corrupt stream: {0}")]
    CorruptStream(&'static str),
    #[error("Entropy coded data ended in the middle of a code")]
    OutOfBounds,
    #[error("File truncated")]
    FileTruncated,
    #[error("Unexpected marker 0xff{0:02x}")]
    UnexpectedMarker(u8),
    #[error("No Huffman code matched after {} bits", HUFFMAN_MAX_BITS)]
    HuffmanCodeNotFound,
    #[error("Coefficient index past the end of the block")]
    CoefficientOutOfRange,
    #[error("Expected restart marker {0}, found 0xff{1:02x}")]
    InvalidRestartMarker(u8, u8),
    #[error("Invalid signature {0:02x}{1:02x}, expected ffd8")]
    InvalidSignature(u8, u8),
    // Malformed headers.
    #[error("Invalid Huffman table: {0}")]
    InvalidHuffmanTable(&'static str),
    #[error("Invalid marker segment 0xff{0:02x} with declared length {1}")]
    InvalidMarkerSegment(u8, u16),
    #[error("Invalid quantization table {0}")]
    InvalidQuantTable(u8),
    #[error("Scan references unknown component {0}")]
    UnknownComponent(u8),
    #[error("Component {0} uses undefined {1} table {2}")]
    MissingTable(u8, &'static str, u8),
    #[error("Invalid sampling factors {0}x{1}")]
    InvalidSamplingFactors(u8, u8),
    // Structurally valid, but not implemented.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
    // Caller requested abort.
    #[error("Operation cancelled: {0:?}")]
    OperationCancelled(enough::StopReason),
    // Encoder configuration.
    #[error("Invalid quality {0}, expected 1..=100")]
    InvalidQuality(u8),
    #[error("Quantization step {0} is zero")]
    InvalidQuantStep(usize),
    #[error("Invalid image size: {0}x{1}")]
    InvalidImageSize(usize, usize),
    #[error("Image has {0} pixels, more than the limit of {1}")]
    ImageTooLarge(usize, usize),
    #[error("Invalid convolution kernel of length {0}")]
    InvalidKernel(usize),
    // Generic arithmetic overflow. Prefer using other errors if possible.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`], so callers can tell damaged input
/// from unsupported input or a cancelled operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CorruptStream,
    InvalidHuffmanTable,
    InvalidMarkerSegment,
    UnsupportedFeature,
    OperationCancelled,
    InvalidConfiguration,
    ResourceExhausted,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CorruptStream(_)
            | Error::OutOfBounds
            | Error::FileTruncated
            | Error::UnexpectedMarker(_)
            | Error::HuffmanCodeNotFound
            | Error::CoefficientOutOfRange
            | Error::InvalidRestartMarker(..)
            | Error::InvalidSignature(..) => ErrorKind::CorruptStream,
            Error::InvalidHuffmanTable(_) => ErrorKind::InvalidHuffmanTable,
            Error::InvalidMarkerSegment(..)
            | Error::InvalidQuantTable(_)
            | Error::UnknownComponent(_)
            | Error::MissingTable(..)
            | Error::InvalidSamplingFactors(..) => ErrorKind::InvalidMarkerSegment,
            Error::UnsupportedFeature(_) => ErrorKind::UnsupportedFeature,
            Error::OperationCancelled(_) => ErrorKind::OperationCancelled,
            Error::InvalidQuality(_)
            | Error::InvalidQuantStep(_)
            | Error::InvalidImageSize(..)
            | Error::InvalidKernel(_) => ErrorKind::InvalidConfiguration,
            Error::ImageTooLarge(..) | Error::ArithmeticOverflow | Error::OutOfMemory(_) => {
                ErrorKind::ResourceExhausted
            }
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<enough::StopReason> for Error {
    fn from(reason: enough::StopReason) -> Self {
        Error::OperationCancelled(reason)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
