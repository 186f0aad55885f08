// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use enough::{Stop, StopReason};
use jpeg_core::api::{EncoderOptions, JpegDecoder, JpegEncoder};
use jpeg_core::error::{ErrorKind, Result};
use jpeg_core::image::{Image, Rgb8};
use test_log::test;

struct Cancelled;

impl Stop for Cancelled {
    fn check(&self) -> std::result::Result<(), StopReason> {
        Err(StopReason::Cancelled)
    }
}

fn valid_stream() -> Vec<u8> {
    let data = jpeg_test_utils::rgb_test_pattern(24, 20);
    let pixels: Vec<Rgb8> = data
        .chunks_exact(3)
        .map(|p| Rgb8([p[0], p[1], p[2]]))
        .collect();
    let image = Image::from_vec((24, 20), pixels).unwrap();
    JpegEncoder::new(EncoderOptions::default())
        .unwrap()
        .encode_to_vec(&image)
        .unwrap()
}

fn marker_offset(data: &[u8], marker: u8) -> usize {
    data.windows(2).position(|w| w == [0xff, marker]).unwrap()
}

fn decode_error(data: &[u8]) -> ErrorKind {
    JpegDecoder::default()
        .decode::<Rgb8>(data)
        .unwrap_err()
        .kind()
}

#[test]
fn oversubscribed_huffman_table() {
    let mut data = valid_stream();
    // First DHT table: marker, length, class/index, then 16 code counts.
    let dht = marker_offset(&data, 0xc4);
    data[dht + 5] = 3;
    assert_eq!(decode_error(&data), ErrorKind::InvalidHuffmanTable);
}

#[test]
fn progressive_frame_is_unsupported() {
    let mut data = valid_stream();
    let sof = marker_offset(&data, 0xc0);
    data[sof + 1] = 0xc2;
    assert_eq!(decode_error(&data), ErrorKind::UnsupportedFeature);
    assert_eq!(
        JpegDecoder::default().read_header(&data).unwrap_err().kind(),
        ErrorKind::UnsupportedFeature
    );
}

#[test]
fn twelve_bit_precision_is_unsupported() {
    let mut data = valid_stream();
    let sof = marker_offset(&data, 0xc0);
    data[sof + 4] = 12;
    assert_eq!(decode_error(&data), ErrorKind::UnsupportedFeature);
}

#[test]
fn truncated_stream() {
    let data = valid_stream();
    let sos = marker_offset(&data, 0xda);
    let cut = &data[..sos + (data.len() - sos) / 2];
    assert_eq!(decode_error(cut), ErrorKind::CorruptStream);
    assert_eq!(decode_error(&data[..sos]), ErrorKind::CorruptStream);
}

#[test]
fn not_a_jpeg() {
    assert_eq!(decode_error(b"\x89PNG\r\n\x1a\n"), ErrorKind::CorruptStream);
    assert_eq!(decode_error(&[0xff]), ErrorKind::CorruptStream);
}

#[test]
fn bad_segment_length() {
    let mut data = valid_stream();
    let dqt = marker_offset(&data, 0xdb);
    data[dqt + 2] = 0;
    data[dqt + 3] = 1;
    assert_eq!(decode_error(&data), ErrorKind::InvalidMarkerSegment);
}

#[test]
fn decode_cancelled() {
    let data = valid_stream();
    let err = JpegDecoder::default()
        .decode_with_stop::<Rgb8>(&data, &Cancelled)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationCancelled);
}

#[test]
fn encode_cancelled_writes_nothing() -> Result<()> {
    let image = Image::new_with_value((32, 32), Rgb8([10, 20, 30]))?;
    let mut sink = Vec::new();
    let err = JpegEncoder::new(EncoderOptions::default())?
        .encode_with_stop(&image, &mut sink, &Cancelled)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationCancelled);
    assert!(sink.is_empty());
    Ok(())
}

#[test]
fn invalid_encoder_options() {
    for quality in [0, 101] {
        let err = JpegEncoder::new(EncoderOptions::with_quality(quality)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }
    let mut options = EncoderOptions::default();
    options.quant_tables = Some([[0; 64], [1; 64]]);
    assert_eq!(
        JpegEncoder::new(options).unwrap_err().kind(),
        ErrorKind::InvalidConfiguration
    );
}

#[test]
fn empty_image_is_rejected() -> Result<()> {
    let image: Image<Rgb8> = Image::new((0, 5))?;
    let err = JpegEncoder::new(EncoderOptions::default())?
        .encode_to_vec(&image)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    Ok(())
}
