// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use jpeg_core::api::{
    ChromaSubsampling, ChromaUpsampling, DecoderOptions, EncodeColor, EncoderOptions,
    JpegDecoder, JpegEncoder, ParallelOptions,
};
use jpeg_core::error::Result;
use jpeg_core::image::{Gray8, Image, Rgb8, Rgba8, RgbF32};
use test_log::test;

fn test_image(width: usize, height: usize) -> Image<Rgb8> {
    let data = jpeg_test_utils::rgb_test_pattern(width, height);
    let pixels: Vec<Rgb8> = data
        .chunks_exact(3)
        .map(|p| Rgb8([p[0], p[1], p[2]]))
        .collect();
    Image::from_vec((width, height), pixels).unwrap()
}

fn channel_errors(a: &Image<Rgb8>, b: &Image<Rgb8>) -> (f64, u8) {
    assert_eq!(a.size(), b.size());
    let mut sum = 0u64;
    let mut max = 0u8;
    for (pa, pb) in a.as_slice().iter().zip(b.as_slice()) {
        for c in 0..3 {
            let diff = pa.0[c].abs_diff(pb.0[c]);
            sum += diff as u64;
            max = max.max(diff);
        }
    }
    (sum as f64 / (a.as_slice().len() * 3) as f64, max)
}

fn encode(image: &Image<Rgb8>, options: EncoderOptions) -> Result<Vec<u8>> {
    JpegEncoder::new(options)?.encode_to_vec(image)
}

macro_rules! round_trip_test {
    ($quality:literal, $subsampling:ident, $max_mean_error:literal) => {
        paste::paste! {
            #[test]
            fn [<round_trip_q $quality _ $subsampling:lower>]() -> Result<()> {
                let original = test_image(67, 45);
                let data = encode(
                    &original,
                    EncoderOptions {
                        quality: $quality,
                        subsampling: ChromaSubsampling::$subsampling,
                        ..EncoderOptions::default()
                    },
                )?;
                let decoder = JpegDecoder::default();
                let info = decoder.read_header(&data)?;
                assert_eq!((info.width, info.height, info.components), (67, 45, 3));
                assert_eq!(
                    info.sampling[0],
                    ChromaSubsampling::$subsampling.luma_sampling()
                );
                let decoded: Image<Rgb8> = decoder.decode(&data)?;
                let (mean, max) = channel_errors(&original, &decoded);
                assert!(
                    mean <= $max_mean_error,
                    "mean error {mean}, max error {max}"
                );
                Ok(())
            }
        }
    };
}

round_trip_test!(50, Yuv420, 4.0);
round_trip_test!(75, Yuv420, 3.0);
round_trip_test!(75, Yuv422, 3.0);
round_trip_test!(75, Yuv440, 3.0);
round_trip_test!(90, Yuv444, 2.0);
round_trip_test!(100, Yuv444, 1.5);

#[test]
fn near_lossless_bounds_every_sample() -> Result<()> {
    let original = test_image(40, 33);
    let data = encode(
        &original,
        EncoderOptions {
            quality: 100,
            subsampling: ChromaSubsampling::Yuv444,
            ..EncoderOptions::default()
        },
    )?;
    let decoded: Image<Rgb8> = JpegDecoder::default().decode(&data)?;
    let (_, max) = channel_errors(&original, &decoded);
    assert!(max <= 6, "max error {max}");
    Ok(())
}

#[test]
fn reencoding_decoded_stream_is_stable() -> Result<()> {
    let options = EncoderOptions::with_quality(85);
    let first = encode(&test_image(48, 32), options.clone())?;
    let decoder = JpegDecoder::default();
    let decoded: Image<Rgb8> = decoder.decode(&first)?;
    let second = encode(&decoded, options)?;
    let redecoded: Image<Rgb8> = decoder.decode(&second)?;
    let (mean, _) = channel_errors(&decoded, &redecoded);
    assert!(mean <= 1.5, "mean error {mean}");
    Ok(())
}

#[test]
fn restart_intervals_do_not_change_pixels() -> Result<()> {
    let original = test_image(70, 50);
    let decoder = JpegDecoder::default();
    let plain: Image<Rgb8> = decoder.decode(&encode(&original, EncoderOptions::default())?)?;
    for restart_interval in [1, 3, 7] {
        let data = encode(
            &original,
            EncoderOptions {
                restart_interval,
                ..EncoderOptions::default()
            },
        )?;
        assert!(data.windows(2).any(|w| w == [0xff, 0xd0]));
        let with_restarts: Image<Rgb8> = decoder.decode(&data)?;
        assert_eq!(plain.as_slice(), with_restarts.as_slice());
    }
    Ok(())
}

#[test]
fn parallel_decode_matches_sequential() -> Result<()> {
    let data = encode(&test_image(150, 130), EncoderOptions::default())?;
    let sequential = JpegDecoder::new(DecoderOptions {
        parallel: ParallelOptions::sequential(),
        ..DecoderOptions::default()
    });
    let parallel = JpegDecoder::new(DecoderOptions {
        parallel: ParallelOptions {
            max_parallelism: Some(4),
            min_rows_per_task: 8,
        },
        ..DecoderOptions::default()
    });
    let a: Image<Rgb8> = sequential.decode(&data)?;
    let b: Image<Rgb8> = parallel.decode(&data)?;
    assert_eq!(a.as_slice(), b.as_slice());
    Ok(())
}

#[test]
fn parallel_encode_matches_sequential() -> Result<()> {
    let image = test_image(99, 101);
    let sequential = encode(
        &image,
        EncoderOptions {
            parallel: ParallelOptions::sequential(),
            ..EncoderOptions::default()
        },
    )?;
    let parallel = encode(
        &image,
        EncoderOptions {
            parallel: ParallelOptions {
                max_parallelism: Some(3),
                min_rows_per_task: 4,
            },
            ..EncoderOptions::default()
        },
    )?;
    assert_eq!(sequential, parallel);
    Ok(())
}

// Gradients only, so chroma has no edges that interpolation would blur.
fn smooth_image(width: usize, height: usize) -> Result<Image<Rgb8>> {
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            pixels.push(Rgb8([
                (20 + x * 200 / width) as u8,
                (30 + y * 200 / height) as u8,
                (230 - (x + y) * 150 / (width + height)) as u8,
            ]));
        }
    }
    Image::from_vec((width, height), pixels)
}

#[test]
fn linear_upsampling_on_smooth_chroma() -> Result<()> {
    let original = smooth_image(64, 48)?;
    let data = encode(&original, EncoderOptions::default())?;
    let nearest: Image<Rgb8> = JpegDecoder::default().decode(&data)?;
    let linear: Image<Rgb8> = JpegDecoder::new(DecoderOptions {
        upsampling: ChromaUpsampling::Linear,
        ..DecoderOptions::default()
    })
    .decode(&data)?;
    let (difference, _) = channel_errors(&nearest, &linear);
    assert!(difference > 0.0, "linear output equals nearest output");
    let (nearest_error, _) = channel_errors(&original, &nearest);
    let (linear_error, _) = channel_errors(&original, &linear);
    // Interpolation reproduces a linear chroma ramp, replication steps it.
    assert!(
        linear_error <= nearest_error + 0.25,
        "linear {linear_error}, nearest {nearest_error}"
    );
    assert!(linear_error <= 2.5, "mean error {linear_error}");
    Ok(())
}

#[test]
fn grayscale_round_trip() -> Result<()> {
    let (width, height) = (30, 19);
    let pixels: Vec<Gray8> = (0..width * height)
        .map(|i| Gray8(((i % width) * 6 + (i / width) * 3) as u8))
        .collect();
    let original = Image::from_vec((width, height), pixels)?;
    let encoder = JpegEncoder::new(EncoderOptions {
        quality: 95,
        color: EncodeColor::Grayscale,
        ..EncoderOptions::default()
    })?;
    let data = encoder.encode_to_vec(&original)?;
    let decoder = JpegDecoder::default();
    assert_eq!(decoder.read_header(&data)?.components, 1);
    let decoded: Image<Gray8> = decoder.decode(&data)?;
    let max = original
        .as_slice()
        .iter()
        .zip(decoded.as_slice())
        .map(|(a, b)| a.0.abs_diff(b.0))
        .max()
        .unwrap();
    assert!(max <= 6, "max error {max}");
    Ok(())
}

#[test]
fn other_pixel_formats() -> Result<()> {
    let rgb = test_image(20, 12);
    let rgba = Image::from_vec(
        rgb.size(),
        rgb.as_slice()
            .iter()
            .map(|p| Rgba8([p.0[0], p.0[1], p.0[2], 255]))
            .collect::<Vec<_>>(),
    )?;
    let encoder = JpegEncoder::new(EncoderOptions::default())?;
    assert_eq!(encoder.encode_to_vec(&rgba)?, encoder.encode_to_vec(&rgb)?);

    let data = encoder.encode_to_vec(&rgb)?;
    let floats: Image<RgbF32> = JpegDecoder::default().decode(&data)?;
    let bytes: Image<Rgb8> = JpegDecoder::default().decode(&data)?;
    for (f, b) in floats.as_slice().iter().zip(bytes.as_slice()) {
        for c in 0..3 {
            jpeg_test_utils::assert_almost_eq!(f.0[c] * 255.0, b.0[c] as f32, 1e-3);
        }
    }
    Ok(())
}

#[test]
fn encode_to_sink() -> Result<()> {
    let image = test_image(16, 16);
    let encoder = JpegEncoder::new(EncoderOptions::default())?;
    let mut sink = Vec::new();
    encoder.encode(&image, &mut sink)?;
    assert_eq!(sink, encoder.encode_to_vec(&image)?);
    assert_eq!(&sink[..2], &[0xff, 0xd8]);
    assert_eq!(&sink[sink.len() - 2..], &[0xff, 0xd9]);
    Ok(())
}
