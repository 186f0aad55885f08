// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use enough::Stop;
use jpeg_transforms::BLOCK_DIM;

use super::planes::{transform_plane, CoefficientPlane, SamplePlane};
use crate::api::{EncodeColor, EncoderOptions};
use crate::bit_writer::BitWriter;
use crate::chroma::downsample;
use crate::color::RgbToYcbcrTables;
use crate::entropy_coding::encode::encode_block;
use crate::entropy_coding::huffman::{HuffmanEncoderTable, HuffmanSpec, TableClass};
use crate::entropy_coding::DcPredictors;
use crate::error::{Error, Result};
use crate::headers::{
    write_segment, Component, FrameCoding, FrameHeader, HuffmanDefinition, HuffmanTables,
    JpegSegment, QuantTableDefinition, QuantizationTables, RestartInterval, ScanComponent,
    ScanHeader,
};
use crate::image::{unit_to_u8, Image, Pixel, PixelBuffer};
use crate::parallel::RowIterator;
use crate::quant::{natural_to_zigzag, QuantTable};
use crate::util::tracing_wrappers::*;

const JFIF_APP0: [u8; 14] = [
    b'J', b'F', b'I', b'F', 0, // identifier
    1, 1, // version 1.01
    0, // no density units, aspect ratio only
    0, 1, 0, 1, // density 1:1
    0, 0, // no thumbnail
];

// Entropy coding tables of one component.
struct EntropyTables {
    dc: HuffmanEncoderTable,
    ac: HuffmanEncoderTable,
}

/// Encodes one baseline (or, with 16-bit quantization steps, extended
/// sequential) frame with a single interleaved scan.
pub struct FrameEncoder<'a> {
    options: &'a EncoderOptions,
    rows: &'a RowIterator,
    quant_tables: [QuantTable; 2],
}

impl<'a> FrameEncoder<'a> {
    pub fn new(options: &'a EncoderOptions, rows: &'a RowIterator) -> Result<FrameEncoder<'a>> {
        Ok(FrameEncoder {
            options,
            rows,
            quant_tables: options.quant_tables()?,
        })
    }

    fn frame_header(&self, size: (usize, usize)) -> Result<FrameHeader> {
        let (width, height) = size;
        let (Ok(width16), Ok(height16)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(Error::InvalidImageSize(width, height));
        };
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize(width, height));
        }
        let extended = self
            .quant_tables
            .iter()
            .any(|t| t.steps.iter().any(|&s| s > 255));
        let components = match self.options.color {
            EncodeColor::Grayscale => vec![Component {
                id: 1,
                h_samp: 1,
                v_samp: 1,
                quant_table: 0,
            }],
            EncodeColor::YCbCr => {
                let (h, v) = self.options.subsampling.luma_sampling();
                vec![
                    Component {
                        id: 1,
                        h_samp: h,
                        v_samp: v,
                        quant_table: 0,
                    },
                    Component {
                        id: 2,
                        h_samp: 1,
                        v_samp: 1,
                        quant_table: 1,
                    },
                    Component {
                        id: 3,
                        h_samp: 1,
                        v_samp: 1,
                        quant_table: 1,
                    },
                ]
            }
        };
        Ok(FrameHeader {
            coding: if extended {
                FrameCoding::ExtendedSequential
            } else {
                FrameCoding::Baseline
            },
            precision: 8,
            height: height16,
            width: width16,
            components,
        })
    }

    /// Encodes `image` into a complete stream.
    pub fn encode<B>(&self, image: &B, stop: &dyn Stop) -> Result<Vec<u8>>
    where
        B: PixelBuffer + Sync,
    {
        let frame = self.frame_header(image.size())?;
        debug!(?frame, "encoding frame");
        let planes = self.color_planes(&frame, image, stop)?;
        let mut coefficients = Vec::with_capacity(planes.len());
        for (plane, c) in planes.iter().zip(&frame.components) {
            let table = &self.quant_tables[c.quant_table as usize];
            coefficients.push(transform_plane(plane, table, self.rows, stop)?);
        }
        drop(planes);

        let mut out = vec![0xff, 0xd8];
        write_segment(&mut out, 0xe0, &JFIF_APP0)?;
        let used_tables = if frame.components.len() == 1 { 1 } else { 2 };
        QuantizationTables(
            self.quant_tables[..used_tables]
                .iter()
                .enumerate()
                .map(|(index, table)| QuantTableDefinition {
                    index: index as u8,
                    table: table.clone(),
                })
                .collect(),
        )
        .write(&mut out)?;
        frame.write(&mut out)?;
        let specs = [
            (HuffmanSpec::std_dc_luminance(), HuffmanSpec::std_ac_luminance()),
            (HuffmanSpec::std_dc_chrominance(), HuffmanSpec::std_ac_chrominance()),
        ];
        let mut definitions = Vec::new();
        for (index, (dc, ac)) in specs[..used_tables].iter().enumerate() {
            definitions.push(HuffmanDefinition {
                class: TableClass::Dc,
                index: index as u8,
                spec: dc.clone(),
            });
            definitions.push(HuffmanDefinition {
                class: TableClass::Ac,
                index: index as u8,
                spec: ac.clone(),
            });
        }
        HuffmanTables(definitions).write(&mut out)?;
        if self.options.restart_interval > 0 {
            RestartInterval(self.options.restart_interval).write(&mut out)?;
        }
        ScanHeader::sequential(
            frame
                .components
                .iter()
                .map(|c| ScanComponent {
                    component_id: c.id,
                    dc_table: c.quant_table,
                    ac_table: c.quant_table,
                })
                .collect(),
        )
        .write(&mut out)?;

        let mut tables = Vec::with_capacity(used_tables);
        for (dc, ac) in &specs[..used_tables] {
            tables.push(EntropyTables {
                dc: HuffmanEncoderTable::new(dc)?,
                ac: HuffmanEncoderTable::new(ac)?,
            });
        }
        let data = self.encode_scan_data(&frame, &coefficients, &tables, stop)?;
        out.extend_from_slice(&data);
        out.extend_from_slice(&[0xff, 0xd9]);
        debug!(bytes = out.len(), "frame encoded");
        Ok(out)
    }

    /// Converts the pixels to component planes at component resolution,
    /// padded to whole MCUs by replicating the last column and row.
    fn color_planes<B>(
        &self,
        frame: &FrameHeader,
        image: &B,
        stop: &dyn Stop,
    ) -> Result<Vec<SamplePlane>>
    where
        B: PixelBuffer + Sync,
    {
        let (width, height) = image.size();
        let padded = (
            frame.mcus_x() * frame.mcu_width(),
            frame.mcus_y() * frame.mcu_height(),
        );
        let forward = RgbToYcbcrTables::new();
        let gray = frame.components.len() == 1;
        let mut ycbcr = Image::<[u8; 3]>::new(padded)?;
        self.rows.for_each_rows_mut(
            ycbcr.as_mut_slice(),
            padded.0,
            padded.1,
            0,
            stop,
            |interval, out, _: &mut [u8]| {
                for (y, out_row) in interval.rows().zip(out.chunks_exact_mut(padded.0)) {
                    let row = image.row(y.min(height - 1));
                    for (x, sample) in out_row.iter_mut().enumerate() {
                        let v = row[x.min(width - 1)].to_vector4();
                        let rgb = [unit_to_u8(v[0]), unit_to_u8(v[1]), unit_to_u8(v[2])];
                        *sample = if gray {
                            [forward.y(rgb[0], rgb[1], rgb[2]), 0, 0]
                        } else {
                            forward.convert(rgb)
                        };
                    }
                }
                Ok(())
            },
        )?;
        let (max_h, max_v) = (frame.max_h_samp(), frame.max_v_samp());
        let mut planes = Vec::with_capacity(frame.components.len());
        for (index, c) in frame.components.iter().enumerate() {
            let full = Image::from_vec(
                padded,
                ycbcr.as_slice().iter().map(|s| s[index]).collect(),
            )?;
            let factors = (max_h / c.h_samp as usize, max_v / c.v_samp as usize);
            let plane = downsample(&full, factors)?;
            debug_assert_eq!(
                plane.size(),
                (
                    frame.mcus_x() * c.h_samp as usize * BLOCK_DIM,
                    frame.mcus_y() * c.v_samp as usize * BLOCK_DIM
                )
            );
            planes.push(plane);
        }
        Ok(planes)
    }

    fn encode_scan_data(
        &self,
        frame: &FrameHeader,
        coefficients: &[CoefficientPlane],
        tables: &[EntropyTables],
        stop: &dyn Stop,
    ) -> Result<Vec<u8>> {
        let (mcus_x, mcus_y) = (frame.mcus_x(), frame.mcus_y());
        let restart_interval = self.options.restart_interval as usize;
        let mut bw = BitWriter::new();
        let mut predictors = DcPredictors::new();
        let mut restarts = 0u8;
        for my in 0..mcus_y {
            stop.check()?;
            for mx in 0..mcus_x {
                let mcu = my * mcus_x + mx;
                if restart_interval > 0 && mcu > 0 && mcu % restart_interval == 0 {
                    bw.write_restart(restarts);
                    restarts = (restarts + 1) % 8;
                    predictors.reset();
                }
                for (index, c) in frame.components.iter().enumerate() {
                    let table = &tables[c.quant_table as usize];
                    let (h, v) = (c.h_samp as usize, c.v_samp as usize);
                    for by in 0..v {
                        for bx in 0..h {
                            let natural = coefficients[index].block(mx * h + bx, my * v + by);
                            let natural: [i16; 64] = std::array::from_fn(|i| natural[i]);
                            encode_block(
                                &mut bw,
                                &natural_to_zigzag(&natural),
                                predictors.get_mut(index),
                                &table.dc,
                                &table.ac,
                            )?;
                        }
                    }
                }
            }
        }
        Ok(bw.finish())
    }
}
