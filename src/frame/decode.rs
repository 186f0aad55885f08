// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use enough::Stop;

use super::planes::{reconstruct_plane, CoefficientPlane, SamplePlane};
use crate::bit_reader::BitReader;
use crate::chroma::{ChromaUpsampler, ChromaUpsampling};
use crate::color::YcbcrToRgbTables;
use crate::entropy_coding::decode::decode_block;
use crate::entropy_coding::huffman::{HuffmanTable, TableClass};
use crate::entropy_coding::DcPredictors;
use crate::error::{Error, Result};
use crate::headers::{
    FrameHeader, MarkerReader, MarkerSegment, ScanHeader, MAX_COMPONENTS, MAX_TABLES,
};
use crate::image::{u8_to_unit, Image, Pixel};
use crate::parallel::RowIterator;
use crate::quant::{zigzag_to_natural, QuantTable};
use crate::util::tracing_wrappers::*;

/// Limit on the blocks of one MCU in an interleaved scan.
const MAX_BLOCKS_PER_MCU: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Before the start-of-frame marker.
    Start,
    /// The frame header is known, no scan has been seen yet.
    HeaderParsed,
    /// Between scans; tables may still be (re)defined.
    TablesLoaded,
    ScanInProgress,
    /// End-of-image was reached.
    FramesComplete,
}

/// Basic properties of a frame, available after reading the headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: usize,
    pub height: usize,
    pub components: usize,
    /// Horizontal and vertical sampling factors per component.
    pub sampling: Vec<(u8, u8)>,
}

impl From<&FrameHeader> for FrameInfo {
    fn from(frame: &FrameHeader) -> Self {
        FrameInfo {
            width: frame.width as usize,
            height: frame.height as usize,
            components: frame.components.len(),
            sampling: frame
                .components
                .iter()
                .map(|c| (c.h_samp, c.v_samp))
                .collect(),
        }
    }
}

/// How the three components of a color frame map to RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorTransform {
    YCbCr,
    None,
}

// A component taking part in the current scan, with its tables resolved.
struct ScanComponentRef<'t> {
    index: usize,
    dc_table: &'t HuffmanTable,
    ac_table: &'t HuffmanTable,
}

/// Decodes one sequential frame. Entropy decoding runs on the calling
/// thread; reconstruction of the planes is spread over a [`RowIterator`].
pub struct FrameDecoder<'a> {
    state: DecoderState,
    markers: MarkerReader<'a>,
    frame: Option<FrameHeader>,
    pixel_limit: Option<usize>,
    quant_tables: [Option<QuantTable>; MAX_TABLES],
    dc_tables: [Option<HuffmanTable>; MAX_TABLES],
    ac_tables: [Option<HuffmanTable>; MAX_TABLES],
    restart_interval: u16,
    coefficients: Vec<CoefficientPlane>,
    // Table used by each component, fixed when its scan starts.
    component_quant: Vec<Option<QuantTable>>,
    adobe_transform: Option<u8>,
    saw_jfif: bool,
}

impl<'a> FrameDecoder<'a> {
    pub fn new(data: &'a [u8], pixel_limit: Option<usize>) -> Result<FrameDecoder<'a>> {
        match data {
            [0xff, 0xd8, ..] => {}
            [a, b, ..] => return Err(Error::InvalidSignature(*a, *b)),
            _ => return Err(Error::FileTruncated),
        }
        Ok(FrameDecoder {
            state: DecoderState::Start,
            markers: MarkerReader::new(data),
            frame: None,
            pixel_limit,
            quant_tables: Default::default(),
            dc_tables: Default::default(),
            ac_tables: Default::default(),
            restart_interval: 0,
            coefficients: Vec::new(),
            component_quant: Vec::new(),
            adobe_transform: None,
            saw_jfif: false,
        })
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn frame(&self) -> Option<&FrameHeader> {
        self.frame.as_ref()
    }

    /// Processes segments up to and including the start-of-frame marker.
    pub fn read_header(&mut self, stop: &dyn Stop) -> Result<&FrameHeader> {
        while self.state == DecoderState::Start {
            self.process_next(stop)?;
        }
        self.frame
            .as_ref()
            .ok_or(Error::CorruptStream("missing frame header"))
    }

    /// Processes all remaining segments and entropy coded data, up to the
    /// end-of-image marker.
    pub fn decode_scans(&mut self, stop: &dyn Stop) -> Result<()> {
        while self.state != DecoderState::FramesComplete {
            self.process_next(stop)?;
        }
        Ok(())
    }

    fn process_next(&mut self, stop: &dyn Stop) -> Result<()> {
        if self.state == DecoderState::FramesComplete {
            return Err(Error::CorruptStream("data after end of image"));
        }
        let segment = self.markers.next_marker()?.ok_or(Error::FileTruncated)?;
        match segment {
            MarkerSegment::StartOfImage => {
                if self.markers.position() != 2 {
                    return Err(Error::UnexpectedMarker(0xd8));
                }
            }
            MarkerSegment::App { index: 0, data } if data.starts_with(b"JFIF\0") => {
                self.saw_jfif = true;
            }
            MarkerSegment::App { index: 14, data } if data.starts_with(b"Adobe") => {
                if let Some(&transform) = data.get(11) {
                    self.adobe_transform = Some(transform);
                }
            }
            MarkerSegment::App { .. } | MarkerSegment::Comment(_) | MarkerSegment::Unknown { .. } => {}
            MarkerSegment::QuantizationTables(tables) => {
                for def in tables.0 {
                    self.quant_tables[def.index as usize] = Some(def.table);
                }
                self.tables_changed();
            }
            MarkerSegment::HuffmanTables(tables) => {
                for def in tables.0 {
                    let table = HuffmanTable::new(&def.spec)?;
                    match def.class {
                        TableClass::Dc => self.dc_tables[def.index as usize] = Some(table),
                        TableClass::Ac => self.ac_tables[def.index as usize] = Some(table),
                    }
                }
                self.tables_changed();
            }
            MarkerSegment::RestartInterval(interval) => {
                self.restart_interval = interval;
                self.tables_changed();
            }
            MarkerSegment::StartOfFrame(frame) => self.start_frame(frame)?,
            MarkerSegment::StartOfScan(scan) => {
                match self.state {
                    DecoderState::HeaderParsed | DecoderState::TablesLoaded => {}
                    _ => return Err(Error::CorruptStream("scan before frame header")),
                }
                self.state = DecoderState::ScanInProgress;
                self.decode_scan(&scan, stop)?;
                self.state = DecoderState::TablesLoaded;
            }
            MarkerSegment::EndOfImage => {
                if self.state != DecoderState::TablesLoaded {
                    return Err(Error::CorruptStream("end of image before any scan"));
                }
                if let Some(index) = self.component_quant.iter().position(Option::is_none) {
                    warn!(index, "component without scan");
                    return Err(Error::CorruptStream("component without scan"));
                }
                self.state = DecoderState::FramesComplete;
            }
        }
        Ok(())
    }

    fn tables_changed(&mut self) {
        if self.state == DecoderState::HeaderParsed {
            self.state = DecoderState::TablesLoaded;
        }
    }

    fn start_frame(&mut self, frame: FrameHeader) -> Result<()> {
        if self.state != DecoderState::Start {
            return Err(Error::CorruptStream("more than one frame"));
        }
        frame.check_supported()?;
        let (width, height) = (frame.width as usize, frame.height as usize);
        if let Some(limit) = self.pixel_limit {
            if width * height > limit {
                return Err(Error::ImageTooLarge(width * height, limit));
            }
        }
        let (max_h, max_v) = (frame.max_h_samp(), frame.max_v_samp());
        for c in &frame.components {
            if max_h % c.h_samp as usize != 0 || max_v % c.v_samp as usize != 0 {
                return Err(Error::UnsupportedFeature(format!(
                    "sampling factors {}x{} in a frame with maximum {max_h}x{max_v}",
                    c.h_samp, c.v_samp
                )));
            }
        }
        let mut coefficients = Vec::with_capacity(frame.components.len());
        for index in 0..frame.components.len() {
            coefficients.push(CoefficientPlane::new(frame.component_blocks(index))?);
        }
        debug!(width, height, components = frame.components.len(), "frame");
        self.coefficients = coefficients;
        self.component_quant = vec![None; frame.components.len()];
        self.frame = Some(frame);
        self.state = DecoderState::HeaderParsed;
        Ok(())
    }

    fn decode_scan(&mut self, scan: &ScanHeader, stop: &dyn Stop) -> Result<()> {
        scan.check_sequential()?;
        let frame = self
            .frame
            .as_ref()
            .ok_or(Error::CorruptStream("scan before frame header"))?;
        let mut components = Vec::with_capacity(scan.components.len());
        let mut blocks_per_mcu = 0;
        for sc in &scan.components {
            let index = frame
                .component_index(sc.component_id)
                .ok_or(Error::UnknownComponent(sc.component_id))?;
            if self.component_quant[index].is_some() {
                return Err(Error::CorruptStream("component coded in two scans"));
            }
            let c = &frame.components[index];
            let quant = self.quant_tables[c.quant_table as usize]
                .clone()
                .ok_or(Error::MissingTable(c.id, "quantization", c.quant_table))?;
            self.component_quant[index] = Some(quant);
            let dc_table = self.dc_tables[sc.dc_table as usize]
                .as_ref()
                .ok_or(Error::MissingTable(c.id, "DC", sc.dc_table))?;
            let ac_table = self.ac_tables[sc.ac_table as usize]
                .as_ref()
                .ok_or(Error::MissingTable(c.id, "AC", sc.ac_table))?;
            blocks_per_mcu += c.h_samp as usize * c.v_samp as usize;
            components.push(ScanComponentRef {
                index,
                dc_table,
                ac_table,
            });
        }
        if scan.is_interleaved() && blocks_per_mcu > MAX_BLOCKS_PER_MCU {
            return Err(Error::CorruptStream("too many blocks per MCU"));
        }
        debug_assert!(components.len() <= MAX_COMPONENTS);

        let mut br = BitReader::new(self.markers.data(), self.markers.position());
        decode_scan_data(
            &mut br,
            frame,
            &components,
            &mut self.coefficients,
            self.restart_interval,
            stop,
        )?;
        self.markers.set_position(br.finish());
        Ok(())
    }

    /// Reconstructs the frame into an image of `P` pixels. Requires all
    /// scans to have been decoded.
    pub fn reconstruct<P: Pixel>(
        &self,
        upsampling: ChromaUpsampling,
        rows: &RowIterator,
        stop: &dyn Stop,
    ) -> Result<Image<P>> {
        if self.state != DecoderState::FramesComplete {
            return Err(Error::CorruptStream("frame is incomplete"));
        }
        let frame = self
            .frame
            .as_ref()
            .ok_or(Error::CorruptStream("missing frame header"))?;
        let mut planes = Vec::with_capacity(self.coefficients.len());
        for (coefficients, table) in self.coefficients.iter().zip(&self.component_quant) {
            let table = table
                .as_ref()
                .ok_or(Error::CorruptStream("component without scan"))?;
            planes.push(reconstruct_plane(coefficients, table, rows, stop)?);
        }
        let (max_h, max_v) = (frame.max_h_samp(), frame.max_v_samp());
        let upsamplers: Vec<_> = frame
            .components
            .iter()
            .enumerate()
            .map(|(index, c)| ChromaUpsampler {
                method: upsampling,
                factors: (max_h / c.h_samp as usize, max_v / c.v_samp as usize),
                valid: frame.component_size(index),
            })
            .collect();
        let transform = self.color_transform(frame);
        trace!(?transform, "color transform");
        let size = (frame.width as usize, frame.height as usize);
        let mut image = Image::<P>::new(size)?;
        let ycbcr = YcbcrToRgbTables::new();
        let planes: &[SamplePlane] = &planes;
        rows.for_each_rows_mut(
            image.as_mut_slice(),
            size.0,
            size.1,
            size.0 * planes.len(),
            stop,
            |interval, pixels, scratch: &mut [u8]| {
                for (y, out) in interval.rows().zip(pixels.chunks_exact_mut(size.0)) {
                    for ((plane, upsampler), row) in planes
                        .iter()
                        .zip(&upsamplers)
                        .zip(scratch.chunks_exact_mut(size.0))
                    {
                        upsampler.upsample_row(plane, y, row);
                    }
                    if planes.len() == 1 {
                        for (pixel, &v) in out.iter_mut().zip(&scratch[..]) {
                            let v = u8_to_unit(v);
                            *pixel = P::from_vector4([v, v, v, 1.0]);
                        }
                        continue;
                    }
                    let (c0, rest) = scratch.split_at(size.0);
                    let (c1, c2) = rest.split_at(size.0);
                    for (x, pixel) in out.iter_mut().enumerate() {
                        let samples = [c0[x], c1[x], c2[x]];
                        let [r, g, b] = match transform {
                            ColorTransform::YCbCr => ycbcr.convert(samples),
                            ColorTransform::None => samples,
                        };
                        *pixel = P::from_vector4([u8_to_unit(r), u8_to_unit(g), u8_to_unit(b), 1.0]);
                    }
                }
                Ok(())
            },
        )?;
        Ok(image)
    }

    // Follows the JFIF and Adobe markers, then the component ids.
    fn color_transform(&self, frame: &FrameHeader) -> ColorTransform {
        if self.saw_jfif {
            return ColorTransform::YCbCr;
        }
        match self.adobe_transform {
            Some(0) => ColorTransform::None,
            Some(_) => ColorTransform::YCbCr,
            None => {
                let ids: Vec<u8> = frame.components.iter().map(|c| c.id).collect();
                if ids == b"RGB" {
                    ColorTransform::None
                } else {
                    ColorTransform::YCbCr
                }
            }
        }
    }
}

/// Decodes the entropy coded data of one scan into `coefficients`.
fn decode_scan_data(
    br: &mut BitReader,
    frame: &FrameHeader,
    components: &[ScanComponentRef],
    coefficients: &mut [CoefficientPlane],
    restart_interval: u16,
    stop: &dyn Stop,
) -> Result<()> {
    // A single component scan codes only the blocks its samples cover, one
    // block per MCU.
    let (mcus_x, mcus_y) = if let [single] = components {
        frame.component_covered_blocks(single.index)
    } else {
        (frame.mcus_x(), frame.mcus_y())
    };
    let mut predictors = DcPredictors::new();
    let mut restarts = 0u8;
    let restart_interval = restart_interval as usize;
    debug!(mcus_x, mcus_y, restart_interval, "scan data");
    for my in 0..mcus_y {
        stop.check()?;
        for mx in 0..mcus_x {
            let mcu = my * mcus_x + mx;
            if restart_interval > 0 && mcu > 0 && mcu % restart_interval == 0 {
                br.take_restart(restarts)?;
                restarts = (restarts + 1) % 8;
                predictors.reset();
            }
            for (scan_index, sc) in components.iter().enumerate() {
                let c = &frame.components[sc.index];
                let (h, v) = if components.len() == 1 {
                    (1, 1)
                } else {
                    (c.h_samp as usize, c.v_samp as usize)
                };
                for by in 0..v {
                    for bx in 0..h {
                        let block = decode_block(
                            br,
                            sc.dc_table,
                            sc.ac_table,
                            predictors.get_mut(scan_index),
                        )?;
                        coefficients[sc.index]
                            .block_mut(mx * h + bx, my * v + by)
                            .copy_from_slice(&zigzag_to_natural(&block));
                    }
                }
            }
        }
    }
    Ok(())
}
