// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

/// Working representation of a pixel: red, green, blue and alpha in the unit
/// range.
pub type Vector4 = [f32; 4];

/// A pixel format the codec can read from and write to.
pub trait Pixel: Copy + Default + Debug + Send + Sync + 'static {
    fn to_vector4(&self) -> Vector4;
    fn from_vector4(v: Vector4) -> Self;
}

pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

pub(crate) fn u8_to_unit(v: u8) -> f32 {
    v as f32 * (1.0 / 255.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gray8(pub u8);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb8(pub [u8; 3]);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba8(pub [u8; 4]);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RgbF32(pub [f32; 3]);

impl Pixel for Gray8 {
    fn to_vector4(&self) -> Vector4 {
        let v = u8_to_unit(self.0);
        [v, v, v, 1.0]
    }

    /// Converts to BT.601 luma.
    fn from_vector4(v: Vector4) -> Self {
        Gray8(unit_to_u8(0.299 * v[0] + 0.587 * v[1] + 0.114 * v[2]))
    }
}

impl Pixel for Rgb8 {
    fn to_vector4(&self) -> Vector4 {
        let [r, g, b] = self.0.map(u8_to_unit);
        [r, g, b, 1.0]
    }

    fn from_vector4(v: Vector4) -> Self {
        Rgb8([unit_to_u8(v[0]), unit_to_u8(v[1]), unit_to_u8(v[2])])
    }
}

impl Pixel for Rgba8 {
    fn to_vector4(&self) -> Vector4 {
        self.0.map(u8_to_unit)
    }

    fn from_vector4(v: Vector4) -> Self {
        Rgba8(v.map(unit_to_u8))
    }
}

impl Pixel for RgbF32 {
    fn to_vector4(&self) -> Vector4 {
        let [r, g, b] = self.0;
        [r, g, b, 1.0]
    }

    fn from_vector4(v: Vector4) -> Self {
        RgbF32([v[0], v[1], v[2]])
    }
}
