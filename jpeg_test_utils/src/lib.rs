// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let diff = if *left_val > *right_val {
                    *left_val - *right_val
                } else {
                    *right_val - *left_val
                };
                if !(diff <= $max_error) {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`",
                        left_val, right_val, $max_error
                    );
                }
            }
        }
    };
}

#[macro_export]
macro_rules! assert_all_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if left_val.len() != right_val.len() {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n left.len(): `{}`,\n right.len(): `{}`",
                        left_val.len(),
                        right_val.len()
                    );
                }
                for index in 0..left_val.len() {
                    let (l, r) = (left_val[index], right_val[index]);
                    let diff = if l > r { l - r } else { r - l };
                    if !(diff <= $max_error) {
                        panic!(
                            "assertion failed: `(left ≈ right)`\n max_error: `{:?}`,\n left[{}]: `{:?}`,\n right[{}]: `{:?}`",
                            $max_error, index, l, index, r
                        );
                    }
                }
            }
        }
    };
}

/// Deterministic RGB test pattern: smooth gradients with a few hard edges,
/// interleaved as `[r, g, b, r, g, b, ...]`, row-major.
pub fn rgb_test_pattern(width: usize, height: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = if (x / 16 + y / 16) % 2 == 0 { 64 } else { 192 };
            out.extend_from_slice(&[r, g, b]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_floats() {
        assert_almost_eq!(1.0000001f64, 1.0000002, 0.000001);
        assert_almost_eq!(1.0, 1.1, 0.2);
    }

    #[test]
    fn test_with_integers() {
        assert_almost_eq!(100, 101, 2);
        assert_almost_eq!(777u32, 770, 7);
        assert_almost_eq!(500i64, 498, 3);
    }

    #[test]
    fn test_all_almost_eq() {
        assert_all_almost_eq!([1.0f32, 2.0], [1.05f32, 1.95], 0.1);
        assert_all_almost_eq!(vec![3u8, 7], [4u8, 6], 1);
    }

    #[test]
    fn test_panic() {
        use std::panic;
        let result = panic::catch_unwind(|| {
            assert_almost_eq!(1.0, 1.2, 0.1);
        });
        assert!(
            result.is_err(),
            "Expected assert_almost_eq! to panic, but it didn't"
        );

        let result = panic::catch_unwind(|| {
            assert_all_almost_eq!([100, 1], [100, 5], 2);
        });
        assert!(
            result.is_err(),
            "Expected assert_all_almost_eq! to panic, but it didn't"
        );
    }

    #[test]
    fn test_pattern_size() {
        let pattern = rgb_test_pattern(17, 5);
        assert_eq!(pattern.len(), 17 * 5 * 3);
    }
}
