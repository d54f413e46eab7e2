// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use crate::geometry::{gap_samples, gap_span, gap_weight, BloomGeometry};
use crate::frame::CN;
use crate::kernel::{BLUR_SHIFT, FRINGE_SIZE, KERNEL_CENTER, KERNEL_DIAMETER, LOW_RES_FRINGE};
use crate::unsafe_slice::UnsafeSlice;
use std::ops::Range;

/// Averages every 4x4 block of `src` into one pixel of `dst`.
pub(crate) fn downsize_pass(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    geometry: &BloomGeometry,
) {
    for (y, dst_row) in dst
        .chunks_mut(dst_stride)
        .take(geometry.low_height)
        .enumerate()
    {
        let src_rows = &src[y * 4 * src_stride..];
        for (x, dst_px) in dst_row[..geometry.low_width * CN]
            .chunks_exact_mut(CN)
            .enumerate()
        {
            let mut sums = [0u32; CN];
            for row in 0..4 {
                let offset = row * src_stride + x * 4 * CN;
                for px in src_rows[offset..offset + 4 * CN].chunks_exact(CN) {
                    for (sum, &v) in sums.iter_mut().zip(px.iter()) {
                        *sum += v as u32;
                    }
                }
            }
            for (dst, sum) in dst_px.iter_mut().zip(sums) {
                *dst = (sum >> 4) as u8;
            }
        }
    }
}

#[inline(always)]
fn store_blurred(dst: &mut [u8], acc: [u32; CN]) {
    for (dst, acc) in dst.iter_mut().zip(acc) {
        *dst = (acc >> BLUR_SHIFT).min(255) as u8;
    }
}

pub(crate) fn horizontal_pass(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    kernel: &[u8; KERNEL_DIAMETER],
) {
    for y in 0..height {
        let src_row = &src[y * src_stride..y * src_stride + width * CN];
        let dst_row = &mut dst[y * dst_stride..y * dst_stride + width * CN];
        for x in 0..BloomGeometry::blur_span(width) {
            let window = &src_row[x * CN..(x + KERNEL_DIAMETER) * CN];
            let mut acc = [0u32; CN];
            for (px, &weight) in window.chunks_exact(CN).zip(kernel.iter()) {
                for (acc, &v) in acc.iter_mut().zip(px.iter()) {
                    *acc += weight as u32 * v as u32;
                }
            }
            let cx = (x + KERNEL_CENTER) * CN;
            store_blurred(&mut dst_row[cx..cx + CN], acc);
        }
    }
}

/// Columns inside the reduced fringe only, those are the only ones the upsize reads.
pub(crate) fn vertical_pass(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    kernel: &[u8; KERNEL_DIAMETER],
) {
    for y in 0..BloomGeometry::blur_span(height) {
        let dst_offset = (y + KERNEL_CENTER) * dst_stride;
        for x in LOW_RES_FRINGE..width - LOW_RES_FRINGE {
            let mut acc = [0u32; CN];
            for (i, &weight) in kernel.iter().enumerate() {
                let offset = (y + i) * src_stride + x * CN;
                for (acc, &v) in acc.iter_mut().zip(src[offset..offset + CN].iter()) {
                    *acc += weight as u32 * v as u32;
                }
            }
            let cx = dst_offset + x * CN;
            store_blurred(&mut dst[cx..cx + CN], acc);
        }
    }
}

#[inline(always)]
fn interpolate(a: u8, b: u8, weight: u32) -> u8 {
    ((a as u32 * weight + b as u32 * (256 - weight)) >> 8) as u8
}

/// Upsizes the gap rows `gaps` of the blurred buffer 4x and adds them onto `dst`.
///
/// Only the full resolution rows produced by `gaps` are written, so disjoint
/// gap ranges can run concurrently on the same destination.
pub(crate) fn upsize_blend_pass(
    src: &[u8],
    src_stride: usize,
    dst: &UnsafeSlice<u8>,
    dst_stride: usize,
    geometry: &BloomGeometry,
    gaps: Range<usize>,
) {
    let samples_x = geometry.inner_width();
    let samples_y = geometry.inner_height();
    let row_length = samples_x * CN;
    for gap_y in gaps {
        let (top, bottom) = gap_samples(gap_y, samples_y);
        let top_offset = (LOW_RES_FRINGE + top) * src_stride + LOW_RES_FRINGE * CN;
        let bottom_offset = (LOW_RES_FRINGE + bottom) * src_stride + LOW_RES_FRINGE * CN;
        let top_row = &src[top_offset..top_offset + row_length];
        let bottom_row = &src[bottom_offset..bottom_offset + row_length];

        for y in gap_span(gap_y, samples_y) {
            let weight_y = gap_weight(y, gap_y);
            let dst_row = unsafe {
                dst.slice_mut(
                    (FRINGE_SIZE + y) * dst_stride + FRINGE_SIZE * CN,
                    4 * row_length,
                )
            };
            for gap_x in 0..=samples_x {
                let (left, right) = gap_samples(gap_x, samples_x);
                for x in gap_span(gap_x, samples_x) {
                    let weight_x = gap_weight(x, gap_x);
                    let dst_px = &mut dst_row[x * CN..(x + 1) * CN];
                    for (c, dst) in dst_px.iter_mut().enumerate() {
                        let t = interpolate(
                            top_row[left * CN + c],
                            top_row[right * CN + c],
                            weight_x,
                        );
                        let b = interpolate(
                            bottom_row[left * CN + c],
                            bottom_row[right * CN + c],
                            weight_x,
                        );
                        *dst = dst.saturating_add(interpolate(t, b, weight_y));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BloomKernel, ImageSize};

    #[test]
    fn test_downsize_averages_blocks() {
        let geometry = BloomGeometry::new(ImageSize::new(68, 72)).unwrap();
        let stride = 68 * CN;
        let mut src = vec![0u8; stride * 72];
        for y in 0..72 {
            for x in 0..68 {
                let tap = ((x % 4) + 4 * (y % 4)) as u8;
                for c in 0..CN {
                    src[y * stride + x * CN + c] = tap * (c as u8 + 1);
                }
            }
        }
        let mut dst = vec![0u8; 17 * 18 * CN];
        downsize_pass(&src, stride, &mut dst, 17 * CN, &geometry);
        for px in dst.chunks_exact(CN) {
            assert_eq!(px, &[7, 15, 22, 30]);
        }
    }

    #[test]
    fn test_horizontal_pass_single_pixel() {
        let kernel = BloomKernel::new();
        let width = 17;
        let mut src = vec![0u8; width * CN];
        src[10 * CN..11 * CN].copy_from_slice(&[200, 200, 0, 255]);
        let mut dst = vec![3u8; width * CN];
        horizontal_pass(&src, width * CN, &mut dst, width * CN, width, 1, kernel.taps());
        assert_eq!(&dst[7 * CN..8 * CN], &[65, 65, 0, 83]);
        assert_eq!(&dst[8 * CN..9 * CN], &[86, 86, 0, 110]);
        for x in (0..7).chain(9..width) {
            assert_eq!(&dst[x * CN..(x + 1) * CN], &[3, 3, 3, 3], "Column {x} was written");
        }
    }

    #[test]
    fn test_vertical_pass_single_pixel() {
        let kernel = BloomKernel::new();
        let (width, height) = (17, 17);
        let stride = width * CN;
        let mut src = vec![0u8; stride * height];
        src[10 * stride + 8 * CN..10 * stride + 9 * CN].copy_from_slice(&[200, 200, 0, 255]);
        let mut dst = vec![3u8; stride * height];
        vertical_pass(&src, stride, &mut dst, stride, width, height, kernel.taps());
        assert_eq!(&dst[7 * stride + 8 * CN..7 * stride + 9 * CN], &[65, 65, 0, 83]);
        assert_eq!(&dst[8 * stride + 8 * CN..8 * stride + 9 * CN], &[86, 86, 0, 110]);
        for y in 0..height {
            for x in 0..width {
                if x == 8 && (y == 7 || y == 8) {
                    continue;
                }
                assert_eq!(
                    &dst[y * stride + x * CN..y * stride + (x + 1) * CN],
                    &[3, 3, 3, 3],
                    "Pixel ({x}, {y}) was written"
                );
            }
        }
    }

    #[test]
    fn test_blur_saturates() {
        let kernel = BloomKernel::new();
        let width = 20;
        let src = vec![255u8; width * CN];
        let mut dst = vec![0u8; width * CN];
        horizontal_pass(&src, width * CN, &mut dst, width * CN, width, 1, kernel.taps());
        for x in KERNEL_CENTER..KERNEL_CENTER + BloomGeometry::blur_span(width) {
            assert_eq!(&dst[x * CN..(x + 1) * CN], &[255, 255, 255, 255]);
        }
    }

    #[test]
    fn test_upsize_blends_flat_bloom() {
        let geometry = BloomGeometry::new(ImageSize::new(80, 72)).unwrap();
        let src_stride = geometry.low_width * CN;
        let src = vec![40u8; src_stride * geometry.low_height];
        let dst_stride = 80 * CN;
        let mut dst = vec![250u8; dst_stride * 72];
        for px in dst.chunks_exact_mut(CN).step_by(2) {
            px.copy_from_slice(&[0, 10, 20, 30]);
        }
        let reference = dst.clone();
        let slice = UnsafeSlice::new(&mut dst);
        upsize_blend_pass(
            &src,
            src_stride,
            &slice,
            dst_stride,
            &geometry,
            0..geometry.inner_height() + 1,
        );
        for y in 0..72 {
            for x in 0..80 {
                let at = y * dst_stride + x * CN;
                let inside = (32..48).contains(&x) && (32..40).contains(&y);
                for c in 0..CN {
                    let expected = if inside {
                        reference[at + c].saturating_add(40)
                    } else {
                        reference[at + c]
                    };
                    assert_eq!(dst[at + c], expected, "Pixel ({x}, {y}) channel {c}");
                }
            }
        }
    }

    #[test]
    fn test_upsize_interpolates_and_clamps_edges() {
        // 4 inner samples horizontally, 1 vertically
        let geometry = BloomGeometry::new(ImageSize::new(80, 68)).unwrap();
        let src_stride = geometry.low_width * CN;
        let mut src = vec![0u8; src_stride * geometry.low_height];
        let samples = [0u8, 64, 128, 255];
        for (i, &v) in samples.iter().enumerate() {
            let offset = LOW_RES_FRINGE * src_stride + (LOW_RES_FRINGE + i) * CN;
            src[offset..offset + CN].copy_from_slice(&[v; 4]);
        }
        let dst_stride = 80 * CN;
        let mut dst = vec![0u8; dst_stride * 68];
        let slice = UnsafeSlice::new(&mut dst);
        upsize_blend_pass(&src, src_stride, &slice, dst_stride, &geometry, 0..2);
        let row: Vec<u8> = (0..16)
            .map(|x| dst[FRINGE_SIZE * dst_stride + (FRINGE_SIZE + x) * CN])
            .collect();
        assert_eq!(
            row,
            vec![0, 0, 8, 24, 40, 56, 72, 88, 104, 120, 143, 175, 207, 239, 255, 255]
        );
        for y in FRINGE_SIZE..FRINGE_SIZE + 4 {
            assert_eq!(
                &dst[y * dst_stride + FRINGE_SIZE * CN..y * dst_stride + (FRINGE_SIZE + 16) * CN],
                &dst[FRINGE_SIZE * dst_stride + FRINGE_SIZE * CN
                    ..FRINGE_SIZE * dst_stride + (FRINGE_SIZE + 16) * CN]
            );
        }
    }
}
