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
use crate::kernel::{FRINGE_SIZE, LOW_RES_FRINGE};
use crate::sse::utils::{_mm_blend_gap, _mm_loadu_si32x, GradientWeights, RowWeight};
use crate::ssse3::utils::_mm_broadcast_pixel;
use crate::unsafe_slice::UnsafeSlice;
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;
use std::ops::Range;

pub(crate) fn upsize_blend_pass_ssse3(
    src: &[u8],
    src_stride: usize,
    dst: &UnsafeSlice<u8>,
    dst_stride: usize,
    geometry: &BloomGeometry,
    gaps: Range<usize>,
) {
    assert!(src.len() >= (geometry.low_height - 1) * src_stride + geometry.low_width * CN);
    assert!(
        dst.len()
            >= (geometry.height - FRINGE_SIZE - 1) * dst_stride
                + (geometry.width - FRINGE_SIZE) * CN
    );
    assert!(gaps.end <= geometry.inner_height() + 1);
    unsafe {
        upsize_blend_pass_impl(src, src_stride, dst, dst_stride, geometry, gaps);
    }
}

struct GapRow<'a> {
    top: *const u8,
    bottom: *const u8,
    /// First output row of the gap, already offset into the destination
    dst: *mut u8,
    dst_stride: usize,
    weights: &'a [RowWeight],
}

impl GapRow<'_> {
    #[inline(always)]
    unsafe fn blend(
        &self,
        t: (__m128i, __m128i),
        b: (__m128i, __m128i),
        column: usize,
        first: usize,
        count: usize,
    ) {
        for (y, row_weight) in self.weights.iter().enumerate() {
            _mm_blend_gap(
                self.dst.add(y * self.dst_stride + column * CN),
                row_weight.blend(t, b),
                first,
                count,
            );
        }
    }

    /// One gap at a time, used for both clamped borders and the leftovers.
    #[inline(always)]
    unsafe fn single_gap(&self, weights: &GradientWeights, gap_x: usize, samples_x: usize) {
        let (left, right) = gap_samples(gap_x, samples_x);
        let t = weights.gradient(
            _mm_broadcast_pixel(_mm_loadu_si32x(self.top.add(left * CN)), 0),
            _mm_broadcast_pixel(_mm_loadu_si32x(self.top.add(right * CN)), 0),
        );
        let b = weights.gradient(
            _mm_broadcast_pixel(_mm_loadu_si32x(self.bottom.add(left * CN)), 0),
            _mm_broadcast_pixel(_mm_loadu_si32x(self.bottom.add(right * CN)), 0),
        );
        let columns = gap_span(gap_x, samples_x);
        self.blend(
            t,
            b,
            columns.start,
            columns.start + 2 - gap_x * 4,
            columns.len(),
        );
    }

    /// Four inner gaps starting at `gap_x`, samples `gap_x - 1..gap_x + 4` are read
    /// with two overlapping loads and broadcast by shuffles.
    #[inline(always)]
    unsafe fn four_gaps(&self, weights: &GradientWeights, gap_x: usize) {
        let top_left = _mm_loadu_si128(self.top.add((gap_x - 1) * CN) as *const __m128i);
        let top_right = _mm_loadu_si128(self.top.add(gap_x * CN) as *const __m128i);
        let bottom_left = _mm_loadu_si128(self.bottom.add((gap_x - 1) * CN) as *const __m128i);
        let bottom_right = _mm_loadu_si128(self.bottom.add(gap_x * CN) as *const __m128i);

        for k in 0..4 {
            let t = weights.gradient(
                _mm_broadcast_pixel(top_left, k),
                _mm_broadcast_pixel(top_right, k),
            );
            let b = weights.gradient(
                _mm_broadcast_pixel(bottom_left, k),
                _mm_broadcast_pixel(bottom_right, k),
            );
            self.blend(t, b, (gap_x + k) * 4 - 2, 0, 4);
        }
    }
}

#[target_feature(enable = "ssse3")]
unsafe fn upsize_blend_pass_impl(
    src: &[u8],
    src_stride: usize,
    dst: &UnsafeSlice<u8>,
    dst_stride: usize,
    geometry: &BloomGeometry,
    gaps: Range<usize>,
) {
    let samples_x = geometry.inner_width();
    let samples_y = geometry.inner_height();
    let weights = GradientWeights::new();
    let inner = src
        .get_unchecked(LOW_RES_FRINGE * src_stride + LOW_RES_FRINGE * CN..)
        .as_ptr();
    let dst_origin = dst
        .as_mut_ptr()
        .add(FRINGE_SIZE * dst_stride + FRINGE_SIZE * CN);

    for gap_y in gaps {
        let (top, bottom) = gap_samples(gap_y, samples_y);
        let rows = gap_span(gap_y, samples_y);
        let mut row_weights = [RowWeight::new(0); 4];
        for (dst, y) in row_weights.iter_mut().zip(rows.clone()) {
            *dst = RowWeight::new(gap_weight(y, gap_y));
        }

        let gap_row = GapRow {
            top: inner.add(top * src_stride),
            bottom: inner.add(bottom * src_stride),
            dst: dst_origin.add(rows.start * dst_stride),
            dst_stride,
            weights: &row_weights[..rows.len()],
        };

        gap_row.single_gap(&weights, 0, samples_x);

        let mut gap_x = 1usize;
        while gap_x + 4 <= samples_x {
            gap_row.four_gaps(&weights, gap_x);
            gap_x += 4;
        }

        while gap_x < samples_x {
            gap_row.single_gap(&weights, gap_x, samples_x);
            gap_x += 1;
        }

        gap_row.single_gap(&weights, samples_x, samples_x);
    }
}
