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
use crate::sse::utils::{_mm_blend_gap, _mm_load_pixel_x2, GradientWeights, RowWeight};
use crate::unsafe_slice::UnsafeSlice;
use std::ops::Range;

pub(crate) fn upsize_blend_pass_sse2(
    src: &[u8],
    src_stride: usize,
    dst: &UnsafeSlice<u8>,
    dst_stride: usize,
    geometry: &BloomGeometry,
    gaps: Range<usize>,
) {
    assert!(src.len() >= (geometry.low_height - 1) * src_stride + geometry.low_width * CN);
    assert!(dst.len() >= (geometry.height - FRINGE_SIZE - 1) * dst_stride + (geometry.width - FRINGE_SIZE) * CN);
    assert!(gaps.end <= geometry.inner_height() + 1);
    unsafe {
        upsize_blend_pass_impl(src, src_stride, dst, dst_stride, geometry, gaps);
    }
}

#[target_feature(enable = "sse2")]
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
    let inner = src.get_unchecked(LOW_RES_FRINGE * src_stride + LOW_RES_FRINGE * CN..).as_ptr();
    let dst_origin = dst.as_mut_ptr().add(FRINGE_SIZE * dst_stride + FRINGE_SIZE * CN);

    for gap_y in gaps {
        let (top, bottom) = gap_samples(gap_y, samples_y);
        let top_row = inner.add(top * src_stride);
        let bottom_row = inner.add(bottom * src_stride);

        let rows = gap_span(gap_y, samples_y);
        let mut row_weights = [RowWeight::new(0); 4];
        for (dst, y) in row_weights.iter_mut().zip(rows.clone()) {
            *dst = RowWeight::new(gap_weight(y, gap_y));
        }
        let row_weights = &row_weights[..rows.len()];

        for gap_x in 0..=samples_x {
            let (left, right) = gap_samples(gap_x, samples_x);
            let t = weights.gradient(
                _mm_load_pixel_x2(top_row.add(left * CN)),
                _mm_load_pixel_x2(top_row.add(right * CN)),
            );
            let b = weights.gradient(
                _mm_load_pixel_x2(bottom_row.add(left * CN)),
                _mm_load_pixel_x2(bottom_row.add(right * CN)),
            );

            let columns = gap_span(gap_x, samples_x);
            let first = columns.start + 2 - gap_x * 4;
            for (row_weight, y) in row_weights.iter().zip(rows.clone()) {
                let bloom = row_weight.blend(t, b);
                _mm_blend_gap(
                    dst_origin.add(y * dst_stride + columns.start * CN),
                    bloom,
                    first,
                    columns.len(),
                );
            }
        }
    }
}
