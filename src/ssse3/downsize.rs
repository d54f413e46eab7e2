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

use crate::geometry::BloomGeometry;
use crate::frame::CN;
use crate::sse::utils::_mm_storeu_si32x;
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

pub(crate) fn downsize_pass_ssse3(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    geometry: &BloomGeometry,
) {
    assert!(src.len() >= (geometry.height - 1) * src_stride + geometry.width * CN);
    assert!(dst.len() >= (geometry.low_height - 1) * dst_stride + geometry.low_width * CN);
    unsafe {
        downsize_pass_impl(src, src_stride, dst, dst_stride, geometry);
    }
}

/// Channel pair sums of a 4x4 block, `[b01, b23, g01, g23, r01, r23, x01, x23]`.
#[inline(always)]
unsafe fn block_sums(block: *const u8, stride: usize, planar: __m128i, ones: __m128i) -> __m128i {
    let mut acc = _mm_setzero_si128();
    for row in 0..4 {
        let v = _mm_loadu_si128(block.add(row * stride) as *const __m128i);
        acc = _mm_add_epi16(acc, _mm_maddubs_epi16(_mm_shuffle_epi8(v, planar), ones));
    }
    acc
}

#[target_feature(enable = "ssse3")]
unsafe fn downsize_pass_impl(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    geometry: &BloomGeometry,
) {
    let planar = _mm_setr_epi8(0, 4, 8, 12, 1, 5, 9, 13, 2, 6, 10, 14, 3, 7, 11, 15);
    let ones = _mm_set1_epi8(1);

    for y in 0..geometry.low_height {
        let src_row = src.get_unchecked(y * 4 * src_stride..).as_ptr();
        let dst_row = dst.get_unchecked_mut(y * dst_stride..).as_mut_ptr();

        let mut x = 0usize;

        while x + 2 <= geometry.low_width {
            let s0 = block_sums(src_row.add(x * 4 * CN), src_stride, planar, ones);
            let s1 = block_sums(src_row.add((x + 1) * 4 * CN), src_stride, planar, ones);
            let avg = _mm_srli_epi16::<4>(_mm_hadd_epi16(s0, s1));
            _mm_storel_epi64(
                dst_row.add(x * CN) as *mut __m128i,
                _mm_packus_epi16(avg, avg),
            );
            x += 2;
        }

        if x < geometry.low_width {
            let s0 = block_sums(src_row.add(x * 4 * CN), src_stride, planar, ones);
            let avg = _mm_srli_epi16::<4>(_mm_hadd_epi16(s0, s0));
            _mm_storeu_si32x(dst_row.add(x * CN), _mm_packus_epi16(avg, avg));
        }
    }
}
