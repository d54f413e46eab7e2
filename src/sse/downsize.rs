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

pub(crate) fn downsize_pass_sse2(
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

#[target_feature(enable = "sse2")]
unsafe fn downsize_pass_impl(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    geometry: &BloomGeometry,
) {
    let zeros = _mm_setzero_si128();

    for y in 0..geometry.low_height {
        let src_row = src.get_unchecked(y * 4 * src_stride..).as_ptr();
        let dst_row = dst.get_unchecked_mut(y * dst_stride..).as_mut_ptr();

        for x in 0..geometry.low_width {
            let block = src_row.add(x * 4 * CN);
            let mut lo = zeros;
            let mut hi = zeros;
            for row in 0..4 {
                let v = _mm_loadu_si128(block.add(row * src_stride) as *const __m128i);
                lo = _mm_add_epi16(lo, _mm_unpacklo_epi8(v, zeros));
                hi = _mm_add_epi16(hi, _mm_unpackhi_epi8(v, zeros));
            }
            // Four pixels per register half, fold them into one
            let pairs = _mm_add_epi16(lo, hi);
            let sums = _mm_add_epi16(pairs, _mm_srli_si128::<8>(pairs));
            let avg = _mm_srli_epi16::<4>(sums);
            _mm_storeu_si32x(dst_row.add(x * CN), _mm_packus_epi16(avg, avg));
        }
    }
}
