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
use crate::kernel::{KERNEL_CENTER, KERNEL_DIAMETER};
use crate::sse::utils::{_mm_pack_blurred, _mm_storeu_si32x, _mm_tap_pairs};
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

pub(crate) fn horizontal_pass_sse2(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    kernel: &[u8; KERNEL_DIAMETER],
) {
    assert!(src.len() >= (height - 1) * src_stride + width * CN);
    assert!(dst.len() >= (height - 1) * dst_stride + width * CN);
    unsafe {
        horizontal_pass_impl(src, src_stride, dst, dst_stride, width, height, kernel);
    }
}

/// Accumulates one window of 16 pixels, two taps per `_mm_madd_epi16`.
#[inline(always)]
unsafe fn convolve_pixel(src: *const u8, taps: &[__m128i; KERNEL_DIAMETER / 2]) -> __m128i {
    let zeros = _mm_setzero_si128();
    let mut acc = zeros;
    for (j, &tap) in taps.iter().enumerate() {
        let px = _mm_unpacklo_epi8(
            _mm_loadl_epi64(src.add(j * 2 * CN) as *const __m128i),
            zeros,
        );
        let pair = _mm_unpacklo_epi16(px, _mm_srli_si128::<8>(px));
        acc = _mm_add_epi32(acc, _mm_madd_epi16(pair, tap));
    }
    acc
}

#[target_feature(enable = "sse2")]
unsafe fn horizontal_pass_impl(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    kernel: &[u8; KERNEL_DIAMETER],
) {
    let taps = _mm_tap_pairs(kernel);
    let span = BloomGeometry::blur_span(width);

    for y in 0..height {
        let src_row = src.get_unchecked(y * src_stride..).as_ptr();
        let dst_row = dst
            .get_unchecked_mut(y * dst_stride + KERNEL_CENTER * CN..)
            .as_mut_ptr();

        let mut x = 0usize;

        while x + 4 <= span {
            let a0 = convolve_pixel(src_row.add(x * CN), &taps);
            let a1 = convolve_pixel(src_row.add((x + 1) * CN), &taps);
            let a2 = convolve_pixel(src_row.add((x + 2) * CN), &taps);
            let a3 = convolve_pixel(src_row.add((x + 3) * CN), &taps);
            _mm_storeu_si128(
                dst_row.add(x * CN) as *mut __m128i,
                _mm_pack_blurred(a0, a1, a2, a3),
            );
            x += 4;
        }

        while x < span {
            let a0 = convolve_pixel(src_row.add(x * CN), &taps);
            _mm_storeu_si32x(dst_row.add(x * CN), _mm_pack_blurred(a0, a0, a0, a0));
            x += 1;
        }
    }
}
