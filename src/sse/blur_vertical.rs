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
use crate::kernel::{KERNEL_CENTER, KERNEL_DIAMETER, LOW_RES_FRINGE};
use crate::sse::utils::{_mm_loadu_si32x, _mm_pack_blurred, _mm_storeu_si32x, _mm_tap_pairs};
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

pub(crate) fn vertical_pass_sse2(
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
        vertical_pass_impl(src, src_stride, dst, dst_stride, width, height, kernel);
    }
}

#[target_feature(enable = "sse2")]
unsafe fn vertical_pass_impl(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    kernel: &[u8; KERNEL_DIAMETER],
) {
    let zeros = _mm_setzero_si128();
    let taps = _mm_tap_pairs(kernel);
    let end = width - LOW_RES_FRINGE;

    for y in 0..BloomGeometry::blur_span(height) {
        let src_window = src.get_unchecked(y * src_stride..).as_ptr();
        let dst_row = dst
            .get_unchecked_mut((y + KERNEL_CENTER) * dst_stride..)
            .as_mut_ptr();

        let mut cx = LOW_RES_FRINGE;

        while cx + 4 <= end {
            let mut k0 = zeros;
            let mut k1 = zeros;
            let mut k2 = zeros;
            let mut k3 = zeros;

            for (j, &tap) in taps.iter().enumerate() {
                let s_ptr = src_window.add(2 * j * src_stride + cx * CN);
                let a = _mm_loadu_si128(s_ptr as *const __m128i);
                let b = _mm_loadu_si128(s_ptr.add(src_stride) as *const __m128i);
                let a_lo = _mm_unpacklo_epi8(a, zeros);
                let a_hi = _mm_unpackhi_epi8(a, zeros);
                let b_lo = _mm_unpacklo_epi8(b, zeros);
                let b_hi = _mm_unpackhi_epi8(b, zeros);
                k0 = _mm_add_epi32(k0, _mm_madd_epi16(_mm_unpacklo_epi16(a_lo, b_lo), tap));
                k1 = _mm_add_epi32(k1, _mm_madd_epi16(_mm_unpackhi_epi16(a_lo, b_lo), tap));
                k2 = _mm_add_epi32(k2, _mm_madd_epi16(_mm_unpacklo_epi16(a_hi, b_hi), tap));
                k3 = _mm_add_epi32(k3, _mm_madd_epi16(_mm_unpackhi_epi16(a_hi, b_hi), tap));
            }

            _mm_storeu_si128(
                dst_row.add(cx * CN) as *mut __m128i,
                _mm_pack_blurred(k0, k1, k2, k3),
            );
            cx += 4;
        }

        while cx < end {
            let mut k0 = zeros;
            for (j, &tap) in taps.iter().enumerate() {
                let s_ptr = src_window.add(2 * j * src_stride + cx * CN);
                let a = _mm_unpacklo_epi8(_mm_loadu_si32x(s_ptr), zeros);
                let b = _mm_unpacklo_epi8(_mm_loadu_si32x(s_ptr.add(src_stride)), zeros);
                k0 = _mm_add_epi32(k0, _mm_madd_epi16(_mm_unpacklo_epi16(a, b), tap));
            }
            _mm_storeu_si32x(dst_row.add(cx * CN), _mm_pack_blurred(k0, k0, k0, k0));
            cx += 1;
        }
    }
}
