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
use crate::sse::utils::{_mm_pack_blurred, _mm_storeu_si32x};
use crate::ssse3::utils::{_mm_broadcast_taps, _mm_interleave_pixels_01, _mm_interleave_pixels_23};
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

pub(crate) fn horizontal_pass_ssse3(
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

/// 16 pixels, four per register.
type Window = [__m128i; 4];

#[inline(always)]
unsafe fn load_window(src: *const u8) -> Window {
    [
        _mm_loadu_si128(src as *const __m128i),
        _mm_loadu_si128(src.add(4 * CN) as *const __m128i),
        _mm_loadu_si128(src.add(8 * CN) as *const __m128i),
        _mm_loadu_si128(src.add(12 * CN) as *const __m128i),
    ]
}

#[inline(always)]
unsafe fn convolve_window(window: &Window, taps: &[__m128i; KERNEL_DIAMETER / 2]) -> __m128i {
    let mut acc = _mm_setzero_si128();
    for (q, &px) in window.iter().enumerate() {
        acc = _mm_add_epi32(
            acc,
            _mm_madd_epi16(_mm_interleave_pixels_01(px), taps[2 * q]),
        );
        acc = _mm_add_epi32(
            acc,
            _mm_madd_epi16(_mm_interleave_pixels_23(px), taps[2 * q + 1]),
        );
    }
    acc
}

/// Slides the window one pixel right, the next pixel comes from the bottom of `deck`.
#[inline(always)]
unsafe fn slide_window(window: &mut Window, deck: &mut __m128i) {
    window[0] = _mm_alignr_epi8::<4>(window[1], window[0]);
    window[1] = _mm_alignr_epi8::<4>(window[2], window[1]);
    window[2] = _mm_alignr_epi8::<4>(window[3], window[2]);
    window[3] = _mm_alignr_epi8::<4>(*deck, window[3]);
    *deck = _mm_srli_si128::<4>(*deck);
}

#[target_feature(enable = "ssse3")]
unsafe fn horizontal_pass_impl(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    kernel: &[u8; KERNEL_DIAMETER],
) {
    let taps = _mm_broadcast_taps(kernel);
    let span = BloomGeometry::blur_span(width);

    for y in 0..height {
        let src_row = src.get_unchecked(y * src_stride..).as_ptr();
        let dst_row = dst
            .get_unchecked_mut(y * dst_stride + KERNEL_CENTER * CN..)
            .as_mut_ptr();

        let mut x = 0usize;
        let mut window = load_window(src_row);

        // Deck must stay inside the row
        while x + KERNEL_DIAMETER + 4 <= width {
            let mut deck =
                _mm_loadu_si128(src_row.add((x + KERNEL_DIAMETER) * CN) as *const __m128i);
            let a0 = convolve_window(&window, &taps);
            slide_window(&mut window, &mut deck);
            let a1 = convolve_window(&window, &taps);
            slide_window(&mut window, &mut deck);
            let a2 = convolve_window(&window, &taps);
            slide_window(&mut window, &mut deck);
            let a3 = convolve_window(&window, &taps);
            slide_window(&mut window, &mut deck);
            _mm_storeu_si128(
                dst_row.add(x * CN) as *mut __m128i,
                _mm_pack_blurred(a0, a1, a2, a3),
            );
            x += 4;
        }

        while x < span {
            let window = load_window(src_row.add(x * CN));
            let a0 = convolve_window(&window, &taps);
            _mm_storeu_si32x(dst_row.add(x * CN), _mm_pack_blurred(a0, a0, a0, a0));
            x += 1;
        }
    }
}
