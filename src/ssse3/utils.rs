/*
 * // Copyright (c) Radzivon Bartoshyk 2/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::kernel::KERNEL_DIAMETER;
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Broadcasts kernel taps `2 * pair` and `2 * pair + 1` as u16 into every
/// 32 bit lane, straight from the kernel bytes.
#[inline(always)]
pub(crate) unsafe fn _mm_broadcast_tap_pair(kernel: __m128i, pair: usize) -> __m128i {
    let lo = (pair * 2) as i8;
    let hi = lo + 1;
    _mm_shuffle_epi8(
        kernel,
        _mm_setr_epi8(lo, -1, hi, -1, lo, -1, hi, -1, lo, -1, hi, -1, lo, -1, hi, -1),
    )
}

#[inline(always)]
pub(crate) unsafe fn _mm_broadcast_taps(
    kernel: &[u8; KERNEL_DIAMETER],
) -> [__m128i; KERNEL_DIAMETER / 2] {
    let kernel = _mm_loadu_si128(kernel.as_ptr() as *const __m128i);
    std::array::from_fn(|pair| _mm_broadcast_tap_pair(kernel, pair))
}

/// Zero extends pixels 0 and 1 of a register, interleaved channel by channel.
#[inline(always)]
pub(crate) unsafe fn _mm_interleave_pixels_01(v: __m128i) -> __m128i {
    _mm_shuffle_epi8(
        v,
        _mm_setr_epi8(0, -1, 4, -1, 1, -1, 5, -1, 2, -1, 6, -1, 3, -1, 7, -1),
    )
}

/// Zero extends pixels 2 and 3 of a register, interleaved channel by channel.
#[inline(always)]
pub(crate) unsafe fn _mm_interleave_pixels_23(v: __m128i) -> __m128i {
    _mm_shuffle_epi8(
        v,
        _mm_setr_epi8(8, -1, 12, -1, 9, -1, 13, -1, 10, -1, 14, -1, 11, -1, 15, -1),
    )
}

/// Zero extends pixel `index` of a register into both u16 halves.
#[inline(always)]
pub(crate) unsafe fn _mm_broadcast_pixel(v: __m128i, index: usize) -> __m128i {
    let b = (index * 4) as i8;
    _mm_shuffle_epi8(
        v,
        _mm_setr_epi8(
            b,
            -1,
            b + 1,
            -1,
            b + 2,
            -1,
            b + 3,
            -1,
            b,
            -1,
            b + 1,
            -1,
            b + 2,
            -1,
            b + 3,
            -1,
        ),
    )
}
