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
use crate::geometry::GRADIENT_WEIGHTS;
use crate::kernel::{BLUR_SHIFT, KERNEL_DIAMETER};
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[inline(always)]
pub(crate) const fn _shuffle(z: u32, y: u32, x: u32, w: u32) -> i32 {
    ((z << 6) | (y << 4) | (x << 2) | w) as i32
}

#[inline(always)]
pub(crate) unsafe fn _mm_loadu_si32x(ptr: *const u8) -> __m128i {
    _mm_cvtsi32_si128((ptr as *const i32).read_unaligned())
}

#[inline(always)]
pub(crate) unsafe fn _mm_storeu_si32x(ptr: *mut u8, a: __m128i) {
    (ptr as *mut i32).write_unaligned(_mm_cvtsi128_si32(a));
}

/// Kernel taps as `(k[2j], k[2j + 1])` pairs in every 32 bit lane, ready for `_mm_madd_epi16`
/// against two pixels interleaved channel by channel.
#[inline(always)]
pub(crate) unsafe fn _mm_tap_pairs(kernel: &[u8; KERNEL_DIAMETER]) -> [__m128i; KERNEL_DIAMETER / 2] {
    std::array::from_fn(|j| {
        _mm_set1_epi32(((kernel[2 * j + 1] as i32) << 16) | kernel[2 * j] as i32)
    })
}

/// Shifts four pixel accumulators down, clamps to 255 and packs them into 16 bytes.
#[inline(always)]
pub(crate) unsafe fn _mm_pack_blurred(
    a0: __m128i,
    a1: __m128i,
    a2: __m128i,
    a3: __m128i,
) -> __m128i {
    const SHIFT: i32 = BLUR_SHIFT as i32;
    let b0 = _mm_srli_epi32::<SHIFT>(a0);
    let b1 = _mm_srli_epi32::<SHIFT>(a1);
    let b2 = _mm_srli_epi32::<SHIFT>(a2);
    let b3 = _mm_srli_epi32::<SHIFT>(a3);
    _mm_packus_epi16(_mm_packs_epi32(b0, b1), _mm_packs_epi32(b2, b3))
}

/// Widens a single pixel into both halves of a u16 register.
#[inline(always)]
pub(crate) unsafe fn _mm_load_pixel_x2(ptr: *const u8) -> __m128i {
    let px = _mm_unpacklo_epi8(_mm_loadu_si32x(ptr), _mm_setzero_si128());
    _mm_shuffle_epi32::<{ _shuffle(1, 0, 1, 0) }>(px)
}

/// Weights of the four positions between two samples, first two and last two positions.
pub(crate) struct GradientWeights {
    lead_01: __m128i,
    trail_01: __m128i,
    lead_23: __m128i,
    trail_23: __m128i,
}

impl GradientWeights {
    #[inline(always)]
    pub(crate) unsafe fn new() -> GradientWeights {
        let w = GRADIENT_WEIGHTS.map(|x| x as i16);
        let c = GRADIENT_WEIGHTS.map(|x| (256 - x) as i16);
        GradientWeights {
            lead_01: _mm_setr_epi16(w[0], w[0], w[0], w[0], w[1], w[1], w[1], w[1]),
            trail_01: _mm_setr_epi16(c[0], c[0], c[0], c[0], c[1], c[1], c[1], c[1]),
            lead_23: _mm_setr_epi16(w[2], w[2], w[2], w[2], w[3], w[3], w[3], w[3]),
            trail_23: _mm_setr_epi16(c[2], c[2], c[2], c[2], c[3], c[3], c[3], c[3]),
        }
    }

    /// Interpolates the four pixels between `l` and `r`, both holding one pixel
    /// as u16 in each half. Products never exceed 65280 so u16 lanes are exact.
    #[inline(always)]
    pub(crate) unsafe fn gradient(&self, l: __m128i, r: __m128i) -> (__m128i, __m128i) {
        let lo = _mm_add_epi16(
            _mm_mullo_epi16(l, self.lead_01),
            _mm_mullo_epi16(r, self.trail_01),
        );
        let hi = _mm_add_epi16(
            _mm_mullo_epi16(l, self.lead_23),
            _mm_mullo_epi16(r, self.trail_23),
        );
        (_mm_srli_epi16::<8>(lo), _mm_srli_epi16::<8>(hi))
    }
}

/// Vertical weight of one output row, broadcast.
#[derive(Copy, Clone)]
pub(crate) struct RowWeight {
    lead: __m128i,
    trail: __m128i,
}

impl RowWeight {
    #[inline(always)]
    pub(crate) unsafe fn new(weight: u32) -> RowWeight {
        RowWeight {
            lead: _mm_set1_epi16(weight as i16),
            trail: _mm_set1_epi16((256 - weight) as i16),
        }
    }

    /// Blends two gradients, returns four packed bloom pixels.
    #[inline(always)]
    pub(crate) unsafe fn blend(&self, top: (__m128i, __m128i), bottom: (__m128i, __m128i)) -> __m128i {
        let lo = _mm_add_epi16(
            _mm_mullo_epi16(top.0, self.lead),
            _mm_mullo_epi16(bottom.0, self.trail),
        );
        let hi = _mm_add_epi16(
            _mm_mullo_epi16(top.1, self.lead),
            _mm_mullo_epi16(bottom.1, self.trail),
        );
        _mm_packus_epi16(_mm_srli_epi16::<8>(lo), _mm_srli_epi16::<8>(hi))
    }
}

/// Saturating adds the pixels `first..first + count` of a gap's four bloom
/// pixels onto `dst`. Inner gaps are complete, the outer ones contribute two pixels.
#[inline(always)]
pub(crate) unsafe fn _mm_blend_gap(dst: *mut u8, bloom: __m128i, first: usize, count: usize) {
    if count == 4 {
        let v = _mm_loadu_si128(dst as *const __m128i);
        _mm_storeu_si128(dst as *mut __m128i, _mm_adds_epu8(v, bloom));
    } else {
        debug_assert_eq!(count, 2);
        let bloom = if first == 2 {
            _mm_srli_si128::<8>(bloom)
        } else {
            bloom
        };
        let v = _mm_loadl_epi64(dst as *const __m128i);
        _mm_storel_epi64(dst as *mut __m128i, _mm_adds_epu8(v, bloom));
    }
}
