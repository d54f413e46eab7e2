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

use crate::kernel::{FRINGE_SIZE, KERNEL_DIAMETER, LOW_RES_FRINGE};
use crate::{BloomError, ImageSize};
use std::ops::Range;

/// Upsize interpolation weight of the left (or top) sample for each of the
/// four positions between two reduced pixels, the right sample gets `256 - w`.
pub(crate) const GRADIENT_WEIGHTS: [u32; 4] = [224, 160, 96, 32];

/// Number of persistent upsize workers.
pub const UPSIZE_WORKERS: usize = 4;

/// Sizes of the full resolution frame and the reduced buffers derived from it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BloomGeometry {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) low_width: usize,
    pub(crate) low_height: usize,
}

impl BloomGeometry {
    pub(crate) fn new(size: ImageSize) -> Result<BloomGeometry, BloomError> {
        if size.width == 0 || size.height == 0 {
            return Err(BloomError::ZeroBaseSize);
        }
        if size.width % 4 != 0 || size.height % 4 != 0 {
            return Err(BloomError::UnalignedDimensions(size));
        }
        if size.width <= 2 * FRINGE_SIZE || size.height <= 2 * FRINGE_SIZE {
            return Err(BloomError::InsufficientFringe(size));
        }
        Ok(BloomGeometry {
            width: size.width,
            height: size.height,
            low_width: size.width / 4,
            low_height: size.height / 4,
        })
    }

    /// Reduced columns the upsize samples from
    #[inline]
    pub(crate) fn inner_width(&self) -> usize {
        self.low_width - 2 * LOW_RES_FRINGE
    }

    /// Reduced rows the upsize samples from
    #[inline]
    pub(crate) fn inner_height(&self) -> usize {
        self.low_height - 2 * LOW_RES_FRINGE
    }

    /// Count of window positions a blur pass evaluates along an axis of `len` pixels
    #[inline]
    pub(crate) fn blur_span(len: usize) -> usize {
        len + 1 - KERNEL_DIAMETER
    }

    /// Full resolution rows written by the upsize, in absolute coordinates
    pub(crate) fn blended_rows(&self) -> Range<usize> {
        FRINGE_SIZE..FRINGE_SIZE + 4 * self.inner_height()
    }

    /// Splits the upsize gap rows into worker bands.
    ///
    /// Interior gaps are spread evenly, earlier bands take the remainder. The
    /// top band additionally owns the clamped first gap and the bottom band the
    /// clamped last one.
    pub(crate) fn upsize_bands(&self) -> [UpsizeBand; UPSIZE_WORKERS] {
        let samples = self.inner_height();
        let interior = samples - 1;
        let base = interior / UPSIZE_WORKERS;
        let remainder = interior % UPSIZE_WORKERS;
        let mut start = 0usize;
        let mut interior_start = 1usize;
        std::array::from_fn(|index| {
            let count = base + if index < remainder { 1 } else { 0 };
            let interior_end = interior_start + count;
            let end = if index == UPSIZE_WORKERS - 1 {
                samples + 1
            } else {
                interior_end
            };
            let kind = match index {
                0 => BandKind::Top,
                x if x == UPSIZE_WORKERS - 1 => BandKind::Bottom,
                _ => BandKind::Middle,
            };
            let gaps = start..end;
            let first_row = gap_span(gaps.start, samples).start;
            let last_row = if gaps.is_empty() {
                first_row
            } else {
                gap_span(gaps.end - 1, samples).end
            };
            start = end;
            interior_start = interior_end;
            UpsizeBand {
                kind,
                gaps,
                rows: FRINGE_SIZE + first_row..FRINGE_SIZE + last_row,
            }
        })
    }
}

/// Output positions, relative to the fringe, generated by gap `gap` along an
/// axis with `samples` reduced pixels.
#[inline]
pub(crate) fn gap_span(gap: usize, samples: usize) -> Range<usize> {
    (gap * 4).saturating_sub(2)..(gap * 4 + 2).min(samples * 4)
}

/// Reduced pixels, relative to the fringe, interpolated across gap `gap`.
/// Outer gaps clamp both sides onto the border pixel.
#[inline]
pub(crate) fn gap_samples(gap: usize, samples: usize) -> (usize, usize) {
    (gap.saturating_sub(1).min(samples - 1), gap.min(samples - 1))
}

/// Weight of the first sample for output position `position` inside gap `gap`.
#[inline]
pub(crate) fn gap_weight(position: usize, gap: usize) -> u32 {
    GRADIENT_WEIGHTS[position + 2 - gap * 4]
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BandKind {
    Top,
    Middle,
    Bottom,
}

/// Static slice of the upsize owned by one worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpsizeBand {
    pub kind: BandKind,
    /// Gap rows of the reduced image
    pub gaps: Range<usize>,
    /// Full resolution rows written
    pub rows: Range<usize>,
}
