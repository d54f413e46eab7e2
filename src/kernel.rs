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
use num_traits::{AsPrimitive, Float, FloatConst};

/// Number of taps of the bloom kernel.
pub const KERNEL_DIAMETER: usize = 16;

/// Tap whose weight is normalized to 255, convolution results are written under it.
pub(crate) const KERNEL_CENTER: usize = (KERNEL_DIAMETER - 1) / 2;

/// Kernel half width in reduced resolution pixels.
pub(crate) const LOW_RES_FRINGE: usize = KERNEL_DIAMETER / 2;

/// Border in full resolution pixels that the bloom never writes to.
pub const FRINGE_SIZE: usize = LOW_RES_FRINGE * 4;

/// Blur results are a fixed `sum >> 9`, which overdrives the normalized result
/// and is then clamped to 255.
pub(crate) const BLUR_SHIFT: u32 = 9;

/// Unnormalized gaussian weights sampled at pixel centers, so the kernel is
/// symmetric around the middle of its even number of taps.
pub(crate) fn gaussian_weights<F>(diameter: usize, sigma: F) -> Vec<F>
where
    F: Float + FloatConst + 'static,
    usize: AsPrimitive<F>,
{
    let two = F::one() + F::one();
    let scale = F::one() / ((two * F::PI()).sqrt() * sigma);
    let mean = (diameter - 1).as_() / two;
    (0..diameter)
        .map(|x| {
            let dx = (x.as_() - mean) / sigma;
            (-(dx * dx) / two).exp() * scale
        })
        .collect()
}

/// Quantizes gaussian weights into bytes, the tap at `center` becomes exactly 255.
pub(crate) fn quantized_kernel<F>(diameter: usize, center: usize) -> Vec<u8>
where
    F: Float + FloatConst + AsPrimitive<u8> + 'static,
    usize: AsPrimitive<F>,
{
    let sigma = diameter.as_() / 6usize.as_();
    let weights = gaussian_weights::<F>(diameter, sigma);
    let peak = weights[center];
    let max = 255usize.as_();
    weights.iter().map(|&w| (max * w / peak).as_()).collect()
}

/// Fixed 16 tap kernel shared by the horizontal and vertical blur.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BloomKernel {
    taps: [u8; KERNEL_DIAMETER],
}

impl BloomKernel {
    pub fn new() -> BloomKernel {
        let mut taps = [0u8; KERNEL_DIAMETER];
        taps.copy_from_slice(&quantized_kernel::<f32>(KERNEL_DIAMETER, KERNEL_CENTER));
        BloomKernel { taps }
    }

    #[inline]
    pub fn taps(&self) -> &[u8; KERNEL_DIAMETER] {
        &self.taps
    }

    #[inline]
    pub fn center(&self) -> u8 {
        self.taps[KERNEL_CENTER]
    }

    /// Sum of all taps, the largest value a channel accumulator reaches is `255 * sum`.
    pub fn sum(&self) -> u32 {
        self.taps.iter().map(|&x| x as u32).sum()
    }
}

impl Default for BloomKernel {
    fn default() -> Self {
        BloomKernel::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_taps() {
        let kernel = BloomKernel::new();
        assert_eq!(
            kernel.taps(),
            &[4, 13, 30, 62, 109, 167, 221, 255, 255, 221, 167, 109, 62, 30, 13, 4]
        );
        assert_eq!(kernel.center(), 255);
        assert_eq!(kernel.sum(), 1722);
    }

    #[test]
    fn test_kernel_is_symmetric() {
        let kernel = BloomKernel::new();
        let taps = kernel.taps();
        for i in 0..KERNEL_DIAMETER {
            assert_eq!(
                taps[i],
                taps[KERNEL_DIAMETER - 1 - i],
                "Tap {i} doesn't mirror tap {}",
                KERNEL_DIAMETER - 1 - i
            );
        }
    }

    #[test]
    fn test_kernel_is_deterministic_across_precision() {
        let single = quantized_kernel::<f32>(KERNEL_DIAMETER, KERNEL_CENTER);
        let double = quantized_kernel::<f64>(KERNEL_DIAMETER, KERNEL_CENTER);
        assert_eq!(single, double);
        assert_eq!(BloomKernel::new(), BloomKernel::default());
    }

    #[test]
    fn test_gaussian_weights_peak_in_the_middle() {
        let weights = gaussian_weights::<f64>(KERNEL_DIAMETER, KERNEL_DIAMETER as f64 / 6.);
        let max = weights.iter().cloned().fold(0f64, f64::max);
        assert_eq!(weights[KERNEL_CENTER], max);
        assert_eq!(weights[KERNEL_CENTER + 1], max);
    }

    #[test]
    fn test_accumulator_fits_i32() {
        let kernel = BloomKernel::new();
        assert!(kernel.sum() as u64 * 255 < i32::MAX as u64);
        // Overdriven saturated input still clamps back to 255
        assert!((kernel.sum() * 255) >> BLUR_SHIFT > 255);
    }

    #[test]
    fn test_blur_shift_overdrives() {
        let kernel = BloomKernel::new();
        assert_eq!(kernel.sum(), 1722);
        assert_eq!(1u32 << BLUR_SHIFT, 512);
        // A flat area comes out brighter than it went in
        assert_eq!((kernel.sum() * 40) >> BLUR_SHIFT, 134);
        assert_eq!(((kernel.sum() * 100) >> BLUR_SHIFT).min(255), 255);
    }
}
