/*
 * // Copyright (c) Radzivon Bartoshyk 3/2025. All rights reserved.
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
use crate::{BloomError, BloomImageMut, BloomMode, BloomProcessor};
use image::RgbaImage;

/// Adds bloom to the image in place, with a processor made for this one image.
///
/// Alpha is handled as a fourth color channel, so glow is added into it as well.
/// Use [BloomProcessor] directly to process a sequence of frames.
///
/// # Arguments
///
/// * `image`: RGBA image provided by image crate, both dimensions must be multiples of 4.
/// * `mode` - Instruction set and threading, see [BloomMode] for more info.
///
pub fn bloom_rgba_image(image: &mut RgbaImage, mode: BloomMode) -> Result<(), BloomError> {
    let width = image.width();
    let height = image.height();
    let mut frame = BloomImageMut::borrow(&mut **image, width, height);
    let mut processor = BloomProcessor::with_mode(&frame, mode)?;
    processor.go(&mut frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_bloom_rgba_image() {
        let mut image = RgbaImage::from_pixel(128, 128, Rgba([0, 0, 0, 255]));
        for y in 60..68 {
            for x in 60..68 {
                image.put_pixel(x, y, Rgba([255, 128, 0, 255]));
            }
        }
        bloom_rgba_image(&mut image, BloomMode::preferred()).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(64, 64)[0], 255);
        let glow = image.get_pixel(56, 64);
        assert!(glow[0] > 0 && glow[1] > 0);
        assert_eq!(glow[2], 0);
    }

    #[test]
    fn test_rejects_unaligned_image() {
        let mut image = RgbaImage::new(130, 128);
        assert!(matches!(
            bloom_rgba_image(&mut image, BloomMode::Scalar),
            Err(BloomError::UnalignedDimensions(_))
        ));
    }
}
