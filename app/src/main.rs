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

use bloomfx::{bloom_rgba_image, BloomImageMut, BloomMode, BloomProcessor};
use flexi_logger::Logger;
use image::{ImageReader, RgbaImage};
use log::info;
use std::time::Instant;

/// Crops the image so both sides are multiples of 4, the bloom needs whole 4x4 blocks.
fn crop_to_blocks(image: RgbaImage) -> RgbaImage {
    let width = image.width() & !3;
    let height = image.height() & !3;
    if width == image.width() && height == image.height() {
        return image;
    }
    image::imageops::crop_imm(&image, 0, 0, width, height).to_image()
}

fn main() {
    Logger::try_with_str("debug")
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e))
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e));

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./assets/test_image_1_small.jpg".to_string());
    let dyn_image = ImageReader::open(&path).unwrap().decode().unwrap();
    let source = crop_to_blocks(dyn_image.to_rgba8());
    let (width, height) = source.dimensions();
    info!("{path}: {width}x{height}");

    for mode in [
        BloomMode::Scalar,
        BloomMode::Baseline,
        BloomMode::Advanced,
        BloomMode::AdvancedThreaded,
    ] {
        if !mode.is_supported() {
            info!("{mode:?} is not supported on this machine");
            continue;
        }
        let mut frame = source.clone();
        let mut image = BloomImageMut::borrow(&mut frame, width, height);
        let mut processor = BloomProcessor::with_mode(&image, mode).unwrap();

        let start_time = Instant::now();
        const FRAMES: u32 = 20;
        for _ in 0..FRAMES {
            processor.go(&mut image).unwrap();
        }
        println!("{mode:?}: {:?} per frame", start_time.elapsed() / FRAMES);
    }

    let mut bloomed = source.clone();
    bloom_rgba_image(&mut bloomed, BloomMode::preferred()).unwrap();
    bloomed.save("bloom.png").unwrap();

    // Glow alone, blended onto black
    let mut source_frame = source.clone();
    let source_image = BloomImageMut::borrow(&mut source_frame, width, height);
    let mut glow = RgbaImage::new(width, height);
    let mut glow_image = BloomImageMut::borrow(&mut glow, width, height);
    let mut processor = BloomProcessor::new(&source_image).unwrap();
    processor.downsize_pass(&source_image).unwrap();
    processor.horizontal_pass();
    processor.vertical_pass();
    processor.upsize_blend_pass(&mut glow_image).unwrap();
    drop(glow_image);
    for px in glow.pixels_mut() {
        px[3] = 255;
    }
    glow.save("bloom_glow.png").unwrap();
}
