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

#![no_main]

use arbitrary::Arbitrary;
use bloomfx::{BloomImageMut, BloomMode, BloomProcessor, FRINGE_SIZE};
use libfuzzer_sys::fuzz_target;

#[derive(Clone, Debug, Arbitrary)]
pub struct SrcImage {
    pub width: u8,
    pub height: u8,
    pub padding: u8,
    pub pattern: Vec<u8>,
}

fuzz_target!(|data: SrcImage| {
    // Smallest valid side is 2 * FRINGE_SIZE + 4
    let width = 2 * FRINGE_SIZE + 4 * (data.width as usize % 64 + 1);
    let height = 2 * FRINGE_SIZE + 4 * (data.height as usize % 64 + 1);
    let stride = width * 4 + (data.padding as usize % 8) * 4;
    if data.pattern.is_empty() {
        return;
    }
    let source = data
        .pattern
        .iter()
        .cycle()
        .take(stride * height)
        .copied()
        .collect::<Vec<u8>>();

    let reference = bloom(&source, width, height, stride, BloomMode::Scalar);
    for mode in [
        BloomMode::Baseline,
        BloomMode::Advanced,
        BloomMode::AdvancedThreaded,
    ] {
        if !mode.is_supported() {
            continue;
        }
        let frame = bloom(&source, width, height, stride, mode);
        assert!(
            frame == reference,
            "{mode:?} differs from scalar on {width}x{height}, stride {stride}"
        );
    }
});

fn bloom(source: &[u8], width: usize, height: usize, stride: usize, mode: BloomMode) -> Vec<u8> {
    let mut frame = source.to_vec();
    let mut image =
        BloomImageMut::borrow_with_stride(&mut frame, width as u32, height as u32, stride as u32);
    let mut processor = BloomProcessor::with_mode(&image, mode).unwrap();
    processor.go(&mut image).unwrap();
    drop(image);
    frame
}
