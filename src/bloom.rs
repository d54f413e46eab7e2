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
use crate::geometry::{BloomGeometry, UpsizeBand, UPSIZE_WORKERS};
use crate::frame::BloomImageMut;
use crate::kernel::{BloomKernel, FRINGE_SIZE, KERNEL_DIAMETER};
use crate::mode::BloomMode;
use crate::unsafe_slice::UnsafeSlice;
use crate::workers::UpsizeWorkers;
use crate::{scalar, BloomError, ImageSize};
use log::debug;
use std::ops::Range;

type DownsizePass = fn(&[u8], usize, &mut [u8], usize, &BloomGeometry);

type BlurPass = fn(&[u8], usize, &mut [u8], usize, usize, usize, &[u8; KERNEL_DIAMETER]);

type UpsizePass = fn(&[u8], usize, &UnsafeSlice<u8>, usize, &BloomGeometry, Range<usize>);

fn get_downsize_pass(mode: BloomMode) -> DownsizePass {
    #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
    {
        match mode {
            BloomMode::Baseline => return crate::sse::downsize_pass_sse2,
            BloomMode::Advanced | BloomMode::AdvancedThreaded => {
                return crate::ssse3::downsize_pass_ssse3;
            }
            BloomMode::Scalar => {}
        }
    }
    let _ = mode;
    scalar::downsize_pass
}

fn get_horizontal_pass(mode: BloomMode) -> BlurPass {
    #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
    {
        match mode {
            BloomMode::Baseline => return crate::sse::horizontal_pass_sse2,
            BloomMode::Advanced | BloomMode::AdvancedThreaded => {
                return crate::ssse3::horizontal_pass_ssse3;
            }
            BloomMode::Scalar => {}
        }
    }
    let _ = mode;
    scalar::horizontal_pass
}

fn get_vertical_pass(mode: BloomMode) -> BlurPass {
    #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
    {
        match mode {
            BloomMode::Baseline => return crate::sse::vertical_pass_sse2,
            BloomMode::Advanced | BloomMode::AdvancedThreaded => {
                return crate::ssse3::vertical_pass_ssse3;
            }
            BloomMode::Scalar => {}
        }
    }
    let _ = mode;
    scalar::vertical_pass
}

fn get_upsize_pass(mode: BloomMode) -> UpsizePass {
    #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
    {
        match mode {
            BloomMode::Baseline => return crate::sse::upsize_blend_pass_sse2,
            BloomMode::Advanced | BloomMode::AdvancedThreaded => {
                return crate::ssse3::upsize_blend_pass_ssse3;
            }
            BloomMode::Scalar => {}
        }
    }
    let _ = mode;
    scalar::upsize_blend_pass
}

/// Stage implementations of one mode, resolved once per processor.
#[derive(Copy, Clone)]
struct BloomStages {
    downsize: DownsizePass,
    horizontal: BlurPass,
    vertical: BlurPass,
    upsize: UpsizePass,
}

impl BloomStages {
    fn for_mode(mode: BloomMode) -> BloomStages {
        BloomStages {
            downsize: get_downsize_pass(mode),
            horizontal: get_horizontal_pass(mode),
            vertical: get_vertical_pass(mode),
            upsize: get_upsize_pass(mode),
        }
    }
}

/// Adds a bloom glow onto frames of one fixed size.
///
/// Every frame goes through four stages, each one finishing before the next starts:
///
/// 1. the frame is averaged down 4x into a reduced buffer,
/// 2. the reduced buffer is blurred horizontally with a 16 tap gaussian,
/// 3. and then vertically; both passes overdrive the result and clamp it,
/// 4. the blurred buffer is upsized 4x and saturating added onto the frame.
///
/// A border of [FRINGE_SIZE] pixels around the frame is never modified.
///
/// # Examples
///
/// ```
/// use bloomfx::{BloomImageMut, BloomProcessor};
///
/// let mut frame = BloomImageMut::alloc(256, 256);
/// frame.set_pixel(128, 128, [255, 255, 255, 0]);
/// let mut processor = BloomProcessor::new(&frame).unwrap();
/// processor.go(&mut frame).unwrap();
/// assert_ne!(frame.pixel(126, 126), [0, 0, 0, 0]);
/// assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
/// ```
pub struct BloomProcessor {
    geometry: BloomGeometry,
    kernel: BloomKernel,
    mode: BloomMode,
    stages: BloomStages,
    /// Downsized frame, later the final blurred bloom
    h_buffer: BloomImageMut<'static>,
    /// Horizontally blurred rows
    v_buffer: BloomImageMut<'static>,
    workers: Option<UpsizeWorkers>,
}

impl BloomProcessor {
    /// Creates a processor for frames shaped like `image`, using [BloomMode::preferred].
    pub fn new(image: &BloomImageMut<'_>) -> Result<BloomProcessor, BloomError> {
        BloomProcessor::with_mode(image, BloomMode::preferred())
    }

    /// Creates a processor for frames shaped like `image`.
    ///
    /// Width and height must be multiples of 4 and larger than twice [FRINGE_SIZE].
    /// A `mode` this CPU can't run is replaced by the best lower one.
    pub fn with_mode(
        image: &BloomImageMut<'_>,
        mode: BloomMode,
    ) -> Result<BloomProcessor, BloomError> {
        image.check_layout()?;
        let geometry = BloomGeometry::new(image.size())?;
        let mode = mode.resolve();
        let workers = if mode.is_threaded() {
            Some(UpsizeWorkers::new(&geometry)?)
        } else {
            None
        };
        debug!(
            "Bloom processor for {}x{} frames, reduced {}x{}, mode {mode:?}",
            geometry.width, geometry.height, geometry.low_width, geometry.low_height
        );
        Ok(BloomProcessor {
            geometry,
            kernel: BloomKernel::new(),
            mode,
            stages: BloomStages::for_mode(mode),
            h_buffer: BloomImageMut::alloc(geometry.low_width as u32, geometry.low_height as u32),
            v_buffer: BloomImageMut::alloc(geometry.low_width as u32, geometry.low_height as u32),
            workers,
        })
    }

    #[inline]
    pub fn mode(&self) -> BloomMode {
        self.mode
    }

    #[inline]
    pub fn kernel(&self) -> &BloomKernel {
        &self.kernel
    }

    /// Frame size this processor accepts
    #[inline]
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.geometry.width, self.geometry.height)
    }

    /// Width of the border, in frame pixels, the bloom never touches.
    #[inline]
    pub fn fringe_size(&self) -> usize {
        FRINGE_SIZE
    }

    /// Reduced buffer the upsize samples from.
    ///
    /// After [BloomProcessor::vertical_pass] only columns `8..w - 8` and rows
    /// `7..h - 8` of the reduced size hold the blurred bloom, the upsize samples
    /// rows `8..h - 8` of it. Everything outside still holds downsized, unblurred data.
    #[inline]
    pub fn low_res_bloom(&self) -> &BloomImageMut<'static> {
        &self.h_buffer
    }

    /// Bands of the threaded upsize, `None` unless the mode is [BloomMode::AdvancedThreaded].
    pub fn upsize_bands(&self) -> Option<&[UpsizeBand; UPSIZE_WORKERS]> {
        self.workers.as_ref().map(|workers| workers.bands())
    }

    fn check_frame(&self, image: &BloomImageMut<'_>) -> Result<(), BloomError> {
        image.check_layout()?;
        if image.size() != self.size() {
            return Err(BloomError::ImagesMustMatch);
        }
        Ok(())
    }

    /// Runs all four stages on `image`, adding the bloom in place.
    pub fn go(&mut self, image: &mut BloomImageMut<'_>) -> Result<(), BloomError> {
        self.downsize_pass(image)?;
        self.horizontal_pass();
        self.vertical_pass();
        self.upsize_blend_pass(image)
    }

    /// Averages `image` down into the reduced buffer.
    pub fn downsize_pass(&mut self, image: &BloomImageMut<'_>) -> Result<(), BloomError> {
        self.check_frame(image)?;
        let src_stride = image.row_stride() as usize;
        let dst_stride = self.h_buffer.row_stride() as usize;
        let pass = self.stages.downsize;
        pass(
            image.data.borrow(),
            src_stride,
            self.h_buffer.data.borrow_mut(),
            dst_stride,
            &self.geometry,
        );
        Ok(())
    }

    /// Blurs every reduced row, columns closer than 7 pixels to the left edge
    /// or 8 to the right keep whatever they held.
    pub fn horizontal_pass(&mut self) {
        let src_stride = self.h_buffer.row_stride() as usize;
        let dst_stride = self.v_buffer.row_stride() as usize;
        let pass = self.stages.horizontal;
        pass(
            self.h_buffer.data.borrow(),
            src_stride,
            self.v_buffer.data.borrow_mut(),
            dst_stride,
            self.geometry.low_width,
            self.geometry.low_height,
            self.kernel.taps(),
        );
    }

    /// Blurs the horizontal result along columns back into the reduced buffer,
    /// only the part the upsize reads from.
    pub fn vertical_pass(&mut self) {
        let src_stride = self.v_buffer.row_stride() as usize;
        let dst_stride = self.h_buffer.row_stride() as usize;
        let pass = self.stages.vertical;
        pass(
            self.v_buffer.data.borrow(),
            src_stride,
            self.h_buffer.data.borrow_mut(),
            dst_stride,
            self.geometry.low_width,
            self.geometry.low_height,
            self.kernel.taps(),
        );
    }

    /// Upsizes the blurred buffer and saturating adds it onto `image`.
    pub fn upsize_blend_pass(&mut self, image: &mut BloomImageMut<'_>) -> Result<(), BloomError> {
        self.check_frame(image)?;
        let dst_stride = image.row_stride() as usize;
        let src_stride = self.h_buffer.row_stride() as usize;
        let src = self.h_buffer.data.borrow();
        let dst = UnsafeSlice::new(image.data.borrow_mut());
        let geometry = &self.geometry;
        let pass = self.stages.upsize;
        match &self.workers {
            Some(workers) => workers.run(|band| {
                pass(src, src_stride, &dst, dst_stride, geometry, band.gaps.clone());
            }),
            None => pass(
                src,
                src_stride,
                &dst,
                dst_stride,
                geometry,
                0..geometry.inner_height() + 1,
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BandKind;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const MODES: [BloomMode; 4] = [
        BloomMode::Scalar,
        BloomMode::Baseline,
        BloomMode::Advanced,
        BloomMode::AdvancedThreaded,
    ];

    fn random_frame(stride: usize, height: usize, shift: u32, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = vec![0u8; stride * height];
        rng.fill(&mut data[..]);
        for v in data.iter_mut() {
            *v >>= shift;
        }
        data
    }

    struct Stages {
        downsized: Vec<u8>,
        horizontal: Vec<u8>,
        blurred: Vec<u8>,
        frame: Vec<u8>,
    }

    fn run_stages(data: &[u8], width: u32, height: u32, stride: u32, mode: BloomMode) -> Stages {
        let mut frame = data.to_vec();
        let (downsized, horizontal, blurred) = {
            let mut image = BloomImageMut::borrow_with_stride(&mut frame, width, height, stride);
            let mut processor = BloomProcessor::with_mode(&image, mode).unwrap();
            assert_eq!(processor.mode(), mode);
            processor.downsize_pass(&image).unwrap();
            let downsized = processor.h_buffer.data.borrow().to_vec();
            processor.horizontal_pass();
            let horizontal = processor.v_buffer.data.borrow().to_vec();
            processor.vertical_pass();
            let blurred = processor.low_res_bloom().data.borrow().to_vec();
            processor.upsize_blend_pass(&mut image).unwrap();
            (downsized, horizontal, blurred)
        };
        Stages {
            downsized,
            horizontal,
            blurred,
            frame,
        }
    }

    #[test]
    fn test_modes_are_equivalent() {
        // Reduced widths 64, 33, 17 and 75 cover every vector tail
        let sizes = [(256u32, 256u32, 0u32), (132, 100, 8), (68, 68, 4), (300, 84, 0)];
        for (i, &(width, height, padding)) in sizes.iter().enumerate() {
            let stride = width * 4 + padding;
            for shift in [0u32, 2, 4] {
                let data = random_frame(stride as usize, height as usize, shift, i as u64 * 31 + shift as u64);
                let reference = run_stages(&data, width, height, stride, BloomMode::Scalar);
                for mode in MODES.iter().skip(1).filter(|m| m.is_supported()) {
                    let stages = run_stages(&data, width, height, stride, *mode);
                    assert!(
                        stages.downsized == reference.downsized,
                        "Downsize differs for {mode:?} at {width}x{height}"
                    );
                    assert!(
                        stages.horizontal == reference.horizontal,
                        "Horizontal blur differs for {mode:?} at {width}x{height}"
                    );
                    assert!(
                        stages.blurred == reference.blurred,
                        "Vertical blur differs for {mode:?} at {width}x{height}"
                    );
                    assert!(
                        stages.frame == reference.frame,
                        "Blended frame differs for {mode:?} at {width}x{height}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_sparse_highlights_are_equivalent() {
        let (width, height) = (384u32, 200u32);
        let stride = width * 4;
        let mut rng = StdRng::seed_from_u64(7);
        let mut data = vec![0u8; (stride * height) as usize];
        for _ in 0..300 {
            let x = rng.random_range(0..width as usize);
            let y = rng.random_range(0..height as usize);
            let at = y * stride as usize + x * 4;
            data[at..at + 4].copy_from_slice(&[255, rng.random(), rng.random(), 0]);
        }
        let reference = run_stages(&data, width, height, stride, BloomMode::Scalar);
        for mode in MODES.iter().skip(1).filter(|m| m.is_supported()) {
            let stages = run_stages(&data, width, height, stride, *mode);
            assert!(stages.frame == reference.frame, "Frame differs for {mode:?}");
        }
    }

    #[test]
    fn test_black_frame_is_unchanged() {
        for mode in MODES {
            let mut image = BloomImageMut::alloc(256, 256);
            let mut processor = BloomProcessor::with_mode(&image, mode).unwrap();
            processor.go(&mut image).unwrap();
            assert!(
                image.data.borrow().iter().all(|&x| x == 0),
                "Black frame changed with {mode:?}"
            );
        }
    }

    #[test]
    fn test_white_frame_saturates() {
        for mode in MODES {
            let mut image = BloomImageMut::alloc(256, 256);
            image.fill([255, 255, 255, 255]);
            let mut processor = BloomProcessor::with_mode(&image, mode).unwrap();
            processor.go(&mut image).unwrap();
            assert!(
                image.data.borrow().iter().all(|&x| x == 255),
                "White frame wrapped with {mode:?}"
            );
        }
    }

    #[test]
    fn test_gray_frame_saturates_inside_fringe() {
        let mut image = BloomImageMut::alloc(128, 96);
        image.fill([200, 100, 20, 0]);
        let mut processor = BloomProcessor::with_mode(&image, BloomMode::Scalar).unwrap();
        processor.go(&mut image).unwrap();
        for y in 0..96 {
            for x in 0..128 {
                let inside = (FRINGE_SIZE..128 - FRINGE_SIZE).contains(&x)
                    && (FRINGE_SIZE..96 - FRINGE_SIZE).contains(&y);
                // 100 * 1722 >> 9 clamps, 20 * 1722 >> 9 is 67, blurred twice is 225
                let expected = if inside {
                    [255, 255, 245, 0]
                } else {
                    [200, 100, 20, 0]
                };
                assert_eq!(image.pixel(x, y), expected, "Pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_fringe_is_never_written() {
        let (width, height) = (200usize, 140usize);
        let stride = width * 4 + 12;
        let data = random_frame(stride, height, 1, 11);
        for mode in MODES.iter().filter(|m| m.is_supported()) {
            let stages = run_stages(&data, width as u32, height as u32, stride as u32, *mode);
            for y in 0..height {
                for x in 0..stride {
                    let inside = (FRINGE_SIZE..height - FRINGE_SIZE).contains(&y)
                        && (FRINGE_SIZE * 4..(width - FRINGE_SIZE) * 4).contains(&x);
                    if !inside {
                        assert_eq!(
                            stages.frame[y * stride + x],
                            data[y * stride + x],
                            "Byte {x} of row {y} changed with {mode:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_white_block_glow() {
        let mut block = vec![0u8; 256 * 256 * 4];
        let mut glow = BloomImageMut::alloc(256, 256);
        {
            let mut image = BloomImageMut::borrow(&mut block, 256, 256);
            for y in 128..132 {
                for x in 128..132 {
                    image.set_pixel(x, y, [255, 255, 255, 255]);
                }
            }
            let mut processor = BloomProcessor::with_mode(&image, BloomMode::Scalar).unwrap();
            processor.downsize_pass(&image).unwrap();
            processor.horizontal_pass();
            processor.vertical_pass();
            processor.upsize_blend_pass(&mut glow).unwrap();
        }
        let at = |x: usize, y: usize| {
            let px = glow.pixel(x, y);
            assert!(px.iter().all(|&c| c == px[0]));
            px[0]
        };

        // 255 * 255 >> 9 horizontally, then 255 * 127 >> 9
        assert_eq!(at(128, 128), 63);
        let mut max = 0;
        for y in FRINGE_SIZE..256 - FRINGE_SIZE {
            for x in FRINGE_SIZE..256 - FRINGE_SIZE {
                let v = at(x, y);
                max = max.max(v);
                assert_eq!(v, at(255 - x, y), "Glow is not mirrored at ({x}, {y})");
                assert_eq!(v, at(x, 255 - y), "Glow is not mirrored at ({x}, {y})");
                let far = (x as f32 - 127.5).abs() > 36. || (y as f32 - 127.5).abs() > 36.;
                if far {
                    assert_eq!(v, 0, "Glow reaches ({x}, {y})");
                }
            }
        }
        assert_eq!(max, 63);
        for d in 128..256 - FRINGE_SIZE - 1 {
            assert!(at(d + 1, 128) <= at(d, 128), "Glow grows along the row at {d}");
            assert!(at(128, d + 1) <= at(128, d), "Glow grows along the column at {d}");
            assert!(at(d + 1, d + 1) <= at(d, d), "Glow grows along the diagonal at {d}");
        }
        assert!(at(140, 128) > 0);
        assert!(at(140, 128) < at(130, 128));

        // A full pass adds exactly that glow on top of the block
        for mode in MODES.iter().filter(|m| m.is_supported()) {
            let mut frame = block.clone();
            let mut image = BloomImageMut::borrow(&mut frame, 256, 256);
            let mut processor = BloomProcessor::with_mode(&image, *mode).unwrap();
            processor.go(&mut image).unwrap();
            drop(image);
            for (i, (&out, (&src, &add))) in frame
                .iter()
                .zip(block.iter().zip(glow.data.borrow().iter()))
                .enumerate()
            {
                assert_eq!(out, src.saturating_add(add), "Byte {i} with {mode:?}");
            }
        }
    }

    #[test]
    fn test_threaded_frames_match_scalar() {
        if !BloomMode::AdvancedThreaded.is_supported() {
            return;
        }
        let (width, height) = (640u32, 832u32);
        let data = random_frame(width as usize * 4, height as usize, 3, 5);
        let mut scalar_frame = data.clone();
        let mut threaded_frame = data;
        let mut scalar_image = BloomImageMut::borrow(&mut scalar_frame, width, height);
        let mut threaded_image = BloomImageMut::borrow(&mut threaded_frame, width, height);
        let mut scalar = BloomProcessor::with_mode(&scalar_image, BloomMode::Scalar).unwrap();
        let mut threaded =
            BloomProcessor::with_mode(&threaded_image, BloomMode::AdvancedThreaded).unwrap();
        let bands = threaded.upsize_bands().unwrap();
        assert_eq!(bands[0].kind, BandKind::Top);
        assert_eq!(bands[3].kind, BandKind::Bottom);
        assert_eq!(bands[0].rows.start, FRINGE_SIZE);
        assert_eq!(bands[3].rows.end, height as usize - FRINGE_SIZE);
        assert!(scalar.upsize_bands().is_none());
        // Bloom accumulates, every frame feeds the next one
        for frame in 0..3 {
            scalar.go(&mut scalar_image).unwrap();
            threaded.go(&mut threaded_image).unwrap();
            assert!(
                scalar_image.data.borrow() == threaded_image.data.borrow(),
                "Frame {frame} differs"
            );
        }
    }

    #[test]
    fn test_rejects_invalid_frames() {
        let image = BloomImageMut::alloc(130, 128);
        assert_eq!(
            BloomProcessor::new(&image).err(),
            Some(BloomError::UnalignedDimensions(ImageSize::new(130, 128)))
        );
        let image = BloomImageMut::alloc(128, 64);
        assert_eq!(
            BloomProcessor::new(&image).err(),
            Some(BloomError::InsufficientFringe(ImageSize::new(128, 64)))
        );
        let mut data = vec![0u8; 100];
        let image = BloomImageMut::borrow(&mut data, 128, 128);
        assert!(matches!(
            BloomProcessor::new(&image),
            Err(BloomError::MinimumSliceSizeMismatch(_))
        ));

        let image = BloomImageMut::alloc(128, 128);
        let mut processor = BloomProcessor::new(&image).unwrap();
        let mut other = BloomImageMut::alloc(128, 132);
        assert_eq!(processor.go(&mut other), Err(BloomError::ImagesMustMatch));
        assert!(other.data.borrow().iter().all(|&x| x == 0));
    }

    #[test]
    fn test_accepts_other_stride_of_same_size() {
        let data = random_frame(96 * 4, 96, 2, 3);
        let mut padded = vec![9u8; (96 * 4 + 16) * 96];
        for (dst, src) in padded.chunks_exact_mut(96 * 4 + 16).zip(data.chunks_exact(96 * 4)) {
            dst[..96 * 4].copy_from_slice(src);
        }
        let packed = run_stages(&data, 96, 96, 96 * 4, BloomMode::Scalar);
        let mut padded_frame = padded.clone();
        let mut packed_frame = data.clone();
        let packed_image = BloomImageMut::borrow(&mut packed_frame, 96, 96);
        let mut processor = BloomProcessor::new(&packed_image).unwrap();
        let mut padded_image = BloomImageMut::borrow_with_stride(&mut padded_frame, 96, 96, 96 * 4 + 16);
        processor.go(&mut padded_image).unwrap();
        drop(padded_image);
        for (dst, src) in padded_frame
            .chunks_exact(96 * 4 + 16)
            .zip(packed.frame.chunks_exact(96 * 4))
        {
            assert_eq!(&dst[..96 * 4], src);
            assert!(dst[96 * 4..].iter().all(|&x| x == 9));
        }
    }

    #[test]
    fn test_low_res_bloom_border_keeps_downsized_data() {
        let data = random_frame(160 * 4, 128, 1, 21);
        let mut frame = data.clone();
        let image = BloomImageMut::borrow(&mut frame, 160, 128);
        let mut processor = BloomProcessor::with_mode(&image, BloomMode::Scalar).unwrap();
        processor.downsize_pass(&image).unwrap();
        let downsized = processor.low_res_bloom().data.borrow().to_vec();
        processor.horizontal_pass();
        processor.vertical_pass();
        let bloom = processor.low_res_bloom();
        let (low_width, low_height) = (40usize, 32usize);
        let mut inner_changed = false;
        for y in 0..low_height {
            for x in 0..low_width {
                let px = bloom.pixel(x, y);
                let at = (y * low_width + x) * 4;
                let inner = (8..low_width - 8).contains(&x) && (7..low_height - 8).contains(&y);
                if inner {
                    inner_changed |= px[..] != downsized[at..at + 4];
                } else {
                    assert_eq!(px[..], downsized[at..at + 4], "Border pixel ({x}, {y}) changed");
                }
            }
        }
        assert!(inner_changed);
    }

    #[test]
    fn test_stages_are_bound_at_construction() {
        for mode in MODES.iter().filter(|m| m.is_supported()) {
            let image = BloomImageMut::alloc(128, 128);
            let processor = BloomProcessor::with_mode(&image, *mode).unwrap();
            let expected = BloomStages::for_mode(*mode);
            let stages = processor.stages;
            assert_eq!(stages.downsize as usize, expected.downsize as usize);
            assert_eq!(stages.horizontal as usize, expected.horizontal as usize);
            assert_eq!(stages.vertical as usize, expected.vertical as usize);
            assert_eq!(stages.upsize as usize, expected.upsize as usize);
        }
        let image = BloomImageMut::alloc(128, 128);
        let processor = BloomProcessor::with_mode(&image, BloomMode::Scalar).unwrap();
        let scalar_upsize: UpsizePass = scalar::upsize_blend_pass;
        assert_eq!(processor.stages.upsize as usize, scalar_upsize as usize);
    }

    #[test]
    fn test_fringe_size() {
        let image = BloomImageMut::alloc(128, 128);
        let processor = BloomProcessor::with_mode(&image, BloomMode::Scalar).unwrap();
        assert_eq!(processor.fringe_size(), 32);
        assert_eq!(processor.kernel().center(), 255);
        assert_eq!(processor.size(), ImageSize::new(128, 128));
    }
}
