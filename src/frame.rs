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
use crate::util::check_slice_size;
use crate::{BloomError, ImageSize};
use std::fmt::Debug;

/// Bytes per pixel, three colour channels and one spare byte.
pub(crate) const CN: usize = 4;

/// A single RGBX/BGRX pixel. The fourth byte is processed like the others.
pub type Pixel = [u8; CN];

#[derive(Debug)]
pub enum BufferStore<'a, T: Copy + Debug> {
    Borrowed(&'a mut [T]),
    Owned(Vec<T>),
}

impl<T: Copy + Debug> BufferStore<'_, T> {
    #[allow(clippy::should_implement_trait)]
    pub fn borrow(&self) -> &[T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn borrow_mut(&mut self) -> &mut [T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }
}

/// Mutable 4 channel image store.
///
/// This is the full resolution frame the bloom is added to, and also the layout
/// of the processor's reduced buffers.
pub struct BloomImageMut<'a> {
    pub data: BufferStore<'a, u8>,
    pub width: u32,
    pub height: u32,
    /// Image stride, bytes per row, might be 0
    pub stride: u32,
}

impl<'a> BloomImageMut<'a> {
    /// Allocates a black, tightly packed image
    pub fn alloc(width: u32, height: u32) -> Self {
        Self {
            data: BufferStore::Owned(vec![0u8; width as usize * height as usize * CN]),
            width,
            height,
            stride: width * CN as u32,
        }
    }

    /// Mutable borrows existing data
    /// Stride will be default `width * 4`
    pub fn borrow(arr: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            data: BufferStore::Borrowed(arr),
            width,
            height,
            stride: width * CN as u32,
        }
    }

    /// Mutable borrows existing data with rows `stride` bytes apart
    pub fn borrow_with_stride(arr: &'a mut [u8], width: u32, height: u32, stride: u32) -> Self {
        Self {
            data: BufferStore::Borrowed(arr),
            width,
            height,
            stride,
        }
    }

    /// Returns row stride
    #[inline]
    pub fn row_stride(&self) -> u32 {
        if self.stride == 0 {
            self.width * CN as u32
        } else {
            self.stride
        }
    }

    #[inline]
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width as usize, self.height as usize)
    }

    /// Checks if layout matches necessary requirements
    #[inline]
    pub fn check_layout(&self) -> Result<(), BloomError> {
        check_slice_size(
            self.data.borrow(),
            self.row_stride() as usize,
            self.width as usize,
            self.height as usize,
            CN,
        )
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width as usize && y < self.height as usize,
            "Pixel ({x}, {y}) is out of bounds of {}x{} image",
            self.width,
            self.height
        );
        y * self.row_stride() as usize + x * CN
    }

    /// Reads a pixel, panics if coordinates are out of bounds
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        let offset = self.offset(x, y);
        let src = &self.data.borrow()[offset..offset + CN];
        [src[0], src[1], src[2], src[3]]
    }

    /// Writes a pixel, panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        let offset = self.offset(x, y);
        self.data.borrow_mut()[offset..offset + CN].copy_from_slice(&pixel);
    }

    /// Fills every pixel of the image, padding bytes are left untouched
    pub fn fill(&mut self, pixel: Pixel) {
        let stride = self.row_stride() as usize;
        let width = self.width as usize;
        let height = self.height as usize;
        for row in self
            .data
            .borrow_mut()
            .chunks_mut(stride)
            .take(height)
        {
            for dst in row[..width * CN].chunks_exact_mut(CN) {
                dst.copy_from_slice(&pixel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MismatchedSize;

    #[test]
    fn test_row_stride() {
        let image = BloomImageMut::alloc(16, 8);
        assert_eq!(image.row_stride(), 64);
        let mut data = vec![0u8; 80 * 8];
        let mut image = BloomImageMut::borrow_with_stride(&mut data, 16, 8, 0);
        assert_eq!(image.row_stride(), 64);
        image.stride = 80;
        assert_eq!(image.row_stride(), 80);
        assert!(image.check_layout().is_ok());
    }

    #[test]
    fn test_check_layout() {
        let mut data = vec![0u8; 16 * 4 * 7];
        let image = BloomImageMut::borrow(&mut data, 16, 8);
        assert_eq!(
            image.check_layout(),
            Err(BloomError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: 16 * 4 * 8,
                received: 16 * 4 * 7,
            }))
        );
        let image = BloomImageMut::alloc(0, 8);
        assert_eq!(image.check_layout(), Err(BloomError::ZeroBaseSize));
    }

    #[test]
    fn test_pixel_access_respects_stride() {
        let mut data = vec![7u8; 20 * 3];
        let mut image = BloomImageMut::borrow_with_stride(&mut data, 4, 3, 20);
        image.fill([1, 2, 3, 4]);
        image.set_pixel(3, 2, [9, 8, 7, 6]);
        assert_eq!(image.pixel(0, 0), [1, 2, 3, 4]);
        assert_eq!(image.pixel(3, 2), [9, 8, 7, 6]);
        drop(image);
        // Padding bytes keep their value
        assert_eq!(&data[16..20], &[7, 7, 7, 7]);
        assert_eq!(&data[52..56], &[9, 8, 7, 6]);
        assert_eq!(&data[56..60], &[7, 7, 7, 7]);
    }

    #[test]
    #[should_panic]
    fn test_pixel_out_of_bounds() {
        let image = BloomImageMut::alloc(4, 4);
        image.pixel(4, 0);
    }
}
