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
use crate::ImageSize;
use std::error::Error;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
/// Shows size mismatching
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BloomError {
    ZeroBaseSize,
    MinimumSliceSizeMismatch(MismatchedSize),
    MinimumStrideSizeMismatch(MismatchedSize),
    /// Width or height is not a multiple of the 4x4 downsize block
    UnalignedDimensions(ImageSize),
    /// Width or height does not exceed twice the fringe
    InsufficientFringe(ImageSize),
    ImagesMustMatch,
    WorkerPool(String),
}

impl Error for BloomError {}

impl std::fmt::Display for BloomError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BloomError::MinimumSliceSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum image slice size mismatch: expected={}, received={}",
                size.expected, size.received
            )),
            BloomError::MinimumStrideSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum stride must have size at least {} but it is {}",
                size.expected, size.received
            )),
            BloomError::ZeroBaseSize => f.write_str("Image size must not be zero"),
            BloomError::UnalignedDimensions(size) => f.write_fmt(format_args!(
                "Image dimensions must be multiples of 4, but received {}x{}",
                size.width, size.height
            )),
            BloomError::InsufficientFringe(size) => f.write_fmt(format_args!(
                "Image {}x{} is too small, both dimensions must exceed {}",
                size.width,
                size.height,
                2 * crate::FRINGE_SIZE
            )),
            BloomError::ImagesMustMatch => {
                f.write_str("Image dimensions must match the ones the processor was created for")
            }
            BloomError::WorkerPool(reason) => {
                f.write_fmt(format_args!("Unable to start upsize workers: {reason}"))
            }
        }
    }
}

pub(crate) fn check_slice_size<T>(
    arr: &[T],
    stride: usize,
    width: usize,
    height: usize,
    cn: usize,
) -> Result<(), BloomError> {
    if width == 0 || height == 0 {
        return Err(BloomError::ZeroBaseSize);
    }
    if arr.len() < stride * (height - 1) + width * cn {
        return Err(BloomError::MinimumSliceSizeMismatch(MismatchedSize {
            expected: stride * height,
            received: arr.len(),
        }));
    }
    if (stride) < (width * cn) {
        return Err(BloomError::MinimumStrideSizeMismatch(MismatchedSize {
            expected: width * cn,
            received: stride,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_slice_size() {
        let data = vec![0u8; 64 * 4 * 2];
        assert_eq!(check_slice_size(&data, 64 * 4, 64, 2, 4), Ok(()));
        assert_eq!(
            check_slice_size(&data, 64 * 4, 0, 2, 4),
            Err(BloomError::ZeroBaseSize)
        );
        assert_eq!(
            check_slice_size(&data, 64 * 4, 64, 3, 4),
            Err(BloomError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: 64 * 4 * 3,
                received: data.len(),
            }))
        );
        assert_eq!(
            check_slice_size(&data, 60 * 4, 64, 2, 4),
            Err(BloomError::MinimumStrideSizeMismatch(MismatchedSize {
                expected: 64 * 4,
                received: 60 * 4,
            }))
        );
    }

    #[test]
    fn test_error_messages() {
        let size = ImageSize::new(66, 128);
        assert_eq!(
            BloomError::UnalignedDimensions(size).to_string(),
            "Image dimensions must be multiples of 4, but received 66x128"
        );
        assert_eq!(
            BloomError::InsufficientFringe(ImageSize::new(64, 64)).to_string(),
            "Image 64x64 is too small, both dimensions must exceed 64"
        );
    }
}
