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

use log::warn;

/// Which implementation of the four bloom stages a processor runs.
///
/// All modes produce byte identical frames, they only differ in speed.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum BloomMode {
    /// Portable per pixel arithmetic, the reference implementation
    Scalar,
    /// SSE2, four pixels per register
    Baseline,
    /// SSSE3 byte shuffles for tap broadcast and sliding windows
    Advanced,
    /// `Advanced`, with the upsize split over four persistent workers
    AdvancedThreaded,
}

impl BloomMode {
    /// Best mode for this build and CPU.
    ///
    /// The `sse` feature allows the vector tiers, the `threading` feature
    /// prefers the threaded upsize once the advanced tier is available.
    pub fn preferred() -> BloomMode {
        let preferred = if cfg!(feature = "threading") {
            BloomMode::AdvancedThreaded
        } else {
            BloomMode::Advanced
        };
        preferred.supported_or_lower()
    }

    /// Checks if this build and CPU can run the mode.
    pub fn is_supported(&self) -> bool {
        match self {
            BloomMode::Scalar => true,
            BloomMode::Baseline => has_sse2(),
            BloomMode::Advanced | BloomMode::AdvancedThreaded => has_ssse3(),
        }
    }

    #[inline]
    pub fn is_threaded(&self) -> bool {
        matches!(self, BloomMode::AdvancedThreaded)
    }

    /// Walks down the tiers until one runs here.
    pub(crate) fn supported_or_lower(self) -> BloomMode {
        let mut mode = self;
        while !mode.is_supported() {
            mode = match mode {
                BloomMode::AdvancedThreaded | BloomMode::Advanced => BloomMode::Baseline,
                BloomMode::Baseline | BloomMode::Scalar => BloomMode::Scalar,
            };
        }
        mode
    }

    /// Same as [BloomMode::supported_or_lower], but tells when the request was not honored.
    pub(crate) fn resolve(self) -> BloomMode {
        let resolved = self.supported_or_lower();
        if resolved != self {
            warn!("Bloom mode {self:?} is not available, falling back to {resolved:?}");
        }
        resolved
    }
}

#[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
fn has_sse2() -> bool {
    std::arch::is_x86_feature_detected!("sse2")
}

#[cfg(not(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse")))]
fn has_sse2() -> bool {
    false
}

#[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
fn has_ssse3() -> bool {
    std::arch::is_x86_feature_detected!("ssse3")
}

#[cfg(not(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse")))]
fn has_ssse3() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_always_available() {
        assert!(BloomMode::Scalar.is_supported());
        assert_eq!(BloomMode::Scalar.resolve(), BloomMode::Scalar);
    }

    #[test]
    fn test_degrades_to_supported_mode() {
        for mode in [
            BloomMode::Scalar,
            BloomMode::Baseline,
            BloomMode::Advanced,
            BloomMode::AdvancedThreaded,
        ] {
            let resolved = mode.resolve();
            assert!(resolved.is_supported());
            assert!(resolved <= mode);
            if mode.is_supported() {
                assert_eq!(resolved, mode);
            }
        }
        assert!(BloomMode::preferred().is_supported());
    }

    #[cfg(all(target_arch = "x86_64", feature = "sse"))]
    #[test]
    fn test_x86_64_has_baseline() {
        assert!(BloomMode::Baseline.is_supported());
        assert_ne!(BloomMode::preferred(), BloomMode::Scalar);
    }
}
