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
use crate::BloomError;
use log::{debug, warn};
use std::thread::JoinHandle;

/// Persistent workers of the threaded upsize.
///
/// Threads live as long as the processor and each one always runs the same
/// band. A frame is one broadcast over the pool, it returns once every band is
/// blended, so no worker ever outlives the borrow of the frame.
/// Dropping the workers shuts the pool down and joins every thread.
pub(crate) struct UpsizeWorkers {
    pool: Option<rayon::ThreadPool>,
    handles: Vec<JoinHandle<()>>,
    bands: [UpsizeBand; UPSIZE_WORKERS],
}

impl UpsizeWorkers {
    pub(crate) fn new(geometry: &BloomGeometry) -> Result<UpsizeWorkers, BloomError> {
        let mut handles = Vec::with_capacity(UPSIZE_WORKERS);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(UPSIZE_WORKERS)
            .thread_name(|index| format!("bloom-upsize-{index}"))
            .spawn_handler(|thread| {
                let mut builder = std::thread::Builder::new();
                if let Some(name) = thread.name() {
                    builder = builder.name(name.to_owned());
                }
                if let Some(stack_size) = thread.stack_size() {
                    builder = builder.stack_size(stack_size);
                }
                handles.push(builder.spawn(move || thread.run())?);
                Ok(())
            })
            .build()
            .map_err(|e| BloomError::WorkerPool(e.to_string()))?;
        let bands = geometry.upsize_bands();
        for (index, band) in bands.iter().enumerate() {
            debug!(
                "Upsize worker {index} ({:?}): gaps {:?}, rows {:?}",
                band.kind, band.gaps, band.rows
            );
        }
        Ok(UpsizeWorkers {
            pool: Some(pool),
            handles,
            bands,
        })
    }

    #[inline]
    pub(crate) fn bands(&self) -> &[UpsizeBand; UPSIZE_WORKERS] {
        &self.bands
    }

    /// Runs `work` exactly once on every worker with that worker's band and
    /// waits for all of them.
    pub(crate) fn run<F>(&self, work: F)
    where
        F: Fn(&UpsizeBand) + Sync,
    {
        if let Some(pool) = &self.pool {
            pool.broadcast(|ctx| work(&self.bands[ctx.index()]));
        }
    }
}

impl Drop for UpsizeWorkers {
    fn drop(&mut self) {
        // Terminates the pool, its threads leave their loop once idle
        drop(self.pool.take());
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Upsize worker panicked before shutdown");
            }
        }
        debug!("Upsize workers joined");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageSize;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts threads that reached their thread local destructors
    struct ExitMarker(Arc<AtomicUsize>);

    impl Drop for ExitMarker {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    thread_local! {
        static EXIT_MARKER: RefCell<Option<ExitMarker>> = const { RefCell::new(None) };
    }

    #[test]
    fn test_each_band_runs_once_per_frame() {
        let geometry = BloomGeometry::new(ImageSize::new(256, 256)).unwrap();
        let workers = UpsizeWorkers::new(&geometry).unwrap();
        let counters: [AtomicUsize; UPSIZE_WORKERS] = std::array::from_fn(|_| AtomicUsize::new(0));
        for _ in 0..3 {
            workers.run(|band| {
                let index = workers
                    .bands()
                    .iter()
                    .position(|x| x == band)
                    .unwrap();
                counters[index].fetch_add(1, Ordering::SeqCst);
            });
        }
        for counter in counters.iter() {
            assert_eq!(counter.load(Ordering::SeqCst), 3);
        }
    }

    #[test]
    fn test_bands_are_bound_to_threads() {
        let geometry = BloomGeometry::new(ImageSize::new(128, 832)).unwrap();
        let workers = UpsizeWorkers::new(&geometry).unwrap();
        for _ in 0..2 {
            workers.run(|band| {
                let index = workers
                    .bands()
                    .iter()
                    .position(|x| x == band)
                    .unwrap();
                let expected = format!("bloom-upsize-{index}");
                assert_eq!(std::thread::current().name(), Some(expected.as_str()));
            });
        }
    }

    #[test]
    fn test_threads_are_joined_on_drop() {
        let geometry = BloomGeometry::new(ImageSize::new(256, 256)).unwrap();
        for _ in 0..5 {
            let exited = Arc::new(AtomicUsize::new(0));
            let workers = UpsizeWorkers::new(&geometry).unwrap();
            assert_eq!(workers.handles.len(), UPSIZE_WORKERS);
            workers.run(|_| {
                EXIT_MARKER.with(|marker| {
                    *marker.borrow_mut() = Some(ExitMarker(exited.clone()));
                });
            });
            assert_eq!(exited.load(Ordering::SeqCst), 0);
            drop(workers);
            assert_eq!(exited.load(Ordering::SeqCst), UPSIZE_WORKERS);
        }
    }
}
