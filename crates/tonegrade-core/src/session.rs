//! Shared pipeline handle for hosts that update parameters and render on
//! different threads.
//!
//! Writers go through a single lock; each frame reads one snapshot up front
//! and evaluates every pixel against it, so a frame never mixes parameter
//! values from before and after an update.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::Result;
use crate::image::GradingImage;
use crate::pipeline::{ControlEvent, GradingPipeline};
use crate::transform::evaluate::process_image;
use crate::transform::params::PipelineSnapshot;

/// A snapshot tagged with the update generation it was taken at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub generation: u64,
    pub params: PipelineSnapshot,
}

/// Cloneable, thread-safe handle to one [`GradingPipeline`].
#[derive(Debug, Clone)]
pub struct SharedPipeline {
    inner: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    pipeline: RwLock<GradingPipeline>,
    generation: AtomicU64,
}

impl SharedPipeline {
    pub fn new(pipeline: GradingPipeline) -> Self {
        Self {
            inner: Arc::new(Shared {
                pipeline: RwLock::new(pipeline),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Apply one control event. The generation only advances on success.
    pub fn apply(&self, event: &ControlEvent) -> Result<()> {
        let mut pipeline = self.inner.pipeline.write();
        pipeline.handle(event)?;
        self.inner.generation.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Run an arbitrary mutation under the write lock.
    ///
    /// `f` works on a copy that replaces the live pipeline only on success,
    /// so an error part-way through leaves no partial update behind.
    pub fn update<T>(&self, f: impl FnOnce(&mut GradingPipeline) -> Result<T>) -> Result<T> {
        let mut pipeline = self.inner.pipeline.write();
        let mut next = pipeline.clone();
        let out = f(&mut next)?;
        *pipeline = next;
        self.inner.generation.fetch_add(1, Ordering::Release);
        Ok(out)
    }

    /// Number of successful updates so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Current parameters, consistent with the returned generation.
    pub fn snapshot(&self) -> FrameSnapshot {
        let pipeline = self.inner.pipeline.read();
        FrameSnapshot {
            generation: self.inner.generation.load(Ordering::Acquire),
            params: pipeline.snapshot(),
        }
    }

    /// Snapshot only if something changed since `last_generation`.
    pub fn snapshot_if_changed(&self, last_generation: u64) -> Option<FrameSnapshot> {
        if self.generation() == last_generation {
            return None;
        }
        Some(self.snapshot())
    }

    /// Evaluate one frame. The lock is released before any pixel work.
    pub fn render_frame(&self, image: &GradingImage) -> (FrameSnapshot, GradingImage) {
        let frame = self.snapshot();
        let out = process_image(image, &frame.params);
        tracing::trace!(
            generation = frame.generation,
            pixels = image.pixel_count(),
            "frame rendered"
        );
        (frame, out)
    }
}

impl Default for SharedPipeline {
    fn default() -> Self {
        Self::new(GradingPipeline::default())
    }
}
