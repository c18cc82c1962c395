use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::RenderBackend;
use crate::frame::{FrameInfo, FrameIterator};
use crate::runtime::SceneRuntime;

/// Cloneable switch that ends an `AnimationLoop`
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Repeating frame task, driven either by the host's redraw callback
/// (`next_frame`) or by a plain loop (`run`)
#[derive(Debug)]
pub struct AnimationLoop {
    frames: FrameIterator,
    stop: StopHandle,
    frame_limit: Option<u64>,
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self {
            frames: FrameIterator::new(),
            stop: StopHandle::default(),
            frame_limit: None,
        }
    }

    /// Stop on its own after `limit` frames
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.stop.is_stopped()
            || self
                .frame_limit
                .is_some_and(|limit| self.frames.frame_number() >= limit)
    }

    /// Timing for the next frame, or `None` once stopped
    pub fn next_frame(&mut self) -> Option<FrameInfo> {
        if self.is_finished() {
            return None;
        }
        self.frames.next()
    }

    /// Tick `runtime` once per frame until stopped; returns frames run
    pub fn run<B: RenderBackend>(&mut self, runtime: &mut SceneRuntime<B>) -> u64 {
        let mut ticks = 0;
        while self.next_frame().is_some() {
            runtime.tick();
            ticks += 1;
        }
        ticks
    }
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_limit_ends_loop() {
        let mut animation = AnimationLoop::new().with_frame_limit(3);
        assert!(animation.next_frame().is_some());
        assert!(animation.next_frame().is_some());
        assert!(animation.next_frame().is_some());
        assert!(animation.next_frame().is_none());
        assert!(animation.is_finished());
    }

    #[test]
    fn test_stop_handle_ends_loop() {
        let mut animation = AnimationLoop::new();
        let handle = animation.stop_handle();
        assert!(animation.next_frame().is_some());
        handle.stop();
        assert!(animation.next_frame().is_none());
    }

    #[test]
    fn test_stop_handles_share_state() {
        let handle = StopHandle::default();
        let other = handle.clone();
        other.stop();
        assert!(handle.is_stopped());
    }
}
