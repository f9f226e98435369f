//! Frame driver with an explicit cancellation handle.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

/// Cancels a running [`FrameLoop`]. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AnimationHandle {
    cancelled: Arc<AtomicBool>,
}

impl AnimationHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct FrameLoop {
    interval: Duration,
    handle: AnimationHandle,
    frames: u64,
}

impl FrameLoop {
    pub fn start(interval: Duration) -> (Self, AnimationHandle) {
        let handle = AnimationHandle::default();
        let frame_loop = Self {
            interval,
            handle: handle.clone(),
            frames: 0,
        };
        (frame_loop, handle)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Calls `frame` once per interval until cancelled or the closure breaks.
    pub fn run(&mut self, mut frame: impl FnMut(u64) -> ControlFlow<()>) {
        while !self.handle.is_cancelled() {
            let started = Instant::now();
            let index = self.frames;
            self.frames += 1;
            if frame(index).is_break() {
                break;
            }
            if let Some(rest) = self.interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
        debug!("frame loop stopped after {} frames", self.frames);
    }

    /// Drives up to `count` frames back to back without sleeping.
    pub fn run_for(&mut self, count: u64, mut frame: impl FnMut(u64) -> ControlFlow<()>) {
        for _ in 0..count {
            if self.handle.is_cancelled() {
                break;
            }
            let index = self.frames;
            self.frames += 1;
            if frame(index).is_break() {
                break;
            }
        }
    }
}
