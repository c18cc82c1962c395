use std::time::Instant;

/// Timing for one animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    /// Seconds since the first frame
    pub time: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

/// Endless source of frame timings, one per `next`
#[derive(Debug)]
pub struct FrameIterator {
    frame_number: u64,
    start_time: Instant,
    last_frame_time: Instant,
}

impl FrameIterator {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_number: 0,
            start_time: now,
            last_frame_time: now,
        }
    }

    /// Frames yielded so far
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

impl Default for FrameIterator {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for FrameIterator {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        let now = Instant::now();
        let info = FrameInfo {
            number: self.frame_number,
            time: now.duration_since(self.start_time).as_secs_f32(),
            delta: now.duration_since(self.last_frame_time).as_secs_f32(),
        };

        self.frame_number += 1;
        self.last_frame_time = now;
        Some(info)
    }
}

/// Averages frame rate over a reporting interval
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: f32,
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            frames: 0,
            elapsed: 0.0,
        }
    }

    /// Count a frame; returns the new average when an interval completes
    pub fn record(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta;

        if self.elapsed < self.interval {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}
