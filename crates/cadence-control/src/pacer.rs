// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Frame pacing with drift compensation.

use std::time::Duration;

/// Converts wall-clock time into a clamped deltatime and a wait duration.
///
/// `bias` accumulates the time the engine is running behind (or ahead of)
/// the target rate. Slow frames grow it, so later waits shrink until the
/// engine has caught up.
#[derive(Debug, Clone)]
pub struct FramePacer {
    fps: f32,
    min_fps: f32,
    min_wait_fps: f32,
    recording: u32,
    deltatime: f32,
    bias: f32,
}

impl FramePacer {
    /// Creates a pacer targeting `fps`, clamping deltatime to `1 / min_fps`
    /// and never waiting past `1 / min_wait_fps` beyond the current bias.
    pub fn new(fps: f32, min_fps: f32, min_wait_fps: f32) -> Self {
        Self {
            fps,
            min_fps,
            min_wait_fps,
            recording: 0,
            deltatime: 0.0,
            bias: 0.0,
        }
    }

    /// Computes the deltatime of a new frame from the wall-clock time
    /// `elapsed` since the previous one.
    pub fn begin_frame(&mut self, elapsed: f32) -> f32 {
        if self.recording > 0 && self.fps > 0.0 {
            self.deltatime = 1.0 / self.fps;
        } else {
            self.deltatime = elapsed;
            self.bias += elapsed;
        }

        let max_deltatime = 1.0 / self.min_fps;
        if self.deltatime > max_deltatime {
            self.deltatime = max_deltatime;
            self.bias = 0.0;
        }

        self.deltatime
    }

    /// Computes how long the driver should wait before the next frame.
    pub fn frame_wait(&mut self) -> Duration {
        let mut frametime = if self.fps > 0.0 { 1.0 / self.fps } else { 0.0 };

        let ceiling = self.bias + 1.0 / self.min_wait_fps;
        if frametime > ceiling {
            frametime = ceiling;
        }
        let wait = (frametime - self.bias).max(0.0);

        // Recorded frames must stay reproducible.
        if self.recording == 0 {
            self.bias -= frametime;
        }

        Duration::from_secs_f32(wait)
    }

    /// Enters a (possibly nested) recording section.
    pub fn push_recording(&mut self) {
        self.recording += 1;
    }

    /// Leaves a recording section.
    ///
    /// # Panics
    ///
    /// Panics if no recording section is open.
    pub fn pop_recording(&mut self) {
        assert!(self.recording > 0, "pop_recording without matching push_recording");
        self.recording -= 1;
    }

    /// Current recording depth.
    pub fn recording(&self) -> u32 {
        self.recording
    }

    /// Target frame rate.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Deltatime of the last frame, in seconds.
    pub fn deltatime(&self) -> f32 {
        self.deltatime
    }

    /// Accumulated drift, in seconds.
    pub fn bias(&self) -> f32 {
        self.bias
    }
}
