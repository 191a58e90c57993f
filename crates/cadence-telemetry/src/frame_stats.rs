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

//! Periodic frame-time summaries.

use cadence_core::event::TickerEvent;
use serde::Serialize;

/// Aggregated figures over a window of frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameSummary {
    /// First frame of the window.
    pub first_frame: u64,
    /// Last frame of the window.
    pub last_frame: u64,
    /// Number of frames in the window.
    pub frames: u64,
    /// Mean deltatime, in seconds.
    pub avg_deltatime: f32,
    /// Smallest deltatime, in seconds.
    pub min_deltatime: f32,
    /// Largest deltatime, in seconds.
    pub max_deltatime: f32,
    /// Largest pacing drift seen, in seconds.
    pub max_bias: f32,
    /// Tickables freed during the window.
    pub destroyed: usize,
    /// References dropped by the shutdown escalator during the window.
    pub poked: usize,
}

impl FrameSummary {
    /// Serializes the summary to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Default)]
struct Window {
    first_frame: Option<u64>,
    last_frame: u64,
    frames: u64,
    sum: f64,
    min: f32,
    max: f32,
    max_bias: f32,
    destroyed: usize,
    poked: usize,
}

impl Window {
    fn push(&mut self, frame: u64, deltatime: f32, bias: f32) {
        if self.first_frame.is_none() {
            self.first_frame = Some(frame);
            self.min = deltatime;
            self.max = deltatime;
            self.max_bias = bias;
        }
        self.last_frame = frame;
        self.frames += 1;
        self.sum += f64::from(deltatime);
        self.min = self.min.min(deltatime);
        self.max = self.max.max(deltatime);
        self.max_bias = self.max_bias.max(bias);
    }

    fn summary(&self) -> Option<FrameSummary> {
        let first_frame = self.first_frame?;
        Some(FrameSummary {
            first_frame,
            last_frame: self.last_frame,
            frames: self.frames,
            avg_deltatime: (self.sum / self.frames as f64) as f32,
            min_deltatime: self.min,
            max_deltatime: self.max,
            max_bias: self.max_bias,
            destroyed: self.destroyed,
            poked: self.poked,
        })
    }
}

/// Consumes ticker events and produces a [`FrameSummary`] every `interval`
/// frames.
pub struct FrameStats {
    receiver: flume::Receiver<TickerEvent>,
    interval: u64,
    window: Window,
    total_frames: u64,
}

impl FrameStats {
    /// Creates a consumer summarizing every `interval` frames (at least one).
    pub fn new(receiver: flume::Receiver<TickerEvent>, interval: u64) -> Self {
        Self {
            receiver,
            interval: interval.max(1),
            window: Window::default(),
            total_frames: 0,
        }
    }

    /// Folds one event in. Returns a summary when it completes a window.
    pub fn record(&mut self, event: &TickerEvent) -> Option<FrameSummary> {
        match *event {
            TickerEvent::FrameCompleted {
                frame,
                deltatime,
                bias,
            } => {
                self.total_frames += 1;
                self.window.push(frame, deltatime, bias);
                if self.window.frames >= self.interval {
                    return self.flush();
                }
            }
            TickerEvent::Destroyed { count, .. } => self.window.destroyed += count,
            TickerEvent::Poked { poked, .. } => self.window.poked += poked,
            TickerEvent::ShutdownRequested { frame } => {
                log::info!("Shutdown requested at frame {} ({} frames seen).", frame, self.total_frames);
            }
        }
        None
    }

    /// Drains every pending event and returns the summaries it completed.
    pub fn poll(&mut self) -> Vec<FrameSummary> {
        let events: Vec<TickerEvent> = self.receiver.try_iter().collect();
        events
            .iter()
            .filter_map(|event| self.record(event))
            .collect()
    }

    /// Closes the current window, even if incomplete, and logs it.
    pub fn flush(&mut self) -> Option<FrameSummary> {
        let summary = std::mem::take(&mut self.window).summary()?;
        log::info!(
            "Frames {}..={}: dt avg {:.2}ms min {:.2}ms max {:.2}ms, bias max {:.2}ms, {} destroyed",
            summary.first_frame,
            summary.last_frame,
            summary.avg_deltatime * 1000.0,
            summary.min_deltatime * 1000.0,
            summary.max_deltatime * 1000.0,
            summary.max_bias * 1000.0,
            summary.destroyed
        );
        if summary.poked > 0 {
            log::warn!("{} references poked during shutdown.", summary.poked);
        }
        Some(summary)
    }

    /// Frames seen since creation.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}
