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

//! Ticker configuration.

use cadence_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a [`Ticker`](crate::Ticker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// Target frame rate. `0` disables pacing.
    pub fps: f32,
    /// Run the game pass on a dedicated worker when threads are available.
    pub multithreaded: bool,
    /// Frames between the first two shutdown escalation attempts.
    pub quit_delay: u32,
    /// Deltatime never exceeds `1 / min_fps` seconds.
    pub min_fps: f32,
    /// Pacing never waits long enough to drop below this rate.
    pub min_wait_fps: f32,
    /// Also mark unreferenced tickables that only have a game-side group.
    pub collect_game_side: bool,
    /// Capacity of the event bus; events beyond it are dropped.
    pub event_buffer: usize,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            multithreaded: true,
            quit_delay: 20,
            min_fps: 15.0,
            min_wait_fps: 5.0,
            collect_game_side: false,
            event_buffer: 1024,
        }
    }
}

impl TickerConfig {
    /// A configuration running both passes on the calling thread.
    pub fn single_threaded(fps: f32) -> Self {
        Self {
            fps,
            multithreaded: false,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fps.is_finite() || self.fps < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fps must be a finite, non-negative number, got {}",
                self.fps
            )));
        }
        if !(self.min_fps > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_fps must be positive, got {}",
                self.min_fps
            )));
        }
        if !(self.min_wait_fps > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_wait_fps must be positive, got {}",
                self.min_wait_fps
            )));
        }
        if self.quit_delay == 0 {
            return Err(ConfigError::Invalid("quit_delay must be at least 1".into()));
        }
        Ok(())
    }
}
