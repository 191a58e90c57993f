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

//! Errors raised while setting up a ticker.

use cadence_core::ConfigError;
use thiserror::Error;

/// A failure to bring a ticker up.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A worker thread could not be spawned.
    #[error("failed to spawn {worker} worker: {source}")]
    Spawn {
        /// Name of the worker.
        worker: &'static str,
        /// The OS error.
        source: std::io::Error,
    },
}
