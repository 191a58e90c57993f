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

//! Error types shared across the scheduler crates.

use crate::tickable::TickHandle;
use thiserror::Error;

/// A violation of the reference-counting contract.
///
/// The panicking entry points (`retain`, `release`) turn these into fatal
/// assertions; the `try_*` variants surface them so callers can inspect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TickError {
    /// The handle does not resolve to a live tickable (never registered,
    /// already freed, or recycled under a newer generation).
    #[error("invalid tickable handle {0}")]
    InvalidHandle(TickHandle),
    /// The tickable is already marked for destruction and cannot be retained.
    #[error("tickable {0} is being destroyed")]
    Destroying(TickHandle),
    /// Releasing would drive the reference count below zero.
    #[error("tickable {0} has a zero reference count")]
    ZeroRefCount(TickHandle),
    /// The tickable is still owned by the autorelease list; it was never retained.
    #[error("tickable {0} is autoreleased and was never retained")]
    Autoreleased(TickHandle),
}

/// An error raised while loading or validating a ticker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration source is not valid JSON for the expected layout.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    /// A field holds a value the scheduler cannot work with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_error_messages_name_the_handle() {
        let handle = TickHandle {
            index: 3,
            generation: 1,
        };
        assert_eq!(
            TickError::ZeroRefCount(handle).to_string(),
            "tickable #3v1 has a zero reference count"
        );
        assert_eq!(
            TickError::Autoreleased(handle).to_string(),
            "tickable #3v1 is autoreleased and was never retained"
        );
    }

    #[test]
    fn config_error_wraps_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("failed to read configuration"));
    }
}
