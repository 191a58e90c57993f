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

//! # Cadence Core
//!
//! Foundational crate containing the contracts shared by the frame scheduler
//! and every subsystem it drives: the [`Tickable`] lifecycle hooks, the
//! [`Scene`] render-target hooks, group ordering, handles and flags.

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod scene;
pub mod tickable;
pub mod utils;

pub use error::{ConfigError, TickError};
pub use scene::Scene;
pub use tickable::{Group, TickContext, TickFlags, TickHandle, TickState, Tickable, TickerAccess};
pub use utils::timer::Stopwatch;
