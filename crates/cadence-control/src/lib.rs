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

//! # Cadence Control
//!
//! The frame scheduler ("the ticker"). It owns every registered tickable,
//! drives their multi-stage lifecycle, collects the ones nobody references
//! anymore, paces frames against the wall clock, and runs the game-update and
//! draw passes on two workers that strictly alternate.
//!
//! The entry point is [`Ticker`].

pub mod config;
pub mod coordinator;
pub mod error;
pub mod pacer;
pub mod registry;
pub mod scenes;
pub mod shutdown;
pub mod ticker;

mod gc;
mod lifecycle;
mod state;

pub use config::TickerConfig;
pub use coordinator::HandshakeState;
pub use error::SetupError;
pub use pacer::FramePacer;
pub use registry::TickableRegistry;
pub use scenes::{SceneList, MAX_SCENES};
pub use shutdown::{PokeReport, ShutdownEscalator};
pub use ticker::{Ticker, TickerSnapshot};
