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

//! Event bus and the notifications published by the ticker.

mod bus;

pub use bus::{publish_on, EventBus};

/// A notification published by the ticker once the corresponding step is done.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerEvent {
    /// A full game + draw cycle completed.
    FrameCompleted {
        /// Frame number of the cycle.
        frame: u64,
        /// Deltatime used by the cycle, in seconds.
        deltatime: f32,
        /// Accumulated pacing bias after the cycle, in seconds.
        bias: f32,
    },
    /// Shutdown started.
    ShutdownRequested {
        /// Frame at which shutdown was requested.
        frame: u64,
    },
    /// The shutdown escalator forcibly dropped references.
    Poked {
        /// Frame of the escalation attempt.
        frame: u64,
        /// Number of references dropped.
        poked: usize,
        /// Live tickables at the time of the attempt.
        stuck: usize,
    },
    /// The garbage collector freed a batch of tickables.
    Destroyed {
        /// Frame of the collection.
        frame: u64,
        /// Number of tickables freed.
        count: usize,
    },
}
