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

//! Per-tickable lifecycle flags and the debug tick-state.

use crate::cadence_bitflags;

cadence_bitflags! {
    /// Lifecycle flags carried by every registered tickable.
    pub struct TickFlags: u8 {
        /// Owned by the scheduler until explicitly retained.
        const AUTORELEASE = 1 << 0;
        /// Marked for destruction; never ticked again.
        const DESTROYING = 1 << 1;
        /// `init_game` reported completion.
        const INIT_GAME_DONE = 1 << 2;
        /// `release_game` reported completion.
        const RELEASE_GAME_DONE = 1 << 3;
        /// `init_draw` reported completion.
        const INIT_DRAW_DONE = 1 << 4;
        /// `release_draw` reported completion.
        const RELEASE_DRAW_DONE = 1 << 5;
    }
}

impl TickFlags {
    /// Both release hooks acknowledged completion.
    pub const RELEASED: Self =
        Self::from_bits_truncate(Self::RELEASE_GAME_DONE.bits() | Self::RELEASE_DRAW_DONE.bits());
}

/// Where a tickable stands inside a tick hook invocation.
///
/// Only tracked in debug builds, where it catches re-entrant or unbalanced
/// hook invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickState {
    /// Not inside any tick hook.
    #[default]
    Idle,
    /// Inside `tick_game`, before the scheduler step completed.
    PreGame,
    /// `tick_game` returned and the scheduler step completed.
    PostGame,
    /// Inside `tick_draw`, before the scheduler step completed.
    PreDraw,
    /// `tick_draw` returned and the scheduler step completed.
    PostDraw,
}
