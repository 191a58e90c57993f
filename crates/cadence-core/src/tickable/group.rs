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

//! Processing groups.
//!
//! Groups, not individual priorities, define the order in which tickables are
//! processed. They are split into a contiguous game-side range followed by a
//! contiguous draw-side range.

use serde::{Deserialize, Serialize};

/// An ordered processing bucket.
///
/// The declaration order is the processing order: every pass iterates groups
/// in ascending order, and every game-side group precedes every draw-side one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Group {
    /// Input sampling.
    GameInput,
    /// Application-level logic.
    GameApp,
    /// Generic world entities.
    GameEntity,
    /// Player controllers.
    GamePlayer,
    /// Tile maps and other bulk world data.
    GameTiles,
    /// Camera setup; the first draw-side group.
    DrawCamera,
    /// World geometry.
    DrawWorld,
    /// Generic drawable entities.
    DrawEntity,
    /// Lights.
    DrawLight,
    /// Application-level drawing.
    DrawApp,
    /// Overlays drawn on top of the scene.
    DrawHud,
    /// Screenshot and video capture.
    DrawCapture,
}

impl Group {
    /// Total number of groups.
    pub const COUNT: usize = 12;

    /// Every group, in processing order.
    pub const ALL: [Group; Group::COUNT] = [
        Group::GameInput,
        Group::GameApp,
        Group::GameEntity,
        Group::GamePlayer,
        Group::GameTiles,
        Group::DrawCamera,
        Group::DrawWorld,
        Group::DrawEntity,
        Group::DrawLight,
        Group::DrawApp,
        Group::DrawHud,
        Group::DrawCapture,
    ];

    /// The first group of the draw-side range.
    pub const FIRST_DRAW: Group = Group::DrawCamera;

    /// Position of the group in processing order.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the group at `index` in processing order.
    pub fn from_index(index: usize) -> Option<Group> {
        Self::ALL.get(index).copied()
    }

    /// Returns `true` if the group lies in the draw-side range.
    #[inline]
    pub const fn is_draw(self) -> bool {
        self.index() >= Self::FIRST_DRAW.index()
    }

    /// Returns `true` if the group lies in the game-side range.
    #[inline]
    pub const fn is_game(self) -> bool {
        !self.is_draw()
    }

    /// Game-side groups in processing order.
    pub fn game() -> impl Iterator<Item = Group> {
        Self::ALL.into_iter().filter(|g| g.is_game())
    }

    /// Draw-side groups in processing order.
    pub fn draw() -> impl Iterator<Item = Group> {
        Self::ALL.into_iter().filter(|g| g.is_draw())
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
