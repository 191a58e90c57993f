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

//! Per-scene ordering of a draw group.

use cadence_core::TickHandle;

/// The scene index table of one draw-side group.
///
/// Entries are stored as contiguous per-scene segments, in scene order.
/// `ends[i]` is the number of entries up to and including the segment of
/// scene `i`. A tickable relevant to several scenes appears once in each of
/// their segments.
#[derive(Debug, Clone, Default)]
pub struct SceneLinks {
    entries: Vec<TickHandle>,
    ends: Vec<usize>,
}

impl SceneLinks {
    /// Grows the table to track `count` scenes. New scenes start empty.
    pub fn ensure_scenes(&mut self, count: usize) {
        while self.ends.len() < count {
            self.ends.push(self.entries.len());
        }
    }

    /// Appends `handle` to the segment of every scene whose bit is set in
    /// `mask`.
    pub fn link(&mut self, handle: TickHandle, mask: u64) {
        for i in 0..self.ends.len() {
            if mask & (1u64 << i) == 0 {
                continue;
            }
            self.entries.insert(self.ends[i], handle);
            for end in &mut self.ends[i..] {
                *end += 1;
            }
        }
    }

    /// Removes `handle` from the segment of every scene whose bit is set in
    /// `mask`. Surviving entries keep their order.
    pub fn unlink(&mut self, handle: TickHandle, mask: u64) {
        for i in 0..self.ends.len() {
            if mask & (1u64 << i) == 0 {
                continue;
            }
            let start = self.start(i);
            let Some(pos) = self.entries[start..self.ends[i]]
                .iter()
                .position(|&h| h == handle)
            else {
                continue;
            };
            self.entries.remove(start + pos);
            for end in &mut self.ends[i..] {
                *end -= 1;
            }
        }
    }

    /// Tickables drawn into scene `scene`, in link order.
    pub fn segment(&self, scene: usize) -> &[TickHandle] {
        match self.ends.get(scene) {
            Some(&end) => &self.entries[self.start(scene)..end],
            None => &[],
        }
    }

    /// Number of scenes tracked.
    pub fn scene_count(&self) -> usize {
        self.ends.len()
    }

    /// Total number of links across every scene.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tickable is linked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn start(&self, scene: usize) -> usize {
        if scene == 0 {
            0
        } else {
            self.ends[scene - 1]
        }
    }
}
