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

//! Deferred destruction of unreferenced tickables.

use crate::registry::TickableRegistry;
use cadence_core::{Group, TickFlags, TickHandle};

/// Marks unreferenced tickables for destruction and frees the ones whose
/// release hooks both acknowledged completion. Returns how many were freed.
///
/// Only draw-side lists mark tickables, unless `collect_game_side` is set.
/// Lists are walked backwards and entries removed by swapping with the last
/// one, so the order of surviving entries may change.
pub(crate) fn collect_garbage(registry: &mut TickableRegistry, collect_game_side: bool) -> usize {
    let mut batch: Vec<TickHandle> = Vec::new();

    for group in Group::ALL {
        for i in (0..registry.group_len(group)).rev() {
            let handle = registry.group(group)[i];
            let Some(meta) = registry.meta_mut(handle) else {
                continue;
            };

            if !meta.flags.contains(TickFlags::DESTROYING) {
                if meta.refs == 0 && (group.is_draw() || collect_game_side) {
                    meta.flags.insert(TickFlags::DESTROYING);
                    // Nothing will ever run its draw-side release hook.
                    if meta.draw_group.is_none() {
                        meta.flags.insert(TickFlags::RELEASE_DRAW_DONE);
                    }
                    log::debug!("Marked {} for destruction", handle);
                }
                continue;
            }

            // Retry next frame.
            if !meta.flags.contains(TickFlags::RELEASED) {
                continue;
            }

            let scene_mask = meta.scene_mask;
            registry.group_mut(group).swap_remove(i);
            if group.is_draw() {
                registry.links_mut(group).unlink(handle, scene_mask);
            }
            if !batch.contains(&handle) {
                batch.push(handle);
            }
        }
    }

    if batch.is_empty() {
        return 0;
    }
    registry.free_batch(&batch)
}
