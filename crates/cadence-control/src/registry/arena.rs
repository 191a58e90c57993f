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

//! Slot storage for registered tickables.

use cadence_core::{Group, TickFlags, TickHandle, Tickable};

#[cfg(debug_assertions)]
use cadence_core::TickState;

/// Scheduler-side bookkeeping for one tickable.
#[derive(Debug, Clone)]
pub(crate) struct TickMeta {
    pub(crate) refs: u32,
    pub(crate) flags: TickFlags,
    pub(crate) game_group: Group,
    pub(crate) draw_group: Option<Group>,
    /// Bit `i` is set if scene `i` considered the tickable relevant when it
    /// was promoted.
    pub(crate) scene_mask: u64,
    #[cfg(debug_assertions)]
    pub(crate) tick_state: TickState,
}

impl TickMeta {
    fn registered() -> Self {
        Self {
            refs: 1,
            flags: TickFlags::AUTORELEASE,
            game_group: Group::GameEntity,
            draw_group: None,
            scene_mask: 0,
            #[cfg(debug_assertions)]
            tick_state: TickState::Idle,
        }
    }
}

struct Slot {
    handle: TickHandle,
    /// `Some` only while the slot is alive.
    meta: Option<TickMeta>,
    /// `None` while a hook of this tickable is running.
    body: Option<Box<dyn Tickable>>,
}

/// Owns every registered tickable, addressed by generational handles.
///
/// Freed indices are recycled through a free list; the generation of a slot
/// is bumped on reuse so stale handles never resolve to the newcomer.
#[derive(Default)]
pub(crate) struct TickArena {
    slots: Vec<Slot>,
    freed: Vec<u32>,
}

impl TickArena {
    /// Stores `body` and returns its new handle.
    pub(crate) fn insert(&mut self, body: Box<dyn Tickable>) -> TickHandle {
        if let Some(index) = self.freed.pop() {
            let slot = &mut self.slots[index as usize];
            slot.handle.generation = slot.handle.generation.wrapping_add(1);
            slot.meta = Some(TickMeta::registered());
            slot.body = Some(body);
            slot.handle
        } else {
            let handle = TickHandle {
                index: self.slots.len() as u32,
                generation: 0,
            };
            self.slots.push(Slot {
                handle,
                meta: Some(TickMeta::registered()),
                body: Some(body),
            });
            handle
        }
    }

    fn slot(&self, handle: TickHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.handle == handle && slot.meta.is_some())
    }

    fn slot_mut(&mut self, handle: TickHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.handle == handle && slot.meta.is_some())
    }

    pub(crate) fn contains(&self, handle: TickHandle) -> bool {
        self.slot(handle).is_some()
    }

    pub(crate) fn meta(&self, handle: TickHandle) -> Option<&TickMeta> {
        self.slot(handle).and_then(|slot| slot.meta.as_ref())
    }

    pub(crate) fn meta_mut(&mut self, handle: TickHandle) -> Option<&mut TickMeta> {
        self.slot_mut(handle).and_then(|slot| slot.meta.as_mut())
    }

    pub(crate) fn body(&self, handle: TickHandle) -> Option<&dyn Tickable> {
        self.slot(handle).and_then(|slot| slot.body.as_deref())
    }

    /// Moves the tickable out of its slot so one of its hooks can run while
    /// the arena stays borrowable.
    pub(crate) fn take_body(&mut self, handle: TickHandle) -> Option<Box<dyn Tickable>> {
        self.slot_mut(handle).and_then(|slot| slot.body.take())
    }

    pub(crate) fn restore_body(&mut self, handle: TickHandle, body: Box<dyn Tickable>) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.body = Some(body);
        }
    }

    /// Frees the slot of `handle`, returning the tickable it owned.
    pub(crate) fn free(&mut self, handle: TickHandle) -> Option<Box<dyn Tickable>> {
        let slot = self.slot_mut(handle)?;
        slot.meta = None;
        let body = slot.body.take();
        self.freed.push(handle.index);
        body
    }

    /// Number of live slots.
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.freed.len()
    }
}
