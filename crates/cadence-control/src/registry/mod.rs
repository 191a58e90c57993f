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

//! Ownership and ordering of registered tickables.

mod arena;
mod scene_links;

pub(crate) use arena::TickMeta;
pub use scene_links::SceneLinks;

use crate::scenes::SceneList;
use arena::TickArena;
use cadence_core::{Group, TickError, TickFlags, TickHandle, Tickable};
use std::collections::HashSet;

/// Owns every registered tickable and the ordered lists the passes walk.
///
/// Newly registered tickables wait in two pending stages before joining
/// their group lists: their groups are only read once the registering code
/// is done configuring them.
#[derive(Default)]
pub struct TickableRegistry {
    arena: TickArena,
    /// Processing order, one list per group.
    groups: [Vec<TickHandle>; Group::COUNT],
    /// Scene index tables; only the draw-side entries are used.
    links: [SceneLinks; Group::COUNT],
    /// Registered during the current cycle.
    pending_delayed: Vec<TickHandle>,
    /// Promoted at the start of the next game pass.
    pending: Vec<TickHandle>,
    autorelease: HashSet<TickHandle>,
    live: HashSet<TickHandle>,
    entity_count: usize,
}

impl TickableRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an autoreleased tickable with one reference.
    pub fn register(&mut self, tickable: Box<dyn Tickable>) -> TickHandle {
        let handle = self.arena.insert(tickable);
        if let Some(body) = self.arena.body(handle) {
            log::debug!("Registered tickable '{}' as {}", body.name(), handle);
        }

        self.pending_delayed.push(handle);
        self.autorelease.insert(handle);
        self.entity_count += 1;
        handle
    }

    /// Takes one reference on `handle`.
    ///
    /// Retaining an autoreleased tickable transfers the scheduler's reference
    /// to the caller instead of adding one.
    pub fn try_retain(&mut self, handle: TickHandle) -> Result<(), TickError> {
        let meta = self
            .arena
            .meta_mut(handle)
            .ok_or(TickError::InvalidHandle(handle))?;

        if meta.flags.contains(TickFlags::DESTROYING) {
            return Err(TickError::Destroying(handle));
        }

        if meta.flags.contains(TickFlags::AUTORELEASE) {
            meta.flags.remove(TickFlags::AUTORELEASE);
            self.autorelease.remove(&handle);
        } else {
            meta.refs += 1;
        }
        Ok(())
    }

    /// Drops one reference on `handle`, returning the new count.
    pub fn try_release(&mut self, handle: TickHandle) -> Result<u32, TickError> {
        let meta = self
            .arena
            .meta_mut(handle)
            .ok_or(TickError::InvalidHandle(handle))?;

        if meta.refs == 0 {
            return Err(TickError::ZeroRefCount(handle));
        }
        if meta.flags.contains(TickFlags::AUTORELEASE) {
            return Err(TickError::Autoreleased(handle));
        }

        meta.refs -= 1;
        Ok(meta.refs)
    }

    /// Drops the scheduler's reference on every autoreleased tickable and
    /// empties the autorelease set. Returns how many were released.
    pub fn release_autoreleased(&mut self) -> usize {
        let released = self.autorelease.len();
        for handle in self.autorelease.drain() {
            if let Some(meta) = self.arena.meta_mut(handle) {
                meta.refs = meta.refs.saturating_sub(1);
                meta.flags.remove(TickFlags::AUTORELEASE);
            }
        }
        released
    }

    /// Inserts `handle` into the live set. Returns `false` if already present.
    pub fn add(&mut self, handle: TickHandle) -> bool {
        self.live.insert(handle)
    }

    /// Removes `handle` from the live set. Returns `false` if absent.
    pub fn remove(&mut self, handle: TickHandle) -> bool {
        self.live.remove(&handle)
    }

    /// Moves the tickables registered before the previous game pass into
    /// their group lists, most recent registration first, then advances the
    /// newer registrations by one stage.
    ///
    /// # Panics
    ///
    /// Panics if a tickable declares a draw-side game group or a game-side
    /// draw group.
    pub fn promote_pending(&mut self, scenes: &SceneList) {
        for handle in std::mem::take(&mut self.pending).into_iter().rev() {
            let Some(body) = self.arena.body(handle) else {
                log::error!("Pending tickable {} vanished before promotion", handle);
                continue;
            };

            let game_group = body.game_group();
            let draw_group = body.draw_group();
            assert!(
                game_group.is_game(),
                "tickable '{}' declares {game_group} as its game group",
                body.name()
            );
            if let Some(draw) = draw_group {
                assert!(
                    draw.is_draw(),
                    "tickable '{}' declares {draw} as its draw group",
                    body.name()
                );
            }
            let scene_mask = match draw_group {
                Some(_) => scenes.relevance_mask(handle, body),
                None => 0,
            };
            log::debug!(
                "Promoting '{}' ({}) into {game_group}/{:?}, scene mask {scene_mask:#b}",
                body.name(),
                handle,
                draw_group
            );

            if let Some(meta) = self.arena.meta_mut(handle) {
                meta.game_group = game_group;
                meta.draw_group = draw_group;
                meta.scene_mask = scene_mask;
            }

            self.groups[game_group.index()].push(handle);
            if let Some(draw) = draw_group {
                self.groups[draw.index()].push(handle);
                let links = &mut self.links[draw.index()];
                links.ensure_scenes(scenes.len());
                links.link(handle, scene_mask);
            }
        }

        self.pending = std::mem::take(&mut self.pending_delayed);
    }

    /// Frees every tickable of `batch` and returns how many were freed.
    ///
    /// The handles must already be unlinked from every group list.
    pub(crate) fn free_batch(&mut self, batch: &[TickHandle]) -> usize {
        let mut freed = 0;
        for &handle in batch {
            if let Some(body) = self.arena.free(handle) {
                log::debug!("Destroyed tickable '{}' ({})", body.name(), handle);
                freed += 1;
            }
            self.autorelease.remove(&handle);
            self.live.remove(&handle);
        }
        self.entity_count -= freed;
        freed
    }

    pub(crate) fn meta(&self, handle: TickHandle) -> Option<&TickMeta> {
        self.arena.meta(handle)
    }

    pub(crate) fn meta_mut(&mut self, handle: TickHandle) -> Option<&mut TickMeta> {
        self.arena.meta_mut(handle)
    }

    pub(crate) fn take_body(&mut self, handle: TickHandle) -> Option<Box<dyn Tickable>> {
        self.arena.take_body(handle)
    }

    pub(crate) fn restore_body(&mut self, handle: TickHandle, body: Box<dyn Tickable>) {
        self.arena.restore_body(handle, body);
    }

    pub(crate) fn group_mut(&mut self, group: Group) -> &mut Vec<TickHandle> {
        &mut self.groups[group.index()]
    }

    pub(crate) fn links_mut(&mut self, group: Group) -> &mut SceneLinks {
        &mut self.links[group.index()]
    }

    /// The processing list of `group`.
    pub fn group(&self, group: Group) -> &[TickHandle] {
        &self.groups[group.index()]
    }

    /// Number of tickables in the processing list of `group`.
    pub fn group_len(&self, group: Group) -> usize {
        self.groups[group.index()].len()
    }

    /// The scene index table of `group`.
    pub fn scene_links(&self, group: Group) -> &SceneLinks {
        &self.links[group.index()]
    }

    /// Tickables registered and not yet freed.
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Tickables waiting in either pending stage.
    pub fn pending_count(&self) -> usize {
        self.pending.len() + self.pending_delayed.len()
    }

    /// Tickables still owned by the autorelease set.
    pub fn autorelease_count(&self) -> usize {
        self.autorelease.len()
    }

    /// Number of handles in the live set.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if `handle` is in the live set.
    pub fn is_added(&self, handle: TickHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Reference count of `handle`, if it is alive.
    pub fn ref_count(&self, handle: TickHandle) -> Option<u32> {
        self.arena.meta(handle).map(|meta| meta.refs)
    }

    /// Lifecycle flags of `handle`, if it is alive.
    pub fn flags(&self, handle: TickHandle) -> Option<TickFlags> {
        self.arena.meta(handle).map(|meta| meta.flags)
    }

    /// Returns `true` if `handle` resolves to a registered tickable.
    pub fn is_alive(&self, handle: TickHandle) -> bool {
        self.arena.contains(handle)
    }

    /// Tickable behind `handle`, unless it is alive but busy running a hook.
    pub fn get(&self, handle: TickHandle) -> Option<&dyn Tickable> {
        self.arena.body(handle)
    }

    /// Number of occupied arena slots; equals [`entity_count`](Self::entity_count).
    pub fn slot_count(&self) -> usize {
        self.arena.live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::Scene;

    struct Game;
    impl Tickable for Game {}

    struct Drawn(Group);
    impl Tickable for Drawn {
        fn draw_group(&self) -> Option<Group> {
            Some(self.0)
        }
    }

    struct Misplaced;
    impl Tickable for Misplaced {
        fn game_group(&self) -> Group {
            Group::DrawHud
        }
    }

    struct Screen;
    impl Scene for Screen {
        fn render(&mut self, _dt: f32) {}
    }

    #[test]
    fn register_sets_one_autoreleased_ref() {
        let mut registry = TickableRegistry::new();
        let h = registry.register(Box::new(Game));
        assert_eq!(registry.ref_count(h), Some(1));
        assert!(registry.flags(h).unwrap().contains(TickFlags::AUTORELEASE));
        assert_eq!(registry.autorelease_count(), 1);
        assert_eq!(registry.entity_count(), 1);
        assert_eq!(registry.pending_count(), 1);
    }

    #[test]
    fn retain_of_autoreleased_transfers_ownership() {
        let mut registry = TickableRegistry::new();
        let h = registry.register(Box::new(Game));

        registry.try_retain(h).unwrap();
        assert_eq!(registry.ref_count(h), Some(1));
        assert_eq!(registry.autorelease_count(), 0);

        registry.try_retain(h).unwrap();
        assert_eq!(registry.ref_count(h), Some(2));
        assert_eq!(registry.try_release(h), Ok(1));
        assert_eq!(registry.try_release(h), Ok(0));
        assert_eq!(registry.try_release(h), Err(TickError::ZeroRefCount(h)));
    }

    #[test]
    fn releasing_autoreleased_is_an_error() {
        let mut registry = TickableRegistry::new();
        let h = registry.register(Box::new(Game));
        assert_eq!(registry.try_release(h), Err(TickError::Autoreleased(h)));
        assert_eq!(registry.ref_count(h), Some(1));
    }

    #[test]
    fn stale_handles_are_invalid() {
        let mut registry = TickableRegistry::new();
        let bogus = TickHandle {
            index: 42,
            generation: 3,
        };
        assert_eq!(registry.try_retain(bogus), Err(TickError::InvalidHandle(bogus)));
        assert_eq!(registry.try_release(bogus), Err(TickError::InvalidHandle(bogus)));
    }

    #[test]
    fn release_autoreleased_drops_the_scheduler_reference() {
        let mut registry = TickableRegistry::new();
        let handles: Vec<_> = (0..5).map(|_| registry.register(Box::new(Game))).collect();
        assert_eq!(registry.release_autoreleased(), 5);
        assert_eq!(registry.autorelease_count(), 0);
        for h in handles {
            assert_eq!(registry.ref_count(h), Some(0));
            assert!(!registry.flags(h).unwrap().contains(TickFlags::AUTORELEASE));
        }
    }

    #[test]
    fn promotion_takes_two_stages() {
        let mut registry = TickableRegistry::new();
        let scenes = SceneList::default();
        let first = registry.register(Box::new(Game));
        let second = registry.register(Box::new(Game));

        registry.promote_pending(&scenes);
        assert!(registry.group(Group::GameEntity).is_empty());
        assert_eq!(registry.pending_count(), 2);

        registry.promote_pending(&scenes);
        assert_eq!(registry.group(Group::GameEntity), &[second, first]);
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn drawable_joins_both_lists_and_its_scenes() {
        let mut registry = TickableRegistry::new();
        let mut scenes = SceneList::default();
        scenes.add(Box::new(Screen));
        let h = registry.register(Box::new(Drawn(Group::DrawHud)));

        registry.promote_pending(&scenes);
        registry.promote_pending(&scenes);

        assert_eq!(registry.group(Group::GameEntity), &[h]);
        assert_eq!(registry.group(Group::DrawHud), &[h]);
        assert_eq!(registry.scene_links(Group::DrawHud).segment(0), &[h]);
        assert_eq!(registry.meta(h).unwrap().scene_mask, 0b1);
    }

    #[test]
    #[should_panic(expected = "as its game group")]
    fn draw_side_game_group_is_rejected() {
        let mut registry = TickableRegistry::new();
        let scenes = SceneList::default();
        registry.register(Box::new(Misplaced));
        registry.promote_pending(&scenes);
        registry.promote_pending(&scenes);
    }

    #[test]
    fn live_set_membership_is_idempotent() {
        let mut registry = TickableRegistry::new();
        let h = registry.register(Box::new(Game));
        assert!(registry.add(h));
        assert!(!registry.add(h));
        assert!(registry.is_added(h));
        assert!(registry.remove(h));
        assert!(!registry.remove(h));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn free_batch_updates_counts() {
        let mut registry = TickableRegistry::new();
        let h = registry.register(Box::new(Game));
        registry.add(h);
        assert_eq!(registry.free_batch(&[h]), 1);
        assert_eq!(registry.entity_count(), 0);
        assert_eq!(registry.autorelease_count(), 0);
        assert_eq!(registry.live_count(), 0);
        assert!(!registry.is_alive(h));
        assert_eq!(registry.slot_count(), 0);
    }
}
