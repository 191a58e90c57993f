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

//! Bounded-time shutdown.
//!
//! Tickables that keep their references after shutdown was requested would
//! keep the ticker alive forever. The escalator periodically drops some of
//! those references by force, poking more tickables at shorter intervals
//! every attempt, until every tickable could be collected.

use crate::registry::TickableRegistry;
use cadence_core::Group;

/// Outcome of one escalation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PokeReport {
    /// Number of references dropped by force.
    pub poked: usize,
    /// Tickables still alive when the attempt started.
    pub stuck: usize,
}

/// Tracks the quit request and the escalation schedule.
#[derive(Debug, Clone)]
pub struct ShutdownEscalator {
    quitting: bool,
    quit_frame: u64,
    quit_delay: u32,
    panic: u32,
}

impl ShutdownEscalator {
    /// Creates an escalator whose first attempt happens `quit_delay` frames
    /// after shutdown starts.
    pub fn new(quit_delay: u32) -> Self {
        Self {
            quitting: false,
            quit_frame: 0,
            quit_delay: quit_delay.max(1),
            panic: 0,
        }
    }

    /// Starts the shutdown sequence at `frame`.
    pub fn begin(&mut self, frame: u64) {
        self.quitting = true;
        self.quit_frame = frame;
    }

    /// Runs an escalation attempt if one is due at `frame`.
    ///
    /// An attempt doubles the poke budget (plus two), drops one reference
    /// from up to that many referenced tickables in processing order, and
    /// halves the delay until the next attempt.
    pub fn handle_shutdown(
        &mut self,
        frame: u64,
        registry: &mut TickableRegistry,
    ) -> Option<PokeReport> {
        if !self.quitting {
            return None;
        }
        let elapsed = frame.saturating_sub(self.quit_frame);
        if elapsed % u64::from(self.quit_delay) != 0 {
            return None;
        }

        self.panic = self.panic.saturating_add(1).saturating_mul(2);
        let budget = self.panic as usize;
        let stuck = registry.entity_count();
        let mut poked = 0;

        'groups: for group in Group::ALL {
            for i in 0..registry.group_len(group) {
                if poked >= budget {
                    break 'groups;
                }
                let handle = registry.group(group)[i];
                let Some(meta) = registry.meta_mut(handle) else {
                    continue;
                };
                if meta.refs == 0 {
                    continue;
                }
                meta.refs -= 1;
                let refs = meta.refs;
                poked += 1;

                let name = registry.get(handle).map_or("<busy>", |body| body.name());
                log::warn!("Poking '{}' ({}), {} references left", name, handle, refs);
            }
        }

        if poked > 0 {
            log::warn!(
                "{} entities stuck after {} frames, poked {}",
                stuck,
                self.quit_delay,
                poked
            );
        }

        self.quit_delay = (self.quit_delay / 2).max(1);
        Some(PokeReport { poked, stuck })
    }

    /// Returns `true` once shutdown has started.
    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Frame at which shutdown started.
    pub fn quit_frame(&self) -> u64 {
        self.quit_frame
    }

    /// Frames until the next escalation attempt window.
    pub fn quit_delay(&self) -> u32 {
        self.quit_delay
    }

    /// Poke budget of the last attempt.
    pub fn panic_budget(&self) -> u32 {
        self.panic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::SceneList;
    use cadence_core::Tickable;

    struct Stuck;
    impl Tickable for Stuck {}

    fn promoted(count: usize) -> TickableRegistry {
        let mut registry = TickableRegistry::new();
        let scenes = SceneList::default();
        for _ in 0..count {
            let h = registry.register(Box::new(Stuck));
            registry.try_retain(h).unwrap();
            registry.try_retain(h).unwrap();
        }
        registry.promote_pending(&scenes);
        registry.promote_pending(&scenes);
        registry
    }

    #[test]
    fn idle_until_quitting() {
        let mut registry = promoted(1);
        let mut escalator = ShutdownEscalator::new(20);
        assert_eq!(escalator.handle_shutdown(20, &mut registry), None);
    }

    #[test]
    fn attempts_follow_the_halving_schedule() {
        let mut registry = TickableRegistry::new();
        let mut escalator = ShutdownEscalator::new(20);
        escalator.begin(100);

        let attempts: Vec<u64> = (101..=160)
            .filter(|&frame| escalator.handle_shutdown(frame, &mut registry).is_some())
            .collect();

        // 20, then 10, then 5 frames apart until the delay bottoms out at 1.
        assert_eq!(&attempts[..4], &[120, 130, 135, 136]);
        assert_eq!(escalator.quit_delay(), 1);
    }

    #[test]
    fn budget_grows_and_caps_the_pokes() {
        let mut registry = promoted(5);
        let mut escalator = ShutdownEscalator::new(1);
        escalator.begin(0);

        let first = escalator.handle_shutdown(1, &mut registry).unwrap();
        assert_eq!(first, PokeReport { poked: 2, stuck: 5 });
        assert_eq!(escalator.panic_budget(), 2);

        // Budget 6, but only five references are left to take.
        let second = escalator.handle_shutdown(2, &mut registry).unwrap();
        assert_eq!(second.poked, 5);
        assert_eq!(escalator.panic_budget(), 6);

        let remaining: u32 = registry
            .group(Group::GameEntity)
            .iter()
            .map(|&h| registry.ref_count(h).unwrap())
            .sum();
        assert_eq!(remaining, 10 - 7);
    }

    #[test]
    fn budget_saturates() {
        let mut registry = TickableRegistry::new();
        let mut escalator = ShutdownEscalator::new(1);
        escalator.begin(0);
        for frame in 1..100 {
            escalator.handle_shutdown(frame, &mut registry);
        }
        assert_eq!(escalator.panic_budget(), u32::MAX);
    }
}
