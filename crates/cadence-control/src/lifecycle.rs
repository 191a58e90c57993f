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

//! Per-tickable init / tick / release transitions.
//!
//! Each side (game and draw) progresses independently:
//! pending, initialized, destroying, released, freed. The init and release
//! hooks are retried every frame until they report completion.

use crate::state::TickerCore;
use cadence_core::{Group, Scene, TickFlags, TickHandle};

#[cfg(debug_assertions)]
use cadence_core::TickState;

/// The two independent halves of a tickable's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Game,
    Draw,
}

impl Side {
    fn init_flag(self) -> TickFlags {
        match self {
            Side::Game => TickFlags::INIT_GAME_DONE,
            Side::Draw => TickFlags::INIT_DRAW_DONE,
        }
    }

    fn release_flag(self) -> TickFlags {
        match self {
            Side::Game => TickFlags::RELEASE_GAME_DONE,
            Side::Draw => TickFlags::RELEASE_DRAW_DONE,
        }
    }

    #[cfg(debug_assertions)]
    fn pre(self) -> TickState {
        match self {
            Side::Game => TickState::PreGame,
            Side::Draw => TickState::PreDraw,
        }
    }

    #[cfg(debug_assertions)]
    fn post(self) -> TickState {
        match self {
            Side::Game => TickState::PostGame,
            Side::Draw => TickState::PostDraw,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Game => write!(f, "game"),
            Side::Draw => write!(f, "draw"),
        }
    }
}

/// Runs the pending init or release hook of `handle` on `side`.
pub(crate) fn step(core: &mut TickerCore, handle: TickHandle, side: Side) {
    let Some(flags) = core.registry.flags(handle) else {
        return;
    };

    if !flags.contains(side.init_flag()) && !flags.contains(TickFlags::DESTROYING) {
        let done = core
            .invoke(handle, |body, ctx| match side {
                Side::Game => body.init_game(ctx),
                Side::Draw => body.init_draw(ctx),
            })
            .unwrap_or(false);
        if done {
            set_flag(core, handle, side.init_flag());
            log::debug!("{} {} side initialized", handle, side);
        }
    }

    let Some(flags) = core.registry.flags(handle) else {
        return;
    };
    if flags.contains(TickFlags::DESTROYING) && !flags.contains(side.release_flag()) {
        let done = core
            .invoke(handle, |body, ctx| match side {
                Side::Game => body.release_game(ctx),
                Side::Draw => body.release_draw(ctx),
            })
            .unwrap_or(false);
        if done {
            set_flag(core, handle, side.release_flag());
            log::debug!("{} {} side released", handle, side);
        }
    }
}

/// Returns `true` if `handle` is initialized on `side` and not being destroyed.
pub(crate) fn is_tickable(core: &TickerCore, handle: TickHandle, side: Side) -> bool {
    core.registry.flags(handle).is_some_and(|flags| {
        flags.contains(side.init_flag()) && !flags.contains(TickFlags::DESTROYING)
    })
}

fn set_flag(core: &mut TickerCore, handle: TickHandle, flag: TickFlags) {
    if let Some(meta) = core.registry.meta_mut(handle) {
        meta.flags.insert(flag);
    }
}

/// Init and release hooks of every game-side list, then the game ticks.
///
/// Ticks stop as soon as shutdown starts.
pub(crate) fn run_game(core: &mut TickerCore, dt: f32) {
    for group in Group::game() {
        for i in 0..core.registry.group_len(group) {
            let handle = core.registry.group(group)[i];
            step(core, handle, Side::Game);
        }
    }

    for group in Group::game() {
        for i in 0..core.registry.group_len(group) {
            if core.escalator.is_quitting() {
                return;
            }
            let handle = core.registry.group(group)[i];
            if is_tickable(core, handle, Side::Game) {
                guarded(core, handle, Side::Game, |core| {
                    core.invoke(handle, |body, ctx| body.tick_game(ctx, dt));
                });
            }
        }
    }
}

/// Init and release hooks of every draw-side list. Runs once per frame,
/// whatever the number of scenes.
pub(crate) fn run_draw_hooks(core: &mut TickerCore) {
    for group in Group::draw() {
        for i in 0..core.registry.group_len(group) {
            let handle = core.registry.group(group)[i];
            step(core, handle, Side::Draw);
        }
    }
}

/// Ticks `handle` into `scene`.
pub(crate) fn tick_draw(core: &mut TickerCore, handle: TickHandle, dt: f32, scene: &mut dyn Scene) {
    guarded(core, handle, Side::Draw, |core| {
        core.invoke(handle, |body, ctx| body.tick_draw(ctx, dt, scene));
    });
}

/// Wraps a tick hook with the debug tick-state checks.
///
/// The state goes `Idle -> Pre*` here, `Pre* -> Post*` through
/// [`TickContext::tick_done`](cadence_core::TickContext::tick_done) inside the
/// hook, and back to `Idle` once the hook returned.
fn guarded(
    core: &mut TickerCore,
    handle: TickHandle,
    side: Side,
    hook: impl FnOnce(&mut TickerCore),
) {
    #[cfg(debug_assertions)]
    transition(core, handle, TickState::Idle, side.pre(), "was not idle before its");
    hook(core);
    #[cfg(debug_assertions)]
    transition(core, handle, side.post(), TickState::Idle, "missed super");
    #[cfg(not(debug_assertions))]
    let _ = (handle, side);
}

#[cfg(debug_assertions)]
fn transition(
    core: &mut TickerCore,
    handle: TickHandle,
    from: TickState,
    to: TickState,
    failure: &str,
) {
    let Some(current) = core.registry.meta(handle).map(|meta| meta.tick_state) else {
        return;
    };
    if current != from {
        let side = match from {
            TickState::PreGame | TickState::PostGame => Side::Game,
            _ => Side::Draw,
        };
        let name = core.registry.get(handle).map_or("<busy>", |body| body.name());
        log::error!(
            "Tickable '{}' ({}) {} {} tick: expected {:?}, found {:?}",
            name,
            handle,
            failure,
            side,
            from,
            current
        );
        panic!("tickable '{name}' ({handle}) {failure} {side} tick");
    }
    if let Some(meta) = core.registry.meta_mut(handle) {
        meta.tick_state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TickerConfig;
    use crate::scenes::SceneList;
    use cadence_core::{TickContext, Tickable};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        init: AtomicU32,
        tick: AtomicU32,
        release: AtomicU32,
    }

    struct Slow {
        counters: Arc<Counters>,
        init_after: u32,
    }

    impl Tickable for Slow {
        fn init_game(&mut self, _ctx: &mut TickContext<'_>) -> bool {
            self.counters.init.fetch_add(1, Ordering::SeqCst) + 1 >= self.init_after
        }
        fn tick_game(&mut self, ctx: &mut TickContext<'_>, _dt: f32) {
            self.counters.tick.fetch_add(1, Ordering::SeqCst);
            ctx.tick_done();
        }
        fn release_game(&mut self, _ctx: &mut TickContext<'_>) -> bool {
            self.counters.release.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn core_with(counters: &Arc<Counters>, init_after: u32) -> (TickerCore, TickHandle) {
        let (sender, _receiver) = flume::unbounded();
        let mut core = TickerCore::new(&TickerConfig::single_threaded(60.0), sender);
        let handle = core.registry.register(Box::new(Slow {
            counters: Arc::clone(counters),
            init_after,
        }));
        let scenes = SceneList::default();
        core.registry.promote_pending(&scenes);
        core.registry.promote_pending(&scenes);
        (core, handle)
    }

    #[test]
    fn init_is_retried_then_ticks_in_the_same_frame() {
        let counters = Arc::new(Counters::default());
        let (mut core, handle) = core_with(&counters, 3);

        run_game(&mut core, 0.016);
        run_game(&mut core, 0.016);
        assert_eq!(counters.tick.load(Ordering::SeqCst), 0);

        run_game(&mut core, 0.016);
        assert_eq!(counters.init.load(Ordering::SeqCst), 3);
        assert_eq!(counters.tick.load(Ordering::SeqCst), 1);
        assert!(is_tickable(&core, handle, Side::Game));

        run_game(&mut core, 0.016);
        assert_eq!(counters.init.load(Ordering::SeqCst), 3);
        assert_eq!(counters.tick.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn destroying_runs_release_instead_of_tick() {
        let counters = Arc::new(Counters::default());
        let (mut core, handle) = core_with(&counters, 1);
        run_game(&mut core, 0.016);

        set_flag(&mut core, handle, TickFlags::DESTROYING);
        run_game(&mut core, 0.016);
        run_game(&mut core, 0.016);

        assert_eq!(counters.tick.load(Ordering::SeqCst), 1);
        assert_eq!(counters.release.load(Ordering::SeqCst), 1);
        assert!(core
            .registry
            .flags(handle)
            .unwrap()
            .contains(TickFlags::RELEASE_GAME_DONE));
    }

    #[test]
    fn ticks_stop_once_quitting() {
        let counters = Arc::new(Counters::default());
        let (mut core, _handle) = core_with(&counters, 1);
        core.escalator.begin(0);

        run_game(&mut core, 0.016);
        assert_eq!(counters.init.load(Ordering::SeqCst), 1);
        assert_eq!(counters.tick.load(Ordering::SeqCst), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "was not idle before its game tick")]
    fn unbalanced_tick_state_is_fatal() {
        let counters = Arc::new(Counters::default());
        let (mut core, handle) = core_with(&counters, 1);
        run_game(&mut core, 0.016);

        core.registry.meta_mut(handle).unwrap().tick_state = TickState::PreGame;
        run_game(&mut core, 0.016);
    }

    /// Overrides `tick_game` without ending it with `tick_done`.
    struct Forgetful;

    impl Tickable for Forgetful {
        fn name(&self) -> &str {
            "forgetful"
        }

        fn tick_game(&mut self, _ctx: &mut TickContext<'_>, _dt: f32) {}
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "tickable 'forgetful' (#0v0) missed super game tick")]
    fn tick_without_base_step_is_fatal() {
        let (sender, _receiver) = flume::unbounded();
        let mut core = TickerCore::new(&TickerConfig::single_threaded(60.0), sender);
        core.registry.register(Box::new(Forgetful));
        let scenes = SceneList::default();
        core.registry.promote_pending(&scenes);
        core.registry.promote_pending(&scenes);

        run_game(&mut core, 0.016);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn base_step_returns_the_tickable_to_idle() {
        let counters = Arc::new(Counters::default());
        let (mut core, handle) = core_with(&counters, 1);
        for _ in 0..3 {
            run_game(&mut core, 0.016);
            assert_eq!(core.registry.meta(handle).unwrap().tick_state, TickState::Idle);
        }
        assert_eq!(counters.tick.load(Ordering::SeqCst), 3);
    }
}
