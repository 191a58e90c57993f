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

//! The frame state shared by the game and draw passes.
//!
//! Exactly one pass owns the [`FrameState`] at any time: it travels between
//! the driver and the game worker inside the handshake tokens.

use crate::config::TickerConfig;
use crate::gc;
use crate::lifecycle::{self, Side};
use crate::pacer::FramePacer;
use crate::registry::TickableRegistry;
use crate::scenes::SceneList;
use crate::shutdown::ShutdownEscalator;
use crate::ticker::TickerSnapshot;
use cadence_core::event::{publish_on, TickerEvent};
use cadence_core::{
    Group, Stopwatch, TickContext, TickError, TickHandle, Tickable, TickerAccess,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(debug_assertions)]
use cadence_core::TickState;

/// Everything a tickable hook may reach through its [`TickContext`].
pub(crate) struct TickerCore {
    pub(crate) registry: TickableRegistry,
    pub(crate) escalator: ShutdownEscalator,
    pub(crate) pacer: FramePacer,
    pub(crate) frame: u64,
    events: flume::Sender<TickerEvent>,
}

impl TickerCore {
    pub(crate) fn new(config: &TickerConfig, events: flume::Sender<TickerEvent>) -> Self {
        Self {
            registry: TickableRegistry::new(),
            escalator: ShutdownEscalator::new(config.quit_delay),
            pacer: FramePacer::new(config.fps, config.min_fps, config.min_wait_fps),
            frame: 0,
            events,
        }
    }

    /// Runs `hook` on the tickable behind `handle` with a fresh context.
    ///
    /// The tickable is moved out of its slot for the duration of the call, so
    /// the hook can use the whole registry through the context. Returns
    /// `None` if the handle is dead or the tickable is already running.
    pub(crate) fn invoke<R>(
        &mut self,
        handle: TickHandle,
        hook: impl FnOnce(&mut dyn Tickable, &mut TickContext<'_>) -> R,
    ) -> Option<R> {
        let mut body = self.registry.take_body(handle)?;
        let frame = self.frame;
        let deltatime = self.pacer.deltatime();
        let result = {
            let mut ctx = TickContext::new(handle, frame, deltatime, self);
            hook(body.as_mut(), &mut ctx)
        };
        self.registry.restore_body(handle, body);
        Some(result)
    }

    pub(crate) fn publish(&self, event: TickerEvent) {
        publish_on(&self.events, event);
    }
}

impl TickerAccess for TickerCore {
    fn register(&mut self, tickable: Box<dyn Tickable>) -> TickHandle {
        self.registry.register(tickable)
    }

    fn try_retain(&mut self, handle: TickHandle) -> Result<(), TickError> {
        self.registry.try_retain(handle)
    }

    fn try_release(&mut self, handle: TickHandle) -> Result<u32, TickError> {
        self.registry.try_release(handle)
    }

    fn add(&mut self, handle: TickHandle) -> bool {
        self.registry.add(handle)
    }

    fn remove(&mut self, handle: TickHandle) -> bool {
        self.registry.remove(handle)
    }

    fn shutdown(&mut self) {
        let released = self.registry.release_autoreleased();
        self.escalator.begin(self.frame);
        log::info!(
            "Shutdown requested at frame {}: released {} autoreleased tickables, {} still alive",
            self.frame,
            released,
            self.registry.entity_count()
        );
        self.publish(TickerEvent::ShutdownRequested { frame: self.frame });
    }

    fn is_quitting(&self) -> bool {
        self.escalator.is_quitting()
    }

    #[cfg(debug_assertions)]
    fn tick_done(&mut self, handle: TickHandle) {
        if let Some(meta) = self.registry.meta_mut(handle) {
            meta.tick_state = match meta.tick_state {
                TickState::PreGame => TickState::PostGame,
                TickState::PreDraw => TickState::PostDraw,
                other => other,
            };
        }
    }

    #[cfg(not(debug_assertions))]
    fn tick_done(&mut self, _handle: TickHandle) {}
}

/// The state handed back and forth between the two passes.
pub(crate) struct FrameState {
    pub(crate) core: TickerCore,
    pub(crate) scenes: SceneList,
    clock: Stopwatch,
    collect_game_side: bool,
    quit_request: Arc<AtomicBool>,
}

impl FrameState {
    pub(crate) fn new(
        config: &TickerConfig,
        events: flume::Sender<TickerEvent>,
        quit_request: Arc<AtomicBool>,
    ) -> Self {
        Self {
            core: TickerCore::new(config, events),
            scenes: SceneList::default(),
            clock: Stopwatch::new(),
            collect_game_side: config.collect_game_side,
            quit_request,
        }
    }

    /// Pacing, shutdown handling, garbage collection, promotion of pending
    /// tickables, then the game-side hooks.
    pub(crate) fn game_pass(&mut self) {
        // Consumed before the frame advances so the quit frame is the one
        // the request was raised during.
        if self.quit_request.swap(false, Ordering::AcqRel) {
            self.core.shutdown();
        }

        self.core.frame += 1;
        let frame = self.core.frame;
        let dt = self.core.pacer.begin_frame(self.clock.lap());
        log::trace!("Game pass {} (dt {:.4}s)", frame, dt);

        if let Some(report) = self
            .core
            .escalator
            .handle_shutdown(frame, &mut self.core.registry)
        {
            if report.poked > 0 {
                self.core.publish(TickerEvent::Poked {
                    frame,
                    poked: report.poked,
                    stuck: report.stuck,
                });
            }
        }

        let destroyed = gc::collect_garbage(&mut self.core.registry, self.collect_game_side);
        if destroyed > 0 {
            self.core.publish(TickerEvent::Destroyed {
                frame,
                count: destroyed,
            });
        }

        self.core.registry.promote_pending(&self.scenes);
        lifecycle::run_game(&mut self.core, dt);
    }

    /// Draw-side hooks, then one render pass per scene over the draw-side
    /// groups. Rendering stops once shutdown has started.
    pub(crate) fn draw_pass(&mut self) {
        let dt = self.core.pacer.deltatime();
        log::trace!("Draw pass {}", self.core.frame);
        lifecycle::run_draw_hooks(&mut self.core);

        for index in 0..self.scenes.len() {
            if self.core.escalator.is_quitting() {
                break;
            }
            let Some(scene) = self.scenes.get_mut(index) else {
                break;
            };

            scene.enable_display();
            scene.pre_render(dt);

            for group in Group::draw() {
                if self.core.escalator.is_quitting() {
                    break;
                }
                if group == Group::FIRST_DRAW {
                    scene.reset();
                }

                let linked = self.core.registry.scene_links(group).segment(index).len();
                for i in 0..linked {
                    if self.core.escalator.is_quitting() {
                        break;
                    }
                    let handle = self.core.registry.scene_links(group).segment(index)[i];
                    if lifecycle::is_tickable(&self.core, handle, Side::Draw) {
                        lifecycle::tick_draw(&mut self.core, handle, dt, scene);
                    }
                }
            }

            scene.render(dt);
            scene.post_render(dt);
            scene.disable_display();
        }
    }

    /// The disk tick run inline when no disk worker exists. There is no disk
    /// work yet.
    pub(crate) fn disk_tick(&mut self) {
        log::trace!("Disk tick {}", self.core.frame);
    }

    /// Computes the pacing wait of the completed cycle.
    pub(crate) fn frame_wait(&mut self) -> Duration {
        let wait = self.core.pacer.frame_wait();
        self.core.publish(TickerEvent::FrameCompleted {
            frame: self.core.frame,
            deltatime: self.core.pacer.deltatime(),
            bias: self.core.pacer.bias(),
        });
        wait
    }

    pub(crate) fn shutdown(&mut self) {
        self.core.shutdown();
    }

    pub(crate) fn snapshot(&self) -> TickerSnapshot {
        let registry = &self.core.registry;
        TickerSnapshot {
            frame: self.core.frame,
            deltatime: self.core.pacer.deltatime(),
            bias: self.core.pacer.bias(),
            entity_count: registry.entity_count(),
            pending_count: registry.pending_count(),
            autorelease_count: registry.autorelease_count(),
            quitting: self.core.escalator.is_quitting(),
            quit_frame: self.core.escalator.quit_frame(),
            quit_delay: self.core.escalator.quit_delay(),
            panic_budget: self.core.escalator.panic_budget(),
        }
    }
}
