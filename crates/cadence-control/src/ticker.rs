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

//! The ticker: the scheduler context object owned by the application.

use crate::config::TickerConfig;
use crate::coordinator::{Coordinator, HandshakeState};
use crate::error::SetupError;
use crate::registry::TickableRegistry;
use crate::scenes::SceneList;
use crate::state::FrameState;
use cadence_core::event::{EventBus, TickerEvent};
use cadence_core::{Scene, TickError, TickHandle, Tickable, TickerAccess};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Scheduler counters, as of the last time the driver held the frame state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickerSnapshot {
    /// Number of game passes run so far.
    pub frame: u64,
    /// Deltatime of the last game pass, in seconds.
    pub deltatime: f32,
    /// Accumulated pacing drift, in seconds.
    pub bias: f32,
    /// Tickables registered and not yet freed.
    pub entity_count: usize,
    /// Tickables waiting to join their groups.
    pub pending_count: usize,
    /// Tickables still owned by the autorelease set.
    pub autorelease_count: usize,
    /// Whether shutdown has started.
    pub quitting: bool,
    /// Frame at which shutdown started.
    pub quit_frame: u64,
    /// Frames until the next escalation attempt window.
    pub quit_delay: u32,
    /// Poke budget of the last escalation attempt.
    pub panic_budget: u32,
}

/// Drives the game and draw passes of every registered tickable.
///
/// In multithreaded mode the game pass of the next frame runs on a worker
/// while the driver waits out the current frame. Driver-side operations that
/// touch the tickables (`register`, `retain`, `add_scene`, ...) are only
/// available while the driver holds the frame state: before the first
/// [`present`](Self::present), whenever the ticker is idle with no tickable
/// left, and always in single-threaded mode. Tickables themselves use their
/// [`TickContext`](cadence_core::TickContext) instead.
pub struct Ticker {
    config: TickerConfig,
    state: Option<Box<FrameState>>,
    coordinator: Option<Coordinator>,
    quit_request: Arc<AtomicBool>,
    events: EventBus<TickerEvent>,
    snapshot: TickerSnapshot,
}

impl Ticker {
    /// Sets up a ticker, spawning its workers when multithreading is enabled
    /// and available.
    pub fn new(config: TickerConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let events = EventBus::bounded(config.event_buffer.max(1));
        let quit_request = Arc::new(AtomicBool::new(false));
        let state = Box::new(FrameState::new(
            &config,
            events.sender(),
            Arc::clone(&quit_request),
        ));

        let coordinator = if config.multithreaded && threads_available() {
            Some(Coordinator::spawn()?)
        } else {
            None
        };

        log::info!(
            "Ticker set up at {} fps ({}).",
            config.fps,
            if coordinator.is_some() {
                "multithreaded"
            } else {
                "single-threaded"
            }
        );

        let snapshot = state.snapshot();
        Ok(Self {
            config,
            state: Some(state),
            coordinator,
            quit_request,
            events,
            snapshot,
        })
    }

    /// Configuration the ticker was set up with.
    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Returns `true` if the game pass runs on its own worker.
    pub fn is_multithreaded(&self) -> bool {
        self.coordinator.is_some()
    }

    /// Returns `true` if the driver currently holds the frame state.
    ///
    /// Multithreaded, the game worker keeps the state between two `present`
    /// calls while tickables are alive, and the driver-side operations panic.
    pub fn holds_state(&self) -> bool {
        self.state.is_some()
    }

    fn held(&mut self, operation: &str) -> &mut FrameState {
        match self.state.as_deref_mut() {
            Some(state) => state,
            None => panic!(
                "{operation}: the frame state is held by the game worker; \
                 call it from a tickable hook instead"
            ),
        }
    }

    /// Registers an autoreleased tickable.
    ///
    /// It joins its groups two game passes later.
    ///
    /// # Panics
    ///
    /// Panics if the game worker holds the frame state; see
    /// [`holds_state`](Self::holds_state).
    pub fn register(&mut self, tickable: Box<dyn Tickable>) -> TickHandle {
        self.held("register").core.register(tickable)
    }

    /// Takes one reference on `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is invalid or the tickable is being destroyed,
    /// or if the game worker holds the frame state.
    pub fn retain(&mut self, handle: TickHandle) {
        if let Err(e) = self.try_retain(handle) {
            panic!("retain: {e}");
        }
    }

    /// Drops one reference on `handle` and returns the new count.
    ///
    /// # Panics
    ///
    /// Panics if the handle is invalid, the count is already zero, the
    /// tickable is still autoreleased, or the game worker holds the frame
    /// state.
    pub fn release(&mut self, handle: TickHandle) -> u32 {
        match self.try_release(handle) {
            Ok(count) => count,
            Err(e) => panic!("release: {e}"),
        }
    }

    /// Checked variant of [`retain`](Self::retain).
    ///
    /// # Panics
    ///
    /// Panics if the game worker holds the frame state; see
    /// [`holds_state`](Self::holds_state).
    pub fn try_retain(&mut self, handle: TickHandle) -> Result<(), TickError> {
        self.held("retain").core.try_retain(handle)
    }

    /// Checked variant of [`release`](Self::release).
    ///
    /// # Panics
    ///
    /// Panics if the game worker holds the frame state; see
    /// [`holds_state`](Self::holds_state).
    pub fn try_release(&mut self, handle: TickHandle) -> Result<u32, TickError> {
        self.held("release").core.try_release(handle)
    }

    /// Inserts `handle` into the live set.
    ///
    /// # Panics
    ///
    /// Panics if the game worker holds the frame state; see
    /// [`holds_state`](Self::holds_state).
    pub fn add(&mut self, handle: TickHandle) -> bool {
        self.held("add").core.add(handle)
    }

    /// Removes `handle` from the live set.
    ///
    /// # Panics
    ///
    /// Panics if the game worker holds the frame state; see
    /// [`holds_state`](Self::holds_state).
    pub fn remove(&mut self, handle: TickHandle) -> bool {
        self.held("remove").core.remove(handle)
    }

    /// Adds a render target and returns its index.
    ///
    /// Tickables already linked into their draw groups are not linked into
    /// scenes added afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the game worker holds the frame state; see
    /// [`holds_state`](Self::holds_state).
    pub fn add_scene(&mut self, scene: Box<dyn Scene>) -> usize {
        let index = self.held("add_scene").scenes.add(scene);
        log::debug!("Scene {} added.", index);
        index
    }

    /// Enters a recording section: deltatime becomes a fixed step and the
    /// pacing drift is frozen.
    pub fn push_recording(&mut self) {
        self.held("push_recording").core.pacer.push_recording();
    }

    /// Leaves a recording section.
    ///
    /// # Panics
    ///
    /// Panics if no recording section is open.
    pub fn pop_recording(&mut self) {
        self.held("pop_recording").core.pacer.pop_recording();
    }

    /// Starts the shutdown sequence.
    ///
    /// Runs at once if the driver holds the frame state, otherwise at the
    /// start of the next game pass.
    pub fn request_shutdown(&mut self) {
        match self.state.as_deref_mut() {
            Some(state) => state.shutdown(),
            None => self.quit_request.store(true, Ordering::Release),
        }
    }

    /// Runs one full update/draw cycle, then waits out the rest of the frame.
    ///
    /// Single-threaded, the game pass runs inline. Multithreaded, the call
    /// blocks until the game worker hands over the draw turn, draws, then
    /// lets the worker start the next game pass before waiting.
    pub fn present(&mut self) {
        let wait = match self.coordinator.as_mut() {
            None => {
                let Some(state) = self.state.as_deref_mut() else {
                    return;
                };
                state.game_pass();
                state.draw_pass();
                state.disk_tick();
                let wait = state.frame_wait();
                self.snapshot = state.snapshot();
                wait
            }
            Some(coordinator) => {
                if coordinator.is_terminated() {
                    return;
                }
                if let Some(state) = self.state.take() {
                    coordinator.hand_over(state);
                }
                let Some(mut state) = coordinator.await_permit() else {
                    return;
                };

                state.draw_pass();
                let wait = state.frame_wait();
                self.snapshot = state.snapshot();

                // With nothing left to tick, keep the state so the ticker
                // can be inspected or torn down.
                if self.snapshot.entity_count == 0 {
                    self.state = Some(state);
                } else {
                    coordinator.resume(state);
                }
                wait
            }
        };

        if wait > Duration::ZERO {
            std::thread::sleep(wait);
        }
    }

    /// Current counters; live when the driver holds the frame state.
    pub fn snapshot(&self) -> TickerSnapshot {
        self.state
            .as_ref()
            .map_or(self.snapshot, |state| state.snapshot())
    }

    /// Number of game passes run so far.
    pub fn frame(&self) -> u64 {
        self.snapshot().frame
    }

    /// Deltatime of the last game pass, in seconds.
    pub fn deltatime(&self) -> f32 {
        self.snapshot().deltatime
    }

    /// Accumulated pacing drift, in seconds.
    pub fn bias(&self) -> f32 {
        self.snapshot().bias
    }

    /// Tickables registered and not yet freed.
    pub fn entity_count(&self) -> usize {
        self.snapshot().entity_count
    }

    /// Returns `true` once every tickable was freed.
    pub fn finished(&self) -> bool {
        self.entity_count() == 0
    }

    /// Returns `true` once shutdown has started.
    pub fn is_quitting(&self) -> bool {
        self.snapshot().quitting
    }

    /// The registry, while the driver holds the frame state.
    pub fn registry(&self) -> Option<&TickableRegistry> {
        self.state.as_ref().map(|state| &state.core.registry)
    }

    /// The scenes, while the driver holds the frame state.
    pub fn scenes(&self) -> Option<&SceneList> {
        self.state.as_ref().map(|state| &state.scenes)
    }

    /// Receiver of the events published by the ticker.
    pub fn events(&self) -> flume::Receiver<TickerEvent> {
        self.events.receiver()
    }

    /// Where the game/draw handshake stands. Always `Idle` single-threaded.
    pub fn handshake_state(&self) -> HandshakeState {
        self.coordinator
            .as_ref()
            .map_or(HandshakeState::Idle, |coordinator| coordinator.handshake_state())
    }

    /// Stops the workers and destroys the ticker.
    ///
    /// # Panics
    ///
    /// Panics if tickables are still alive or a draw turn is still owed.
    pub fn teardown(mut self) {
        let mut owed_turn = false;
        if let Some(mut coordinator) = self.coordinator.take() {
            if let Some(state) = coordinator.terminate() {
                owed_turn = true;
                self.state = Some(state);
            }
        }

        let snapshot = self.snapshot();
        if snapshot.entity_count != 0 {
            log::error!(
                "Teardown with {} tickables still alive at frame {}",
                snapshot.entity_count,
                snapshot.frame
            );
        }
        assert_eq!(
            snapshot.entity_count, 0,
            "still {} tickables in ticker",
            snapshot.entity_count
        );
        assert!(!owed_turn, "a draw turn was still owed at teardown");

        log::info!(
            "Ticker torn down after {} frames ({} frames required to quit).",
            snapshot.frame,
            snapshot.frame.saturating_sub(snapshot.quit_frame)
        );
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(mut coordinator) = self.coordinator.take() {
            if !coordinator.is_terminated() {
                log::warn!("Ticker dropped without teardown, stopping its workers.");
                let _ = coordinator.terminate();
            }
        }
    }
}

fn threads_available() -> bool {
    !cfg!(target_family = "wasm")
}
