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

//! The tickable contract: per-frame units of work driven by the ticker.

mod flags;
mod group;
mod handle;

pub use flags::{TickFlags, TickState};
pub use group::Group;
pub use handle::TickHandle;

use crate::error::TickError;
use crate::scene::Scene;

/// A polymorphic unit of per-frame work.
///
/// Each side (game and draw) runs its own `init → tick → release` sequence,
/// independently of the other side:
/// - `init_*` is retried every frame until it returns `true`,
/// - `tick_*` runs every frame once initialized, until destruction starts,
/// - `release_*` is retried every frame once destruction started, until it
///   returns `true`.
///
/// The tickable whose hook is running is temporarily detached from the
/// scheduler, so hooks may freely use the [`TickContext`] to register, retain
/// or release other tickables, including themselves.
pub trait Tickable: Send {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The game-side group this tickable is processed in.
    ///
    /// Read once, when the tickable leaves the pending queue.
    fn game_group(&self) -> Group {
        Group::GameEntity
    }

    /// The draw-side group this tickable is drawn in, if any.
    ///
    /// Read once, when the tickable leaves the pending queue.
    fn draw_group(&self) -> Option<Group> {
        None
    }

    /// Game-side initialization. Return `true` once fully initialized.
    fn init_game(&mut self, _ctx: &mut TickContext<'_>) -> bool {
        true
    }

    /// Per-frame game logic.
    ///
    /// Overrides must call [`TickContext::tick_done`] before returning, the
    /// way the default body does. Debug builds abort on a tick that did not.
    fn tick_game(&mut self, ctx: &mut TickContext<'_>, _dt: f32) {
        ctx.tick_done();
    }

    /// Game-side cleanup. Return `true` once cleanup is complete.
    fn release_game(&mut self, _ctx: &mut TickContext<'_>) -> bool {
        true
    }

    /// Draw-side initialization. Return `true` once fully initialized.
    fn init_draw(&mut self, _ctx: &mut TickContext<'_>) -> bool {
        true
    }

    /// Per-frame drawing into `scene`, called once per scene that considers
    /// this tickable relevant.
    ///
    /// Same contract as [`tick_game`](Self::tick_game): overrides end with
    /// [`TickContext::tick_done`].
    fn tick_draw(&mut self, ctx: &mut TickContext<'_>, _dt: f32, _scene: &mut dyn Scene) {
        ctx.tick_done();
    }

    /// Draw-side cleanup. Return `true` once cleanup is complete.
    fn release_draw(&mut self, _ctx: &mut TickContext<'_>) -> bool {
        true
    }
}

/// Scheduler operations reachable from inside a hook.
///
/// Implemented by the ticker's frame state. Kept as a trait so that this
/// crate stays independent of the scheduler implementation.
pub trait TickerAccess {
    /// Registers a new autoreleased tickable and returns its handle.
    fn register(&mut self, tickable: Box<dyn Tickable>) -> TickHandle;

    /// Takes one reference on `handle`.
    fn try_retain(&mut self, handle: TickHandle) -> Result<(), TickError>;

    /// Drops one reference on `handle`, returning the new count.
    fn try_release(&mut self, handle: TickHandle) -> Result<u32, TickError>;

    /// Inserts `handle` into the live set. Returns `false` if already present.
    fn add(&mut self, handle: TickHandle) -> bool;

    /// Removes `handle` from the live set. Returns `false` if absent.
    fn remove(&mut self, handle: TickHandle) -> bool;

    /// Starts the shutdown sequence.
    fn shutdown(&mut self);

    /// Returns `true` once shutdown has started.
    fn is_quitting(&self) -> bool;

    /// Records that the scheduler step of the running tick hook of `handle`
    /// was executed.
    fn tick_done(&mut self, handle: TickHandle);
}

/// Per-invocation context handed to every hook.
pub struct TickContext<'a> {
    handle: TickHandle,
    frame: u64,
    deltatime: f32,
    ticker: &'a mut dyn TickerAccess,
}

impl<'a> TickContext<'a> {
    /// Creates a context for the hook of `handle` during `frame`.
    pub fn new(
        handle: TickHandle,
        frame: u64,
        deltatime: f32,
        ticker: &'a mut dyn TickerAccess,
    ) -> Self {
        Self {
            handle,
            frame,
            deltatime,
            ticker,
        }
    }

    /// Handle of the tickable whose hook is running.
    pub fn handle(&self) -> TickHandle {
        self.handle
    }

    /// Current frame number.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Deltatime computed for the current frame, in seconds.
    pub fn deltatime(&self) -> f32 {
        self.deltatime
    }

    /// Registers a new tickable. It is processed starting two frames later.
    pub fn register(&mut self, tickable: Box<dyn Tickable>) -> TickHandle {
        self.ticker.register(tickable)
    }

    /// Takes one reference on `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is invalid or the tickable is being destroyed.
    pub fn retain(&mut self, handle: TickHandle) {
        if let Err(e) = self.ticker.try_retain(handle) {
            panic!("retain: {e}");
        }
    }

    /// Drops one reference on `handle`, returning the new count.
    ///
    /// # Panics
    ///
    /// Panics if the handle is invalid, the count is already zero, or the
    /// tickable was never retained.
    pub fn release(&mut self, handle: TickHandle) -> u32 {
        match self.ticker.try_release(handle) {
            Ok(count) => count,
            Err(e) => panic!("release: {e}"),
        }
    }

    /// Checked variant of [`retain`](Self::retain).
    pub fn try_retain(&mut self, handle: TickHandle) -> Result<(), TickError> {
        self.ticker.try_retain(handle)
    }

    /// Checked variant of [`release`](Self::release).
    pub fn try_release(&mut self, handle: TickHandle) -> Result<u32, TickError> {
        self.ticker.try_release(handle)
    }

    /// Inserts `handle` into the live set.
    pub fn add(&mut self, handle: TickHandle) -> bool {
        self.ticker.add(handle)
    }

    /// Removes `handle` from the live set.
    pub fn remove(&mut self, handle: TickHandle) -> bool {
        self.ticker.remove(handle)
    }

    /// Starts the shutdown sequence.
    pub fn shutdown(&mut self) {
        self.ticker.shutdown();
    }

    /// Returns `true` once shutdown has started.
    pub fn is_quitting(&self) -> bool {
        self.ticker.is_quitting()
    }

    /// The scheduler step every `tick_game` / `tick_draw` ends with.
    ///
    /// Outside a tick hook this does nothing.
    pub fn tick_done(&mut self) {
        self.ticker.tick_done(self.handle);
    }
}
