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

//! The render-target contract consumed by the draw pass.

use crate::tickable::{TickHandle, Tickable};

/// A render target the draw pass renders into once per frame.
///
/// For every scene, the draw pass calls, in order: `enable_display`,
/// `pre_render`, `reset` (when the first draw group starts), `tick_draw` on
/// each relevant tickable, `render`, `post_render`, `disable_display`.
pub trait Scene: Send {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Binds the scene's display before anything is drawn.
    fn enable_display(&mut self) {}

    /// Unbinds the scene's display once the frame is submitted.
    fn disable_display(&mut self) {}

    /// Called before any tickable draws into the scene.
    fn pre_render(&mut self, _dt: f32) {}

    /// Clears per-frame state when the first draw group starts.
    fn reset(&mut self) {}

    /// Submits everything drawn this frame.
    fn render(&mut self, dt: f32);

    /// Called after the scene was rendered.
    fn post_render(&mut self, _dt: f32) {}

    /// Whether `tickable` draws into this scene.
    ///
    /// Evaluated once, when the tickable is linked into its draw group.
    fn is_relevant(&self, _handle: TickHandle, _tickable: &dyn Tickable) -> bool {
        true
    }
}
