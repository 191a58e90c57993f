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

//! The scenes rendered by the draw pass.

use cadence_core::{Scene, TickHandle, Tickable};

/// Maximum number of scenes; relevance is tracked in a `u64` mask.
pub const MAX_SCENES: usize = 64;

/// Ordered collection of render targets owned by the ticker.
#[derive(Default)]
pub struct SceneList {
    scenes: Vec<Box<dyn Scene>>,
}

impl SceneList {
    /// Appends a scene and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if [`MAX_SCENES`] scenes are already registered.
    pub fn add(&mut self, scene: Box<dyn Scene>) -> usize {
        assert!(
            self.scenes.len() < MAX_SCENES,
            "cannot add scene '{}': at most {MAX_SCENES} scenes are supported",
            scene.name()
        );
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Returns `true` if no scene was added.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Scene at `index`.
    pub fn get(&self, index: usize) -> Option<&dyn Scene> {
        self.scenes.get(index).map(|scene| scene.as_ref())
    }

    /// Mutable scene at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Scene + 'static)> {
        self.scenes.get_mut(index).map(|scene| scene.as_mut())
    }

    /// Bit mask of the scenes that consider `tickable` relevant.
    pub fn relevance_mask(&self, handle: TickHandle, tickable: &dyn Tickable) -> u64 {
        self.scenes
            .iter()
            .enumerate()
            .filter(|(_, scene)| scene.is_relevant(handle, tickable))
            .fold(0u64, |mask, (i, _)| mask | (1u64 << i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);
    impl Tickable for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    struct OnlyNamed(&'static str);
    impl Scene for OnlyNamed {
        fn render(&mut self, _dt: f32) {}
        fn is_relevant(&self, _handle: TickHandle, tickable: &dyn Tickable) -> bool {
            tickable.name() == self.0
        }
    }

    #[test]
    fn relevance_mask_has_one_bit_per_scene() {
        let mut scenes = SceneList::default();
        assert_eq!(scenes.add(Box::new(OnlyNamed("hud"))), 0);
        assert_eq!(scenes.add(Box::new(OnlyNamed("world"))), 1);
        assert_eq!(scenes.add(Box::new(OnlyNamed("hud"))), 2);

        let handle = TickHandle {
            index: 0,
            generation: 0,
        };
        assert_eq!(scenes.relevance_mask(handle, &Named("hud")), 0b101);
        assert_eq!(scenes.relevance_mask(handle, &Named("world")), 0b010);
        assert_eq!(scenes.relevance_mask(handle, &Named("none")), 0);
    }

    #[test]
    #[should_panic(expected = "at most 64 scenes")]
    fn rejects_scene_beyond_mask_width() {
        let mut scenes = SceneList::default();
        for _ in 0..=MAX_SCENES {
            scenes.add(Box::new(OnlyNamed("x")));
        }
    }
}
