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

//! Shared fixtures for the scheduler scenario tests.

#![allow(dead_code)]

use cadence_core::{Group, Scene, TickContext, TickHandle, Tickable};
use std::sync::{Arc, Mutex};

/// A lifecycle hook observed by a [`Probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook {
    InitGame,
    TickGame,
    ReleaseGame,
    InitDraw,
    TickDraw(String),
    ReleaseDraw,
    Render(String),
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub name: &'static str,
    pub hook: Hook,
    pub frame: u64,
    pub thread: Option<String>,
}

/// Records every hook invocation, in order.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Entry>>>);

impl Journal {
    fn record(&self, name: &'static str, hook: Hook, frame: u64) {
        let thread = std::thread::current().name().map(str::to_owned);
        self.0.lock().unwrap().push(Entry {
            name,
            hook,
            frame,
            thread,
        });
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str, hook: &Hook) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.name == name && &e.hook == hook)
            .count()
    }

    /// Frames in which `name` ran `hook`.
    pub fn frames(&self, name: &str, hook: &Hook) -> Vec<u64> {
        self.entries()
            .iter()
            .filter(|e| e.name == name && &e.hook == hook)
            .map(|e| e.frame)
            .collect()
    }
}

/// A tickable whose init and release hooks succeed after a configurable
/// number of attempts.
pub struct Probe {
    name: &'static str,
    journal: Journal,
    game_group: Group,
    draw_group: Option<Group>,
    init_after: u32,
    release_after: u32,
    init_attempts: [u32; 2],
    release_attempts: [u32; 2],
}

impl Probe {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            game_group: Group::GameEntity,
            draw_group: None,
            init_after: 1,
            release_after: 1,
            init_attempts: [0; 2],
            release_attempts: [0; 2],
        }
    }

    pub fn in_group(mut self, group: Group) -> Self {
        self.game_group = group;
        self
    }

    pub fn drawn_in(mut self, group: Group) -> Self {
        self.draw_group = Some(group);
        self
    }

    pub fn init_after(mut self, attempts: u32) -> Self {
        self.init_after = attempts;
        self
    }

    pub fn release_after(mut self, attempts: u32) -> Self {
        self.release_after = attempts;
        self
    }

    pub fn boxed(self) -> Box<dyn Tickable> {
        Box::new(self)
    }

    fn attempt(counter: &mut u32, needed: u32) -> bool {
        *counter += 1;
        *counter >= needed
    }
}

impl Tickable for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn game_group(&self) -> Group {
        self.game_group
    }

    fn draw_group(&self) -> Option<Group> {
        self.draw_group
    }

    fn init_game(&mut self, ctx: &mut TickContext<'_>) -> bool {
        self.journal.record(self.name, Hook::InitGame, ctx.frame());
        Self::attempt(&mut self.init_attempts[0], self.init_after)
    }

    fn tick_game(&mut self, ctx: &mut TickContext<'_>, _dt: f32) {
        self.journal.record(self.name, Hook::TickGame, ctx.frame());
        ctx.tick_done();
    }

    fn release_game(&mut self, ctx: &mut TickContext<'_>) -> bool {
        self.journal.record(self.name, Hook::ReleaseGame, ctx.frame());
        Self::attempt(&mut self.release_attempts[0], self.release_after)
    }

    fn init_draw(&mut self, ctx: &mut TickContext<'_>) -> bool {
        self.journal.record(self.name, Hook::InitDraw, ctx.frame());
        Self::attempt(&mut self.init_attempts[1], self.init_after)
    }

    fn tick_draw(&mut self, ctx: &mut TickContext<'_>, _dt: f32, scene: &mut dyn Scene) {
        let hook = Hook::TickDraw(scene.name().to_owned());
        self.journal.record(self.name, hook, ctx.frame());
        ctx.tick_done();
    }

    fn release_draw(&mut self, ctx: &mut TickContext<'_>) -> bool {
        self.journal.record(self.name, Hook::ReleaseDraw, ctx.frame());
        Self::attempt(&mut self.release_attempts[1], self.release_after)
    }
}

/// A scene that records its render calls and accepts a fixed set of names.
pub struct TestScene {
    name: String,
    journal: Journal,
    accepts: Option<Vec<&'static str>>,
    frame: u64,
}

impl TestScene {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_owned(),
            journal: journal.clone(),
            accepts: None,
            frame: 0,
        }
    }

    pub fn accepting(mut self, names: &[&'static str]) -> Self {
        self.accepts = Some(names.to_vec());
        self
    }

    pub fn boxed(self) -> Box<dyn Scene> {
        Box::new(self)
    }
}

impl Scene for TestScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn pre_render(&mut self, _dt: f32) {
        self.frame += 1;
    }

    fn render(&mut self, _dt: f32) {
        self.journal
            .record("scene", Hook::Render(self.name.clone()), self.frame);
    }

    fn is_relevant(&self, _handle: TickHandle, tickable: &dyn Tickable) -> bool {
        match &self.accepts {
            Some(names) => names.iter().any(|name| *name == tickable.name()),
            None => true,
        }
    }
}
