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

//! Drives a ticker with a handful of spinning entities, then shuts it down.
//!
//! Usage: `sandbox [config.json] [frames]`

use anyhow::Context;
use cadence_control::{Ticker, TickerConfig};
use cadence_core::{Group, Scene, TickContext, TickHandle, Tickable};
use cadence_telemetry::{init_logging, FrameStats, LoggingConfig};

const DEFAULT_FRAMES: u64 = 180;
const SPINNERS: usize = 3;

/// Spawns the spinners, keeps the first one alive until it is released, and
/// draws a HUD line.
#[derive(Default)]
struct Spawner {
    owned: Vec<TickHandle>,
}

impl Tickable for Spawner {
    fn name(&self) -> &str {
        "spawner"
    }

    fn game_group(&self) -> Group {
        Group::GameApp
    }

    // Game-only tickables are never collected, so the spawner draws too.
    fn draw_group(&self) -> Option<Group> {
        Some(Group::DrawHud)
    }

    fn init_game(&mut self, ctx: &mut TickContext<'_>) -> bool {
        for i in 0..SPINNERS {
            let handle = ctx.register(Box::new(Spinner::new(i as f32 + 1.0)));
            if i == 0 {
                ctx.retain(handle);
                self.owned.push(handle);
            }
        }
        log::info!("Spawned {} spinners at frame {}.", SPINNERS, ctx.frame());
        true
    }

    fn tick_draw(&mut self, ctx: &mut TickContext<'_>, _dt: f32, scene: &mut dyn Scene) {
        log::trace!("hud: frame {} in {}", ctx.frame(), scene.name());
        ctx.tick_done();
    }

    fn release_game(&mut self, ctx: &mut TickContext<'_>) -> bool {
        for handle in self.owned.drain(..) {
            ctx.release(handle);
        }
        true
    }
}

struct Spinner {
    speed: f32,
    angle: f32,
}

impl Spinner {
    fn new(speed: f32) -> Self {
        Self { speed, angle: 0.0 }
    }
}

impl Tickable for Spinner {
    fn name(&self) -> &str {
        "spinner"
    }

    fn draw_group(&self) -> Option<Group> {
        Some(Group::DrawEntity)
    }

    fn tick_game(&mut self, ctx: &mut TickContext<'_>, dt: f32) {
        self.angle = (self.angle + self.speed * dt) % std::f32::consts::TAU;
        ctx.tick_done();
    }

    fn tick_draw(&mut self, ctx: &mut TickContext<'_>, _dt: f32, scene: &mut dyn Scene) {
        log::trace!("spinner at {:.3} rad in {}", self.angle, scene.name());
        ctx.tick_done();
    }
}

/// A scene that only reports how often it was rendered.
#[derive(Default)]
struct Console {
    renders: u64,
}

impl Scene for Console {
    fn name(&self) -> &str {
        "console"
    }

    fn render(&mut self, dt: f32) {
        self.renders += 1;
        if self.renders % 60 == 0 {
            log::debug!("console: {} renders, dt {:.2}ms", self.renders, dt * 1000.0);
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => TickerConfig::from_file(&path)
            .with_context(|| format!("loading ticker configuration from {path}"))?,
        None => TickerConfig::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("invalid frame count {raw:?}"))?,
        None => DEFAULT_FRAMES,
    };

    let mut ticker = Ticker::new(config).context("starting the ticker")?;
    let mut stats = FrameStats::new(ticker.events(), 60);

    ticker.add_scene(Box::new(Console::default()));
    ticker.register(Box::new(Spawner::default()));

    for _ in 0..frames {
        ticker.present();
        stats.poll();
    }

    ticker.request_shutdown();
    while !ticker.finished() {
        ticker.present();
        stats.poll();
    }
    stats.flush();

    log::info!(
        "All tickables freed after {} frames, shutting down.",
        ticker.frame()
    );
    ticker.teardown();
    Ok(())
}
