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

//! The game/draw handshake.
//!
//! The game pass runs on a dedicated worker, the draw pass on the driving
//! thread. The frame state itself is the token passed through the handshake
//! queues, so only the pass holding it can touch the tickable lists.

use crate::error::SetupError;
use crate::state::FrameState;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Where the handshake currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HandshakeState {
    /// No pass has run yet.
    Idle = 0,
    /// The game worker is running a game pass.
    RunningGame = 1,
    /// The game pass is done and the draw permit is on its way.
    SignaledDraw = 2,
    /// The driver is running a draw pass.
    RunningDraw = 3,
    /// The draw pass is done and the game worker was resumed.
    SignaledGame = 4,
    /// The workers were told to stop.
    Terminated = 5,
}

impl HandshakeState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::RunningGame,
            2 => Self::SignaledDraw,
            3 => Self::RunningDraw,
            4 => Self::SignaledGame,
            5 => Self::Terminated,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SharedState(Arc<AtomicU8>);

impl SharedState {
    fn get(&self) -> HandshakeState {
        HandshakeState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: HandshakeState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// A handshake token: either the frame state or the termination sentinel.
pub(crate) enum Turn {
    Run(Box<FrameState>),
    Stop,
}

/// Owns the game and disk workers and the three handshake queues.
pub(crate) struct Coordinator {
    resume_tx: Sender<Turn>,
    permit_rx: Receiver<Turn>,
    /// Used once, to hand the first draw turn to the driver.
    seed_tx: Option<Sender<Turn>>,
    disk_tx: Sender<()>,
    game_worker: Option<JoinHandle<()>>,
    disk_worker: Option<JoinHandle<()>>,
    state: SharedState,
}

impl Coordinator {
    /// Spawns the game and disk workers.
    pub(crate) fn spawn() -> Result<Self, SetupError> {
        let (resume_tx, resume_rx) = crossbeam_channel::bounded::<Turn>(1);
        let (permit_tx, permit_rx) = crossbeam_channel::bounded::<Turn>(1);
        let (disk_tx, disk_rx) = crossbeam_channel::bounded::<()>(1);
        let state = SharedState::default();

        let seed_tx = permit_tx.clone();
        let worker_state = state.clone();
        let game_worker = thread::Builder::new()
            .name("cadence-game".to_string())
            .spawn(move || game_loop(&resume_rx, &permit_tx, &worker_state))
            .map_err(|source| SetupError::Spawn {
                worker: "game",
                source,
            })?;

        let disk_worker = thread::Builder::new()
            .name("cadence-disk".to_string())
            .spawn(move || {
                log::debug!("Disk worker started.");
                let _ = disk_rx.recv();
                log::debug!("Disk worker terminated.");
            })
            .map_err(|source| SetupError::Spawn {
                worker: "disk",
                source,
            })?;

        log::info!("Ticker workers spawned.");
        Ok(Self {
            resume_tx,
            permit_rx,
            seed_tx: Some(seed_tx),
            disk_tx,
            game_worker: Some(game_worker),
            disk_worker: Some(disk_worker),
            state,
        })
    }

    /// Gives up the driver's hold on `state`.
    ///
    /// The first time, the state is pushed as the initial draw permit so the
    /// driver draws once before any game pass runs. Afterwards the game
    /// worker is resumed.
    pub(crate) fn hand_over(&mut self, state: Box<FrameState>) {
        match self.seed_tx.take() {
            Some(seed_tx) => {
                self.state.set(HandshakeState::SignaledDraw);
                // `permit_rx` lives as long as `self`, so this cannot fail.
                let _ = seed_tx.send(Turn::Run(state));
            }
            None => self.resume(state),
        }
    }

    /// Lets the game worker run the next game pass on `state`.
    pub(crate) fn resume(&mut self, state: Box<FrameState>) {
        self.state.set(HandshakeState::SignaledGame);
        if self.resume_tx.send(Turn::Run(state)).is_err() {
            self.game_worker_died();
        }
    }

    /// Blocks until the game worker hands over the draw turn.
    ///
    /// Returns `None` if the worker terminated.
    pub(crate) fn await_permit(&mut self) -> Option<Box<FrameState>> {
        match self.permit_rx.recv() {
            Ok(Turn::Run(state)) => {
                self.state.set(HandshakeState::RunningDraw);
                Some(state)
            }
            Ok(Turn::Stop) => None,
            Err(_) => self.game_worker_died(),
        }
    }

    /// Current handshake state.
    pub(crate) fn handshake_state(&self) -> HandshakeState {
        self.state.get()
    }

    /// Stops both workers and waits for them.
    ///
    /// Returns the frame state if a draw turn was still owed.
    pub(crate) fn terminate(&mut self) -> Option<Box<FrameState>> {
        self.state.set(HandshakeState::Terminated);
        self.seed_tx = None;
        let _ = self.resume_tx.send(Turn::Stop);
        let _ = self.disk_tx.send(());

        let mut owed = None;
        loop {
            match self.permit_rx.recv() {
                Ok(Turn::Run(state)) => owed = Some(state),
                Ok(Turn::Stop) | Err(_) => break,
            }
        }

        if let Some(worker) = self.game_worker.take() {
            if worker.join().is_err() {
                log::error!("Game worker panicked before termination.");
            }
        }
        if let Some(worker) = self.disk_worker.take() {
            if worker.join().is_err() {
                log::error!("Disk worker panicked before termination.");
            }
        }
        log::debug!("Ticker workers joined.");
        owed
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.game_worker.is_none()
    }

    /// Re-raises the panic of a game worker that hung up mid-handshake.
    fn game_worker_died(&mut self) -> ! {
        self.state.set(HandshakeState::Terminated);
        if let Some(worker) = self.game_worker.take() {
            if let Err(payload) = worker.join() {
                std::panic::resume_unwind(payload);
            }
        }
        panic!("game worker exited in the middle of the handshake");
    }
}

fn game_loop(resume_rx: &Receiver<Turn>, permit_tx: &Sender<Turn>, state: &SharedState) {
    log::debug!("Game worker started.");
    loop {
        match resume_rx.recv() {
            Ok(Turn::Run(mut frame)) => {
                state.set(HandshakeState::RunningGame);
                frame.game_pass();
                state.set(HandshakeState::SignaledDraw);
                if permit_tx.send(Turn::Run(frame)).is_err() {
                    break;
                }
            }
            Ok(Turn::Stop) | Err(_) => break,
        }
    }
    let _ = permit_tx.send(Turn::Stop);
    log::debug!("Game worker terminated.");
}
