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

mod common;

use cadence_control::{Ticker, TickerConfig};
use cadence_core::{Group, TickError, TickFlags, TickHandle};
use common::{Journal, Probe};

fn ticker() -> Ticker {
    Ticker::new(TickerConfig::single_threaded(0.0)).expect("valid config")
}

fn run(ticker: &mut Ticker, frames: usize) {
    for _ in 0..frames {
        ticker.present();
    }
}

#[test]
#[should_panic(expected = "release: tickable #0v0 is autoreleased and was never retained")]
fn releasing_an_autoreleased_tickable_is_fatal() {
    let journal = Journal::default();
    let mut ticker = ticker();
    let handle = ticker.register(Probe::new("auto", &journal).boxed());
    ticker.release(handle);
}

#[test]
#[should_panic(expected = "has a zero reference count")]
fn double_release_is_fatal() {
    let journal = Journal::default();
    let mut ticker = ticker();
    let handle = ticker.register(Probe::new("once", &journal).boxed());
    ticker.retain(handle);
    assert_eq!(ticker.release(handle), 0);
    ticker.release(handle);
}

#[test]
#[should_panic(expected = "retain: invalid tickable handle #7v2")]
fn retaining_an_unknown_handle_is_fatal() {
    let mut ticker = ticker();
    ticker.retain(TickHandle {
        index: 7,
        generation: 2,
    });
}

#[test]
#[should_panic(expected = "is being destroyed")]
fn retaining_a_destroying_tickable_is_fatal() {
    // --- 1. ARRANGE ---
    let journal = Journal::default();
    let mut ticker = ticker();
    let handle = ticker.register(
        Probe::new("doomed", &journal)
            .drawn_in(Group::DrawEntity)
            .release_after(100)
            .boxed(),
    );
    ticker.retain(handle);
    run(&mut ticker, 2);
    ticker.release(handle);
    run(&mut ticker, 1);
    assert!(ticker
        .registry()
        .unwrap()
        .flags(handle)
        .unwrap()
        .contains(TickFlags::DESTROYING));

    // --- 2. ACT ---
    ticker.retain(handle);
}

#[test]
fn reference_count_never_goes_negative() {
    let journal = Journal::default();
    let mut ticker = ticker();
    let handle = ticker.register(Probe::new("counted", &journal).boxed());

    // Ownership transfer, then two extra references.
    for _ in 0..3 {
        ticker.try_retain(handle).unwrap();
    }
    assert_eq!(ticker.registry().unwrap().ref_count(handle), Some(3));

    let counts: Vec<_> = (0..3).map(|_| ticker.try_release(handle).unwrap()).collect();
    assert_eq!(counts, vec![2, 1, 0]);

    for _ in 0..3 {
        assert_eq!(ticker.try_release(handle), Err(TickError::ZeroRefCount(handle)));
    }
    assert_eq!(ticker.registry().unwrap().ref_count(handle), Some(0));
}

#[test]
fn freed_handles_do_not_resolve_to_recycled_slots() {
    // --- 1. ARRANGE ---
    let journal = Journal::default();
    let mut ticker = ticker();
    let old = ticker.register(Probe::new("old", &journal).drawn_in(Group::DrawApp).boxed());
    ticker.retain(old);
    run(&mut ticker, 2);
    ticker.release(old);
    run(&mut ticker, 2);
    assert!(!ticker.registry().unwrap().is_alive(old));

    // --- 2. ACT ---
    let new = ticker.register(Probe::new("new", &journal).boxed());

    // --- 3. ASSERT ---
    assert_eq!(new.index, old.index);
    assert_ne!(new, old);
    assert_eq!(ticker.try_retain(old), Err(TickError::InvalidHandle(old)));
    assert!(ticker.try_retain(new).is_ok());
}

#[test]
fn shutdown_releases_every_autoreleased_tickable() {
    // --- 1. ARRANGE ---
    let journal = Journal::default();
    let mut ticker = ticker();
    run(&mut ticker, 3);
    let handles: Vec<_> = (0..5)
        .map(|_| ticker.register(Probe::new("pending", &journal).boxed()))
        .collect();
    assert_eq!(ticker.snapshot().autorelease_count, 5);

    // --- 2. ACT ---
    ticker.request_shutdown();

    // --- 3. ASSERT ---
    let snapshot = ticker.snapshot();
    assert_eq!(snapshot.autorelease_count, 0);
    assert!(snapshot.quitting);
    assert_eq!(snapshot.quit_frame, 3);

    let registry = ticker.registry().unwrap();
    for handle in handles {
        assert_eq!(registry.ref_count(handle), Some(0));
        assert!(!registry.flags(handle).unwrap().contains(TickFlags::AUTORELEASE));
    }
}

#[test]
fn live_set_is_independent_of_reference_counts() {
    let journal = Journal::default();
    let mut ticker = ticker();
    let handle = ticker.register(Probe::new("live", &journal).boxed());

    assert!(ticker.add(handle));
    assert!(!ticker.add(handle));
    assert_eq!(ticker.registry().unwrap().ref_count(handle), Some(1));
    assert!(ticker.remove(handle));
    assert!(!ticker.remove(handle));
}
