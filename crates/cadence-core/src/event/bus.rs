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

//! A flume-backed broadcast point for engine notifications.

/// A generic, thread-safe event channel.
///
/// Generic over the event type so that the core crate stays independent of
/// the event vocabulary of higher-level crates.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// Creates a bus backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventBus initialized (unbounded).");
        Self { sender, receiver }
    }

    /// Creates a bus holding at most `capacity` undelivered events.
    ///
    /// When the buffer is full, new events are dropped.
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(capacity);
        log::debug!("EventBus initialized (capacity {capacity}).");
        Self { sender, receiver }
    }

    /// Publishes an event without blocking.
    ///
    /// Drops the event if the buffer is full, and logs an error if every
    /// receiver is gone.
    pub fn publish(&self, event: T) {
        publish_on(&self.sender, event);
    }

    /// Returns a clone of the sending end, for producers on other threads.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a clone of the receiving end.
    pub fn receiver(&self) -> flume::Receiver<T> {
        self.receiver.clone()
    }

    /// Drains every event published so far.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

/// Publishes `event` on `sender` with the bus's drop-when-full policy.
pub fn publish_on<T>(sender: &flume::Sender<T>, event: T) {
    match sender.try_send(event) {
        Ok(()) => {}
        Err(flume::TrySendError::Full(_)) => log::trace!("Event buffer full, dropping event."),
        Err(flume::TrySendError::Disconnected(_)) => {
            log::error!("Failed to publish event: receiver disconnected.")
        }
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TickerEvent;
    use flume::TryRecvError;
    use std::{thread, time::Duration};

    #[test]
    fn publish_then_drain_preserves_order() {
        let bus = EventBus::<TickerEvent>::new();
        bus.publish(TickerEvent::ShutdownRequested { frame: 4 });
        bus.publish(TickerEvent::Destroyed { frame: 5, count: 2 });

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                TickerEvent::ShutdownRequested { frame: 4 },
                TickerEvent::Destroyed { frame: 5, count: 2 },
            ]
        );
        assert_eq!(bus.receiver().try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn bounded_bus_drops_when_full() {
        let bus = EventBus::<TickerEvent>::bounded(1);
        bus.publish(TickerEvent::ShutdownRequested { frame: 1 });
        bus.publish(TickerEvent::ShutdownRequested { frame: 2 });
        assert_eq!(bus.drain(), vec![TickerEvent::ShutdownRequested { frame: 1 }]);
    }

    #[test]
    fn send_from_thread() {
        let bus = EventBus::<TickerEvent>::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        let handle = thread::spawn(move || {
            sender
                .send(TickerEvent::ShutdownRequested { frame: 1 })
                .expect("Send from thread failed");
        });

        match receiver.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => assert_eq!(event, TickerEvent::ShutdownRequested { frame: 1 }),
            Err(e) => panic!("Failed to receive event from thread: {e:?}"),
        }
        handle.join().expect("Thread join failed");
    }

    #[test]
    fn send_fails_once_bus_is_dropped() {
        let bus = EventBus::<TickerEvent>::new();
        let sender = bus.sender();
        drop(bus);
        assert!(sender.send(TickerEvent::ShutdownRequested { frame: 0 }).is_err());
    }
}
