//! # Event Bus
//!
//! Broadcast plumbing shared by core modules. A module defines its own event
//! enum and publishes it through an [`EventBus`]; hosts subscribe and consume
//! events through an [`EventStream`] or a raw `broadcast::Receiver`.
//!
//! ```text
//! ┌────────────────────┐   emit   ┌───────────┐  subscribe  ┌────────────┐
//! │ PlaybackController ├─────────>│ EventBus  ├────────────>│ UI binding │
//! └────────────────────┘          │ (broadcast│             └────────────┘
//!                                 │  channel) │  subscribe  ┌────────────┐
//!                                 │           ├────────────>│ Notifier   │
//!                                 └───────────┘             └────────────┘
//! ```
//!
//! Delivery is best-effort: publishing with no subscribers is not an error for
//! the publisher, and a subscriber that falls more than `capacity` events
//! behind receives `RecvError::Lagged` and resumes from the oldest retained
//! event.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventStream};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Ping {
//!     Hello(u32),
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut stream = EventStream::new(bus.subscribe());
//!
//! bus.emit(Ping::Hello(1)).ok();
//! assert_eq!(stream.recv().await.unwrap(), Ping::Hello(1));
//! # }
//! ```

use core_async::sync::broadcast::{self, error::SendError, Receiver};
use std::fmt;

pub use core_async::sync::broadcast::error::RecvError;

/// Default number of events retained per subscriber.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

/// Multi-producer, multi-consumer event channel.
///
/// Cloning the bus yields another handle to the same channel.
pub struct EventBus<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> EventBus<E> {
    /// Creates a new event bus retaining at most `capacity` events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; callers validate it through
    /// [`PlaybackSettings::validate`](crate::config::PlaybackSettings::validate).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event, or the event
    /// back if nobody is listening.
    pub fn emit(&self, event: E) -> Result<usize, SendError<E>> {
        self.sender.send(event)
    }

    /// Creates a receiver for every event published from now on.
    ///
    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<E> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.sender.receiver_count())
            .finish()
    }
}

type EventFilter<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream};
///
/// let bus: EventBus<u32> = EventBus::new(8);
/// let evens = EventStream::new(bus.subscribe()).filter(|n| n % 2 == 0);
/// ```
pub struct EventStream<E> {
    receiver: Receiver<E>,
    filter: Option<EventFilter<E>>,
}

impl<E: Clone> EventStream<E> {
    pub fn new(receiver: Receiver<E>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &E) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` once every sender has been dropped.
    pub async fn recv(&mut self) -> Result<E, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<E, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl<E> fmt::Debug for EventStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Started { id: u32 },
        Progress { percent: u8 },
        Stopped,
    }

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus: EventBus<TestEvent> = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        let err = bus.emit(TestEvent::Stopped).unwrap_err();
        assert_eq!(err.0, TestEvent::Stopped);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = TestEvent::Started { id: 7 };
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, TestEvent::Progress { .. }));

        bus.emit(TestEvent::Started { id: 1 }).ok();
        bus.emit(TestEvent::Progress { percent: 40 }).ok();
        bus.emit(TestEvent::Stopped).ok();

        assert_eq!(
            stream.recv().await.unwrap(),
            TestEvent::Progress { percent: 40 }
        );
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for percent in 0..5 {
            bus.emit(TestEvent::Progress { percent }).ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(sub.recv().await.unwrap(), TestEvent::Progress { percent: 3 });
    }

    #[tokio::test]
    async fn test_concurrent_publishers() {
        let bus = EventBus::new(100);
        let mut stream = EventStream::new(bus.subscribe());

        let bus1 = bus.clone();
        let bus2 = bus.clone();

        let handle1 = tokio::spawn(async move {
            for id in 0..10 {
                bus1.emit(TestEvent::Started { id }).ok();
            }
        });
        let handle2 = tokio::spawn(async move {
            for percent in 0..10 {
                bus2.emit(TestEvent::Progress { percent }).ok();
            }
        });

        handle1.await.ok();
        handle2.await.ok();

        let mut count = 0;
        while let Some(Ok(_)) = stream.try_recv() {
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[tokio::test]
    async fn test_closed_after_bus_dropped() {
        let bus: EventBus<TestEvent> = EventBus::default();
        let mut stream = EventStream::new(bus.subscribe());
        drop(bus);

        assert!(matches!(stream.recv().await, Err(RecvError::Closed)));
        assert!(format!("{:?}", stream).contains("has_filter"));
    }
}
