//! Blocking event channels
//!
//! Dispatch in this workspace is synchronous, so a consumer that wants to
//! handle events on its own thread (a UI loop, a test harness) forwards them
//! into an `EventChannel` from inside its listener and drains them through
//! an `EventIterator`:
//! - Blocking: `recv()`, `for event in iter`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`, `timeout_iter()`

use std::fmt;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{DispatchError, Result};

/// Multi-producer channel whose receiving side can be shared
///
/// Cloning the channel clones both ends; every clone drains the same queue.
pub struct EventChannel<E> {
    tx: mpsc::Sender<E>,
    rx: Arc<Mutex<mpsc::Receiver<E>>>,
}

impl<E> EventChannel<E> {
    /// Create a new empty channel
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Push an event into the channel
    pub fn send(&self, event: E) -> Result<()> {
        self.tx.send(event).map_err(|_| DispatchError::ChannelClosed)
    }

    /// A detached sending handle
    pub fn sender(&self) -> EventSender<E> {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// An iterator over the events queued in this channel
    pub fn iter(&self) -> EventIterator<E> {
        EventIterator::new(Arc::clone(&self.rx))
    }

    /// Drain everything currently queued without blocking
    pub fn drain(&self) -> Vec<E> {
        self.iter().try_iter().collect()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel").finish_non_exhaustive()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: Arc::clone(&self.rx),
        }
    }
}

/// Sending half of an `EventChannel`
pub struct EventSender<E> {
    tx: mpsc::Sender<E>,
}

impl<E> EventSender<E> {
    /// Push an event, failing if every receiver has been dropped
    pub fn send(&self, event: E) -> Result<()> {
        self.tx.send(event).map_err(|_| DispatchError::ChannelClosed)
    }
}

impl<E> Clone for EventSender<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Blocking iterator over queued events
///
/// All methods are synchronous - no async/await required.
///
/// # Example
///
/// ```rust,ignore
/// // Blocking iteration
/// for event in channel.iter() {
///     println!("{:?}", event);
/// }
///
/// // Non-blocking check
/// for event in channel.iter().try_iter() {
///     println!("{:?}", event);
/// }
/// ```
pub struct EventIterator<E> {
    rx: Arc<Mutex<mpsc::Receiver<E>>>,
}

impl<E> EventIterator<E> {
    pub(crate) fn new(rx: Arc<Mutex<mpsc::Receiver<E>>>) -> Self {
        Self { rx }
    }

    /// Block until the next event is available
    ///
    /// Returns `None` if the channel is closed.
    pub fn recv(&self) -> Option<E> {
        self.rx.lock().recv().ok()
    }

    /// Block until the next event or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<E> {
        self.rx.lock().recv_timeout(timeout).ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<E> {
        self.rx.lock().try_recv().ok()
    }

    /// Non-blocking iterator over currently queued events
    pub fn try_iter(&self) -> TryIter<'_, E> {
        TryIter { inner: self }
    }

    /// Iterator that blocks for up to `timeout` per item
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_, E> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl<E> Iterator for EventIterator<E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Non-blocking iterator over currently available events
pub struct TryIter<'a, E> {
    inner: &'a EventIterator<E>,
}

impl<'a, E> Iterator for TryIter<'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with timeout
pub struct TimeoutIter<'a, E> {
    inner: &'a EventIterator<E>,
    timeout: Duration,
}

impl<'a, E> Iterator for TimeoutIter<'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_try_recv_empty() {
        let channel = EventChannel::<u32>::new();
        assert!(channel.iter().try_recv().is_none());
    }

    #[test]
    fn test_send_then_try_recv() {
        let channel = EventChannel::new();
        channel.send("peer-added").unwrap();

        let iter = channel.iter();
        assert_eq!(iter.try_recv(), Some("peer-added"));
        assert!(iter.try_recv().is_none());
    }

    #[test]
    fn test_recv_timeout_expires() {
        let channel = EventChannel::<u32>::new();

        let start = Instant::now();
        assert!(channel.iter().recv_timeout(Duration::from_millis(50)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_sender_from_other_thread() {
        let channel = EventChannel::new();
        let sender = channel.sender();

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            sender.send(42u32).unwrap();
        });

        assert_eq!(channel.iter().recv_timeout(Duration::from_secs(1)), Some(42));
    }

    #[test]
    fn test_drain_preserves_order() {
        let channel = EventChannel::new();
        for i in 0..5u32 {
            channel.send(i).unwrap();
        }

        assert_eq!(channel.drain(), vec![0, 1, 2, 3, 4]);
        assert!(channel.drain().is_empty());
    }

    #[test]
    fn test_clones_share_queue() {
        let channel = EventChannel::new();
        let clone = channel.clone();

        channel.send(1u8).unwrap();
        assert_eq!(clone.iter().try_recv(), Some(1));
    }
}
