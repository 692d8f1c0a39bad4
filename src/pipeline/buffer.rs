//! Bounded staging buffer shared by requester and resolver threads.
//!
//! The buffer holds at most `capacity` hostnames. Producers block in
//! [`StagingBuffer::push`] while it is full and consumers block in
//! [`StagingBuffer::pop`] while it is empty.
//!
//! The number of active producers and consumers lives under the same lock as
//! the items. A consumer therefore checks "no producers remain and nothing is
//! buffered" atomically with going to sleep, and the last producer to leave
//! wakes every sleeping consumer. Consumers can never miss the end of the run.
//!
//! Producer and consumer registrations are RAII slots. Dropping a slot,
//! whether the worker finished, panicked, or its thread never started,
//! releases it exactly once.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

use crate::core::common::BufferOrder;

/// Returned by [`StagingBuffer::push`] when no consumer is left to drain the
/// buffer. Carries the rejected hostname.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no consumers remain to drain the staging buffer")]
pub struct BufferClosed(pub String);

#[derive(Debug, Default)]
struct BufferState {
    items: VecDeque<String>,
    producers: usize,
    consumers: usize,
}

#[derive(Debug)]
pub struct StagingBuffer {
    state: Mutex<BufferState>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    order: BufferOrder,
}

impl StagingBuffer {
    pub fn new(capacity: usize, order: BufferOrder) -> Self {
        debug_assert!(capacity > 0, "staging buffer capacity must be positive");
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(BufferState::default()),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            order,
        }
    }

    /// Register a producer. Consumers keep waiting for work as long as at
    /// least one producer slot is alive.
    pub fn register_producer(self: &Arc<Self>) -> ProducerSlot {
        self.state.lock().producers += 1;
        ProducerSlot {
            buffer: Arc::clone(self),
        }
    }

    /// Register a consumer. Producers only block on a full buffer while at
    /// least one consumer slot is alive.
    pub fn register_consumer(self: &Arc<Self>) -> ConsumerSlot {
        self.state.lock().consumers += 1;
        ConsumerSlot {
            buffer: Arc::clone(self),
        }
    }

    /// Insert a hostname, blocking while the buffer is full.
    pub fn push(&self, hostname: String) -> Result<(), BufferClosed> {
        let mut state = self.state.lock();
        while state.items.len() >= self.capacity && state.consumers > 0 {
            self.not_full.wait(&mut state);
        }
        if state.consumers == 0 {
            return Err(BufferClosed(hostname));
        }

        state.items.push_back(hostname);
        debug_assert!(state.items.len() <= self.capacity);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove a hostname, blocking while the buffer is empty.
    ///
    /// Returns `None` once every producer has been released and the buffer
    /// has drained. No hostname will ever be pushed after that.
    pub fn pop(&self) -> Option<String> {
        let mut state = self.state.lock();
        loop {
            let item = match self.order {
                BufferOrder::Fifo => state.items.pop_front(),
                BufferOrder::Lifo => state.items.pop_back(),
            };
            if let Some(hostname) = item {
                self.not_full.notify_one();
                return Some(hostname);
            }
            if state.producers == 0 {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn order(&self) -> BufferOrder {
        self.order
    }

    pub fn active_producers(&self) -> usize {
        self.state.lock().producers
    }

    fn release_producer(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.producers > 0);
        state.producers = state.producers.saturating_sub(1);
        if state.producers == 0 {
            self.not_empty.notify_all();
        }
    }

    fn release_consumer(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.consumers > 0);
        state.consumers = state.consumers.saturating_sub(1);
        if state.consumers == 0 {
            self.not_full.notify_all();
        }
    }
}

/// A live producer registration. Released on drop.
#[derive(Debug)]
pub struct ProducerSlot {
    buffer: Arc<StagingBuffer>,
}

impl ProducerSlot {
    pub fn buffer(&self) -> &StagingBuffer {
        &self.buffer
    }
}

impl Drop for ProducerSlot {
    fn drop(&mut self) {
        self.buffer.release_producer();
    }
}

/// A live consumer registration. Released on drop.
#[derive(Debug)]
pub struct ConsumerSlot {
    buffer: Arc<StagingBuffer>,
}

impl ConsumerSlot {
    pub fn buffer(&self) -> &StagingBuffer {
        &self.buffer
    }
}

impl Drop for ConsumerSlot {
    fn drop(&mut self) {
        self.buffer.release_consumer();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn buffer(capacity: usize, order: BufferOrder) -> Arc<StagingBuffer> {
        Arc::new(StagingBuffer::new(capacity, order))
    }

    #[test]
    fn fifo_pops_in_push_order() {
        let buffer = buffer(4, BufferOrder::Fifo);
        let _consumer = buffer.register_consumer();
        for name in ["a", "b", "c"] {
            buffer.push(name.to_owned()).unwrap();
        }
        assert_eq!(buffer.pop().as_deref(), Some("a"));
        assert_eq!(buffer.pop().as_deref(), Some("b"));
        assert_eq!(buffer.pop().as_deref(), Some("c"));
    }

    #[test]
    fn lifo_pops_most_recent_first() {
        let buffer = buffer(4, BufferOrder::Lifo);
        let _consumer = buffer.register_consumer();
        for name in ["a", "b", "c"] {
            buffer.push(name.to_owned()).unwrap();
        }
        assert_eq!(buffer.pop().as_deref(), Some("c"));
        assert_eq!(buffer.pop().as_deref(), Some("b"));
        assert_eq!(buffer.pop().as_deref(), Some("a"));
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let buffer = buffer(usize::MAX / 2, BufferOrder::Fifo);
        let _consumer = buffer.register_consumer();
        buffer.push("a".to_owned()).unwrap();
        assert_eq!(buffer.capacity(), usize::MAX / 2);
        assert_eq!(buffer.pop().as_deref(), Some("a"));
    }

    #[test]
    fn pop_returns_none_once_producers_are_gone_and_drained() {
        let buffer = buffer(2, BufferOrder::Fifo);
        let _consumer = buffer.register_consumer();
        let producer = buffer.register_producer();
        buffer.push("left.over".to_owned()).unwrap();
        drop(producer);

        assert_eq!(buffer.active_producers(), 0);
        assert_eq!(buffer.pop().as_deref(), Some("left.over"));
        assert_eq!(buffer.pop(), None);
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn pop_without_any_producer_does_not_block() {
        let buffer = buffer(2, BufferOrder::Fifo);
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn sleeping_consumers_wake_when_last_producer_leaves() {
        let buffer = buffer(2, BufferOrder::Fifo);
        let producer = buffer.register_producer();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || buffer.pop())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        drop(producer);

        for handle in handles {
            assert_eq!(handle.join().unwrap(), None);
        }
    }

    #[test]
    fn push_blocks_while_full_until_pop() {
        let buffer = buffer(1, BufferOrder::Fifo);
        let _consumer = buffer.register_consumer();
        buffer.push("first".to_owned()).unwrap();

        let pusher = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.push("second".to_owned()))
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(buffer.len(), 1);
        assert!(!pusher.is_finished());

        assert_eq!(buffer.pop().as_deref(), Some("first"));
        pusher.join().unwrap().unwrap();
        assert_eq!(buffer.pop().as_deref(), Some("second"));
    }

    #[test]
    fn push_fails_when_no_consumers_remain() {
        let buffer = buffer(1, BufferOrder::Fifo);
        let consumer = buffer.register_consumer();
        buffer.push("first".to_owned()).unwrap();

        let pusher = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.push("second".to_owned()))
        };
        thread::sleep(Duration::from_millis(50));
        drop(consumer);

        assert_eq!(pusher.join().unwrap(), Err(BufferClosed("second".to_owned())));
    }

    #[test]
    fn concurrent_hand_off_delivers_every_item_once_within_capacity() {
        const CAPACITY: usize = 3;
        const PER_PRODUCER: usize = 500;

        let buffer = buffer(CAPACITY, BufferOrder::Lifo);
        let producers: Vec<_> = (0..4).map(|_| buffer.register_producer()).collect();
        let consumers: Vec<_> = (0..3).map(|_| buffer.register_consumer()).collect();

        let producer_handles: Vec<_> = producers
            .into_iter()
            .enumerate()
            .map(|(p, slot)| {
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        slot.buffer().push(format!("host-{p}-{i}")).unwrap();
                        assert!(slot.buffer().len() <= CAPACITY);
                    }
                })
            })
            .collect();

        let consumer_handles: Vec<_> = consumers
            .into_iter()
            .map(|slot| {
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(hostname) = slot.buffer().pop() {
                        assert!(slot.buffer().len() <= CAPACITY);
                        seen.push(hostname);
                    }
                    seen
                })
            })
            .collect();

        for handle in producer_handles {
            handle.join().unwrap();
        }
        let mut all = Vec::new();
        for handle in consumer_handles {
            all.extend(handle.join().unwrap());
        }

        let unique: HashSet<_> = all.iter().cloned().collect();
        assert_eq!(all.len(), 4 * PER_PRODUCER);
        assert_eq!(unique.len(), all.len());
        assert!(buffer.is_empty());
    }
}
