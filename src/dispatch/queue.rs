//! Bounded FIFO dispatch queue.
//!
//! A fixed-capacity ring buffer guarded by one mutex, with two semaphores
//! playing the role of the "not full" and "not empty" conditions:
//! - `free` holds one permit per empty slot; producers wait on it
//! - `filled` holds one permit per queued item; consumers wait on it
//!
//! The mutex is only held for the ring update and never across an await.
//! Waiters are served in arrival order (tokio semaphores are fair), so a full
//! queue backpressures the accept loop instead of dropping connections.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// Returned by [`DispatchQueue::enqueue`] after [`DispatchQueue::close`];
/// hands the rejected item back to the caller.
#[derive(Debug, PartialEq, Eq)]
pub struct QueueClosed<T>(pub T);

impl<T> fmt::Display for QueueClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dispatch queue closed")
    }
}

impl<T: fmt::Debug> std::error::Error for QueueClosed<T> {}

#[derive(Debug)]
struct Ring<T> {
    slots: Vec<Option<T>>,
    front: usize,
    rear: usize,
    count: usize,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            front: 0,
            rear: 0,
            count: 0,
        }
    }

    fn push(&mut self, item: T) {
        debug_assert!(self.count < self.slots.len(), "push into full ring");
        self.slots[self.rear] = Some(item);
        self.rear = (self.rear + 1) % self.slots.len();
        self.count += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.front].take();
        self.front = (self.front + 1) % self.slots.len();
        self.count -= 1;
        item
    }
}

/// Fixed-capacity FIFO with waiting insertion and removal.
#[derive(Debug)]
pub struct DispatchQueue<T> {
    ring: Mutex<Ring<T>>,
    free: Semaphore,
    filled: Semaphore,
    capacity: usize,
}

impl<T> DispatchQueue<T> {
    /// Create a queue holding at most `capacity` items (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(Ring::with_capacity(capacity)),
            free: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            capacity,
        }
    }

    fn ring(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an item, waiting while the queue is full.
    pub async fn enqueue(&self, item: T) -> Result<(), QueueClosed<T>> {
        match self.free.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return Err(QueueClosed(item)),
        }
        self.ring().push(item);
        self.filled.add_permits(1);
        Ok(())
    }

    /// Remove the oldest item, waiting while the queue is empty.
    ///
    /// After [`close`](Self::close), remaining items are still handed out;
    /// `None` is returned once the queue is closed and drained.
    pub async fn dequeue(&self) -> Option<T> {
        match self.filled.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return self.ring().pop(),
        }
        // Can only come back empty if a consumer woken by `close` drained
        // the item this permit stood for.
        let item = self.ring().pop();
        self.free.add_permits(1);
        item
    }

    /// Stop accepting items and wake every waiter.
    pub fn close(&self) {
        self.free.close();
        self.filled.close();
    }

    pub fn is_closed(&self) -> bool {
        self.free.is_closed()
    }

    pub fn len(&self) -> usize {
        self.ring().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
