//! Single-slot, overwrite-on-full hand-off between the reader thread and the
//! control loop.

use crossbeam_queue::ArrayQueue;

/// Holds at most one value. Writers replace whatever is there; the reader
/// takes it atomically. Older values are simply lost.
#[derive(Debug)]
pub struct LatestSlot<T> {
    queue: ArrayQueue<T>,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            queue: ArrayQueue::new(1),
        }
    }

    /// Store `value`, returning the value it displaced.
    pub fn put(&self, value: T) -> Option<T> {
        self.queue.force_push(value)
    }

    pub fn take(&self) -> Option<T> {
        self.queue.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
