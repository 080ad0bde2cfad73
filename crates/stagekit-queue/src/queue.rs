use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};

/// FIFO queue shared between producers and consumers.
///
/// Every operation takes the lock exactly once, so items come out in the
/// order their `enqueue` calls acquired it. Dequeuing from an empty queue
/// returns `None` and is not an error.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: Option<usize>,
}

impl<T> WorkQueue<T> {
    /// Create an empty, unbounded queue.
    pub fn new() -> Self {
        Self::with_config(&QueueConfig::default())
    }

    /// Create an empty queue from `config`.
    pub fn with_config(config: &QueueConfig) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity: config.capacity,
        }
    }

    /// Append `item` at the back.
    pub fn enqueue(&self, item: T) -> QueueResult<()> {
        let mut items = self.items.lock().expect("lock poisoned");
        if let Some(capacity) = self.capacity {
            if items.len() >= capacity {
                debug!(capacity, "work queue full; rejecting item");
                return Err(QueueError::Full { capacity });
            }
        }
        items.push_back(item);
        Ok(())
    }

    /// Remove and return the front item.
    pub fn dequeue(&self) -> Option<T> {
        self.items.lock().expect("lock poisoned").pop_front()
    }

    /// Remove and return every pending item, front first.
    pub fn dequeue_all(&self) -> Vec<T> {
        self.items.lock().expect("lock poisoned").drain(..).collect()
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.items.lock().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.items.lock().expect("lock poisoned").is_empty()
    }

    /// The configured capacity bound, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl<T: Clone> WorkQueue<T> {
    /// A copy of the front item, leaving it queued.
    pub fn front(&self) -> Option<T> {
        self.items.lock().expect("lock poisoned").front().cloned()
    }

    /// A copy of every pending item, front first.
    pub fn all(&self) -> Vec<T> {
        self.items.lock().expect("lock poisoned").iter().cloned().collect()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("pending", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
