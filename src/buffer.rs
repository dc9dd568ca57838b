use std::collections::VecDeque;

/// Default number of items kept by every bounded buffer in a session
pub const DEFAULT_CAPACITY: usize = 5_000;

/// A fixed-capacity FIFO that keeps the most recent N items
///
/// Used for the entry history, the raw visible lines and every filter tab's
/// rendered output. When the buffer is full, the oldest item is evicted and
/// handed back to the caller.
#[derive(Debug, Clone)]
pub struct BoundedBuffer<T> {
    /// Items stored in the buffer (newest at back)
    items: VecDeque<T>,

    /// Number of items ever pushed since creation or the last clear
    total_pushed: u64,

    /// Maximum number of items to keep
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Create a new buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(1000)), // Start smaller, grow as needed
            total_pushed: 0,
            capacity: capacity.max(1), // Minimum capacity of 1
        }
    }

    /// Create a buffer with default capacity (5,000 items)
    pub fn default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Push a new item to the back of the buffer
    ///
    /// Returns `Some(item)` if the oldest item was evicted to make room,
    /// or `None` if no eviction was needed.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        self.total_pushed += 1;

        if self.items.len() > self.capacity {
            return self.items.pop_front();
        }

        None
    }

    /// Get an item by its position, oldest first
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Get the number of items currently in the buffer
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items pushed since the last clear, evicted ones included
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    /// Number of items evicted since the last clear
    pub fn evicted(&self) -> u64 {
        self.total_pushed - self.items.len() as u64
    }

    /// Remove every item and reset the push counter
    pub fn clear(&mut self) {
        self.items.clear();
        self.total_pushed = 0;
    }

    /// Get the buffer's capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over all items in arrival order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }
}

impl<T> Default for BoundedBuffer<T> {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl<T> Extend<T> for BoundedBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
