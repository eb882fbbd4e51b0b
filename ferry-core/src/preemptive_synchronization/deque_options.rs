/// Capacity used by [`DequeOptions::default`].
pub const DEFAULT_CAPACITY: usize = 16;

/// Construction options for a `BoundedBlockingDeque`.
///
/// A capacity of zero is accepted: such a deque is permanently full and
/// every push blocks.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DequeOptions {
    capacity: usize,
    name: String,
}

impl DequeOptions {
    pub fn new(capacity: usize) -> Self {
        DequeOptions {
            capacity,
            name: String::from("deque"),
        }
    }

    /// Sets the name used to tag log records of this deque.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for DequeOptions {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
