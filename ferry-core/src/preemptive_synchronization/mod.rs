//! Thread-blocking synchronization built on `std::sync` primitives.
//!
//! - [`blocking_deque`] - Capacity-bounded blocking deque with shutdown
//! - [`deque_options`] - Construction options

pub mod blocking_deque;
pub mod deque_options;

pub use blocking_deque::{BoundedBlockingDeque, DequeState, PayloadRef};
pub use deque_options::{DEFAULT_CAPACITY, DequeOptions};
