//! Data structures underlying the blocking deque.
//!
//! # Organization
//!
//! - [`linked_list`] - Unsynchronized doubly linked list (node splicing,
//!   bidirectional lookup, in-place reversal)
//! - [`payload_ops`] - Caller-supplied equality, rendering and disposal

pub mod linked_list;
pub mod payload_ops;

pub use linked_list::{Iter, LinkedList};
pub use payload_ops::{DefaultPayloadOps, Keyed, KeyedPayloadOps, PayloadOps};
