pub mod common_tests;
pub mod data_structures;
pub mod error;
pub mod preemptive_synchronization;

// Re-export the main types for convenience
pub use data_structures::{DefaultPayloadOps, LinkedList, PayloadOps};
pub use error::{DequeError, PushError};
pub use preemptive_synchronization::{BoundedBlockingDeque, DequeOptions, DequeState};

/*

cargo llvm-cov --html

sudo CARGO_PROFILE_RELEASE_DEBUG=true cargo flamegraph --bench deque_benchmark --root --

cargo valgrind test

*/
