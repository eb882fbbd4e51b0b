use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use ferry_core::common_tests::Job;
use ferry_core::common_tests::blocking_deque_stress_tests::*;
use ferry_core::data_structures::{DefaultPayloadOps, KeyedPayloadOps, PayloadOps};
use ferry_core::{BoundedBlockingDeque, DequeError};
use rand::Rng;
use rstest::rstest;
use serial_test::serial;

// Trait for type-level parametrization
trait TestPayloadOps {
    type Ops: PayloadOps<Job> + 'static;
}

// Marker types for each capability set
struct UseDefaultOps;
struct UseKeyedOps;

impl TestPayloadOps for UseDefaultOps {
    type Ops = DefaultPayloadOps;
}

impl TestPayloadOps for UseKeyedOps {
    type Ops = KeyedPayloadOps<u64>;
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[rstest]
#[serial(stress_tests)]
#[case::default_ops(UseDefaultOps)]
#[case::keyed_ops(UseKeyedOps)]
fn stress_exactly_once_small_capacity<T: TestPayloadOps>(#[case] _type: T) {
    init_logging();
    test_producers_consumers_exactly_once::<T::Ops>(8, 500, 8, 4);
}

#[rstest]
#[serial(stress_tests)]
#[case::default_ops(UseDefaultOps)]
#[case::keyed_ops(UseKeyedOps)]
fn stress_exactly_once_more_consumers<T: TestPayloadOps>(#[case] _type: T) {
    init_logging();
    test_producers_consumers_exactly_once::<T::Ops>(2, 2_000, 12, 64);
}

#[rstest]
#[serial(stress_tests)]
#[case::default_ops(UseDefaultOps)]
#[case::keyed_ops(UseKeyedOps)]
fn stress_exactly_once_capacity_one<T: TestPayloadOps>(#[case] _type: T) {
    init_logging();
    test_producers_consumers_exactly_once::<T::Ops>(4, 250, 4, 1);
}

#[rstest]
#[serial(stress_tests)]
#[case::default_ops(UseDefaultOps)]
#[case::keyed_ops(UseKeyedOps)]
fn stress_full_deque_blocks_producers<T: TestPayloadOps>(#[case] _type: T) {
    init_logging();
    test_full_deque_blocks_producers::<T::Ops>();
}

#[rstest]
#[serial(stress_tests)]
#[case::default_ops(UseDefaultOps)]
#[case::keyed_ops(UseKeyedOps)]
fn stress_shutdown_wakes_all_consumers<T: TestPayloadOps>(#[case] _type: T) {
    init_logging();
    test_shutdown_wakes_all_consumers::<T::Ops>(16);
}

#[rstest]
#[serial(stress_tests)]
#[case::default_ops_capacity_zero(UseDefaultOps, 0)]
#[case::keyed_ops_capacity_zero(UseKeyedOps, 0)]
#[case::default_ops_capacity_one(UseDefaultOps, 1)]
#[case::keyed_ops_capacity_four(UseKeyedOps, 4)]
fn stress_shutdown_keeps_producers_blocked<T: TestPayloadOps>(
    #[case] _type: T,
    #[case] capacity: usize,
) {
    init_logging();
    test_shutdown_keeps_producers_blocked::<T::Ops>(capacity);
}

#[rstest]
#[serial(stress_tests)]
#[case::default_ops(UseDefaultOps)]
#[case::keyed_ops(UseKeyedOps)]
fn stress_remove_by_value_admits_producer<T: TestPayloadOps>(#[case] _type: T) {
    init_logging();
    test_remove_by_value_admits_producer::<T::Ops>();
}

#[rstest]
#[serial(stress_tests)]
#[case::default_ops(UseDefaultOps)]
#[case::keyed_ops(UseKeyedOps)]
fn stress_ping_pong_handoff<T: TestPayloadOps>(#[case] _type: T) {
    init_logging();
    test_ping_pong_handoff::<T::Ops>(2_000);
}

// ============================================================================
// Randomized mix of non-blocking operations
// ============================================================================

#[test]
#[serial(stress_tests)]
fn stress_random_operations_keep_invariants() {
    init_logging();

    let capacity = 32;
    let thread_count = 8;
    let ops_per_thread = 5_000;

    let deque = Arc::new(BoundedBlockingDeque::<Job, KeyedPayloadOps<u64>>::new(capacity));
    let barrier = Arc::new(Barrier::new(thread_count + 1));
    let running = Arc::new(AtomicBool::new(true));

    let checker = {
        let deque = Arc::clone(&deque);
        let barrier = Arc::clone(&barrier);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            barrier.wait();
            let mut checks = 0;
            while running.load(Ordering::Acquire) {
                deque.check_invariants().unwrap();
                checks += 1;
                thread::yield_now();
            }
            checks
        })
    };

    let workers: Vec<_> = (0..thread_count)
        .map(|thread_id| {
            let deque = Arc::clone(&deque);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                barrier.wait();

                for i in 0..ops_per_thread {
                    let id = rng.gen_range(0..128u64);
                    let job = Job::from_producer(thread_id, id);

                    match rng.gen_range(0..7) {
                        0 => {
                            let _ = deque.try_push_front(job);
                        }
                        1 => {
                            let _ = deque.try_push_rear(job);
                        }
                        2 => match deque.try_pop_front() {
                            Ok(_) | Err(DequeError::Empty) => {}
                            Err(error) => panic!("unexpected error: {}", error),
                        },
                        3 => match deque.try_pop_rear() {
                            Ok(_) | Err(DequeError::Empty) => {}
                            Err(error) => panic!("unexpected error: {}", error),
                        },
                        4 => {
                            deque.remove_by_value(&job).unwrap();
                        }
                        5 => {
                            deque.contains(&job).unwrap();
                        }
                        6 => {
                            if i % 100 == 0 {
                                deque.reverse().unwrap();
                            }
                        }
                        _ => unreachable!(),
                    }

                    assert!(deque.len() <= capacity);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    running.store(false, Ordering::Release);

    let checks = checker.join().unwrap();
    println!("Random operations - {} invariant checks during run", checks);

    deque.check_invariants().unwrap();
    assert!(deque.len() <= capacity);
}
