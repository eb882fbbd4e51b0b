//! Bounded Blocking Deque
//!
//! A `LinkedList` behind one mutex, with two condition variables turning it
//! into a capacity-bounded producer/consumer queue.
//!
//! # Wait / Signal Placement
//!
//! ```text
//!   push_front / push_rear                 pop_front / pop_rear
//!         │                                       │
//!         ▼                                       ▼
//!   ┌────────────────────┐  yes          ┌──────────────────────────┐  yes
//!   │ size == capacity ? ├──────┐        │ size == 0 && !finished ? ├──────┐
//!   └─────────┬──────────┘      │        └────────────┬─────────────┘      │
//!             │ no              ▼                     │ no                 ▼
//!             │      wait(space_available)            │       wait(item_available)
//!             │      (loop, re-check)                 │       (loop, re-check)
//!             ▼                                       ▼
//!   ┌────────────────────┐               ┌──────────────────────────┐
//!   │ link node          │               │ size > 0 ? detach node   │
//!   │ notify_one(item)   │               │   notify_one(space)      │
//!   └────────────────────┘               │ else end of stream       │
//!                                        └──────────────────────────┘
//! ```
//!
//! Waiters always re-test their predicate after waking: a wakeup may be
//! spurious, and another thread may take the slot between the signal and
//! the reacquisition of the lock. No wakeup order is guaranteed.
//!
//! # Shutdown
//!
//! ```text
//!   Active ──shutdown()──► Finishing ──last pop──► Drained
//!   (finished = false)     (finished, size > 0)    (finished, size == 0)
//! ```
//!
//! `shutdown()` broadcasts on `item_available` so every blocked consumer
//! observes `finished`. Producers are unaffected: a push into a full deque
//! still waits for space.
//!
//! # Poisoning
//!
//! Caller-supplied `PayloadOps` run under the lock, so a panicking `equals`
//! poisons it. Operations then report `DequeError::Poisoned`. The chain itself
//! is never left half-linked by a panic, so read-only snapshots (`len`,
//! `state`, ...) and teardown read through a poisoned lock.

use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use log::{debug, trace, warn};

use crate::data_structures::linked_list::LinkedList;
use crate::data_structures::payload_ops::{DefaultPayloadOps, PayloadOps};
use crate::error::{DequeError, PushError};
use crate::preemptive_synchronization::deque_options::DequeOptions;

/// Lifecycle of a deque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeState {
    /// Producers may still be adding work.
    Active,
    /// Shutdown was requested; items remain to be drained.
    Finishing,
    /// Shutdown was requested and the deque is empty.
    Drained,
}

#[derive(Clone, Copy)]
enum End {
    Front,
    Rear,
}

struct SharedState<T, O: PayloadOps<T>> {
    list: LinkedList<T, O>,
    finished: bool,
}

pub struct BoundedBlockingDeque<T, O: PayloadOps<T> = DefaultPayloadOps> {
    shared: Mutex<SharedState<T, O>>,
    space_available: Condvar,
    item_available: Condvar,
    capacity: usize,
    name: String,
}

impl<T, O: PayloadOps<T>> BoundedBlockingDeque<T, O> {
    pub fn new(capacity: usize) -> Self {
        Self::with_options(DequeOptions::new(capacity))
    }

    pub fn with_options(options: DequeOptions) -> Self {
        debug!(
            "deque '{}': created with capacity {}",
            options.name(),
            options.capacity()
        );

        BoundedBlockingDeque {
            shared: Mutex::new(SharedState {
                list: LinkedList::new(),
                finished: false,
            }),
            space_available: Condvar::new(),
            item_available: Condvar::new(),
            capacity: options.capacity(),
            name: options.name().to_string(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // Producers
    // =========================================================================

    /// Inserts at the front, blocking while the deque is full.
    pub fn push_front(&self, payload: T) -> Result<(), PushError<T>> {
        self.push(payload, End::Front)
    }

    /// Inserts at the rear, blocking while the deque is full.
    pub fn push_rear(&self, payload: T) -> Result<(), PushError<T>> {
        self.push(payload, End::Rear)
    }

    /// Inserts at the front, failing with `DequeError::Full` instead of blocking.
    pub fn try_push_front(&self, payload: T) -> Result<(), PushError<T>> {
        self.try_push(payload, End::Front)
    }

    /// Inserts at the rear, failing with `DequeError::Full` instead of blocking.
    pub fn try_push_rear(&self, payload: T) -> Result<(), PushError<T>> {
        self.try_push(payload, End::Rear)
    }

    fn push(&self, payload: T, end: End) -> Result<(), PushError<T>> {
        let mut shared = match self.lock() {
            Ok(shared) => shared,
            Err(error) => return Err(PushError::new(error, payload)),
        };

        while shared.list.len() >= self.capacity {
            trace!("deque '{}': producer waiting for space", self.name);

            shared = match self.space_available.wait(shared) {
                Ok(shared) => shared,
                Err(_) => return Err(PushError::new(self.poisoned(), payload)),
            };
        }

        self.link(&mut shared, payload, end)
    }

    fn try_push(&self, payload: T, end: End) -> Result<(), PushError<T>> {
        let mut shared = match self.lock() {
            Ok(shared) => shared,
            Err(error) => return Err(PushError::new(error, payload)),
        };

        if shared.list.len() >= self.capacity {
            return Err(PushError::new(DequeError::Full, payload));
        }

        self.link(&mut shared, payload, end)
    }

    fn link(
        &self,
        shared: &mut SharedState<T, O>,
        payload: T,
        end: End,
    ) -> Result<(), PushError<T>> {
        let result = match end {
            End::Front => shared.list.push_front(payload),
            End::Rear => shared.list.push_rear(payload),
        };

        match &result {
            Ok(()) => self.item_available.notify_one(),
            Err(error) => warn!("deque '{}': {}", self.name, error),
        }

        result
    }

    // =========================================================================
    // Consumers
    // =========================================================================

    /// Removes from the front, blocking while the deque is empty.
    ///
    /// Returns `Ok(None)` once the deque is shut down and empty.
    pub fn pop_front(&self) -> Result<Option<T>, DequeError> {
        self.pop(End::Front)
    }

    /// Removes from the rear, blocking while the deque is empty.
    ///
    /// Returns `Ok(None)` once the deque is shut down and empty.
    pub fn pop_rear(&self) -> Result<Option<T>, DequeError> {
        self.pop(End::Rear)
    }

    /// Removes from the front without blocking.
    ///
    /// Fails with `DequeError::Empty` if the deque is empty but still active;
    /// returns `Ok(None)` if it is drained.
    pub fn try_pop_front(&self) -> Result<Option<T>, DequeError> {
        self.try_pop(End::Front)
    }

    /// Removes from the rear without blocking. See [`Self::try_pop_front`].
    pub fn try_pop_rear(&self) -> Result<Option<T>, DequeError> {
        self.try_pop(End::Rear)
    }

    fn pop(&self, end: End) -> Result<Option<T>, DequeError> {
        let mut shared = self.lock()?;

        while shared.list.is_empty() && !shared.finished {
            trace!("deque '{}': consumer waiting for an item", self.name);

            shared = self
                .item_available
                .wait(shared)
                .map_err(|_| self.poisoned())?;
        }

        Ok(self.unlink(&mut shared, end))
    }

    fn try_pop(&self, end: End) -> Result<Option<T>, DequeError> {
        let mut shared = self.lock()?;

        if shared.list.is_empty() && !shared.finished {
            return Err(DequeError::Empty);
        }

        Ok(self.unlink(&mut shared, end))
    }

    fn unlink(&self, shared: &mut SharedState<T, O>, end: End) -> Option<T> {
        let payload = match end {
            End::Front => shared.list.pop_front(),
            End::Rear => shared.list.pop_rear(),
        };

        if payload.is_some() {
            self.space_available.notify_one();
        } else {
            trace!("deque '{}': end of stream", self.name);
        }

        payload
    }

    /// Removes the first payload equal to `payload` under `O::equals`.
    ///
    /// Returns `Ok(None)` without side effects if no payload matches.
    pub fn remove_by_value(&self, payload: &T) -> Result<Option<T>, DequeError> {
        let mut shared = self.lock()?;

        let removed = shared.list.remove_value(payload);
        if removed.is_some() {
            self.space_available.notify_one();
        }

        Ok(removed)
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Declares that no more work is coming and wakes every blocked consumer.
    ///
    /// Returns `true` for the call that performed the transition; later calls
    /// are no-ops returning `false`.
    pub fn shutdown(&self) -> Result<bool, DequeError> {
        let mut shared = self.lock()?;

        if shared.finished {
            return Ok(false);
        }

        shared.finished = true;
        self.item_available.notify_all();

        debug!(
            "deque '{}': shutdown with {} item(s) left to drain",
            self.name,
            shared.list.len()
        );

        Ok(true)
    }

    /// Destroys every remaining payload through `O::destroy` and releases the
    /// deque. Returns the number of payloads destroyed.
    ///
    /// Taking `self` guarantees no other operation is in progress.
    pub fn destroy(mut self) -> usize {
        self.drain_remaining()
    }

    fn drain_remaining(&mut self) -> usize {
        let shared = self
            .shared
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        let destroyed = shared.list.clear();
        if destroyed > 0 {
            debug!(
                "deque '{}': destroyed {} remaining item(s)",
                self.name, destroyed
            );
        }

        destroyed
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns a read-only handle to the head payload.
    ///
    /// The handle holds the deque lock until dropped; every other operation
    /// on this deque blocks meanwhile, including from the same thread.
    pub fn peek_head(&self) -> Result<Option<PayloadRef<'_, T, O>>, DequeError> {
        let shared = self.lock()?;

        let head = shared.list.front().map(NonNull::from);
        Ok(head.map(|head| PayloadRef {
            _shared: shared,
            head,
        }))
    }

    /// Applies `f` to the head payload under the lock.
    pub fn peek_head_and_apply<F, R>(&self, f: F) -> Result<Option<R>, DequeError>
    where
        F: FnOnce(&T) -> R,
    {
        let shared = self.lock()?;
        Ok(shared.list.front().map(f))
    }

    pub fn contains(&self, payload: &T) -> Result<bool, DequeError> {
        Ok(self.lock()?.list.contains(payload))
    }

    /// Reverses the order of the queued payloads.
    pub fn reverse(&self) -> Result<(), DequeError> {
        self.lock()?.list.reverse_in_place();
        Ok(())
    }

    /// Renders the queued payloads front to rear through `O::render`.
    pub fn render_all(&self) -> Result<String, DequeError> {
        Ok(self.lock()?.list.render_all())
    }

    /// Copies the queued payloads front to rear.
    pub fn to_vec(&self) -> Result<Vec<T>, DequeError>
    where
        T: Clone,
    {
        Ok(self.lock()?.list.iter().cloned().collect())
    }

    /// Snapshot of the element count.
    pub fn len(&self) -> usize {
        self.snapshot().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_finished(&self) -> bool {
        self.snapshot().finished
    }

    pub fn state(&self) -> DequeState {
        let shared = self.snapshot();
        match (shared.finished, shared.list.is_empty()) {
            (false, _) => DequeState::Active,
            (true, false) => DequeState::Finishing,
            (true, true) => DequeState::Drained,
        }
    }

    /// Verifies the chain invariants and `size <= capacity`.
    pub fn check_invariants(&self) -> Result<(), String> {
        let shared = self.snapshot();
        shared.list.check_invariants()?;

        if shared.list.len() > self.capacity {
            return Err(format!(
                "size {} exceeds capacity {}",
                shared.list.len(),
                self.capacity
            ));
        }

        Ok(())
    }

    // =========================================================================
    // Locking
    // =========================================================================

    fn lock(&self) -> Result<MutexGuard<'_, SharedState<T, O>>, DequeError> {
        self.shared.lock().map_err(|_| self.poisoned())
    }

    fn snapshot(&self) -> MutexGuard<'_, SharedState<T, O>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poisoned(&self) -> DequeError {
        warn!("deque '{}': lock poisoned", self.name);
        DequeError::Poisoned
    }
}

impl<T, O: PayloadOps<T>> Drop for BoundedBlockingDeque<T, O> {
    fn drop(&mut self) {
        self.drain_remaining();
    }
}

impl<T, O: PayloadOps<T>> fmt::Debug for BoundedBlockingDeque<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBlockingDeque")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("state", &self.state())
            .finish()
    }
}

/// Read-only handle to the head payload of a deque.
///
/// Holds the deque lock for its lifetime.
///
pub struct PayloadRef<'a, T, O: PayloadOps<T>> {
    _shared: MutexGuard<'a, SharedState<T, O>>,
    head: NonNull<T>,
}

impl<T, O: PayloadOps<T>> Deref for PayloadRef<'_, T, O> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the head node cannot be unlinked or freed while the guard
        // is held, and the guard only allows shared access through this type.
        unsafe { self.head.as_ref() }
    }
}
