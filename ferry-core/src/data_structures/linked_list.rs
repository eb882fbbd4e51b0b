use std::alloc::{Layout, alloc};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr;

use crate::data_structures::payload_ops::{DefaultPayloadOps, PayloadOps};
use crate::error::{DequeError, PushError};

pub(crate) type NodePtr<T> = *mut ListNode<T>;

// =============================================================================
// CHAIN INVARIANTS
// =============================================================================
//
//            head                                     tail
//             │                                        │
//             ▼                                        ▼
//   NULL ◄── [A] ◄──────► [B] ◄──────► [C] ◄──────► [D] ──► NULL
//
// 1. size == number of nodes reachable from head via next
// 2. n.next == m (m non-null) implies m.prev == n
// 3. head.prev == NULL and tail.next == NULL
// 4. head == tail == NULL iff size == 0; head == tail iff size == 1
//
// Links are ownership-free: the list owns every node and frees each exactly
// once, either by handing the payload back (pop/remove) or through
// O::destroy (clear/Drop). A detached node always has next == prev == NULL.
//
// =============================================================================
// LOCATE (bidirectional scan)
// =============================================================================
//
//   step 0:  front ─► [A]  [B]  [C]  [D] ◄─ rear
//   step 1:       [A]  front ─► [B]  [C] ◄─ rear  [D]
//   stop:    next(front) == rear, or front == rear
//
// Front is compared before rear on every step. Each node is compared at most
// once, so the worst case is size comparisons over size / 2 steps.
//
pub(crate) struct ListNode<T> {
    payload: T,
    next: NodePtr<T>,
    prev: NodePtr<T>,
}

impl<T> ListNode<T> {
    /// Allocates a detached node, reporting allocation failure instead of
    /// aborting.
    fn try_alloc(payload: T) -> Result<NodePtr<T>, PushError<T>> {
        let layout = Layout::new::<Self>();

        // SAFETY: ListNode always holds two pointers, so the layout is never
        // zero-sized.
        let node = unsafe { alloc(layout) } as NodePtr<T>;
        if node.is_null() {
            return Err(PushError::new(DequeError::AllocationFailed, payload));
        }

        // SAFETY: node is a fresh, properly aligned allocation for Self.
        unsafe {
            ptr::write(
                node,
                ListNode {
                    payload,
                    next: ptr::null_mut(),
                    prev: ptr::null_mut(),
                },
            )
        };

        Ok(node)
    }

    /// Frees a detached node and returns its payload.
    ///
    /// # Safety
    /// `node` must come from `try_alloc`, be detached, and not be used again.
    unsafe fn into_payload(node: NodePtr<T>) -> T {
        // SAFETY: try_alloc used the global allocator with Layout::new::<Self>(),
        // which is what Box expects.
        let node = unsafe { Box::from_raw(node) };
        node.payload
    }
}

///
/// Doubly linked chain of individually allocated nodes.
///
/// This type performs no synchronization. `BoundedBlockingDeque` wraps it in a
/// mutex; on its own it is an ordinary single-owner deque.
///
pub struct LinkedList<T, O: PayloadOps<T> = DefaultPayloadOps> {
    head: NodePtr<T>,
    tail: NodePtr<T>,
    size: usize,
    _owns: PhantomData<Box<ListNode<T>>>,
    _ops: PhantomData<fn() -> O>,
}

// SAFETY: nodes are reachable only through the list, which owns them.
unsafe impl<T: Send, O: PayloadOps<T>> Send for LinkedList<T, O> {}
unsafe impl<T: Sync, O: PayloadOps<T>> Sync for LinkedList<T, O> {}

impl<T, O: PayloadOps<T>> Default for LinkedList<T, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O: PayloadOps<T>> LinkedList<T, O> {
    pub fn new() -> Self {
        LinkedList {
            head: ptr::null_mut(),
            tail: ptr::null_mut(),
            size: 0,
            _owns: PhantomData,
            _ops: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    // =========================================================================
    // Node primitives
    // =========================================================================

    /// Links a detached node in front of the current head.
    ///
    /// # Safety
    /// `node` must come from `ListNode::try_alloc` and be detached.
    pub(crate) unsafe fn insert_front(&mut self, node: NodePtr<T>) {
        unsafe {
            (*node).prev = ptr::null_mut();
            (*node).next = self.head;

            if self.head.is_null() {
                self.tail = node;
            } else {
                (*self.head).prev = node;
            }
        }

        self.head = node;
        self.size += 1;
    }

    /// Links a detached node behind the current tail.
    ///
    /// # Safety
    /// `node` must come from `ListNode::try_alloc` and be detached.
    pub(crate) unsafe fn insert_rear(&mut self, node: NodePtr<T>) {
        unsafe {
            (*node).next = ptr::null_mut();
            (*node).prev = self.tail;

            if self.tail.is_null() {
                self.head = node;
            } else {
                (*self.tail).next = node;
            }
        }

        self.tail = node;
        self.size += 1;
    }

    /// Detaches the head node. Returns null if the list is empty.
    pub(crate) fn remove_head_node(&mut self) -> NodePtr<T> {
        let node = self.head;
        if node.is_null() {
            return node;
        }

        // SAFETY: head is a live node owned by this list.
        unsafe {
            self.head = (*node).next;
            if self.head.is_null() {
                self.tail = ptr::null_mut();
            } else {
                (*self.head).prev = ptr::null_mut();
            }

            (*node).next = ptr::null_mut();
            (*node).prev = ptr::null_mut();
        }

        self.size -= 1;
        node
    }

    /// Detaches the tail node. Returns null if the list is empty.
    pub(crate) fn remove_tail_node(&mut self) -> NodePtr<T> {
        let node = self.tail;
        if node.is_null() {
            return node;
        }

        // SAFETY: tail is a live node owned by this list.
        unsafe {
            self.tail = (*node).prev;
            if self.tail.is_null() {
                self.head = ptr::null_mut();
            } else {
                (*self.tail).next = ptr::null_mut();
            }

            (*node).next = ptr::null_mut();
            (*node).prev = ptr::null_mut();
        }

        self.size -= 1;
        node
    }

    /// Detaches `node` from anywhere in the chain by relinking its neighbors.
    ///
    /// # Safety
    /// `node` must currently be linked into this list.
    pub(crate) unsafe fn splice(&mut self, node: NodePtr<T>) -> NodePtr<T> {
        if node == self.head {
            return self.remove_head_node();
        }
        if node == self.tail {
            return self.remove_tail_node();
        }

        // Interior node: both neighbors exist.
        unsafe {
            let prev = (*node).prev;
            let next = (*node).next;

            (*prev).next = next;
            (*next).prev = prev;

            (*node).next = ptr::null_mut();
            (*node).prev = ptr::null_mut();
        }

        self.size -= 1;
        node
    }

    /// Finds the first node equal to `payload`, scanning from both ends.
    /// Returns null if the list is empty or no node matches.
    pub(crate) fn locate(&self, payload: &T) -> NodePtr<T> {
        let mut front = self.head;
        let mut rear = self.tail;

        // SAFETY: both cursors only ever point at live nodes of this list.
        unsafe {
            while !front.is_null() {
                if O::equals(&(*front).payload, payload) {
                    return front;
                }
                if front == rear {
                    break;
                }
                if O::equals(&(*rear).payload, payload) {
                    return rear;
                }

                let next_front = (*front).next;
                if next_front == rear {
                    break;
                }

                front = next_front;
                rear = (*rear).prev;
            }
        }

        ptr::null_mut()
    }

    /// Reverses the chain by swapping every node's links, then the ends.
    pub fn reverse_in_place(&mut self) {
        let mut curr = self.head;

        while !curr.is_null() {
            // SAFETY: curr is a live node; after the swap its prev is the old next.
            unsafe {
                let node = &mut *curr;
                mem::swap(&mut node.next, &mut node.prev);
                curr = node.prev;
            }
        }

        mem::swap(&mut self.head, &mut self.tail);
    }

    // =========================================================================
    // Payload operations
    // =========================================================================

    pub fn push_front(&mut self, payload: T) -> Result<(), PushError<T>> {
        let node = ListNode::try_alloc(payload)?;
        // SAFETY: node is freshly allocated and detached.
        unsafe { self.insert_front(node) };
        Ok(())
    }

    pub fn push_rear(&mut self, payload: T) -> Result<(), PushError<T>> {
        let node = ListNode::try_alloc(payload)?;
        // SAFETY: node is freshly allocated and detached.
        unsafe { self.insert_rear(node) };
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let node = self.remove_head_node();
        // SAFETY: a non-null node was just detached and is not referenced elsewhere.
        (!node.is_null()).then(|| unsafe { ListNode::into_payload(node) })
    }

    pub fn pop_rear(&mut self) -> Option<T> {
        let node = self.remove_tail_node();
        // SAFETY: a non-null node was just detached and is not referenced elsewhere.
        (!node.is_null()).then(|| unsafe { ListNode::into_payload(node) })
    }

    /// Removes and returns the first payload equal to `payload`.
    pub fn remove_value(&mut self, payload: &T) -> Option<T> {
        let node = self.locate(payload);
        if node.is_null() {
            return None;
        }

        // SAFETY: locate only returns nodes linked into this list.
        unsafe {
            let node = self.splice(node);
            Some(ListNode::into_payload(node))
        }
    }

    pub fn contains(&self, payload: &T) -> bool {
        !self.locate(payload).is_null()
    }

    pub fn front(&self) -> Option<&T> {
        // SAFETY: head is null or a live node borrowed for the lifetime of &self.
        unsafe { self.head.as_ref().map(|node| &node.payload) }
    }

    pub fn back(&self) -> Option<&T> {
        // SAFETY: tail is null or a live node borrowed for the lifetime of &self.
        unsafe { self.tail.as_ref().map(|node| &node.payload) }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.size,
            _list: PhantomData,
        }
    }

    /// Renders the chain front to rear as `a --> b --> NULL`.
    pub fn render_all(&self) -> String {
        let mut output = String::new();
        for payload in self.iter() {
            output.push_str(&O::render(payload));
            output.push_str(" --> ");
        }
        output.push_str("NULL");
        output
    }

    /// Disposes of every payload through `O::destroy`.
    /// Returns the number of payloads destroyed.
    pub fn clear(&mut self) -> usize {
        let mut destroyed = 0;
        while let Some(payload) = self.pop_front() {
            O::destroy(payload);
            destroyed += 1;
        }
        destroyed
    }

    /// Walks the chain and verifies the structural invariants.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.head.is_null() != self.tail.is_null() {
            return Err("exactly one of head/tail is null".to_string());
        }
        if self.head.is_null() != (self.size == 0) {
            return Err(format!("empty ends with size {}", self.size));
        }
        if (self.size == 1) != (!self.head.is_null() && self.head == self.tail) {
            return Err(format!("head/tail identity does not match size {}", self.size));
        }

        let mut count = 0;
        let mut prev: NodePtr<T> = ptr::null_mut();
        let mut curr = self.head;

        // SAFETY: the walk is bounded by size + 1 and only follows live links.
        unsafe {
            while !curr.is_null() {
                if (*curr).prev != prev {
                    return Err(format!("node {} has a stale prev link", count));
                }

                count += 1;
                if count > self.size {
                    return Err(format!("more than {} nodes reachable", self.size));
                }

                prev = curr;
                curr = (*curr).next;
            }
        }

        if count != self.size {
            return Err(format!("{} nodes reachable, size is {}", count, self.size));
        }
        if prev != self.tail {
            return Err("tail is not the last reachable node".to_string());
        }

        Ok(())
    }
}

impl<T, O: PayloadOps<T>> Drop for LinkedList<T, O> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, O: PayloadOps<T>> fmt::Display for LinkedList<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_all())
    }
}

/// Front-to-rear borrowing iterator.
///
pub struct Iter<'a, T> {
    next: NodePtr<T>,
    remaining: usize,
    _list: PhantomData<&'a T>,
}

// SAFETY: Iter only hands out shared references to payloads.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.next.is_null() {
            return None;
        }

        // SAFETY: the list is borrowed for 'a, so the chain cannot change.
        unsafe {
            let node = &*self.next;
            self.next = node.next;
            self.remaining -= 1;
            Some(&node.payload)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T, O: PayloadOps<T>> IntoIterator for &'a LinkedList<T, O> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
