//! Caller-supplied capabilities over the payload type.
//!
//! The deque never inspects payloads itself. Equality (for lookups),
//! rendering (for diagnostics) and disposal are delegated to a
//! [`PayloadOps`] implementation chosen at compile time:
//!
//! ```text
//!   LinkedList<T, O: PayloadOps<T>>
//!       │
//!       ├── O::equals   locate / contains / remove_value
//!       ├── O::render   render_all / Display
//!       └── O::destroy  clear / Drop (payloads still owned by the list)
//! ```
//!
//! Implementors are usually zero-sized marker types.

use std::fmt;
use std::marker::PhantomData;

pub trait PayloadOps<T> {
    /// Returns true if `a` and `b` denote the same entity.
    /// Must be an equivalence relation.
    fn equals(a: &T, b: &T) -> bool;

    /// Renders a payload for logs and diagnostics.
    fn render(payload: &T) -> String;

    /// Disposes of a payload the container still owns.
    /// Called exactly once per such payload.
    fn destroy(payload: T) {
        drop(payload);
    }
}

/// Uses `PartialEq`, `Debug` and `Drop` of the payload type.
///
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPayloadOps;

impl<T: PartialEq + fmt::Debug> PayloadOps<T> for DefaultPayloadOps {
    fn equals(a: &T, b: &T) -> bool {
        a == b
    }

    fn render(payload: &T) -> String {
        format!("{:?}", payload)
    }
}

/// Adapts a [`Keyed`] payload so equality compares keys only.
///
/// Useful for job records where two values with the same identifier
/// denote the same job even if other fields differ.
///
pub struct KeyedPayloadOps<K>(PhantomData<fn() -> K>);

pub trait Keyed {
    type Key: PartialEq + fmt::Display;

    fn key(&self) -> &Self::Key;
}

impl<T: Keyed> PayloadOps<T> for KeyedPayloadOps<T::Key> {
    fn equals(a: &T, b: &T) -> bool {
        a.key() == b.key()
    }

    fn render(payload: &T) -> String {
        format!("#{}", payload.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Job {
        id: u32,
        cost: u64,
    }

    impl Keyed for Job {
        type Key = u32;

        fn key(&self) -> &u32 {
            &self.id
        }
    }

    type JobOps = KeyedPayloadOps<u32>;

    #[test]
    fn default_ops_follow_partial_eq_and_debug() {
        assert!(<DefaultPayloadOps as PayloadOps<&str>>::equals(&"a", &"a"));
        assert!(!<DefaultPayloadOps as PayloadOps<&str>>::equals(&"a", &"b"));
        assert_eq!("\"a\"", <DefaultPayloadOps as PayloadOps<&str>>::render(&"a"));
    }

    #[test]
    fn keyed_ops_ignore_non_key_fields() {
        let a = Job { id: 3, cost: 10 };
        let b = Job { id: 3, cost: 99 };
        let c = Job { id: 4, cost: 10 };

        assert!(JobOps::equals(&a, &b));
        assert!(!JobOps::equals(&a, &c));
        assert_eq!("#3", JobOps::render(&a));
        assert_eq!(a.cost, c.cost);
    }
}
