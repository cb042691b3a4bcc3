//! Thread-Safe Replacement Policy
//!
//! Policies are not synchronized on their own: a cache that is shared between
//! threads already holds a lock around its key map, and the policy is updated
//! under that same lock. [`ConcurrentPolicy`] packages the policy and its lock
//! together for callers that don't have one.
//!
//! ## Why Mutex Instead of RwLock?
//!
//! Even the read side of a policy mutates: a hit calls `touch`, which relinks
//! the element in the eviction index. Only `peek`, `peek_all` and `len` are
//! true reads, and they are cheap enough that a shared lock would not pay for
//! its bookkeeping. `parking_lot::Mutex` does not poison and is
//! cheap to take when uncontended.
//!
//! # Example
//!
//! ```rust
//! use coconut_policy::attributes::AttributeMap;
//! use coconut_policy::concurrent::ConcurrentPolicy;
//! use coconut_policy::policy::LruPolicy;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let policy = Arc::new(ConcurrentPolicy::new(LruPolicy::with_capacity(64)));
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|t| {
//!         let policy = Arc::clone(&policy);
//!         thread::spawn(move || {
//!             let attrs = AttributeMap::new();
//!             for i in 0..100 {
//!                 policy.add(t * 1000 + i, &attrs);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//!
//! assert_eq!(policy.len(), 400);
//! ```
//!
//! # Multi-Step Operations
//!
//! Each method takes the lock once. Sequences that must not interleave with
//! other threads, such as "evict until under budget", go through
//! [`ConcurrentPolicy::with_lock`]:
//!
//! ```rust
//! use coconut_policy::attributes::AttributeMap;
//! use coconut_policy::concurrent::ConcurrentPolicy;
//! use coconut_policy::policy::{FifoPolicy, ReplacementPolicy};
//!
//! let policy = ConcurrentPolicy::new(FifoPolicy::with_capacity(8));
//! for i in 0..6 {
//!     policy.add(i, &AttributeMap::new());
//! }
//!
//! let evicted = policy.with_lock(|p| {
//!     let mut out = Vec::new();
//!     while p.len() > 2 {
//!         out.extend(p.evict_next());
//!     }
//!     out
//! });
//! assert_eq!(evicted, vec![0, 1, 2, 3]);
//! ```

extern crate alloc;

use crate::attributes::AttributeMap;
use crate::index::Handle;
use crate::metrics::{CorePolicyMetrics, PolicyMetrics};
use crate::policy::ReplacementPolicy;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use parking_lot::Mutex;

/// A replacement policy behind a `parking_lot::Mutex`.
///
/// Every operation takes `&self`, so the wrapper can be shared through an
/// `Arc`. It is `Send + Sync` whenever `P: Send`.
///
/// # Type Parameters
///
/// - `T`: Element type managed by the policy.
/// - `P`: The wrapped policy.
pub struct ConcurrentPolicy<T, P> {
    inner: Mutex<P>,
    _element: PhantomData<fn() -> T>,
}

impl<T, P: ReplacementPolicy<T>> ConcurrentPolicy<T, P> {
    pub fn new(policy: P) -> Self {
        ConcurrentPolicy {
            inner: Mutex::new(policy),
            _element: PhantomData,
        }
    }

    /// Registers `element`. See [`ReplacementPolicy::add`].
    pub fn add(&self, element: T, attributes: &AttributeMap) -> Option<Handle> {
        self.inner.lock().add(element, attributes)
    }

    pub fn remove(&self, handle: Handle) -> Option<T> {
        self.inner.lock().remove(handle)
    }

    pub fn evict_next(&self) -> Option<T> {
        self.inner.lock().evict_next()
    }

    pub fn touch(&self, handle: Handle) {
        self.inner.lock().touch(handle)
    }

    /// See [`ReplacementPolicy::admits`].
    pub fn admits(&self, attributes: &AttributeMap) -> bool {
        self.inner.lock().admits(attributes)
    }

    pub fn update(&self, handle: Handle, element: T, attributes: &AttributeMap) -> bool {
        self.inner.lock().update(handle, element, attributes)
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Returns the number of registered elements.
    ///
    /// The value may be stale by the time it is used if other threads are
    /// adding or removing concurrently.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Runs `f` with exclusive access to the wrapped policy.
    ///
    /// The lock is held for the duration of `f`; keep it short.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Mutable access without locking, available when the wrapper is not shared.
    pub fn get_mut(&mut self) -> &mut P {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> P {
        self.inner.into_inner()
    }
}

impl<T: Clone, P: ReplacementPolicy<T>> ConcurrentPolicy<T, P> {
    /// Returns a **clone** of the next victim so the lock is not held by the
    /// caller.
    pub fn peek(&self) -> Option<T> {
        self.inner.lock().peek().cloned()
    }

    /// Returns clones of every element in victim order.
    pub fn peek_all(&self) -> Vec<T> {
        self.inner.lock().peek_all().into_iter().cloned().collect()
    }
}

impl<T, P: PolicyMetrics> PolicyMetrics for ConcurrentPolicy<T, P> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.inner.lock().algorithm_name()
    }

    fn core_counters(&self) -> CorePolicyMetrics {
        self.inner.lock().core_counters()
    }
}

impl<T, P: ReplacementPolicy<T> + Default> Default for ConcurrentPolicy<T, P> {
    fn default() -> Self {
        ConcurrentPolicy::new(P::default())
    }
}

impl<T, P: fmt::Debug> fmt::Debug for ConcurrentPolicy<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(policy) => f
                .debug_struct("ConcurrentPolicy")
                .field("inner", &*policy)
                .finish(),
            None => f
                .debug_struct("ConcurrentPolicy")
                .field("inner", &format_args!("<locked>"))
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::policy::{FifoPolicy, LruPolicy};
    use alloc::vec;
    use std::sync::Arc;
    use std::thread;

    fn assert_send_sync<S: Send + Sync>() {}

    #[test]
    fn test_is_send_and_sync() {
        assert_send_sync::<ConcurrentPolicy<u64, LruPolicy<u64>>>();
        assert_send_sync::<ConcurrentPolicy<String, FifoPolicy<String>>>();
    }

    #[test]
    fn test_single_thread_operations() {
        let attrs = AttributeMap::new();
        let policy = ConcurrentPolicy::new(LruPolicy::with_capacity(4));

        let a = policy.add(1, &attrs).unwrap();
        let b = policy.add(2, &attrs).unwrap();
        policy.add(3, &attrs);

        policy.touch(a);
        assert_eq!(policy.peek(), Some(2));
        assert_eq!(policy.peek_all(), vec![2, 3, 1]);

        assert!(policy.update(b, 20, &attrs));
        assert_eq!(policy.peek_all(), vec![3, 1, 20]);

        assert_eq!(policy.remove(a), Some(1));
        assert_eq!(policy.remove(a), None);
        assert_eq!(policy.evict_next(), Some(3));
        assert_eq!(policy.len(), 1);

        policy.clear();
        assert!(policy.is_empty());
        assert_eq!(policy.algorithm_name(), "LRU");
        assert_eq!(policy.metrics()["clears"], 1.0);
    }

    #[test]
    fn test_parallel_adds_and_removes_keep_len_consistent() {
        let policy = Arc::new(ConcurrentPolicy::new(FifoPolicy::with_capacity(2)));
        let threads = 8;
        let per_thread = 500;

        let workers: Vec<_> = (0..threads)
            .map(|t| {
                let policy = Arc::clone(&policy);
                thread::spawn(move || {
                    let attrs = AttributeMap::new();
                    let mut kept = 0usize;
                    for i in 0..per_thread {
                        let handle = policy.add(t * per_thread + i, &attrs).unwrap();
                        if i % 2 == 0 {
                            assert_eq!(policy.remove(handle), Some(t * per_thread + i));
                        } else {
                            kept += 1;
                        }
                    }
                    kept
                })
            })
            .collect();

        let kept: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
        assert_eq!(policy.len(), kept);
        assert_eq!(policy.peek_all().len(), kept);

        let inner = Arc::try_unwrap(policy).unwrap().into_inner();
        inner.index().debug_validate_invariants();
    }

    #[test]
    fn test_with_lock_is_atomic() {
        let policy = Arc::new(ConcurrentPolicy::new(LruPolicy::with_capacity(16)));
        let attrs = AttributeMap::new();
        for i in 0..64u32 {
            policy.add(i, &attrs);
        }

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let policy = Arc::clone(&policy);
                thread::spawn(move || {
                    policy.with_lock(|p| {
                        let before = p.len();
                        p.evict_next();
                        p.evict_next();
                        assert_eq!(p.len(), before - 2);
                    })
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(policy.len(), 56);
        assert_eq!(policy.peek(), Some(8));
    }
}
