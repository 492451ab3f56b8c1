use std::future::Future;
use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::SequenceError;

mod traits;

struct Container<T> {
    slots: Mutex<Vec<T>>,
    length: AtomicUsize,
    capacity: AtomicUsize,
}

impl <T> Container<T> {
    fn allocate(capacity: usize) -> Self {
        Self::adopt(Vec::with_capacity(capacity))
    }

    fn adopt(slots: Vec<T>) -> Self {
        Self {
            length: AtomicUsize::new(slots.len()),
            capacity: AtomicUsize::new(slots.capacity()),
            slots: Mutex::new(slots),
        }
    }

    /// must be called with the slots lock held, after the mutation is complete.
    fn publish(&self, slots: &Vec<T>) {
        debug_assert!(slots.len() <= slots.capacity(), "Invariant violation: length {} exceeds capacity {}.", slots.len(), slots.capacity());
        self.capacity.store(slots.capacity(), Ordering::Relaxed);
        self.length.store(slots.len(), Ordering::Release);
    }
}

/// In-progress `map` over the guarded slots.
///
/// Dropping it (normally or while unwinding from a panicking transform) puts the unmapped
/// tail back behind the mapped head and republishes the counters, so `length()` always
/// matches the live elements. Only the element handed to a panicking transform is lost.
struct Remap<'g, T> {
    slots: &'g mut Vec<T>,
    pending: std::vec::IntoIter<T>,
    container: &'g Container<T>,
}

impl <T> Drop for Remap<'_, T> {
    fn drop(&mut self) {
        self.slots.extend(&mut self.pending);
        self.container.publish(&*self.slots);
    }
}

/// ### -> `Sequence<T>` - A thread-safe, lock-guarded, growable sequence.
///
/// `Sequence<T>` holds an ordered collection of `T` behind a single mutual-exclusion lock and
/// offers stack operations (push/pop), front operations (unshift/shift), indexed access,
/// in-place transformation (map), querying (filter/find), traversal (each) and diagnostics
/// (snapshot/render).
///
/// ### -> `Concurrency Model`
///
/// - Every operation that reads or writes elements acquires the same `tokio::sync::Mutex`,
///   so at most one of them runs at a time across all handles. Structural mutations are
///   therefore atomic with respect to each other.
/// - `length()` and `capacity()` do not take the lock. They read atomic counters which are
///   only written under the lock, once the mutation they describe is complete, so every read
///   lands between two completed operations.
/// - Closures passed to `map`, `filter`, `find` and `each` run under the lock. They must not
///   block on an operation of the same sequence; the lock is not re-entrant.
/// - A single coarse lock trades throughput for simplicity. It is meant for moderate
///   contention.
///
/// ### -> `Invariants`
///
/// 1. **Order**: element order reflects the push/unshift/shift/pop history exactly.
/// 2. **Length ≤ Capacity**: capacity is a pre-allocation hint, never a cap. The store grows
///    when a push or unshift finds it full.
///
/// ### -> `Error Handling`
///
/// Fallible operations return `Result<T, SequenceError>`:
/// - `SequenceError::OutOfRange` for `pop`/`shift`/`peek` on an empty sequence and for `at`
///   with a negative or too large index.
/// - `SequenceError::NotFound` when `find` has no match.
///
/// Use `unwrap_or_default()` where the element type's baseline value is wanted on error.
///
/// ### -> `Sharing`
///
/// Cloning a `Sequence<T>` is O(1) and yields another handle to the same elements. The
/// elements are dropped together with the last handle.
///
/// ### -> `Usage Example`
///
/// ```
/// use lockstep::sequence::prelude::*;
///
/// async fn example() -> anyhow::Result<()> {
///     let sequence = Sequence::<i32>::allocate(10).await;
///     sequence.push(1).await;
///     sequence.push(2).await;
///     sequence.push(3).await;
///
///     assert_eq!(sequence.length(), 3);
///     assert_eq!(sequence.render().await, "[1 2 3]");
///     assert_eq!(sequence.at(1).await?, 2);
///     assert_eq!(sequence.filter(|v| *v > 1).await, vec![2, 3]);
///
///     let missing = sequence.find(|v| *v > 3).await;
///     assert_eq!(missing, Err(SequenceError::NotFound));
///     assert_eq!(missing.unwrap_or_default(), 0);
///
///     assert_eq!(sequence.pop().await?, 3);
///     assert_eq!(sequence.pop().await?, 2);
///     assert_eq!(sequence.pop().await?, 1);
///     assert_eq!(sequence.pop().await, Err(SequenceError::OutOfRange));
///
///     Ok(())
/// }
///
/// lockstep::future!(example()).unwrap();
/// ```
pub struct Sequence<T> {
    container: Arc<Container<T>>,
}

impl <T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self { container: Arc::clone(&self.container) }
    }
}

impl <T> std::fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("length", &self.container.length.load(Ordering::Acquire))
            .field("capacity", &self.container.capacity.load(Ordering::Acquire))
            .finish()
    }
}

impl <T> Sequence<T>
where
    T: Send + Sync + 'static
{
    /// Growth schedule used when a push or unshift finds the store full.
    fn generate_capacity(current: usize, required: usize) -> usize {
        let new_capacity = if current < 8 {
            (current * 2).max(8)
        } else if current < 4096 {
            current + (current / 2)
        } else {
            current + 1024
        };

        new_capacity.max(required)
    }

    /// does not take the lock! the caller passes the guarded slots.
    fn reserve_one(slots: &mut Vec<T>) {
        let length = slots.len();
        let capacity = slots.capacity();

        if length < capacity {
            return;
        }

        let upto = Self::generate_capacity(capacity, length + 1);
        slots.reserve_exact(upto - length);
        trace!(from = capacity, to = slots.capacity(), "sequence store grown");
    }

    /// Builds a sequence that takes ownership of `vector`. The capacity of `vector` is kept.
    pub fn from_vec(vector: Vec<T>) -> Self {
        Self { container: Arc::new(Container::adopt(vector)) }
    }

    /// Current capacity of the backing store, always at least `length()`.
    ///
    /// Purely advisory; exposed for diagnostics.
    pub fn capacity(&self) -> usize {
        self.container.capacity.load(Ordering::Acquire)
    }
}


impl <T> traits::Allocation<T> for Sequence<T>
where
    T: Send + Sync + 'static,
{
    fn allocate_raw(capacity: usize) -> std::pin::Pin<Box<dyn Future<Output = Self> + Send + 'static>> {
        Box::pin(async move {
            Self { container: Arc::new(Container::allocate(capacity)) }
        })
    }
}


impl <T> traits::Length for Sequence<T> {
    fn length(&self) -> usize {
        self.container.length.load(Ordering::Acquire)
    }
}


impl <T> traits::Stack<T> for Sequence<T>
where
    T: Send + Sync + 'static,
{
    fn push(&self, value: T) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let mut slots = self.container.slots.lock().await;
            Self::reserve_one(&mut slots);
            slots.push(value);
            self.container.publish(&slots);
        })
    }

    fn pop(&self) -> std::pin::Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + '_>> {
        Box::pin(async move {
            let mut slots = self.container.slots.lock().await;
            let Some(value) = slots.pop() else {
                debug!(operation = "pop", "pop on an empty sequence");
                return Err(SequenceError::OutOfRange);
            };

            self.container.publish(&slots);
            Ok(value)
        })
    }

    fn peek(&self) -> std::pin::Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + '_>>
    where
        T: Clone
    {
        Box::pin(async move {
            let slots = self.container.slots.lock().await;
            match slots.last() {
                Some(value) => Ok(value.clone()),
                None => {
                    debug!(operation = "peek", "peek on an empty sequence");
                    Err(SequenceError::OutOfRange)
                }
            }
        })
    }
}


impl <T> traits::Queue<T> for Sequence<T>
where
    T: Send + Sync + 'static,
{
    fn unshift(&self, value: T) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let mut slots = self.container.slots.lock().await;
            Self::reserve_one(&mut slots);
            slots.insert(0, value);
            self.container.publish(&slots);
        })
    }

    fn shift(&self) -> std::pin::Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + '_>> {
        Box::pin(async move {
            let mut slots = self.container.slots.lock().await;
            if slots.is_empty() {
                debug!(operation = "shift", "shift on an empty sequence");
                return Err(SequenceError::OutOfRange);
            }

            let value = slots.remove(0);
            self.container.publish(&slots);
            Ok(value)
        })
    }
}


impl <T> traits::Operation<T> for Sequence<T>
where
    T: Send + Sync + 'static,
{
    fn at(&self, index: isize) -> std::pin::Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + '_>>
    where
        T: Clone
    {
        Box::pin(async move {
            let slots = self.container.slots.lock().await;
            let value = usize::try_from(index).ok().and_then(|index| slots.get(index));

            match value {
                Some(value) => Ok(value.clone()),
                None => {
                    debug!(operation = "at", index, length = slots.len(), "index out of range");
                    Err(SequenceError::OutOfRange)
                }
            }
        })
    }

    fn map<'a, F>(&'a self, mut transform: F) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send + 'a>>
    where
        F: FnMut(T) -> T + Send + 'a
    {
        Box::pin(async move {
            let mut slots = self.container.slots.lock().await;

            // same capacity as before; map never grows or shrinks the store.
            let capacity = slots.capacity();
            let pending = std::mem::replace(&mut *slots, Vec::with_capacity(capacity)).into_iter();
            let mut remap = Remap { slots: &mut *slots, pending, container: &*self.container };

            while let Some(value) = remap.pending.next() {
                let mapped = transform(value);
                remap.slots.push(mapped);
            }
        })
    }

    fn filter<'a, F>(&'a self, mut predicate: F) -> std::pin::Pin<Box<dyn Future<Output = Vec<T>> + Send + 'a>>
    where
        T: Clone,
        F: FnMut(&T) -> bool + Send + 'a
    {
        Box::pin(async move {
            let slots = self.container.slots.lock().await;
            slots.iter().filter(|value| predicate(value)).cloned().collect()
        })
    }

    fn find<'a, F>(&'a self, mut predicate: F) -> std::pin::Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + 'a>>
    where
        T: Clone,
        F: FnMut(&T) -> bool + Send + 'a
    {
        Box::pin(async move {
            let slots = self.container.slots.lock().await;
            match slots.iter().find(|value| predicate(value)) {
                Some(value) => Ok(value.clone()),
                None => {
                    debug!(operation = "find", length = slots.len(), "no element matched");
                    Err(SequenceError::NotFound)
                }
            }
        })
    }

    fn each<'a, F>(&'a self, mut visitor: F) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send + 'a>>
    where
        F: FnMut(&T) + Send + 'a
    {
        Box::pin(async move {
            let slots = self.container.slots.lock().await;
            slots.iter().for_each(|value| visitor(value));
        })
    }
}


impl <T> traits::SnapShot<T> for Sequence<T>
where
    T: Send + Sync + 'static,
    T: Clone,
{
    fn snapshot<'a>(&'a self) -> std::pin::Pin<Box<dyn Future<Output = Vec<T>> + Send + 'a>> {
        Box::pin(async move {
            let slots = self.container.slots.lock().await;
            slots.to_vec()
        })
    }
}


impl <T> traits::Render<T> for Sequence<T>
where
    T: Send + Sync + 'static,
    T: std::fmt::Display,
{
    fn render<'a>(&'a self) -> std::pin::Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        Box::pin(async move {
            let slots = self.container.slots.lock().await;
            let items = slots.iter().map(|value| value.to_string()).collect::<Vec<_>>();
            format!("[{}]", items.join(" "))
        })
    }
}


impl <T> traits::Equality<T> for Sequence<T>
where
    T: Send + Sync + 'static,
    T: Clone + PartialEq,
{
    fn snapshot_eq<'a>(&'a self, other: &'a Self) -> std::pin::Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            if Arc::ptr_eq(&self.container, &other.container) {
                return true;
            }

            let left = traits::SnapShot::snapshot(self).await;
            let right = traits::SnapShot::snapshot(other).await;
            left == right
        })
    }
}


impl <T> traits::Bincode<T> for Sequence<T>
where
    T: Send + Sync + 'static,
    T: Clone,
{
    fn bincode<'a>(&'a self, configuration: &'a crate::EncodingConfiguration) -> std::pin::Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send + 'a>>
    where
        T: serde::Serialize
    {
        Box::pin(async move {
            let snapshot = traits::SnapShot::snapshot(self).await;

            let encoded = match configuration {
                crate::EncodingConfiguration::Standard => {
                    bincode::serde::encode_to_vec(&snapshot, bincode::config::standard())?
                },
                crate::EncodingConfiguration::Legacy => {
                    bincode::serde::encode_to_vec(&snapshot, bincode::config::legacy())?
                }
            };

            trace!(elements = snapshot.len(), bytes = encoded.len(), "sequence encoded");
            Ok(encoded)
        })
    }

    fn from_bincode<'a>(bytes: &'a [u8], configuration: &'a crate::EncodingConfiguration) -> std::pin::Pin<Box<dyn Future<Output = anyhow::Result<Self>> + Send + 'a>>
    where
        T: serde::de::DeserializeOwned,
    {
        Box::pin(async move {
            let (decoded, consumed): (Vec<T>, usize) = match configuration {
                crate::EncodingConfiguration::Standard => {
                    bincode::serde::decode_from_slice(bytes, bincode::config::standard())?
                },
                crate::EncodingConfiguration::Legacy => {
                    bincode::serde::decode_from_slice(bytes, bincode::config::legacy())?
                }
            };

            if consumed != bytes.len() {
                anyhow::bail!("Trailing data: decoded {} of {} bytes.", consumed, bytes.len());
            }

            Ok(Sequence::from_vec(decoded))
        })
    }
}


pub mod prelude;

#[cfg(test)]
mod tests;
