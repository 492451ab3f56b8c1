use std::pin::Pin;
use std::future::Future;
use std::sync::Arc;

use crate::{EncodingConfiguration, SequenceError};

/// ### -> `Allocation<T> Trait`.
///
/// Foundational trait for sequence construction.
///
/// All methods in this trait are asynchronous and return pinned boxed futures, matching
/// the rest of the sequence traits.
///
/// ### -> `Methods`
/// - `allocate(capacity: usize) -> Arc<Self>`:
/// Allocates a new sequence with the specified capacity hint and returns it wrapped in an Arc.
/// - `allocate_raw(capacity: usize) -> Self`:
/// Allocates a new sequence with the specified capacity hint and returns it directly.
///
/// The capacity is a pre-allocation hint only. It never bounds growth, and `0` is accepted.
///
/// ### -> `Usage`
///
/// ```
/// use lockstep::sequence::prelude::*;
///
/// async fn example() {
///     let sequence = Sequence::<i32>::allocate(5).await;
///     assert_eq!(sequence.length(), 0);
///     assert!(sequence.capacity() >= 5);
/// }
///
/// lockstep::future!(example());
/// ```
pub trait Allocation<T>
where
    T: Send + Sync + 'static,
    Self: Sized + Send + 'static,
{
    /// Allocates a new sequence and wraps it in an `Arc` for shared ownership.
    #[must_use = "Allocated sequences must have a purpose!"]
    fn allocate(capacity: usize) -> Pin<Box<dyn Future<Output = Arc<Self>> + Send + 'static>> {
        Box::pin(async move {
            Arc::new(Self::allocate_raw(capacity).await)
        })
    }

    /// Allocates a new sequence and returns it directly.
    #[must_use = "Allocated sequences must have a purpose!"]
    fn allocate_raw(capacity: usize) -> Pin<Box<dyn Future<Output = Self> + Send + 'static>>;
}

/// Lock-free length queries.
pub trait Length {
    /// Element count. Lock-free: reads a counter published under the lock after each
    /// completed mutation, so it never reflects a half-applied operation.
    fn length(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.length() == 0
    }

    fn length_eq(&self, other: &Self) -> bool {
        self.length() == other.length()
    }

    fn length_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.length().partial_cmp(&other.length())
    }
}

/// ### -> `Stack<T> Trait`.
///
/// LIFO operations at the back of the sequence.
///
/// - `push(value)`: appends `value`. Never fails; the store grows past its capacity as needed.
/// - `pop()`: removes and returns the last element, `SequenceError::OutOfRange` when empty.
/// - `peek()`: returns a copy of the last element without removing it.
///
/// ### -> `Usage`
///
/// ```
/// use lockstep::sequence::prelude::*;
///
/// async fn example() -> anyhow::Result<()> {
///     let sequence = Sequence::<i32>::allocate(2).await;
///     sequence.push(1).await;
///     sequence.push(2).await;
///
///     assert_eq!(sequence.peek().await?, 2);
///     assert_eq!(sequence.pop().await?, 2);
///     assert_eq!(sequence.pop().await?, 1);
///     assert_eq!(sequence.pop().await, Err(SequenceError::OutOfRange));
///     assert_eq!(sequence.pop().await.unwrap_or_default(), 0);
///     Ok(())
/// }
///
/// lockstep::future!(example()).unwrap();
/// ```
pub trait Stack<T>: Allocation<T>
where
    T: Send + Sync + 'static,
    Self: Sync,
{
    fn push(&self, value: T) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
    fn pop(&self) -> Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + '_>>;

    #[must_use = "Peeking must serve a purpose!"]
    fn peek(&self) -> Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + '_>>
    where
        T: Clone;
}

/// ### -> `Queue<T> Trait`.
///
/// Operations at the front of the sequence. Combined with `Stack::push`,
/// `shift` gives FIFO semantics.
///
/// - `unshift(value)`: inserts `value` at index 0, moving every element one position back.
/// - `shift()`: removes and returns the first element, `SequenceError::OutOfRange` when empty.
///
/// ### -> `Usage`
///
/// ```
/// use lockstep::sequence::prelude::*;
///
/// async fn example() -> anyhow::Result<()> {
///     let sequence = Sequence::<&str>::allocate(4).await;
///     sequence.push("b").await;
///     sequence.unshift("a").await;
///
///     assert_eq!(sequence.shift().await?, "a");
///     assert_eq!(sequence.shift().await?, "b");
///     assert!(sequence.shift().await.is_err());
///     Ok(())
/// }
///
/// lockstep::future!(example()).unwrap();
/// ```
pub trait Queue<T>: Allocation<T>
where
    T: Send + Sync + 'static,
    Self: Sync,
{
    fn unshift(&self, value: T) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
    fn shift(&self) -> Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + '_>>;
}

/// ### -> `Operation<T> Trait`.
///
/// Indexed access, in-place transformation, querying and traversal.
///
/// Every method holds the sequence lock for its whole duration, including while the
/// supplied closure runs. Closures are synchronous and must not block on another
/// operation of the same sequence (e.g. through `lockstep::future!`): the lock is not
/// re-entrant and such a call never returns.
///
/// ### -> `Methods`
/// - `at(index)`: copy of the element at `index`. Negative indices and indices `>= length`
///   yield `SequenceError::OutOfRange`.
/// - `map(transform)`: replaces every element with `transform(element)`, in order. If
///   `transform` panics, the element it was given is dropped; the elements before it stay
///   mapped, the ones after it stay untouched, and `length()` reflects that.
/// - `filter(predicate)`: new `Vec<T>` holding, in order, the elements matching `predicate`.
///   The vector is owned by the caller and not synchronized. The sequence is untouched.
/// - `find(predicate)`: first element matching `predicate`, `SequenceError::NotFound` otherwise.
/// - `each(visitor)`: calls `visitor` on every element, in order.
///
/// ### -> `Usage`
///
/// ```
/// use lockstep::sequence::prelude::*;
///
/// async fn example() -> anyhow::Result<()> {
///     let sequence = Sequence::<i32>::allocate(10).await;
///     for value in 1..=3 {
///         sequence.push(value).await;
///     }
///
///     assert_eq!(sequence.at(1).await?, 2);
///     assert_eq!(sequence.filter(|v| *v > 1).await, vec![2, 3]);
///     assert_eq!(sequence.find(|v| *v > 3).await, Err(SequenceError::NotFound));
///
///     sequence.map(|v| v * 10).await;
///     let mut total = 0;
///     sequence.each(|v| total += *v).await;
///     assert_eq!(total, 60);
///     Ok(())
/// }
///
/// lockstep::future!(example()).unwrap();
/// ```
pub trait Operation<T>: Allocation<T> + Length
where
    T: Send + Sync + 'static,
    Self: Sync,
{
    #[must_use = "Fetched elements must have a purpose!"]
    fn at(&self, index: isize) -> Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + '_>>
    where
        T: Clone;

    fn map<'a, F>(&'a self, transform: F) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>
    where
        F: FnMut(T) -> T + Send + 'a;

    #[must_use = "Filtering copies elements and must serve a purpose!"]
    fn filter<'a, F>(&'a self, predicate: F) -> Pin<Box<dyn Future<Output = Vec<T>> + Send + 'a>>
    where
        T: Clone,
        F: FnMut(&T) -> bool + Send + 'a;

    fn find<'a, F>(&'a self, predicate: F) -> Pin<Box<dyn Future<Output = Result<T, SequenceError>> + Send + 'a>>
    where
        T: Clone,
        F: FnMut(&T) -> bool + Send + 'a;

    fn each<'a, F>(&'a self, visitor: F) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>
    where
        F: FnMut(&T) + Send + 'a;
}

pub trait SnapShot<T>: Allocation<T>
where
    T: Send + Sync + 'static,
    T: Clone,
{
    /// Copies the backing store under the lock. The returned vector is independent of the
    /// sequence; later mutations are not reflected in it.
    #[must_use = "Snapshot output must serve a purpose!"]
    fn snapshot<'a>(&'a self) -> Pin<Box<dyn Future<Output = Vec<T>> + Send + 'a>>;
}

pub trait Render<T>: Allocation<T>
where
    T: Send + Sync + 'static,
    T: std::fmt::Display,
{
    /// Renders the elements as `[a b c]`. Meant for logs and diagnostics, not as a
    /// serialization format.
    #[must_use = "Rendered output must serve a purpose!"]
    fn render<'a>(&'a self) -> Pin<Box<dyn Future<Output = String> + Send + 'a>>;
}

pub trait Equality<T>: Allocation<T> + SnapShot<T>
where
    T: PartialEq,
    T: Clone,
    T: Send + Sync + 'static,
{
    /// Compares snapshots of both sequences. The locks are taken one after the other,
    /// never together.
    fn snapshot_eq<'a>(&'a self, other: &'a Self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

pub trait Bincode<T>: Allocation<T> + SnapShot<T>
where
    T: Clone,
    T: Send + Sync + 'static,
{
    #[must_use = "Bincode serialization output must serve a purpose!"]
    fn bincode<'a>(&'a self, configuration: &'a EncodingConfiguration) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send + 'a>>
    where
        T: serde::Serialize;

    fn from_bincode<'a>(bytes: &'a [u8], configuration: &'a EncodingConfiguration) -> Pin<Box<dyn Future<Output = anyhow::Result<Self>> + Send + 'a>>
    where
        T: serde::de::DeserializeOwned;
}
