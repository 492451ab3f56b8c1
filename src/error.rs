use thiserror::Error;

/// Errors returned by fallible `Sequence<T>` operations.
///
/// Both variants carry no data. On error there is no element to hand back;
/// callers that want the element type's baseline value use
/// `result.unwrap_or_default()`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceError {
    /// Positional access beyond the current bounds: a negative or too large
    /// index, or `pop`/`shift`/`peek` on an empty sequence.
    #[error("index out of range")]
    OutOfRange,

    /// No element satisfied the predicate passed to `find`.
    #[error("not found")]
    NotFound,
}
