/// Runs a future to completion on the current thread.
///
/// Mostly useful for doctests, which do not support async natively.
#[macro_export]
macro_rules! future {
    ($coroutine: expr) => {
        $crate::__private::block_on($coroutine)
    };
}

#[macro_export]
macro_rules! drop {
    ($($x:expr),* $(,)?) => {
        $( std::mem::drop($x); )*
    };
}

#[doc(hidden)]
pub mod __private {
    pub use futures::executor::block_on;
}

pub mod error;
pub mod sequence;

pub use error::SequenceError;

/// Selects the `bincode` configuration used by the `Bincode<T>` trait.
///
/// - `Standard`: `bincode::config::standard()` (variable-length integers).
/// - `Legacy`: `bincode::config::legacy()` (fixed-width integers, bincode 1.x layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingConfiguration {
    #[default]
    Standard,
    Legacy,
}
