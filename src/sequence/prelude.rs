pub use {
    crate::sequence::Sequence,
    crate::sequence::traits::{Allocation, Length, Operation, Stack, Queue, SnapShot, Render, Equality, Bincode},
    crate::{SequenceError, EncodingConfiguration},
};
