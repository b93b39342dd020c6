//! Reusable byte buffers owned by encoders and decoders.

pub mod read;
pub mod write;

pub use read::{Exhausted, Fill, ReadBuffer, ReaderSource};
pub use write::{SCRATCH_CAPACITY, TOO_BIG, WriteBuffer};
