//! Binpack value model.

mod value;

pub use value::{Dict, IntWidth, Value};
