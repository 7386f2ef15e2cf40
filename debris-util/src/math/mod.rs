pub mod range;

pub use range::{FloatRange, IntRange};
