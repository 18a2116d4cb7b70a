mod bounded_index;

pub use bounded_index::*;
