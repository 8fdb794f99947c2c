//! Repository layer — entity-scoped database operations.

mod plate;

pub use plate::*;
