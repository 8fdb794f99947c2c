pub mod plate;

pub use plate::*;
