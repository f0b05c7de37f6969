// Name-based transport abstraction — pluggable session backends.

pub mod session;
pub mod traits;
