//! Built-in service implementations and the default configuration-bearing type.

pub mod builtin;
pub mod registry;

pub use builtin::*;
pub use registry::*;
