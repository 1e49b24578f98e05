//! Finbot Domain - transaction vocabulary and collaborator interfaces
//!
//! The orchestration core treats persistence, messaging, export and
//! scheduling as opaque collaborators. This crate holds the narrow
//! interfaces those collaborators are invoked through, plus the
//! transaction record shape the default system prompt asks backends
//! to emit.

pub mod prompt;
pub mod records;
pub mod store;

pub use prompt::*;
pub use records::*;
pub use store::*;
