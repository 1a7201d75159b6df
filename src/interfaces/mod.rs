//! Abstract interfaces for the targets behind a proxy.
//!
//! These define the contracts for:
//! - Forwarding calls, reads and writes to a live object
//! - Constructing objects from a type identifier

pub mod catalog;
pub mod target;

pub use catalog::{Constructor, TargetCatalog};
pub use target::{Target, TargetError};
