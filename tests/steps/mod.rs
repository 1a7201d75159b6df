//! Step definition modules for Cucumber feature tests.

pub mod interception;
pub mod patterns;
pub mod properties;
