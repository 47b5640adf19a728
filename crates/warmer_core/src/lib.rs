//! Shared warmer domain primitives.
//!
//! This crate owns target resolution, the identity contract served by warmed
//! functions, and the reduction of invocation outcomes into per-target
//! statistics. It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod aggregate;
pub mod contract;
pub mod error;
pub mod spin;
pub mod targets;
