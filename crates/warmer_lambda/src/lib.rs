//! AWS-oriented adapters and handlers for warming Lambda functions.
//!
//! This crate owns runtime integration details (Lambda handlers, the invoke
//! transport seam, and structured reporting) on top of the runtime-free
//! primitives in `warmer_core`.

pub mod adapters;
pub mod error;
pub mod handlers;
pub mod reporting;
