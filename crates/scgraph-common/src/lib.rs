//! SCGraph Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the SCGraph workspace.
//!
//! # Overview
//!
//! - **Types**: the follower-graph domain model (accounts, profiles, rank edges)
//! - **Error Handling**: record-level error type and result alias
//! - **Logging**: tracing subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use scgraph_common::types::AccountId;
//! use scgraph_common::Result;
//!
//! fn parse(raw: &str) -> Result<AccountId> {
//!     raw.parse()
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{GraphError, Result};
