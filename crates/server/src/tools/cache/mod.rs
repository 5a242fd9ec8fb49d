//! Cache administration MCP tools.
//!
//! This module provides the out-of-band purge signal and cache statistics.

pub mod purge;
pub mod stats;

pub use purge::{CachePurgeParams, purge_impl};
pub use stats::stats_impl;
