//! Audits community partitions of directed graphs.
//!
//! The graph is read from one of several text encodings, made undirected, and
//! every community of an externally computed partition is checked for
//! internal connectivity. See [`pipeline::run_audit`] for the whole flow.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod graph_io;
pub mod io_status;
pub mod membership;
pub mod pipeline;
pub mod report;
pub mod types;
mod util;

pub use error::{AuditError, Result};
