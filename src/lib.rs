//! Expense E2E - end-to-end verification harness for the expense service
//!
//! Drives a declarative HTTP workflow against a running server, threading
//! tokens and ids between steps and classifying each step's outcome.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
