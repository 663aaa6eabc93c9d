// Main library entry point for testreach.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use error::{ReachError, Result};
