//! Testing utilities for the MySQL sink
//!
//! This module provides Docker container management for MySQL testing.

pub mod container;

pub use container::MySQLContainer;
