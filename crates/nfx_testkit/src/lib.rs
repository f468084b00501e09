//! # NFX Testkit
//!
//! Test utilities for the NFX record format and sequencer.
//!
//! This crate provides:
//! - Canned records, plans and test logging
//! - Property-based test generators using proptest
//! - Fuzz targets for the reader and the sequencer
//! - Shareable projection test vectors
//!
//! ## Usage
//!
//! ```rust
//! use nfx_testkit::prelude::*;
//! use nfx_sequencer::Sequencer;
//!
//! init_test_tracing();
//! let entries = scenarios::address_and_bytes_plan();
//! let mut sequencer = Sequencer::compile(&entries).unwrap();
//! let record = scenarios::ipv4_only_record();
//! assert_eq!(sequencer.size_for_record(record.as_bytes()).unwrap(), 16);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use vectors::*;
