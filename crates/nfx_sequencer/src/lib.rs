//! # NFX Sequencer
//!
//! Projects V3 flow records into caller-defined output layouts.
//!
//! A list of [`SequenceEntry`] values describes the output record field by
//! field. It is compiled once into a [`SequencePlan`]; every input record is
//! then scanned once to locate its extensions and the selected byte ranges
//! are copied, in entry order, into a packed output buffer. Values computed
//! by the caller (durations, rates) are interleaved from a `u64` stack.
//!
//! - Missing extensions produce zero bytes, never errors.
//! - Unknown extension ids in the input are skipped.
//! - The output size is known before writing, and nothing is written when
//!   the output buffer is too small.
//!
//! ## Usage
//!
//! ```
//! use nfx_format::fields::{DST4_ADDR, IN_BYTES, SRC4_ADDR};
//! use nfx_format::{RecordBuilder, EX_CNT_FLOW, EX_IPV4_FLOW};
//! use nfx_sequencer::{SequenceEntry, Sequencer};
//!
//! let entries = [
//!     SequenceEntry::field(SRC4_ADDR),
//!     SequenceEntry::field(DST4_ADDR),
//!     SequenceEntry::field(IN_BYTES),
//!     SequenceEntry::stack(0, 8),
//! ];
//! let mut sequencer = Sequencer::compile(&entries).unwrap();
//!
//! let record = RecordBuilder::new()
//!     .add_extension(EX_CNT_FLOW, &[0; 40])
//!     .unwrap()
//!     .add_extension(EX_IPV4_FLOW, &[192, 168, 0, 1, 192, 168, 0, 2])
//!     .unwrap()
//!     .finish()
//!     .unwrap();
//!
//! let size = sequencer.size_for_record(record.as_bytes()).unwrap();
//! let mut out = vec![0u8; size];
//! sequencer.run(record.as_bytes(), &mut out, &[1500]).unwrap();
//! assert_eq!(&out[..4], &[192, 168, 0, 1]);
//! assert_eq!(&out[16..], &1500u64.to_le_bytes());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod describe;
mod engine;
mod error;
mod plan;
mod sequence;
mod stats;

pub use cache::{Position, PositionCache};
pub use config::SequencerConfig;
pub use describe::describe;
pub use engine::{ScannedRecord, Sequencer};
pub use error::{SequencerError, SequencerResult};
pub use plan::SequencePlan;
pub use sequence::SequenceEntry;
pub use stats::{SequencerStats, StatsSnapshot};
