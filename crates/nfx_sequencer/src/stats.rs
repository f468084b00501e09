//! Sequencer statistics.
//!
//! Counters are relaxed atomics so that forked sequencers running on
//! different threads can report into one shared instance.
//!
//! # Usage
//!
//! ```rust
//! use nfx_format::fields::SRC4_ADDR;
//! use nfx_sequencer::{SequenceEntry, Sequencer};
//!
//! let entries = [SequenceEntry::field(SRC4_ADDR)];
//! let sequencer = Sequencer::compile(&entries).unwrap();
//!
//! // Run records...
//!
//! let snapshot = sequencer.stats().snapshot();
//! println!("projected: {}", snapshot.records_projected);
//! println!("malformed: {}", snapshot.malformed_records);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Record processing counters.
#[derive(Debug, Default)]
pub struct SequencerStats {
    /// Records scanned successfully.
    records_scanned: AtomicU64,
    /// Records projected into an output buffer.
    records_projected: AtomicU64,
    /// Records rejected as malformed.
    malformed_records: AtomicU64,
    /// Projections rejected for an undersized output buffer.
    buffer_too_small: AtomicU64,
    /// Elements skipped because the catalog does not know their id.
    unknown_elements: AtomicU64,
    /// Entries zero-filled because their extension was absent.
    missing_extensions: AtomicU64,
    /// Total output bytes written.
    bytes_written: AtomicU64,
}

impl SequencerStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_scan(&self, unknown_elements: u64) {
        self.records_scanned.fetch_add(1, Ordering::Relaxed);
        if unknown_elements > 0 {
            self.unknown_elements
                .fetch_add(unknown_elements, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_projection(&self, bytes: u64, missing_extensions: u64) {
        self.records_projected.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        if missing_extensions > 0 {
            self.missing_extensions
                .fetch_add(missing_extensions, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_malformed(&self) {
        self.malformed_records.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_buffer_too_small(&self) {
        self.buffer_too_small.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of records scanned successfully.
    pub fn records_scanned(&self) -> u64 {
        self.records_scanned.load(Ordering::Relaxed)
    }

    /// Returns the number of records projected.
    pub fn records_projected(&self) -> u64 {
        self.records_projected.load(Ordering::Relaxed)
    }

    /// Returns the number of malformed records rejected.
    pub fn malformed_records(&self) -> u64 {
        self.malformed_records.load(Ordering::Relaxed)
    }

    /// Returns the number of undersized output buffers rejected.
    pub fn buffer_too_small(&self) -> u64 {
        self.buffer_too_small.load(Ordering::Relaxed)
    }

    /// Returns the number of unknown elements skipped.
    ///
    /// A steady non-zero rate usually means a newer producer.
    pub fn unknown_elements(&self) -> u64 {
        self.unknown_elements.load(Ordering::Relaxed)
    }

    /// Returns the number of zero-filled entries.
    pub fn missing_extensions(&self) -> u64 {
        self.missing_extensions.load(Ordering::Relaxed)
    }

    /// Returns the total output bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records_scanned: self.records_scanned(),
            records_projected: self.records_projected(),
            malformed_records: self.malformed_records(),
            buffer_too_small: self.buffer_too_small(),
            unknown_elements: self.unknown_elements(),
            missing_extensions: self.missing_extensions(),
            bytes_written: self.bytes_written(),
        }
    }
}

/// A point-in-time copy of [`SequencerStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Records scanned successfully.
    pub records_scanned: u64,
    /// Records projected.
    pub records_projected: u64,
    /// Malformed records rejected.
    pub malformed_records: u64,
    /// Undersized output buffers rejected.
    pub buffer_too_small: u64,
    /// Unknown elements skipped.
    pub unknown_elements: u64,
    /// Zero-filled entries.
    pub missing_extensions: u64,
    /// Output bytes written.
    pub bytes_written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_zero() {
        let stats = SequencerStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn record_operations() {
        let stats = SequencerStats::new();

        stats.record_scan(0);
        stats.record_scan(3);
        stats.record_projection(16, 1);
        stats.record_malformed();
        stats.record_buffer_too_small();

        let snap = stats.snapshot();
        assert_eq!(snap.records_scanned, 2);
        assert_eq!(snap.unknown_elements, 3);
        assert_eq!(snap.records_projected, 1);
        assert_eq!(snap.bytes_written, 16);
        assert_eq!(snap.missing_extensions, 1);
        assert_eq!(snap.malformed_records, 1);
        assert_eq!(snap.buffer_too_small, 1);
    }

    #[test]
    fn concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(SequencerStats::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let s = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    s.record_scan(0);
                    s.record_projection(8, 0);
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(stats.records_scanned(), 1000);
        assert_eq!(stats.bytes_written(), 8000);
    }
}
