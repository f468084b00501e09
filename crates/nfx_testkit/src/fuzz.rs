//! Fuzz targets for the record reader and the sequencer.
//!
//! Each target accepts arbitrary bytes and must never panic. They can be
//! driven by cargo-fuzz or by the proptest wrappers in this crate's tests.

use nfx_format::fields::{DST4_ADDR, IN_BYTES, MSEC_FIRST, PROTO, SRC4_ADDR, SRC_PORT};
use nfx_format::RecordView;
use nfx_sequencer::{SequenceEntry, Sequencer, SequencerError, SequencerConfig};

static FUZZ_ENTRIES: [SequenceEntry; 7] = [
    SequenceEntry::field(MSEC_FIRST),
    SequenceEntry::field(SRC4_ADDR),
    SequenceEntry::field(DST4_ADDR),
    SequenceEntry::field_as(SRC_PORT, 4),
    SequenceEntry::field(PROTO),
    SequenceEntry::field(IN_BYTES),
    SequenceEntry::stack(0, 8),
];

/// Fuzz target for the element iterator.
///
/// Every element either parses inside the record bounds or the iterator
/// reports an error and stops.
pub fn fuzz_record_view(data: &[u8]) {
    let Ok(view) = RecordView::parse(data) else {
        return;
    };
    let size = view.as_bytes().len();
    for element in view.elements() {
        match element {
            Ok(element) => assert!(element.offset + element.length() <= size),
            Err(_) => break,
        }
    }
}

/// Fuzz target for sizing and projection.
///
/// Runs the input through strict and lenient sequencers. A successful
/// projection must write exactly the size reported for the record.
pub fn fuzz_sequencer_run(data: &[u8]) {
    for config in [SequencerConfig::default(), SequencerConfig::lenient()] {
        let plan = match nfx_sequencer::SequencePlan::compile(&FUZZ_ENTRIES) {
            Ok(plan) => plan,
            Err(e) => panic!("fuzz plan does not compile: {e}"),
        };
        let mut sequencer = Sequencer::with_config(plan, config);

        let size = match sequencer.size_for_record(data) {
            Ok(size) => size,
            Err(SequencerError::MalformedRecord { .. }) => continue,
            Err(e) => panic!("unexpected sizing error: {e}"),
        };
        let mut out = vec![0u8; size];
        let written = sequencer
            .run(data, &mut out, &[u64::MAX])
            .expect("sized buffer accepted");
        assert_eq!(written, size);
    }
}
