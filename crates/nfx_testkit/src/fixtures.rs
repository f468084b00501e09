//! Canned records, plans and test logging.

use std::sync::Once;

use nfx_format::{ExtensionCatalog, Record, RecordBuilder};
use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber writing to the test harness.
///
/// The filter comes from `RUST_LOG` and defaults to `debug`. Safe to call
/// from every test.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic payload for a standard extension.
///
/// Byte `i` is `id * 16 + i` (wrapping), so every byte identifies both its
/// extension and its position.
///
/// # Panics
///
/// Panics if `id` is not in the standard catalog or is variable-length.
pub fn standard_payload(id: u16) -> Vec<u8> {
    let size = ExtensionCatalog::standard()
        .get(id)
        .and_then(|def| def.fixed_size())
        .expect("standard fixed-size extension");
    (0..size)
        .map(|i| (usize::from(id) * 16 + i) as u8)
        .collect()
}

/// Builds a record holding the standard payload of each id, in the given
/// order.
pub fn record_with(ids: &[u16]) -> Record {
    ids.iter()
        .fold(RecordBuilder::new(), |builder, &id| {
            builder
                .add_extension(id, &standard_payload(id))
                .expect("standard extension")
        })
        .finish()
        .expect("record fits")
}

/// Builds a record from `(id, payload)` pairs without catalog checks.
pub fn record_from_elements(elements: &[(u16, Vec<u8>)]) -> Record {
    elements
        .iter()
        .fold(RecordBuilder::new(), |builder, (id, payload)| {
            builder.add_opaque(*id, payload).expect("element fits")
        })
        .finish()
        .expect("record fits")
}

/// Common test scenarios.
pub mod scenarios {
    use super::*;
    use nfx_format::fields::*;
    use nfx_format::{EX_CNT_FLOW, EX_FLOW_MISC, EX_IPV4_FLOW, EX_MSEC_TIME_FLOW};
    use nfx_sequencer::SequenceEntry;

    /// `[srcAddr(4), dstAddr(4), inBytes(8)]`.
    pub fn address_and_bytes_plan() -> Vec<SequenceEntry> {
        vec![
            SequenceEntry::field(SRC4_ADDR),
            SequenceEntry::field(DST4_ADDR),
            SequenceEntry::field(IN_BYTES),
        ]
    }

    /// A plan touching timing, addressing, ports and counters, with one
    /// computed duration at stack slot 0.
    pub fn flow_summary_plan() -> Vec<SequenceEntry> {
        vec![
            SequenceEntry::field(MSEC_FIRST),
            SequenceEntry::field(MSEC_LAST),
            SequenceEntry::stack(0, 8),
            SequenceEntry::field(SRC4_ADDR),
            SequenceEntry::field(DST4_ADDR),
            SequenceEntry::field_as(SRC_PORT, 4),
            SequenceEntry::field_as(DST_PORT, 4),
            SequenceEntry::field(PROTO),
            SequenceEntry::field(TCP_FLAGS),
            SequenceEntry::field(IN_PACKETS),
            SequenceEntry::field(IN_BYTES),
        ]
    }

    /// Output size of [`flow_summary_plan`].
    pub const FLOW_SUMMARY_LEN: usize = 8 + 8 + 8 + 4 + 4 + 4 + 4 + 1 + 2 + 8 + 8;

    /// A record carrying only `EXipv4Flow` with 10.0.0.1 -> 10.0.0.2.
    pub fn ipv4_only_record() -> Record {
        RecordBuilder::new()
            .add_extension(EX_IPV4_FLOW, &[0x0A, 0x00, 0x00, 0x01, 0x0A, 0x00, 0x00, 0x02])
            .expect("ipv4 payload")
            .finish()
            .expect("record fits")
    }

    /// A typical flow: timing, addresses, misc and counters.
    pub fn typical_flow_record() -> Record {
        record_with(&[EX_MSEC_TIME_FLOW, EX_IPV4_FLOW, EX_FLOW_MISC, EX_CNT_FLOW])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfx_format::{RecordView, EX_IPV4_FLOW, HEADER_SIZE};

    #[test]
    fn standard_payload_pattern() {
        let payload = standard_payload(EX_IPV4_FLOW);
        assert_eq!(payload, vec![64, 65, 66, 67, 68, 69, 70, 71]);
    }

    #[test]
    fn record_with_keeps_order() {
        let record = record_with(&[8, 4]);
        let view = RecordView::parse(record.as_bytes()).unwrap();
        let ids: Vec<u16> = view.elements().map(|e| e.unwrap().type_id).collect();
        assert_eq!(ids, vec![8, 4]);
    }

    #[test]
    fn scenario_records() {
        let record = scenarios::ipv4_only_record();
        assert_eq!(record.len(), HEADER_SIZE + 12);
        assert_eq!(scenarios::typical_flow_record().header().num_elements, 4);
    }

    #[test]
    fn tracing_init_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }
}
