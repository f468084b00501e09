//! Shareable sequencer test vectors.
//!
//! Each vector pairs a hex-encoded input record and an entry list with the
//! expected projection or error kind, so other implementations can check
//! themselves against the same cases.

use nfx_sequencer::{SequenceEntry, Sequencer, SequencerError};
use serde::{Deserialize, Serialize};

/// Serializable form of a [`SequenceEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    /// Source extension id.
    pub extension: u16,
    /// Offset within the extension payload.
    pub offset: u16,
    /// Source length.
    pub input_length: u16,
    /// Destination length.
    pub output_length: u16,
    /// Computed-value stack slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_slot: Option<u16>,
}

impl From<SequenceEntry> for EntrySpec {
    fn from(entry: SequenceEntry) -> Self {
        Self {
            extension: entry.extension,
            offset: entry.offset,
            input_length: entry.input_length,
            output_length: entry.output_length,
            stack_slot: entry.stack_slot,
        }
    }
}

impl From<EntrySpec> for SequenceEntry {
    fn from(raw: EntrySpec) -> Self {
        let entry = SequenceEntry::copy(
            raw.extension,
            raw.offset,
            raw.input_length,
            raw.output_length,
        );
        match raw.stack_slot {
            Some(slot) => entry.with_stack_slot(slot),
            None => entry,
        }
    }
}

/// A projection test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Entries of the plan, in output order.
    pub entries: Vec<EntrySpec>,
    /// Input record (hex-encoded).
    pub record_hex: String,
    /// Computed-value stack.
    #[serde(default)]
    pub stack: Vec<u64>,
    /// Expected output (hex-encoded).
    pub expected_hex: String,
    /// Expected error kind (if this should fail).
    pub expected_error: Option<String>,
}

impl SequencerVector {
    /// Compiles the entries, sizes the output and projects the record.
    ///
    /// # Errors
    ///
    /// Returns whatever the sequencer reports.
    pub fn run(&self) -> Result<Vec<u8>, SequencerError> {
        let entries: Vec<SequenceEntry> = self.entries.iter().copied().map(Into::into).collect();
        let record = hex_decode(&self.record_hex);

        let mut sequencer = Sequencer::compile(&entries)?;
        let size = sequencer.size_for_record(&record)?;
        let mut out = vec![0u8; size];
        let written = sequencer.run(&record, &mut out, &self.stack)?;
        out.truncate(written);
        Ok(out)
    }
}

/// Short name of an error kind, as used in [`SequencerVector::expected_error`].
#[must_use]
pub fn error_kind(error: &SequencerError) -> &'static str {
    match error {
        SequencerError::Configuration { .. } => "Configuration",
        SequencerError::MalformedRecord { .. } => "MalformedRecord",
        SequencerError::BufferTooSmall { .. } => "BufferTooSmall",
    }
}

fn entry(extension: u16, offset: u16, input_length: u16, output_length: u16) -> EntrySpec {
    SequenceEntry::copy(extension, offset, input_length, output_length).into()
}

/// Projection vectors.
pub fn sequencer_vectors() -> Vec<SequencerVector> {
    vec![
        SequencerVector {
            id: "missing_extension_zero_fill".into(),
            description: "srcAddr, dstAddr and inBytes against an ipv4-only record".into(),
            entries: vec![entry(4, 0, 4, 4), entry(4, 4, 4, 4), entry(8, 16, 8, 8)],
            record_hex: "0b001800010000000000000004000c000a0000010a000002".into(),
            stack: vec![],
            expected_hex: "0a0000010a0000020000000000000000".into(),
            expected_error: None,
        },
        SequencerVector {
            id: "size_below_elements".into(),
            description: "declared record size smaller than its elements".into(),
            entries: vec![entry(4, 0, 4, 4)],
            record_hex: "0b001400010000000000000004000c000a0000010a000002".into(),
            stack: vec![],
            expected_hex: String::new(),
            expected_error: Some("MalformedRecord".into()),
        },
        SequencerVector {
            id: "stack_value".into(),
            description: "one 8 byte stack entry holding 42".into(),
            entries: vec![SequenceEntry::stack(0, 8).into()],
            record_hex: "0b001800010000000000000004000c000a0000010a000002".into(),
            stack: vec![42],
            expected_hex: "2a00000000000000".into(),
            expected_error: None,
        },
        SequencerVector {
            id: "unknown_element_skipped".into(),
            description: "element 200 precedes the ipv4 element".into(),
            entries: vec![entry(4, 0, 4, 4)],
            record_hex: "0b001e000200000000000000c8000600ffff04000c000a0000010a000002".into(),
            stack: vec![],
            expected_hex: "0a000001".into(),
            expected_error: None,
        },
        SequencerVector {
            id: "resize_fields".into(),
            description: "srcPort widened to 4, proto widened to 2, dstPort narrowed to 1".into(),
            entries: vec![entry(6, 0, 2, 4), entry(6, 6, 1, 2), entry(6, 2, 2, 1)],
            record_hex: "0b001800010000000000000006000c005000bb0112000600".into(),
            stack: vec![],
            expected_hex: "500000000600bb".into(),
            expected_error: None,
        },
        SequencerVector {
            id: "element_count_mismatch".into(),
            description: "header announces two elements, record holds one".into(),
            entries: vec![entry(4, 0, 4, 4)],
            record_hex: "0b001800020000000000000004000c000a0000010a000002".into(),
            stack: vec![],
            expected_hex: String::new(),
            expected_error: Some("MalformedRecord".into()),
        },
    ]
}

/// Generate all test vectors as JSON for cross-language use.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        sequencer: sequencer_vectors(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    sequencer: Vec<SequencerVector>,
}

/// Encodes bytes as hexadecimal string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decodes hexadecimal string to bytes.
pub fn hex_decode(hex: &str) -> Vec<u8> {
    let hex = hex.replace([' ', '\n', '\r'], "");
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("Invalid hex"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_vectors() {
        for vector in sequencer_vectors() {
            match (vector.run(), &vector.expected_error) {
                (Ok(out), None) => assert_eq!(
                    hex_encode(&out),
                    vector.expected_hex,
                    "Vector {} failed: {}",
                    vector.id,
                    vector.description
                ),
                (Err(err), Some(kind)) => assert_eq!(
                    error_kind(&err),
                    kind,
                    "Vector {} failed: {}",
                    vector.id,
                    vector.description
                ),
                (result, _) => panic!("Vector {} unexpected result: {:?}", vector.id, result),
            }
        }
    }

    #[test]
    fn test_vector_ids_unique() {
        let vectors = sequencer_vectors();
        let mut ids: Vec<_> = vectors.iter().map(|v| v.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), vectors.len());
    }

    #[test]
    fn test_json_round_trip() {
        let json = all_vectors_json();
        let parsed: AllTestVectors = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.sequencer.len(), sequencer_vectors().len());
        assert_eq!(parsed.sequencer[2].entries[0].stack_slot, Some(0));
    }

    #[test]
    fn test_entry_spec_conversion() {
        let entry = SequenceEntry::stack(3, 4);
        let raw = EntrySpec::from(entry);
        assert_eq!(SequenceEntry::from(raw), entry);
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(hex_encode(&[0x0a, 0xff]), "0aff");
        assert_eq!(hex_decode("0a ff\n"), vec![0x0a, 0xff]);
    }
}
