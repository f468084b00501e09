//! Record and element headers.
//!
//! Layout (all fields little-endian):
//!
//! ```text
//! record header (12 bytes)
//!   0  type         u16
//!   2  size         u16   header + all elements
//!   4  num_elements u16
//!   6  engine_type  u8
//!   7  engine_id    u8
//!   8  exporter_id  u16
//!  10  flags        u16
//!
//! element header (4 bytes)
//!   0  type         u16
//!   2  length       u16   header + payload
//! ```

use crate::error::{FormatError, FormatResult};

/// Record type tag of a V3 record.
pub const V3_RECORD: u16 = 11;

/// Size of the record header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Size of an element header in bytes.
pub const ELEMENT_HEADER_SIZE: usize = 4;

/// Largest record representable by the 16-bit size field.
pub const MAX_RECORD_SIZE: usize = u16::MAX as usize;

#[inline]
fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

/// Fixed-size prefix of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordHeader {
    /// Record type tag.
    pub record_type: u16,
    /// Total size in bytes, header included.
    pub size: u16,
    /// Number of extension elements.
    pub num_elements: u16,
    /// Engine type of the producing subsystem.
    pub engine_type: u8,
    /// Engine id of the producing subsystem.
    pub engine_id: u8,
    /// Exporter identifier.
    pub exporter_id: u16,
    /// Record flags.
    pub flags: u16,
}

impl RecordHeader {
    /// Creates an empty V3 header: no elements, size equal to the header.
    #[must_use]
    pub const fn v3() -> Self {
        Self {
            record_type: V3_RECORD,
            size: HEADER_SIZE as u16,
            num_elements: 0,
            engine_type: 0,
            engine_id: 0,
            exporter_id: 0,
            flags: 0,
        }
    }

    /// Encodes the header into the first [`HEADER_SIZE`] bytes of `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`HEADER_SIZE`].
    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.record_type.to_le_bytes());
        buf[2..4].copy_from_slice(&self.size.to_le_bytes());
        buf[4..6].copy_from_slice(&self.num_elements.to_le_bytes());
        buf[6] = self.engine_type;
        buf[7] = self.engine_id;
        buf[8..10].copy_from_slice(&self.exporter_id.to_le_bytes());
        buf[10..12].copy_from_slice(&self.flags.to_le_bytes());
    }

    /// Encodes the header to a new array.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Decodes a header from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Truncated`] if fewer than [`HEADER_SIZE`] bytes
    /// are available.
    pub fn decode(data: &[u8]) -> FormatResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(FormatError::Truncated {
                offset: 0,
                needed: HEADER_SIZE,
                available: data.len(),
            });
        }

        Ok(Self {
            record_type: read_u16(data, 0),
            size: read_u16(data, 2),
            num_elements: read_u16(data, 4),
            engine_type: data[6],
            engine_id: data[7],
            exporter_id: read_u16(data, 8),
            flags: read_u16(data, 10),
        })
    }
}

/// Fixed-size prefix of every extension payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    /// Extension-type id.
    pub type_id: u16,
    /// Element length in bytes, header included.
    pub length: u16,
}

impl ElementHeader {
    /// Creates an element header.
    #[must_use]
    pub const fn new(type_id: u16, length: u16) -> Self {
        Self { type_id, length }
    }

    /// Returns the payload length implied by `length`.
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(ELEMENT_HEADER_SIZE)
    }

    /// Encodes the header.
    #[must_use]
    pub fn encode(&self) -> [u8; ELEMENT_HEADER_SIZE] {
        let mut buf = [0u8; ELEMENT_HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.type_id.to_le_bytes());
        buf[2..4].copy_from_slice(&self.length.to_le_bytes());
        buf
    }

    /// Decodes an element header at `offset` within `data`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Truncated`] if the header does not fit.
    pub fn decode_at(data: &[u8], offset: usize) -> FormatResult<Self> {
        let available = data.len().saturating_sub(offset);
        if available < ELEMENT_HEADER_SIZE {
            return Err(FormatError::Truncated {
                offset,
                needed: ELEMENT_HEADER_SIZE,
                available,
            });
        }

        Ok(Self {
            type_id: read_u16(data, offset),
            length: read_u16(data, offset + 2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v3_header_defaults() {
        let header = RecordHeader::v3();
        assert_eq!(header.record_type, V3_RECORD);
        assert_eq!(usize::from(header.size), HEADER_SIZE);
        assert_eq!(header.num_elements, 0);
    }

    #[test]
    fn header_layout_is_fixed() {
        let header = RecordHeader {
            record_type: V3_RECORD,
            size: 0x0102,
            num_elements: 3,
            engine_type: 0xAA,
            engine_id: 0xBB,
            exporter_id: 0x0304,
            flags: 0x0506,
        };

        assert_eq!(
            header.encode(),
            [0x0B, 0x00, 0x02, 0x01, 0x03, 0x00, 0xAA, 0xBB, 0x04, 0x03, 0x06, 0x05]
        );
        assert_eq!(RecordHeader::decode(&header.encode()).unwrap(), header);
    }

    #[test]
    fn short_header_is_truncated() {
        let result = RecordHeader::decode(&[0u8; 11]);
        assert_eq!(
            result,
            Err(FormatError::Truncated {
                offset: 0,
                needed: HEADER_SIZE,
                available: 11
            })
        );
    }

    #[test]
    fn element_header_at_offset() {
        let mut data = vec![0xFF; 6];
        data.extend_from_slice(&ElementHeader::new(8, 44).encode());

        let element = ElementHeader::decode_at(&data, 6).unwrap();
        assert_eq!(element.type_id, 8);
        assert_eq!(element.length, 44);
        assert_eq!(element.payload_len(), 40);

        assert!(matches!(
            ElementHeader::decode_at(&data, 8),
            Err(FormatError::Truncated { offset: 8, .. })
        ));
    }
}
