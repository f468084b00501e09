//! Record builder.

use bytes::{BufMut, Bytes, BytesMut};

use crate::catalog::ExtensionCatalog;
use crate::error::{FormatError, FormatResult};
use crate::header::{ElementHeader, RecordHeader, ELEMENT_HEADER_SIZE, HEADER_SIZE, MAX_RECORD_SIZE};
use crate::reader::RecordView;

/// Accumulates extension elements into a V3 record.
///
/// # Example
///
/// ```
/// use nfx_format::{RecordBuilder, EX_IPV4_FLOW};
///
/// let record = RecordBuilder::new()
///     .exporter_id(3)
///     .add_extension(EX_IPV4_FLOW, &[10, 0, 0, 1, 10, 0, 0, 2])
///     .unwrap()
///     .finish()
///     .unwrap();
///
/// assert_eq!(record.header().num_elements, 1);
/// assert_eq!(record.len(), 12 + 4 + 8);
/// ```
#[derive(Debug)]
pub struct RecordBuilder<'c> {
    catalog: &'c ExtensionCatalog,
    header: RecordHeader,
    buf: BytesMut,
}

impl RecordBuilder<'static> {
    /// Begins a record validated against the standard catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(ExtensionCatalog::standard())
    }
}

impl Default for RecordBuilder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> RecordBuilder<'c> {
    /// Begins a record validated against `catalog`.
    #[must_use]
    pub fn with_catalog(catalog: &'c ExtensionCatalog) -> Self {
        let mut buf = BytesMut::with_capacity(256);
        buf.put_bytes(0, HEADER_SIZE);
        Self {
            catalog,
            header: RecordHeader::v3(),
            buf,
        }
    }

    /// Sets the engine type.
    #[must_use]
    pub fn engine_type(mut self, value: u8) -> Self {
        self.header.engine_type = value;
        self
    }

    /// Sets the engine id.
    #[must_use]
    pub fn engine_id(mut self, value: u8) -> Self {
        self.header.engine_id = value;
        self
    }

    /// Sets the exporter id.
    #[must_use]
    pub fn exporter_id(mut self, value: u16) -> Self {
        self.header.exporter_id = value;
        self
    }

    /// Sets the record flags.
    #[must_use]
    pub fn flags(mut self, value: u16) -> Self {
        self.header.flags = value;
        self
    }

    /// Appends a cataloged extension element.
    ///
    /// # Errors
    ///
    /// Fails if the id is unknown, if the payload size differs from the
    /// catalog size of a fixed-size type, or if the element cannot be
    /// represented.
    pub fn add_extension(self, type_id: u16, payload: &[u8]) -> FormatResult<Self> {
        let def = self
            .catalog
            .get(type_id)
            .ok_or(FormatError::UnknownExtension { id: type_id })?;

        if let Some(expected) = def.fixed_size() {
            if payload.len() != expected {
                return Err(FormatError::PayloadSizeMismatch {
                    id: type_id,
                    expected,
                    actual: payload.len(),
                });
            }
        }

        self.push_element(type_id, payload)
    }

    /// Appends an element without consulting the catalog.
    ///
    /// Used to carry extensions this reader does not know about, such as
    /// records relayed from a newer producer.
    ///
    /// # Errors
    ///
    /// Fails if the element cannot be represented.
    pub fn add_opaque(self, type_id: u16, payload: &[u8]) -> FormatResult<Self> {
        self.push_element(type_id, payload)
    }

    /// Returns the number of bytes the record currently occupies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no element has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header.num_elements == 0
    }

    fn push_element(mut self, type_id: u16, payload: &[u8]) -> FormatResult<Self> {
        let element_len = ELEMENT_HEADER_SIZE + payload.len();
        let size = self.buf.len() + element_len;
        if size > MAX_RECORD_SIZE {
            return Err(FormatError::RecordTooLarge {
                size,
                max: MAX_RECORD_SIZE,
            });
        }

        // Bounded by MAX_RECORD_SIZE above.
        let header = ElementHeader::new(type_id, element_len as u16);
        self.buf.put_slice(&header.encode());
        self.buf.put_slice(payload);
        self.header.num_elements += 1;
        Ok(self)
    }

    /// Writes the record header and returns the immutable record.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::RecordTooLarge`] if the record exceeds the
    /// 16-bit size field.
    pub fn finish(mut self) -> FormatResult<Record> {
        let size = self.buf.len();
        if size > MAX_RECORD_SIZE {
            return Err(FormatError::RecordTooLarge {
                size,
                max: MAX_RECORD_SIZE,
            });
        }

        self.header.size = size as u16;
        self.header.encode_into(&mut self.buf[..HEADER_SIZE]);
        Ok(Record {
            header: self.header,
            bytes: self.buf.freeze(),
        })
    }
}

/// An immutable, validated record buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: RecordHeader,
    bytes: Bytes,
}

impl Record {
    /// Wraps received bytes after validating the record header.
    ///
    /// Bytes beyond the declared record size are dropped.
    ///
    /// # Errors
    ///
    /// Fails if the header is truncated or inconsistent with the buffer.
    pub fn from_bytes(bytes: Bytes) -> FormatResult<Self> {
        let header = RecordView::parse(&bytes)?.header();
        let bytes = bytes.slice(..usize::from(header.size));
        Ok(Self { header, bytes })
    }

    /// Returns the record header.
    #[must_use]
    pub fn header(&self) -> RecordHeader {
        self.header
    }

    /// Returns the encoded record.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the encoded size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the record holds only its header.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header.num_elements == 0
    }

    /// Returns a borrowed view for element iteration.
    #[must_use]
    pub fn view(&self) -> RecordView<'_> {
        RecordView::from_parts(self.header, &self.bytes)
    }

    /// Consumes the record, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for Record {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
