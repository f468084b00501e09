//! Borrowed record reader.

use std::iter::FusedIterator;

use crate::error::{FormatError, FormatResult};
use crate::header::{ElementHeader, RecordHeader, ELEMENT_HEADER_SIZE, HEADER_SIZE};

/// One extension element located inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// Extension-type id.
    pub type_id: u16,
    /// Offset of the element header from the start of the record.
    pub offset: usize,
    /// Element payload (header excluded).
    pub payload: &'a [u8],
}

impl Element<'_> {
    /// Offset of the payload from the start of the record.
    #[must_use]
    pub fn payload_offset(&self) -> usize {
        self.offset + ELEMENT_HEADER_SIZE
    }

    /// Element length as written in its header.
    #[must_use]
    pub fn length(&self) -> usize {
        ELEMENT_HEADER_SIZE + self.payload.len()
    }
}

/// A record borrowed from a caller buffer.
///
/// The view is bounded by the header's declared size; nothing past it is
/// ever read.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    header: RecordHeader,
    data: &'a [u8],
}

impl<'a> RecordView<'a> {
    /// Parses the record header at the start of `data`.
    ///
    /// # Errors
    ///
    /// Fails if the header is truncated, declares a size smaller than the
    /// header itself, or declares more bytes than `data` holds.
    pub fn parse(data: &'a [u8]) -> FormatResult<Self> {
        let header = RecordHeader::decode(data)?;
        let size = usize::from(header.size);

        if size < HEADER_SIZE {
            return Err(FormatError::invalid_header(format!(
                "declared size {size} is smaller than the {HEADER_SIZE} byte header"
            )));
        }
        if size > data.len() {
            return Err(FormatError::Truncated {
                offset: 0,
                needed: size,
                available: data.len(),
            });
        }

        Ok(Self {
            header,
            data: &data[..size],
        })
    }

    pub(crate) fn from_parts(header: RecordHeader, data: &'a [u8]) -> Self {
        Self { header, data }
    }

    /// Returns the record header.
    #[must_use]
    pub fn header(&self) -> RecordHeader {
        self.header
    }

    /// Returns the record bytes, bounded by the declared size.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Iterates over the elements in record order.
    ///
    /// The iterator yields an error for the first inconsistent element
    /// header and stops afterwards.
    #[must_use]
    pub fn elements(&self) -> Elements<'a> {
        Elements {
            data: self.data,
            pos: HEADER_SIZE,
            failed: false,
        }
    }
}

/// Iterator over the elements of a [`RecordView`].
#[derive(Debug, Clone)]
pub struct Elements<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Elements<'a> {
    /// Offset of the next element header.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn fail(&mut self, error: FormatError) -> Option<FormatResult<Element<'a>>> {
        self.failed = true;
        Some(Err(error))
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = FormatResult<Element<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }

        let offset = self.pos;
        let header = match ElementHeader::decode_at(self.data, offset) {
            Ok(header) => header,
            Err(e) => return self.fail(e),
        };

        let length = usize::from(header.length);
        let remaining = self.data.len() - offset;
        if length < ELEMENT_HEADER_SIZE {
            return self.fail(FormatError::InvalidElementLength {
                id: header.type_id,
                length: header.length,
                offset,
            });
        }
        if length > remaining {
            return self.fail(FormatError::Truncated {
                offset,
                needed: length,
                available: remaining,
            });
        }

        self.pos = offset + length;
        Some(Ok(Element {
            type_id: header.type_id,
            offset,
            payload: &self.data[offset + ELEMENT_HEADER_SIZE..offset + length],
        }))
    }
}

impl FusedIterator for Elements<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RecordBuilder;
    use crate::catalog::{EX_FLOW_MISC, EX_IPV4_FLOW};

    fn two_element_record() -> Vec<u8> {
        RecordBuilder::new()
            .add_extension(EX_FLOW_MISC, &[1, 2, 3, 4, 5, 6, 7, 8])
            .unwrap()
            .add_extension(EX_IPV4_FLOW, &[9; 8])
            .unwrap()
            .finish()
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    #[test]
    fn iterates_elements_in_order() {
        let data = two_element_record();
        let view = RecordView::parse(&data).unwrap();
        let elements: Vec<_> = view.elements().collect::<FormatResult<_>>().unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].type_id, EX_FLOW_MISC);
        assert_eq!(elements[0].offset, HEADER_SIZE);
        assert_eq!(elements[0].payload_offset(), HEADER_SIZE + 4);
        assert_eq!(elements[0].payload, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(elements[1].type_id, EX_IPV4_FLOW);
        assert_eq!(elements[1].offset, HEADER_SIZE + 12);
        assert_eq!(elements[1].length(), 12);
    }

    #[test]
    fn declared_size_past_buffer_is_truncated() {
        let data = two_element_record();
        let result = RecordView::parse(&data[..data.len() - 1]);
        assert!(matches!(result, Err(FormatError::Truncated { offset: 0, .. })));
    }

    #[test]
    fn declared_size_below_header_is_invalid() {
        let mut data = two_element_record();
        data[2..4].copy_from_slice(&4u16.to_le_bytes());
        assert!(matches!(
            RecordView::parse(&data),
            Err(FormatError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn element_past_declared_size_fails() {
        let mut data = two_element_record();
        // Shrink the declared size so the second element overruns it.
        let size = (data.len() - 2) as u16;
        data[2..4].copy_from_slice(&size.to_le_bytes());

        let view = RecordView::parse(&data).unwrap();
        let mut elements = view.elements();
        assert!(elements.next().unwrap().is_ok());
        assert!(matches!(
            elements.next(),
            Some(Err(FormatError::Truncated { .. }))
        ));
        assert!(elements.next().is_none());
    }

    #[test]
    fn zero_length_element_fails() {
        let mut data = two_element_record();
        data[HEADER_SIZE + 2..HEADER_SIZE + 4].copy_from_slice(&0u16.to_le_bytes());

        let view = RecordView::parse(&data).unwrap();
        let first = view.elements().next().unwrap();
        assert!(matches!(
            first,
            Err(FormatError::InvalidElementLength { length: 0, .. })
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn elements_stay_inside_declared_size(data in prop::collection::vec(any::<u8>(), 0..256)) {
                if let Ok(view) = RecordView::parse(&data) {
                    let size = view.as_bytes().len();
                    let mut elements = view.elements();
                    for element in elements.by_ref() {
                        match element {
                            Ok(element) => prop_assert!(element.offset + element.length() <= size),
                            Err(_) => break,
                        }
                    }
                    prop_assert!(elements.next().is_none());
                }
            }
        }
    }
}
