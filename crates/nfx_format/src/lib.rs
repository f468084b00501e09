//! # NFX Format
//!
//! The V3 flow record format.
//!
//! A record is a fixed 12 byte header followed by any number of extension
//! elements. Each element carries a 4 byte header (type id, length) and a
//! typed payload whose shape is declared by the [`ExtensionCatalog`].
//! Extensions are independent of each other: any subset may appear, in any
//! order, and readers skip ids they do not know.
//!
//! ## Usage
//!
//! ```
//! use nfx_format::{RecordBuilder, RecordView, EX_CNT_FLOW, EX_IPV4_FLOW};
//!
//! let record = RecordBuilder::new()
//!     .add_extension(EX_IPV4_FLOW, &[10, 0, 0, 1, 10, 0, 0, 2])
//!     .unwrap()
//!     .add_extension(EX_CNT_FLOW, &[0; 40])
//!     .unwrap()
//!     .finish()
//!     .unwrap();
//!
//! let view = RecordView::parse(record.as_bytes()).unwrap();
//! let ids: Vec<u16> = view.elements().map(|e| e.unwrap().type_id).collect();
//! assert_eq!(ids, vec![EX_IPV4_FLOW, EX_CNT_FLOW]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
pub mod catalog;
mod error;
pub mod fields;
mod header;
mod reader;

pub use builder::{Record, RecordBuilder};
pub use catalog::*;
pub use error::{FormatError, FormatResult};
pub use fields::Field;
pub use header::{
    ElementHeader, RecordHeader, ELEMENT_HEADER_SIZE, HEADER_SIZE, MAX_RECORD_SIZE, V3_RECORD,
};
pub use reader::{Element, Elements, RecordView};
