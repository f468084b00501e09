//! Property-based test generators using proptest.
//!
//! Records are generated as `(id, payload)` element lists so tests can
//! permute, extend or drop elements before building the record bytes.

use std::sync::OnceLock;

use nfx_format::{fields, ExtensionCatalog, ExtensionDef, Field, MAX_ELEMENTS, VARLENGTH};
use nfx_sequencer::SequenceEntry;
use proptest::prelude::*;

/// One record element: extension id and payload.
pub type ElementSpec = (u16, Vec<u8>);

fn standard_size(id: u16) -> usize {
    ExtensionCatalog::standard()
        .get(id)
        .and_then(|def| def.fixed_size())
        .unwrap_or(0)
}

/// Strategy for standard extension ids (`1..=30`).
pub fn standard_id_strategy() -> impl Strategy<Value = u16> {
    1u16..MAX_ELEMENTS as u16
}

/// Strategy for a standard element with a random payload of the catalog
/// size.
pub fn element_strategy() -> impl Strategy<Value = ElementSpec> {
    standard_id_strategy().prop_flat_map(|id| {
        (
            Just(id),
            prop::collection::vec(any::<u8>(), standard_size(id)),
        )
    })
}

/// Strategy for elements the standard catalog does not know.
pub fn unknown_element_strategy() -> impl Strategy<Value = ElementSpec> {
    (
        MAX_ELEMENTS as u16..0xFFFE,
        prop::collection::vec(any::<u8>(), 0..64),
    )
}

/// Strategy for a set of standard elements with distinct ids, in random
/// order.
pub fn record_elements_strategy() -> impl Strategy<Value = Vec<ElementSpec>> {
    let ids: Vec<u16> = (1..MAX_ELEMENTS as u16).collect();
    prop::sample::subsequence(ids, 0..MAX_ELEMENTS)
        .prop_flat_map(|ids| {
            ids.into_iter()
                .map(|id| {
                    (
                        Just(id),
                        prop::collection::vec(any::<u8>(), standard_size(id)),
                    )
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

/// Strategy for a named field of a standard extension.
pub fn field_strategy() -> impl Strategy<Value = Field> {
    prop::sample::select(fields::ALL)
}

/// Strategy for a field entry, sometimes resized on output.
pub fn field_entry_strategy() -> impl Strategy<Value = SequenceEntry> {
    (field_strategy(), prop::option::of(1u16..=16)).prop_map(|(field, width)| match width {
        Some(width) => SequenceEntry::field_as(field, width),
        None => SequenceEntry::field(field),
    })
}

/// Strategy for a computed-value entry using stack slots `0..4`.
pub fn stack_entry_strategy() -> impl Strategy<Value = SequenceEntry> {
    (0u16..4, 1u16..=8).prop_map(|(slot, width)| SequenceEntry::stack(slot, width))
}

/// Strategy for a valid entry list over the standard catalog.
pub fn entries_strategy() -> impl Strategy<Value = Vec<SequenceEntry>> {
    prop::collection::vec(
        prop_oneof![
            4 => field_entry_strategy(),
            1 => stack_entry_strategy(),
        ],
        1..16,
    )
}

/// Strategy for a computed-value stack covering every slot used by
/// [`stack_entry_strategy`].
pub fn stack_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(any::<u64>(), 4)
}

/// Caller-defined variable-length extension registered by [`var_catalog`].
pub const VAR_EXTENSION: u16 = 40;

/// The standard catalog plus [`VAR_EXTENSION`] as a variable-length type.
pub fn var_catalog() -> &'static ExtensionCatalog {
    static CATALOG: OnceLock<ExtensionCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        ExtensionCatalog::builder()
            .extension(ExtensionDef::new(VAR_EXTENSION, VARLENGTH, "EXvarPayload"))
            .expect("id 40 is free in the standard table")
            .build()
    })
}

/// Strategy for entries reading [`VAR_EXTENSION`]: whole-tail copies,
/// fixed-width copies and variable-input copies into a fixed width.
pub fn var_entry_strategy() -> impl Strategy<Value = SequenceEntry> {
    prop_oneof![
        (0u16..24).prop_map(|offset| SequenceEntry::variable(VAR_EXTENSION, offset)),
        (0u16..24, 1u16..16, 1u16..16).prop_map(|(offset, input, output)| {
            SequenceEntry::copy(VAR_EXTENSION, offset, input, output)
        }),
        (0u16..24, 1u16..16).prop_map(|(offset, output)| {
            SequenceEntry::copy(VAR_EXTENSION, offset, VARLENGTH, output)
        }),
    ]
}

/// Strategy for an entry list over [`var_catalog`] mixing variable-length,
/// standard field and stack entries.
pub fn var_entries_strategy() -> impl Strategy<Value = Vec<SequenceEntry>> {
    prop::collection::vec(
        prop_oneof![
            2 => var_entry_strategy(),
            1 => field_entry_strategy(),
            1 => stack_entry_strategy(),
        ],
        1..12,
    )
}

/// Strategy for a record's elements plus an optional [`VAR_EXTENSION`]
/// payload, already inserted at a random position.
///
/// Yields `(elements, var_payload)`.
pub fn var_record_elements_strategy(
) -> impl Strategy<Value = (Vec<ElementSpec>, Option<Vec<u8>>)> {
    (
        record_elements_strategy(),
        prop::option::of(prop::collection::vec(any::<u8>(), 0..48)),
        any::<usize>(),
    )
        .prop_map(|(mut elements, payload, at)| {
            if let Some(payload) = &payload {
                let at = at % (elements.len() + 1);
                elements.insert(at, (VAR_EXTENSION, payload.clone()));
            }
            (elements, payload)
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
