//! Plan compilation.

use nfx_format::{ExtensionCatalog, ELEMENT_HEADER_SIZE, EX_NULL, HEADER_SIZE, VARLENGTH};
use tracing::debug;

use crate::cache::PositionCache;
use crate::error::{SequencerError, SequencerResult};
use crate::sequence::SequenceEntry;

/// A compiled, immutable projection plan.
///
/// The plan borrows its entry list and catalog. It is `Send + Sync`: any
/// number of workers may run it concurrently as long as each one owns its
/// own [`PositionCache`].
#[derive(Debug, Clone)]
pub struct SequencePlan<'a> {
    pub(crate) entries: &'a [SequenceEntry],
    pub(crate) catalog: &'a ExtensionCatalog,
    /// Indexed by extension id.
    pub(crate) referenced: Vec<bool>,
    /// Distinct referenced ids in first-reference order.
    pub(crate) extensions: Vec<u16>,
    /// Indexes of entries whose output width depends on the record.
    pub(crate) var_outputs: Vec<usize>,
    /// Sum of all fixed destination lengths.
    pub(crate) fixed_part: usize,
    pub(crate) has_var_length: bool,
    pub(crate) max_stack_slot: Option<u16>,
}

impl<'a> SequencePlan<'a> {
    /// Compiles `entries` against the standard catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Configuration`] if the list is empty or any
    /// entry is inconsistent with the catalog.
    pub fn compile(entries: &'a [SequenceEntry]) -> SequencerResult<Self> {
        Self::compile_with_catalog(entries, ExtensionCatalog::standard())
    }

    /// Compiles `entries` against a caller-supplied catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Configuration`] if the list is empty or any
    /// entry is inconsistent with the catalog.
    pub fn compile_with_catalog(
        entries: &'a [SequenceEntry],
        catalog: &'a ExtensionCatalog,
    ) -> SequencerResult<Self> {
        if entries.is_empty() {
            return Err(SequencerError::configuration("empty sequence entry list"));
        }

        let mut plan = Self {
            entries,
            catalog,
            referenced: vec![false; usize::from(catalog.max_id()) + 1],
            extensions: Vec::new(),
            var_outputs: Vec::new(),
            fixed_part: 0,
            has_var_length: false,
            max_stack_slot: None,
        };

        for (index, entry) in entries.iter().enumerate() {
            plan.add_entry(index, entry)?;
        }

        debug!(
            sequences = plan.num_sequences(),
            extensions = plan.num_extensions(),
            has_var_length = plan.has_var_length,
            fixed_output_len = ?plan.fixed_output_len(),
            "compiled sequence plan"
        );

        Ok(plan)
    }

    fn add_entry(&mut self, index: usize, entry: &SequenceEntry) -> SequencerResult<()> {
        let invalid =
            |reason: String| SequencerError::configuration(format!("entry {index}: {reason}"));

        if entry.output_length == 0 {
            return Err(invalid("output length is zero".into()));
        }

        if let Some(slot) = entry.stack_slot {
            if entry.is_var_output() {
                return Err(invalid("stack values need a fixed output length".into()));
            }
            if entry.extension != EX_NULL && !self.catalog.contains(entry.extension) {
                return Err(invalid(format!("unknown extension id {}", entry.extension)));
            }
            self.max_stack_slot = self.max_stack_slot.max(Some(slot));
            self.fixed_part += usize::from(entry.output_length);
            return Ok(());
        }

        if entry.extension == EX_NULL {
            return Err(invalid("EXnull carries no data".into()));
        }
        let def = self
            .catalog
            .get(entry.extension)
            .ok_or_else(|| invalid(format!("unknown extension id {}", entry.extension)))?;

        if entry.input_length == 0 {
            return Err(invalid("input length is zero".into()));
        }
        match def.fixed_size() {
            Some(size) => {
                if entry.input_length == VARLENGTH {
                    return Err(invalid(format!("{} is not variable-length", def.name)));
                }
                let end = usize::from(entry.offset) + usize::from(entry.input_length);
                if end > size {
                    return Err(invalid(format!(
                        "bytes {}..{end} exceed the {size} byte {} payload",
                        entry.offset, def.name
                    )));
                }
            }
            None => self.has_var_length = true,
        }
        if entry.is_var_output() && entry.input_length != VARLENGTH {
            return Err(invalid(
                "variable output length needs a variable input length".into(),
            ));
        }

        let slot = &mut self.referenced[usize::from(entry.extension)];
        if !*slot {
            *slot = true;
            self.extensions.push(entry.extension);
        }

        if entry.is_var_output() {
            self.var_outputs.push(index);
        } else {
            self.fixed_part += usize::from(entry.output_length);
        }
        Ok(())
    }

    /// The entry list, in output order.
    #[must_use]
    pub fn entries(&self) -> &'a [SequenceEntry] {
        self.entries
    }

    /// The catalog the plan was compiled against.
    #[must_use]
    pub fn catalog(&self) -> &'a ExtensionCatalog {
        self.catalog
    }

    /// Number of sequence entries.
    #[must_use]
    pub fn num_sequences(&self) -> usize {
        self.entries.len()
    }

    /// Number of distinct extensions read from input records.
    #[must_use]
    pub fn num_extensions(&self) -> usize {
        self.extensions.len()
    }

    /// Distinct extensions read from input records, in first-use order.
    #[must_use]
    pub fn extensions(&self) -> &[u16] {
        &self.extensions
    }

    /// Returns true if any entry reads extension `id` from the record.
    #[inline]
    #[must_use]
    pub fn references(&self, id: u16) -> bool {
        self.referenced
            .get(usize::from(id))
            .copied()
            .unwrap_or(false)
    }

    /// Returns true if any referenced extension is variable-length.
    #[must_use]
    pub fn has_var_length(&self) -> bool {
        self.has_var_length
    }

    /// Output size shared by every record, if it does not depend on the
    /// record.
    #[must_use]
    pub fn fixed_output_len(&self) -> Option<usize> {
        self.var_outputs.is_empty().then_some(self.fixed_part)
    }

    /// Size of a record carrying every referenced extension, when all of
    /// them are fixed-size.
    #[must_use]
    pub fn full_input_len(&self) -> Option<usize> {
        if self.has_var_length {
            return None;
        }
        let elements: usize = self
            .extensions
            .iter()
            .filter_map(|&id| self.catalog.get(id).and_then(|def| def.fixed_size()))
            .map(|size| ELEMENT_HEADER_SIZE + size)
            .sum();
        Some(HEADER_SIZE + elements)
    }

    /// Highest stack slot used, if any.
    #[must_use]
    pub fn max_stack_slot(&self) -> Option<u16> {
        self.max_stack_slot
    }

    /// Number of computed values a stack must provide.
    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.max_stack_slot.map_or(0, |slot| usize::from(slot) + 1)
    }

    /// Creates an empty position cache sized for this plan.
    #[must_use]
    pub fn new_cache(&self) -> PositionCache {
        PositionCache::new(self.referenced.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfx_format::fields::{DST4_ADDR, IN_BYTES, IN_PACKETS, SRC4_ADDR};
    use nfx_format::{ExtensionDef, EX_CNT_FLOW, EX_IPV4_FLOW};

    fn assert_configuration<T: std::fmt::Debug>(result: SequencerResult<T>, needle: &str) {
        match result {
            Err(SequencerError::Configuration { message }) => {
                assert!(message.contains(needle), "{message:?} lacks {needle:?}");
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn compile_fixed_plan() {
        let entries = [
            SequenceEntry::field(SRC4_ADDR),
            SequenceEntry::field(DST4_ADDR),
            SequenceEntry::field(IN_BYTES),
        ];
        let plan = SequencePlan::compile(&entries).unwrap();

        assert_eq!(plan.num_sequences(), 3);
        assert_eq!(plan.num_extensions(), 2);
        assert_eq!(plan.extensions(), &[EX_IPV4_FLOW, EX_CNT_FLOW]);
        assert!(plan.references(EX_IPV4_FLOW));
        assert!(!plan.references(5));
        assert!(!plan.references(9000));
        assert!(!plan.has_var_length());
        assert_eq!(plan.fixed_output_len(), Some(16));
        assert_eq!(plan.full_input_len(), Some(12 + 12 + 44));
        assert_eq!(plan.stack_len(), 0);
    }

    #[test]
    fn empty_plan_is_rejected() {
        assert_configuration(SequencePlan::compile(&[]), "empty");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let entries = [SequenceEntry::copy(77, 0, 4, 4)];
        assert_configuration(SequencePlan::compile(&entries), "unknown extension id 77");
    }

    #[test]
    fn null_extension_without_stack_is_rejected() {
        let entries = [SequenceEntry::copy(EX_NULL, 0, 4, 4)];
        assert_configuration(SequencePlan::compile(&entries), "EXnull");
    }

    #[test]
    fn zero_lengths_are_rejected() {
        let entries = [SequenceEntry::copy(EX_IPV4_FLOW, 0, 4, 0)];
        assert_configuration(SequencePlan::compile(&entries), "output length is zero");

        let entries = [SequenceEntry::copy(EX_IPV4_FLOW, 0, 0, 4)];
        assert_configuration(SequencePlan::compile(&entries), "input length is zero");
    }

    #[test]
    fn field_past_payload_is_rejected() {
        let entries = [SequenceEntry::copy(EX_IPV4_FLOW, 6, 4, 4)];
        assert_configuration(SequencePlan::compile(&entries), "exceed the 8 byte");
    }

    #[test]
    fn variable_source_on_fixed_extension_is_rejected() {
        let entries = [SequenceEntry::variable(EX_IPV4_FLOW, 0)];
        assert_configuration(SequencePlan::compile(&entries), "not variable-length");
    }

    #[test]
    fn stack_entries() {
        let entries = [
            SequenceEntry::field(IN_PACKETS),
            SequenceEntry::stack(2, 8),
            SequenceEntry::stack(2, 4),
            SequenceEntry::field(IN_BYTES).with_stack_slot(0),
        ];
        let plan = SequencePlan::compile(&entries).unwrap();

        // Stack entries do not read the record.
        assert_eq!(plan.num_extensions(), 1);
        assert_eq!(plan.fixed_output_len(), Some(8 + 8 + 4 + 8));
        assert_eq!(plan.max_stack_slot(), Some(2));
        assert_eq!(plan.stack_len(), 3);

        let entries = [SequenceEntry::stack(0, VARLENGTH)];
        assert_configuration(SequencePlan::compile(&entries), "fixed output length");
    }

    #[test]
    fn variable_length_plan() {
        let catalog = ExtensionCatalog::builder()
            .extension(ExtensionDef::new(40, VARLENGTH, "EXpayload"))
            .unwrap()
            .build();
        let entries = [
            SequenceEntry::field(SRC4_ADDR),
            SequenceEntry::variable(40, 0),
            SequenceEntry::copy(40, 0, VARLENGTH, 4),
        ];
        let plan = SequencePlan::compile_with_catalog(&entries, &catalog).unwrap();

        assert!(plan.has_var_length());
        assert_eq!(plan.fixed_output_len(), None);
        assert_eq!(plan.full_input_len(), None);
        assert_eq!(plan.var_outputs, vec![1]);
        assert_eq!(plan.fixed_part, 8);
        assert_eq!(plan.new_cache().capacity(), 41);

        let entries = [SequenceEntry::copy(40, 0, 4, VARLENGTH)];
        assert_configuration(
            SequencePlan::compile_with_catalog(&entries, &catalog),
            "variable output length",
        );
    }

    #[test]
    fn fixed_entry_on_variable_extension_keeps_fixed_output() {
        let catalog = ExtensionCatalog::builder()
            .extension(ExtensionDef::new(40, VARLENGTH, "EXpayload"))
            .unwrap()
            .build();
        let entries = [SequenceEntry::copy(40, 2, 4, 4)];
        let plan = SequencePlan::compile_with_catalog(&entries, &catalog).unwrap();

        assert!(plan.has_var_length());
        assert_eq!(plan.fixed_output_len(), Some(4));
    }

    #[test]
    fn plan_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SequencePlan<'static>>();
    }
}
