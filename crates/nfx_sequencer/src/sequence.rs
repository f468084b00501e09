//! Sequence entries: one field-copy instruction each.

use nfx_format::{Field, EX_NULL, VARLENGTH};

/// One request to copy a field from the input record to the output.
///
/// Entries are laid out in output order. An entry with a stack slot takes
/// its value from the caller's computed-value stack instead of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceEntry {
    /// Source extension-type id.
    pub extension: u16,
    /// Byte offset within the extension payload.
    pub offset: u16,
    /// Source length in bytes, or [`VARLENGTH`] for "rest of the element".
    pub input_length: u16,
    /// Destination length in bytes, or [`VARLENGTH`] for "as much as copied".
    pub output_length: u16,
    /// Computed-value stack slot supplying the value.
    pub stack_slot: Option<u16>,
}

impl SequenceEntry {
    /// Copies `input_length` bytes at `offset` into `output_length` bytes.
    #[must_use]
    pub const fn copy(extension: u16, offset: u16, input_length: u16, output_length: u16) -> Self {
        Self {
            extension,
            offset,
            input_length,
            output_length,
            stack_slot: None,
        }
    }

    /// Copies a named field unchanged.
    #[must_use]
    pub const fn field(field: Field) -> Self {
        Self::copy(field.extension, field.offset, field.length, field.length)
    }

    /// Copies a named field, widening or narrowing it to `output_length`.
    #[must_use]
    pub const fn field_as(field: Field, output_length: u16) -> Self {
        Self::copy(field.extension, field.offset, field.length, output_length)
    }

    /// Copies everything from `offset` to the end of a variable-length
    /// extension.
    #[must_use]
    pub const fn variable(extension: u16, offset: u16) -> Self {
        Self::copy(extension, offset, VARLENGTH, VARLENGTH)
    }

    /// Writes a computed value from the stack.
    #[must_use]
    pub const fn stack(slot: u16, output_length: u16) -> Self {
        Self {
            extension: EX_NULL,
            offset: 0,
            input_length: 0,
            output_length,
            stack_slot: Some(slot),
        }
    }

    /// Replaces the record value with a computed value from the stack.
    #[must_use]
    pub const fn with_stack_slot(mut self, slot: u16) -> Self {
        self.stack_slot = Some(slot);
        self
    }

    /// Returns true if the value comes from the computed-value stack.
    #[must_use]
    pub const fn is_stack(&self) -> bool {
        self.stack_slot.is_some()
    }

    /// Returns true if the output width depends on the record.
    #[must_use]
    pub const fn is_var_output(&self) -> bool {
        self.output_length == VARLENGTH
    }
}

impl From<Field> for SequenceEntry {
    fn from(field: Field) -> Self {
        Self::field(field)
    }
}
