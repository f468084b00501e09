//! Sequencer configuration.

/// Record validation settings for a [`crate::Sequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Reject records whose scanned element count differs from the header.
    pub strict_element_count: bool,

    /// Reject records carrying a referenced extension more than once.
    ///
    /// Enabled by default, which is stricter than the classic V3 reader:
    /// that one silently keeps the last occurrence. When disabled, the last
    /// occurrence wins here too.
    pub reject_duplicate_extensions: bool,

    /// Reject fixed-size extensions whose length differs from the catalog.
    pub check_fixed_lengths: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            strict_element_count: true,
            reject_duplicate_extensions: true,
            check_fixed_lengths: true,
        }
    }
}

impl SequencerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that only enforces buffer bounds.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            strict_element_count: false,
            reject_duplicate_extensions: false,
            check_fixed_lengths: false,
        }
    }

    /// Sets whether the header element count must match.
    #[must_use]
    pub const fn strict_element_count(mut self, value: bool) -> Self {
        self.strict_element_count = value;
        self
    }

    /// Sets whether duplicate referenced extensions are rejected.
    #[must_use]
    pub const fn reject_duplicate_extensions(mut self, value: bool) -> Self {
        self.reject_duplicate_extensions = value;
        self
    }

    /// Sets whether fixed-size extension lengths are checked.
    #[must_use]
    pub const fn check_fixed_lengths(mut self, value: bool) -> Self {
        self.check_fixed_lengths = value;
        self
    }
}
