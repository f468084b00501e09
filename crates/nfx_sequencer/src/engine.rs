//! The sequencer engine: per-record scan and projection.
//!
//! Projection rules:
//!
//! - Entries are written back to back in plan order; each one advances the
//!   output cursor by its destination length, whether its value was copied
//!   or zero-filled.
//! - When source and destination widths differ, the first
//!   `min(source, destination)` bytes of the field are copied and the rest
//!   of the destination is zero-filled. For little-endian integers this
//!   keeps the low-order bytes, i.e. zero-extension or truncation.
//! - Stack values are `u64` and follow the same rule on their little-endian
//!   representation.
//! - A referenced extension missing from the record yields zero bytes; a
//!   variable-width entry for a missing extension yields nothing.

use std::sync::Arc;

use nfx_format::{RecordView, VARLENGTH};
use tracing::{debug, trace};

use crate::cache::{Position, PositionCache};
use crate::config::SequencerConfig;
use crate::error::{SequencerError, SequencerResult};
use crate::plan::SequencePlan;
use crate::sequence::SequenceEntry;
use crate::stats::SequencerStats;

/// A record whose extensions have been located by a scan.
///
/// Holds the cache borrow, so the positions it reports always belong to
/// this record.
#[derive(Debug)]
pub struct ScannedRecord<'s, 'r> {
    plan: &'s SequencePlan<'s>,
    cache: &'s PositionCache,
    record: &'r [u8],
    output_len: usize,
    unknown_elements: usize,
    stats: Option<&'s SequencerStats>,
}

impl<'s, 'r> ScannedRecord<'s, 'r> {
    /// Exact number of bytes [`write`](Self::write) produces.
    #[must_use]
    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// Position of a referenced extension's payload in this record.
    #[must_use]
    pub fn position(&self, id: u16) -> Option<Position> {
        self.cache.get(id)
    }

    /// Number of elements with ids the catalog does not know.
    #[must_use]
    pub fn unknown_elements(&self) -> usize {
        self.unknown_elements
    }

    /// The scanned record bytes.
    #[must_use]
    pub fn record(&self) -> &'r [u8] {
        self.record
    }

    /// Projects the record into `out`.
    ///
    /// Writes exactly [`output_len`](Self::output_len) bytes and leaves the
    /// rest of `out` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::BufferTooSmall`] if `out` is too short and
    /// [`SequencerError::Configuration`] if the plan uses a stack slot that
    /// `stack` does not provide. Nothing is written in either case.
    pub fn write(&self, out: &mut [u8], stack: &[u64]) -> SequencerResult<usize> {
        let required = self.output_len;
        if out.len() < required {
            if let Some(stats) = self.stats {
                stats.record_buffer_too_small();
            }
            return Err(SequencerError::BufferTooSmall {
                required,
                available: out.len(),
            });
        }
        if self.plan.stack_len() > stack.len() {
            return Err(SequencerError::configuration(format!(
                "plan reads stack slot {} but the stack holds {} values",
                self.plan.stack_len() - 1,
                stack.len()
            )));
        }

        let mut cursor = 0;
        let mut missing = 0;
        for entry in self.plan.entries() {
            let written = match entry.stack_slot {
                Some(slot) => {
                    let width = usize::from(entry.output_length);
                    let value = stack[usize::from(slot)].to_le_bytes();
                    copy_padded(&value, &mut out[cursor..cursor + width]);
                    width
                }
                None => match self.cache.get(entry.extension) {
                    Some(position) => self.copy_field(entry, position, &mut out[cursor..]),
                    None => {
                        missing += 1;
                        let width = if entry.is_var_output() {
                            0
                        } else {
                            usize::from(entry.output_length)
                        };
                        out[cursor..cursor + width].fill(0);
                        width
                    }
                },
            };
            cursor += written;
        }
        debug_assert_eq!(cursor, required);

        if let Some(stats) = self.stats {
            stats.record_projection(cursor as u64, missing);
        }
        Ok(cursor)
    }

    fn copy_field(&self, entry: &SequenceEntry, position: Position, out: &mut [u8]) -> usize {
        let payload = &self.record[position.offset..position.offset + position.length];
        let start = usize::from(entry.offset).min(payload.len());
        let available = &payload[start..];
        let source = if entry.input_length == VARLENGTH {
            available
        } else {
            &available[..available.len().min(usize::from(entry.input_length))]
        };

        let width = if entry.is_var_output() {
            source.len()
        } else {
            usize::from(entry.output_length)
        };
        copy_padded(source, &mut out[..width]);
        width
    }
}

#[inline]
fn copy_padded(source: &[u8], dest: &mut [u8]) {
    let n = source.len().min(dest.len());
    dest[..n].copy_from_slice(&source[..n]);
    dest[n..].fill(0);
}

impl<'a> SequencePlan<'a> {
    /// Scans `record` into a caller-owned cache.
    ///
    /// This is the entry point for workers sharing one plan: each worker
    /// keeps its own cache and calls this per record.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::MalformedRecord`] if the record is
    /// inconsistent with its header or the catalog.
    pub fn scan_with<'s, 'r>(
        &'s self,
        cache: &'s mut PositionCache,
        config: SequencerConfig,
        record: &'r [u8],
    ) -> SequencerResult<ScannedRecord<'s, 'r>> {
        self.scan_inner(cache, config, record, None)
    }

    fn scan_inner<'s, 'r>(
        &'s self,
        cache: &'s mut PositionCache,
        config: SequencerConfig,
        record: &'r [u8],
        stats: Option<&'s SequencerStats>,
    ) -> SequencerResult<ScannedRecord<'s, 'r>> {
        cache.reset();
        cache.ensure_capacity(self.referenced.len());

        let unknown_elements = match self.locate(cache, config, record) {
            Ok(unknown) => unknown,
            Err(e) => {
                cache.reset();
                debug!(error = %e, "rejecting malformed record");
                if let Some(stats) = stats {
                    stats.record_malformed();
                }
                return Err(e);
            }
        };

        let variable: usize = self
            .var_outputs
            .iter()
            .map(|&index| {
                let entry = &self.entries[index];
                cache.get(entry.extension).map_or(0, |position| {
                    position.length.saturating_sub(usize::from(entry.offset))
                })
            })
            .sum();

        if let Some(stats) = stats {
            stats.record_scan(unknown_elements as u64);
        }

        Ok(ScannedRecord {
            plan: self,
            cache,
            record,
            output_len: self.fixed_part + variable,
            unknown_elements,
            stats,
        })
    }

    /// Walks the element headers once and caches referenced positions.
    /// Returns the number of unknown elements skipped.
    fn locate(
        &self,
        cache: &mut PositionCache,
        config: SequencerConfig,
        record: &[u8],
    ) -> SequencerResult<usize> {
        let view = RecordView::parse(record).map_err(SequencerError::from_scan)?;
        let header = view.header();

        let mut count = 0usize;
        let mut unknown = 0usize;
        for element in view.elements() {
            let element = element.map_err(SequencerError::from_scan)?;
            count += 1;

            let Some(def) = self.catalog.get(element.type_id) else {
                trace!(
                    id = element.type_id,
                    offset = element.offset,
                    "skipping unknown extension"
                );
                unknown += 1;
                continue;
            };

            if config.check_fixed_lengths {
                if let Some(size) = def.fixed_size() {
                    if element.payload.len() != size {
                        return Err(SequencerError::malformed(format!(
                            "{} at offset {} has {} payload bytes, catalog declares {size}",
                            def.name,
                            element.offset,
                            element.payload.len()
                        )));
                    }
                }
            }

            if !self.references(element.type_id) {
                continue;
            }

            let position = Position {
                offset: element.payload_offset(),
                length: element.payload.len(),
            };
            if cache.insert(element.type_id, position) && config.reject_duplicate_extensions {
                return Err(SequencerError::malformed(format!(
                    "{} appears more than once",
                    def.name
                )));
            }
        }

        if config.strict_element_count && count != usize::from(header.num_elements) {
            return Err(SequencerError::malformed(format!(
                "header declares {} elements, record holds {count}",
                header.num_elements
            )));
        }

        Ok(unknown)
    }
}

/// A plan bundled with its own position cache.
///
/// This is the single-worker entry point. For parallel processing, give
/// every worker its own `Sequencer` via [`Sequencer::fork`].
///
/// # Example
///
/// ```
/// use nfx_format::fields::{DST4_ADDR, IN_BYTES, SRC4_ADDR};
/// use nfx_format::{RecordBuilder, EX_IPV4_FLOW};
/// use nfx_sequencer::{SequenceEntry, Sequencer};
///
/// let entries = [
///     SequenceEntry::field(SRC4_ADDR),
///     SequenceEntry::field(DST4_ADDR),
///     SequenceEntry::field(IN_BYTES),
/// ];
/// let mut sequencer = Sequencer::compile(&entries).unwrap();
///
/// let record = RecordBuilder::new()
///     .add_extension(EX_IPV4_FLOW, &[10, 0, 0, 1, 10, 0, 0, 2])
///     .unwrap()
///     .finish()
///     .unwrap();
///
/// let mut out = [0xFF; 16];
/// let written = sequencer.run(record.as_bytes(), &mut out, &[]).unwrap();
/// assert_eq!(written, 16);
/// assert_eq!(&out[..8], &[10, 0, 0, 1, 10, 0, 0, 2]);
/// assert_eq!(&out[8..], &[0; 8]);
/// ```
#[derive(Debug)]
pub struct Sequencer<'a> {
    plan: SequencePlan<'a>,
    cache: PositionCache,
    config: SequencerConfig,
    stats: Arc<SequencerStats>,
}

impl<'a> Sequencer<'a> {
    /// Wraps a compiled plan with the default configuration.
    #[must_use]
    pub fn new(plan: SequencePlan<'a>) -> Self {
        Self::with_config(plan, SequencerConfig::default())
    }

    /// Wraps a compiled plan.
    #[must_use]
    pub fn with_config(plan: SequencePlan<'a>, config: SequencerConfig) -> Self {
        let cache = plan.new_cache();
        Self {
            plan,
            cache,
            config,
            stats: Arc::new(SequencerStats::new()),
        }
    }

    /// Compiles `entries` against the standard catalog.
    ///
    /// # Errors
    ///
    /// See [`SequencePlan::compile`].
    pub fn compile(entries: &'a [SequenceEntry]) -> SequencerResult<Self> {
        SequencePlan::compile(entries).map(Self::new)
    }

    /// Reports into shared statistics instead of private ones.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<SequencerStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Creates another sequencer over the same plan with an empty cache.
    ///
    /// Statistics are shared with `self`.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            plan: self.plan.clone(),
            cache: self.plan.new_cache(),
            config: self.config,
            stats: Arc::clone(&self.stats),
        }
    }

    /// The compiled plan.
    #[must_use]
    pub fn plan(&self) -> &SequencePlan<'a> {
        &self.plan
    }

    /// The record validation settings.
    #[must_use]
    pub fn config(&self) -> SequencerConfig {
        self.config
    }

    /// The statistics this sequencer reports into.
    #[must_use]
    pub fn stats(&self) -> &Arc<SequencerStats> {
        &self.stats
    }

    /// The position cache as left by the last scan.
    #[must_use]
    pub fn cache(&self) -> &PositionCache {
        &self.cache
    }

    /// Invalidates the position cache.
    pub fn reset(&mut self) {
        self.cache.reset();
    }

    /// Scans `record`, returning a handle that can project it without a
    /// second scan.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::MalformedRecord`] if the record is
    /// inconsistent.
    pub fn scan<'s, 'r>(&'s mut self, record: &'r [u8]) -> SequencerResult<ScannedRecord<'s, 'r>> {
        self.plan
            .scan_inner(&mut self.cache, self.config, record, Some(&*self.stats))
    }

    /// Computes the output size for `record`.
    ///
    /// Always scans the record, so a malformed record is rejected even when
    /// the plan's output size is fixed.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::MalformedRecord`] if the record is
    /// inconsistent.
    pub fn size_for_record(&mut self, record: &[u8]) -> SequencerResult<usize> {
        self.scan(record).map(|scanned| scanned.output_len())
    }

    /// Scans `record` and projects it into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::MalformedRecord`] for inconsistent records,
    /// [`SequencerError::BufferTooSmall`] if `out` is too short, and
    /// [`SequencerError::Configuration`] if `stack` is too short. Nothing is
    /// written on error.
    pub fn run(&mut self, record: &[u8], out: &mut [u8], stack: &[u64]) -> SequencerResult<usize> {
        self.scan(record)?.write(out, stack)
    }
}
