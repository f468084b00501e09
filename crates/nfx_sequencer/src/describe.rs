//! Human-readable plan dumps for troubleshooting.

use std::fmt;

use nfx_format::VARLENGTH;

use crate::engine::Sequencer;
use crate::plan::SequencePlan;

fn width(length: u16) -> String {
    if length == VARLENGTH {
        "var".to_string()
    } else {
        length.to_string()
    }
}

impl fmt::Display for SequencePlan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sequence plan: {} sequences, {} extensions",
            self.num_sequences(),
            self.num_extensions()
        )?;
        match self.fixed_output_len() {
            Some(len) => write!(f, ", output {len} bytes")?,
            None => write!(f, ", variable output")?,
        }
        if let Some(len) = self.full_input_len() {
            write!(f, ", full input {len} bytes")?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "  {:>3}  {:<24} {:>6} {:>5} {:>5}  stack",
            "#", "extension", "offset", "in", "out"
        )?;
        for (index, entry) in self.entries().iter().enumerate() {
            let extension = if entry.is_stack() && entry.extension == 0 {
                "-".to_string()
            } else {
                format!("{}({})", self.catalog().name(entry.extension), entry.extension)
            };
            let stack = entry
                .stack_slot
                .map_or_else(|| "-".to_string(), |slot| slot.to_string());
            writeln!(
                f,
                "  {:>3}  {:<24} {:>6} {:>5} {:>5}  {}",
                index,
                extension,
                entry.offset,
                width(entry.input_length),
                width(entry.output_length),
                stack
            )?;
        }
        Ok(())
    }
}

/// Renders the compiled entry table of `plan`.
#[must_use]
pub fn describe(plan: &SequencePlan<'_>) -> String {
    plan.to_string()
}

impl Sequencer<'_> {
    /// Renders the plan followed by the positions cached for the last
    /// scanned record.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = describe(self.plan());
        let catalog = self.plan().catalog();

        if self.cache().is_empty() {
            out.push_str("cache: empty\n");
        } else {
            out.push_str("cache:\n");
            for (id, position) in self.cache().iter() {
                out.push_str(&format!(
                    "  {}({}) at offset {}, {} bytes\n",
                    catalog.name(id),
                    id,
                    position.offset,
                    position.length
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SequenceEntry;
    use nfx_format::fields::{IN_BYTES, SRC4_ADDR};
    use nfx_format::{RecordBuilder, EX_IPV4_FLOW};

    #[test]
    fn plan_table() {
        let entries = [
            SequenceEntry::field(SRC4_ADDR),
            SequenceEntry::field(IN_BYTES),
            SequenceEntry::stack(0, 8),
        ];
        let plan = SequencePlan::compile(&entries).unwrap();
        let text = describe(&plan);

        assert!(text.starts_with(
            "sequence plan: 3 sequences, 2 extensions, output 20 bytes, full input 68 bytes\n"
        ));
        assert!(text.contains("EXipv4Flow(4)"));
        assert!(text.contains("EXcntFlow(8)"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn sequencer_dump_includes_cache() {
        let entries = [SequenceEntry::field(SRC4_ADDR)];
        let mut sequencer = Sequencer::compile(&entries).unwrap();
        assert!(sequencer.describe().ends_with("cache: empty\n"));

        let record = RecordBuilder::new()
            .add_extension(EX_IPV4_FLOW, &[0; 8])
            .unwrap()
            .finish()
            .unwrap();
        sequencer.size_for_record(record.as_bytes()).unwrap();

        assert!(sequencer
            .describe()
            .ends_with("cache:\n  EXipv4Flow(4) at offset 16, 8 bytes\n"));
    }
}
