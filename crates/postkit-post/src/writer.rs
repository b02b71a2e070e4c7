//! Program line writer
//!
//! Every physical line of a program goes through [`ProgramWriter`], which
//! applies the block-delete marker and the line number prefix and appends to
//! a single growing buffer.

/// Counter value before the first numbered line
pub const LINE_NUMBER_START: u32 = 100;
/// Increment between numbered lines
pub const LINE_NUMBER_STEP: u32 = 10;
/// Marker telling the machine the line may be skipped
pub const BLOCK_DELETE: &str = "/";

/// Append-only program buffer
#[derive(Debug, Clone)]
pub struct ProgramWriter {
    buffer: String,
    line_numbers: bool,
    line_number: u32,
    block_delete: bool,
    line_count: usize,
}

impl ProgramWriter {
    /// Create an empty writer
    pub fn new(line_numbers: bool) -> Self {
        Self {
            buffer: String::new(),
            line_numbers,
            line_number: LINE_NUMBER_START,
            block_delete: false,
            line_count: 0,
        }
    }

    /// Mark subsequent lines as block-deleted (or not)
    pub fn set_block_delete(&mut self, block_delete: bool) {
        self.block_delete = block_delete;
    }

    /// Number of lines written so far
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Write one line
    pub fn line(&mut self, text: &str) {
        if self.block_delete {
            self.buffer.push_str(BLOCK_DELETE);
            self.buffer.push(' ');
        }
        if self.line_numbers {
            self.line_number += LINE_NUMBER_STEP;
            self.buffer.push('N');
            self.buffer.push_str(&self.line_number.to_string());
            self.buffer.push(' ');
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
        self.line_count += 1;
    }

    /// Write one line made of space-separated words
    pub fn words<S: AsRef<str>>(&mut self, words: &[S]) {
        let text = words
            .iter()
            .map(|w| w.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        self.line(&text);
    }

    /// Write each non-blank line of a multi-line text block
    pub fn block(&mut self, text: &str) {
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            self.line(line);
        }
    }

    /// Take the finished program text
    pub fn finish(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines() {
        let mut writer = ProgramWriter::new(false);
        writer.line("G21");
        writer.words(&["G0", "X1.000"]);
        assert_eq!(writer.line_count(), 2);
        assert_eq!(writer.finish(), "G21\nG0 X1.000\n");
    }

    #[test]
    fn test_line_numbers_start_at_110() {
        let mut writer = ProgramWriter::new(true);
        writer.line("G21");
        writer.line("M2");
        assert_eq!(writer.finish(), "N110 G21\nN120 M2\n");
    }

    #[test]
    fn test_block_delete_precedes_line_number() {
        let mut writer = ProgramWriter::new(true);
        writer.set_block_delete(true);
        writer.line("M5");
        writer.set_block_delete(false);
        writer.line("M6 T1");
        assert_eq!(writer.finish(), "/ N110 M5\nN120 M6 T1\n");
    }

    #[test]
    fn test_block_skips_blank_lines() {
        let mut writer = ProgramWriter::new(false);
        writer.block("M05\n\n  G17 G90  \nM2\n");
        writer.block("");
        assert_eq!(writer.finish(), "M05\nG17 G90\nM2\n");
    }
}
