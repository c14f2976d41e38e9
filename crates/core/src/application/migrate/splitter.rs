// Statement Splitter - `;`-suffix heuristic, line by line
//
// Good enough for schema DDL. Statements with embedded semicolons at line
// end (trigger or procedure bodies) are split incorrectly.

const TERMINATOR: char = ';';

/// Accumulates lines into statements.
///
/// A statement ends at a line whose trimmed content ends with `;`. Each
/// accumulated line keeps a trailing `\n`. Blank lines between statements
/// are not carried into the next statement.
#[derive(Debug, Default)]
pub struct StatementSplitter {
    pending: String,
}

impl StatementSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its line ending); returns a completed statement
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() && self.pending.is_empty() {
            return None;
        }
        self.pending.push_str(line);
        self.pending.push('\n');
        if trimmed.ends_with(TERMINATOR) {
            Some(std::mem::take(&mut self.pending))
        } else {
            None
        }
    }

    /// Flush a trailing statement that lacks a terminator
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// Split a whole script
    pub fn split(script: &str) -> Vec<String> {
        let mut splitter = Self::new();
        let mut statements: Vec<String> = script
            .lines()
            .filter_map(|line| splitter.push_line(line))
            .collect();
        statements.extend(splitter.finish());
        statements
    }
}
