//! Source location tracking

/// A source location covering a node, as reported by the parser.
///
/// Only the start row/column and the covered source text are stored.
/// The end position is derived from the text on demand, which keeps the
/// parser's job simple and the struct small.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// 1-based start row
    pub row: usize,
    /// 1-based start column
    pub col: usize,
    /// Source text covered by the node, if the parser recorded it
    pub text: Option<String>,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            text: None,
        }
    }

    pub fn with_text(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            text: Some(text.into()),
        }
    }

    /// Derived end position.
    ///
    /// With no recorded text the end equals the start. Single-line text
    /// ends at `col + len`. Multi-line text advances the row by the
    /// number of line breaks; the end column is the length of the text
    /// after the final break.
    pub fn end(&self) -> (usize, usize) {
        let Some(text) = &self.text else {
            return (self.row, self.col);
        };

        match text.rfind('\n') {
            None => (self.row, self.col + text.len()),
            Some(last_break) => {
                let breaks = text.bytes().filter(|b| *b == b'\n').count();
                (self.row + breaks, text.len() - last_break - 1)
            }
        }
    }

    /// The compact `"row:col:endrow:endcol"` form, the only shape any
    /// encoder emits for a location.
    pub fn compact(&self) -> String {
        let (end_row, end_col) = self.end();
        format!("{}:{}:{}:{}", self.row, self.col, end_row, end_col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_without_text() {
        let loc = Location::new(3, 5);
        assert_eq!(loc.end(), (3, 5));
        assert_eq!(loc.compact(), "3:5:3:5");
    }

    #[test]
    fn test_end_single_line() {
        let loc = Location::with_text(1, 1, "package p");
        assert_eq!(loc.end(), (1, 10));
        assert_eq!(loc.compact(), "1:1:1:10");
    }

    #[test]
    fn test_end_multi_line() {
        // Two lines of lengths 10 and 4: the end row advances by the
        // break count, the end column is the final line's length.
        let loc = Location::with_text(3, 5, "aaaaaaaaaa\nbbbb");
        assert_eq!(loc.end(), (4, 4));
        assert_eq!(loc.compact(), "3:5:4:4");
    }

    #[test]
    fn test_end_trailing_break() {
        let loc = Location::with_text(2, 1, "foo\n");
        assert_eq!(loc.end(), (3, 0));
    }
}
