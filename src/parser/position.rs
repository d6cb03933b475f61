//! Conversion between flat byte offsets and (line, column) positions
//!
//! Columns are counted in UTF-16 code units, matching the default LSP
//! position encoding.

/// Line start table over a document's text
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    /// Byte offset where the given line starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Text of a line without its line terminator
    pub fn line(&self, line: usize) -> Option<&'a str> {
        let start = self.line_start(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let text = &self.text[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Line containing the byte offset
    pub fn line_of(&self, offset: usize) -> Option<usize> {
        if offset > self.text.len() {
            return None;
        }
        Some(self.line_starts.partition_point(|&start| start <= offset) - 1)
    }

    /// Convert a byte offset to a (line, UTF-16 column) pair
    ///
    /// Returns None if the offset is past the end or not on a char boundary.
    pub fn position(&self, offset: usize) -> Option<(usize, usize)> {
        let line = self.line_of(offset)?;
        let before = self.text.get(self.line_starts[line]..offset)?;
        Some((line, utf16_len(before)))
    }
}

/// Length of a string in UTF-16 code units
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index within `text` of the given UTF-16 column
///
/// A column equal to the line length maps to the end of the text.
pub fn byte_index(text: &str, column: usize) -> Option<usize> {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        if units == column {
            return Some(index);
        }
        if units > column {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == column).then_some(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TEXT: &str = "{\n  \"a\": \"1\"\r\n}";

    #[test]
    fn line_strips_terminators() {
        let index = LineIndex::new(TEXT);

        assert_eq!(index.line(0), Some("{"));
        assert_eq!(index.line(1), Some("  \"a\": \"1\""));
        assert_eq!(index.line(2), Some("}"));
        assert_eq!(index.line(3), None);
    }

    #[rstest]
    #[case(0, Some((0, 0)))]
    #[case(1, Some((0, 1)))]
    #[case(2, Some((1, 0)))]
    #[case(9, Some((1, 7)))]
    #[case(12, Some((1, 10)))]
    #[case(14, Some((2, 0)))]
    #[case(15, Some((2, 1)))]
    #[case(16, None)]
    fn position_maps_offsets(#[case] offset: usize, #[case] expected: Option<(usize, usize)>) {
        let index = LineIndex::new(TEXT);
        assert_eq!(index.position(offset), expected);
    }

    #[test]
    fn position_counts_utf16_units() {
        // "é" is 2 bytes / 1 unit, "𝄞" is 4 bytes / 2 units
        let text = "é𝄞x";
        let index = LineIndex::new(text);

        assert_eq!(index.position(2), Some((0, 1)));
        assert_eq!(index.position(6), Some((0, 3)));
        assert_eq!(index.position(3), None);
    }

    #[rstest]
    #[case("é𝄞x", 3, Some(6))]
    #[case("é𝄞x", 2, None)]
    #[case("é𝄞x", 4, Some(7))]
    #[case("é𝄞x", 5, None)]
    fn byte_index_maps_utf16_columns(
        #[case] text: &str,
        #[case] column: usize,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(byte_index(text, column), expected);
    }
}
