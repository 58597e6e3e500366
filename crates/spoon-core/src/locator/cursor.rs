//! Cursor position conversions.
//!
//! Editors report positions as character offsets or line/column pairs;
//! the locator works on byte offsets into UTF-8 text.

/// Byte offset of the `char_offset`-th character, clamped to the text length.
pub fn char_to_byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Character offset of a 1-based `line` and 1-based `column`.
///
/// A column past the end of its line is clamped to the line end. Returns
/// `None` when the line does not exist.
pub fn line_column_to_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }

    let mut offset = 0usize;
    for (index, content) in text.split('\n').enumerate() {
        if index + 1 == line {
            let width = content.trim_end_matches('\r').chars().count();
            return Some(offset + column.saturating_sub(1).min(width));
        }
        offset += content.chars().count() + 1;
    }
    None
}

/// 1-based line number of a character offset.
pub fn line_number_at(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).filter(|&c| c == '\n').count() + 1
}
