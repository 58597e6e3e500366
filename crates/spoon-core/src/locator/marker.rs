//! Sentinel injection.
//!
//! Turns "where is the cursor" into "where is the sentinel": the nearest
//! `describe(`/`it(` before the cursor is found textually, and a reserved
//! string literal is written as the first statement of that call's body.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::LocateError;

/// Reserved string literal inserted into the rewritten source.
pub const SENTINEL: &str = "'spoon://locator/sentinel'";

/// The sentinel as a standalone expression statement.
pub const SENTINEL_STATEMENT: &str = "'spoon://locator/sentinel';";

/// Call prefixes that register a test or a test group.
pub const ANCHORS: &[&str] = &["describe(", "it("];

/// Anonymous zero-argument function header, up to its opening brace.
const FUNCTION_HEADER_PATTERN: &str = r"function\s*\(\s*\)\s*\{";

/// Same as [`FUNCTION_HEADER_PATTERN`] but also accepting `() => {`.
const ARROW_HEADER_PATTERN: &str = r"(?:function\s*\(\s*\)|\(\s*\)\s*=>)\s*\{";

/// How the function body header is searched for after the anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// First header after the anchor, anywhere in the text.
    #[default]
    Textual,
    /// Only a header that is a direct argument of the anchor call.
    Structural,
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Textual => write!(f, "textual"),
            Self::Structural => write!(f, "structural"),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "textual" => Ok(Self::Textual),
            "structural" => Ok(Self::Structural),
            other => Err(format!("unknown scan mode: {other}")),
        }
    }
}

/// Source text with the sentinel written into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// The rewritten source.
    pub text: String,
    /// Byte offset of [`SENTINEL_STATEMENT`] within `text`.
    pub sentinel_at: usize,
}

impl Injection {
    /// Remove the sentinel statement, giving back the original source.
    pub fn strip(&self) -> String {
        let mut original = String::with_capacity(self.text.len() - SENTINEL_STATEMENT.len());
        original.push_str(&self.text[..self.sentinel_at]);
        original.push_str(&self.text[self.sentinel_at + SENTINEL_STATEMENT.len()..]);
        original
    }
}

/// Writes the sentinel into the body of the test call nearest the cursor.
#[derive(Debug, Clone, Default)]
pub struct MarkerInjector {
    scan: ScanMode,
    arrow_functions: bool,
}

impl MarkerInjector {
    pub fn new(scan: ScanMode, arrow_functions: bool) -> Self {
        Self {
            scan,
            arrow_functions,
        }
    }

    /// Rewrite `source` with the sentinel after the body header of the
    /// anchor call. `cursor` is a byte offset and is clamped to the text.
    pub fn inject(&self, source: &str, cursor: usize) -> Result<Injection, LocateError> {
        let cursor = floor_char_boundary(source, cursor.min(source.len()));
        let word_bounded = self.scan == ScanMode::Structural;

        let anchor = find_anchor(source, cursor, word_bounded).ok_or(LocateError::NoAnchorFound)?;
        debug!(anchor, cursor, scan = %self.scan, "found test call anchor");

        let header_end = match self.scan {
            ScanMode::Textual => self.textual_header_end(source, anchor),
            ScanMode::Structural => self.structural_header_end(source, anchor),
        }
        .ok_or(LocateError::NoFunctionHeaderFound { anchor })?;

        let mut text = String::with_capacity(source.len() + SENTINEL_STATEMENT.len());
        text.push_str(&source[..header_end]);
        text.push_str(SENTINEL_STATEMENT);
        text.push_str(&source[header_end..]);

        Ok(Injection {
            text,
            sentinel_at: header_end,
        })
    }

    fn header_pattern(&self) -> &'static str {
        if self.arrow_functions {
            ARROW_HEADER_PATTERN
        } else {
            FUNCTION_HEADER_PATTERN
        }
    }

    fn header_regex(&self, anchored: bool) -> Option<Regex> {
        let pattern = if anchored {
            format!("^(?:{})", self.header_pattern())
        } else {
            self.header_pattern().to_string()
        };
        match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("invalid function header pattern: {e}");
                None
            }
        }
    }

    fn textual_header_end(&self, source: &str, anchor: usize) -> Option<usize> {
        let re = self.header_regex(false)?;
        re.find_at(source, anchor).map(|m| m.end())
    }

    /// Walk the anchor's argument list keeping track of bracket depth and
    /// accept the first header sitting directly inside it.
    fn structural_header_end(&self, source: &str, anchor: usize) -> Option<usize> {
        let re = self.header_regex(true)?;
        let bytes = source.as_bytes();
        let open = anchor + source[anchor..].find('(')?;

        let mut depth = 1usize;
        let mut i = open + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\'' | b'"' | b'`' => {
                    i = skip_quoted(bytes, i);
                    continue;
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    i = source[i..].find('\n').map_or(bytes.len(), |n| i + n);
                    continue;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = source[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 2);
                    continue;
                }
                b'(' | b'[' | b'{' => {
                    if depth == 1 && bytes[i] == b'(' {
                        if let Some(m) = re.find(&source[i..]) {
                            return Some(i + m.end());
                        }
                    }
                    depth += 1;
                }
                b')' | b']' | b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return None;
                    }
                }
                b'f' if depth == 1 && !is_ident_byte(bytes[i - 1]) => {
                    if let Some(m) = re.find(&source[i..]) {
                        return Some(i + m.end());
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }
}

/// Start of the rightmost anchor beginning at or before `cursor`.
///
/// With `word_bounded`, an anchor preceded by an identifier character or a
/// `.` (as in `submit(` or `this.it(`) is skipped.
pub fn find_anchor(source: &str, cursor: usize, word_bounded: bool) -> Option<usize> {
    ANCHORS
        .iter()
        .filter_map(|needle| {
            let mut end = floor_char_boundary(source, cursor.saturating_add(needle.len()).min(source.len()));
            while let Some(pos) = source[..end].rfind(needle) {
                let bounded = pos == 0 || {
                    let prev = source.as_bytes()[pos - 1];
                    !is_ident_byte(prev) && prev != b'.'
                };
                if !word_bounded || bounded {
                    return Some(pos);
                }
                end = pos;
            }
            None
        })
        .max()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Index just past the closing quote of the literal opening at `start`.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if quote != b'`' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

pub(crate) fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injects_after_nearest_header() {
        let source = "describe('A', function() { it('B', function() { }); });";
        let cursor = source.find("{ }").unwrap() + 1;
        let injection = MarkerInjector::default().inject(source, cursor).unwrap();
        assert_eq!(
            injection.text,
            "describe('A', function() { it('B', function() {'spoon://locator/sentinel'; }); });"
        );
        assert_eq!(injection.strip(), source);
    }

    #[test]
    fn test_no_anchor_before_cursor() {
        let source = "var x = 1;\ndescribe('A', function() {});";
        let err = MarkerInjector::default().inject(source, 3).unwrap_err();
        assert_eq!(err, LocateError::NoAnchorFound);
    }

    #[test]
    fn test_no_header_after_anchor() {
        let source = "describe('A', () => { x(); });";
        let err = MarkerInjector::default().inject(source, 20).unwrap_err();
        assert_eq!(err, LocateError::NoFunctionHeaderFound { anchor: 0 });
    }

    #[test]
    fn test_arrow_header_when_enabled() {
        let source = "describe('A', () => { x(); });";
        let injector = MarkerInjector::new(ScanMode::Textual, true);
        let injection = injector.inject(source, 20).unwrap();
        assert_eq!(injection.sentinel_at, source.find('{').unwrap() + 1);
    }

    #[test]
    fn test_anchor_may_start_at_cursor() {
        let source = "it('A', function() {});";
        assert_eq!(find_anchor(source, 0, false), Some(0));
    }

    #[test]
    fn test_textual_anchor_matches_inside_identifiers() {
        let source = "it('A', function() { submit(); });";
        let cursor = source.find("();").unwrap();
        assert_eq!(find_anchor(source, cursor, false), source.find("it(); }"));
        assert_eq!(find_anchor(source, cursor, true), Some(0));
    }

    #[test]
    fn test_structural_skips_helper_before_body() {
        let source = "it('A', helper(function() { return 1; }), function() { run(); });";
        let cursor = source.find("run").unwrap();

        let textual = MarkerInjector::new(ScanMode::Textual, false)
            .inject(source, cursor)
            .unwrap();
        assert_eq!(textual.sentinel_at, source.find("{ return").unwrap() + 1);

        let structural = MarkerInjector::new(ScanMode::Structural, false)
            .inject(source, cursor)
            .unwrap();
        assert_eq!(structural.sentinel_at, source.find("{ run").unwrap() + 1);
    }

    #[test]
    fn test_structural_ignores_strings_and_comments() {
        let source = "it('function() {', /* function() { */ function() { run(); });";
        let cursor = source.find("run").unwrap();
        let injection = MarkerInjector::new(ScanMode::Structural, false)
            .inject(source, cursor)
            .unwrap();
        assert_eq!(injection.sentinel_at, source.find("{ run").unwrap() + 1);
    }

    #[test]
    fn test_structural_stops_at_closing_paren() {
        let source = "it('A'); var f = function() {};";
        let err = MarkerInjector::new(ScanMode::Structural, false)
            .inject(source, source.len())
            .unwrap_err();
        assert_eq!(err, LocateError::NoFunctionHeaderFound { anchor: 0 });
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        let source = "it('A', function() {});";
        assert!(MarkerInjector::default().inject(source, 10_000).is_ok());
    }

    #[test]
    fn test_scan_mode_from_str() {
        assert_eq!("Structural".parse::<ScanMode>().unwrap(), ScanMode::Structural);
        assert!("fuzzy".parse::<ScanMode>().is_err());
    }
}
