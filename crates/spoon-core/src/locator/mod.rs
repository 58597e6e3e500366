//! Test locator: which `describe`/`it` block is the cursor inside?
//!
//! Locating runs in three stages:
//!
//! 1. [`MarkerInjector`] writes a sentinel literal into the body of the
//!    nearest test call at or before the cursor.
//! 2. [`SourceParser`] parses the rewritten text with tree-sitter.
//! 3. [`find_test_path`] searches the tree for the sentinel and returns the
//!    labels of the enclosing test calls.
//!
//! Every failure is recoverable; [`locate_test_name`] returns `None` for all
//! of them.

mod cursor;
mod error;
mod marker;
mod treesitter;
mod walker;

pub use cursor::{char_to_byte_offset, line_column_to_offset, line_number_at};
pub use error::LocateError;
pub use marker::{find_anchor, Injection, MarkerInjector, ScanMode, ANCHORS, SENTINEL, SENTINEL_STATEMENT};
pub use treesitter::{Dialect, SourceParser};
pub use walker::{find_test_path, TestPath, TEST_FUNCTIONS};

use tracing::debug;

/// Knobs for a [`Locator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocatorOptions {
    pub dialect: Dialect,
    pub scan: ScanMode,
    pub arrow_functions: bool,
}

/// Something that can name the test under a cursor.
pub trait TestMatcher {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Name of the test enclosing the character offset `cursor`, if any.
    fn find_first_match(&self, source: &str, cursor: usize) -> Option<String>;
}

/// Locates `describe`/`it` unit specs.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    injector: MarkerInjector,
    parser: SourceParser,
}

impl Locator {
    pub fn new(options: LocatorOptions) -> Self {
        Self {
            injector: MarkerInjector::new(options.scan, options.arrow_functions),
            parser: SourceParser::new(options.dialect),
        }
    }

    /// Path of the test enclosing the character offset `cursor`.
    pub fn locate(&self, source: &str, cursor: usize) -> Result<TestPath, LocateError> {
        let byte_cursor = char_to_byte_offset(source, cursor);
        let injection = self.injector.inject(source, byte_cursor)?;
        let tree = self.parser.parse_tree(&injection.text)?;
        find_test_path(&tree, &injection.text)
    }
}

impl TestMatcher for Locator {
    fn name(&self) -> &'static str {
        "unit-spec"
    }

    fn find_first_match(&self, source: &str, cursor: usize) -> Option<String> {
        match self.locate(source, cursor) {
            Ok(path) => Some(path.render()),
            Err(e) => {
                debug!(matcher = self.name(), "no test located: {e}");
                None
            }
        }
    }
}

/// Ordered list of matchers; the first one to name a test wins.
pub struct MatcherChain {
    matchers: Vec<Box<dyn TestMatcher>>,
}

impl MatcherChain {
    /// Chain with the built-in unit spec matcher.
    pub fn new(options: LocatorOptions) -> Self {
        Self {
            matchers: vec![Box::new(Locator::new(options))],
        }
    }

    /// Chain with no matchers.
    pub fn empty() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    pub fn register(&mut self, matcher: Box<dyn TestMatcher>) {
        self.matchers.push(matcher);
    }

    pub fn find_first_match_in(&self, source: &str, cursor: usize) -> Option<String> {
        self.matchers
            .iter()
            .find_map(|m| m.find_first_match(source, cursor))
    }
}

impl Default for MatcherChain {
    fn default() -> Self {
        Self::new(LocatorOptions::default())
    }
}

/// Name of the JavaScript test enclosing the character offset `cursor`,
/// using the default textual scan.
pub fn locate_test_name(source: &str, cursor: usize) -> Option<String> {
    Locator::default().find_first_match(source, cursor)
}
