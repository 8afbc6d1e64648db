//! Address list parsing
//!
//! Turns operator-typed text into an [`AddressList`]. Each line is one
//! address. Blank lines and `#` comments survive normalization so the
//! text can be shown back to the operator, but they never reach the list.
//!
//! ```
//! use pagewheel_core::parser;
//!
//! let list = parser::parse("example.com\n#comment\n\nhttp://already.com");
//! assert_eq!(list.as_slice(), ["https://example.com", "http://already.com"]);
//! ```

use serde::{Deserialize, Serialize};

/// Prefix added to lines without a recognized scheme
pub const DEFAULT_SCHEME_PREFIX: &str = "https://";

const COMMENT_MARKER: char = '#';
const RECOGNIZED_PREFIXES: &[&str] = &["http://", "https://"];

/// Ordered, possibly repeating sequence of absolute addresses
///
/// Repeated entries are kept; an address listed twice is drawn twice
/// as often.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressList(Vec<String>);

impl AddressList {
    /// Create a list from already-absolute addresses
    pub fn new(addresses: Vec<String>) -> Self {
        Self(addresses)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for AddressList {
    fn from(addresses: Vec<String>) -> Self {
        Self(addresses)
    }
}

impl FromIterator<String> for AddressList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether a trimmed line is carried through normalization untouched
fn is_passthrough(line: &str) -> bool {
    line.is_empty() || line.starts_with(COMMENT_MARKER)
}

fn has_recognized_scheme(line: &str) -> bool {
    RECOGNIZED_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Normalize a single line
///
/// Returns the trimmed line, with `https://` prepended when it is an
/// address without a recognized scheme.
pub fn normalize_line(line: &str) -> String {
    let line = line.trim();
    if is_passthrough(line) || has_recognized_scheme(line) {
        line.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, line)
    }
}

/// Normalize raw text for re-display
///
/// Every line is trimmed and scheme-corrected; comments and blank lines
/// are preserved in place.
pub fn normalize_text(raw: &str) -> String {
    raw.lines().map(normalize_line).collect::<Vec<_>>().join("\n")
}

/// Parse raw text into an address list
///
/// Never fails: text without any address lines yields an empty list,
/// which callers must reject before starting a rotation.
pub fn parse(raw: &str) -> AddressList {
    raw.lines()
        .map(normalize_line)
        .filter(|line| !is_passthrough(line))
        .collect()
}
