//! Page identifiers and their canonical form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the document page a stroke belongs to.
///
/// Paged documents hand out page numbers while reflowable ones hand out an
/// opaque position pointer. The same logical page can show up as a number in
/// one code path and as a string after a reload, so keys are compared through
/// [`PageKey::canonical`] everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageKey {
    Number(i64),
    Pointer(String),
}

/// Normalized page key; two [`PageKey`]s are the same page iff these are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPage(String);

impl CanonicalPage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PageKey {
    /// Canonical form: the string representation, so `5` and `"5"` collide.
    pub fn canonical(&self) -> CanonicalPage {
        match self {
            PageKey::Number(n) => CanonicalPage(n.to_string()),
            PageKey::Pointer(s) => CanonicalPage(s.clone()),
        }
    }

    pub fn same_page(&self, other: &PageKey) -> bool {
        self == other || self.canonical() == other.canonical()
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKey::Number(n) => write!(f, "{n}"),
            PageKey::Pointer(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PageKey {
    fn from(n: i64) -> Self {
        PageKey::Number(n)
    }
}

impl From<i32> for PageKey {
    fn from(n: i32) -> Self {
        PageKey::Number(n as i64)
    }
}

impl From<&str> for PageKey {
    fn from(s: &str) -> Self {
        PageKey::Pointer(s.to_string())
    }
}

impl From<String> for PageKey {
    fn from(s: String) -> Self {
        PageKey::Pointer(s)
    }
}
