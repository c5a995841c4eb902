//! Location values
//!
//! A [`Location`] is the scheme-free URI pushed onto the stack:
//! `path[?query][#fragment]`. It is parsed once on creation and never
//! mutated afterwards. No normalization is applied; two locations are equal
//! exactly when their string forms are equal.

use crate::params::QueryParams;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An immutable, parsed navigation target.
///
/// # Example
///
/// ```
/// use route_stack::Location;
///
/// let location = Location::new("/users/42?tab=posts#top");
/// assert_eq!(location.path(), "/users/42");
/// assert_eq!(location.query(), Some("tab=posts"));
/// assert_eq!(location.fragment(), Some("top"));
/// assert!(location.same_path(&Location::new("/users/42")));
/// ```
#[derive(Clone)]
pub struct Location {
    raw: String,
    /// End of the path component (start of `?` if any)
    path_end: usize,
    /// End of the query component (start of `#` if any)
    query_end: usize,
}

impl Location {
    /// Parse a location from its string form
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let query_end = raw.find('#').unwrap_or(raw.len());
        let path_end = raw[..query_end].find('?').unwrap_or(query_end);
        Self {
            raw,
            path_end,
            query_end,
        }
    }

    /// The root location `/`
    pub fn root() -> Self {
        Self::new("/")
    }

    /// Full string form
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path component, the only part route patterns see
    pub fn path(&self) -> &str {
        &self.raw[..self.path_end]
    }

    /// Raw query string without the leading `?`
    ///
    /// `Some("")` for a location ending in a bare `?`.
    pub fn query(&self) -> Option<&str> {
        (self.path_end < self.query_end).then(|| &self.raw[self.path_end + 1..self.query_end])
    }

    /// Fragment without the leading `#`
    pub fn fragment(&self) -> Option<&str> {
        (self.query_end < self.raw.len()).then(|| &self.raw[self.query_end + 1..])
    }

    /// Decoded query parameters
    pub fn query_params(&self) -> QueryParams {
        self.query()
            .map(QueryParams::from_query_string)
            .unwrap_or_default()
    }

    /// Compare path components only, ignoring query and fragment
    pub fn same_path(&self, other: &Location) -> bool {
        self.path() == other.path()
    }

    /// Consume the location, returning its string form
    pub fn into_string(self) -> String {
        self.raw
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialEq<str> for Location {
    fn eq(&self, other: &str) -> bool {
        self.raw == other
    }
}

impl PartialEq<&str> for Location {
    fn eq(&self, other: &&str) -> bool {
        self.raw == *other
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Location").field(&self.raw).finish()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Location {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Location {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Location {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&String> for Location {
    fn from(raw: &String) -> Self {
        Self::new(raw.as_str())
    }
}

impl From<&Location> for Location {
    fn from(location: &Location) -> Self {
        location.clone()
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
