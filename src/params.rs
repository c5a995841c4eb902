//! Captured route parameters and query strings
//!
//! [`RouteParams`] holds the named capture groups of the route pattern that
//! matched a location (`(?P<id>\d+)`). [`QueryParams`] holds the decoded
//! `?key=value` pairs of the location itself.

use std::collections::HashMap;

/// Named captures from a matched route pattern
///
/// # Example
///
/// ```
/// use route_stack::RouteParams;
///
/// let mut params = RouteParams::new();
/// params.insert("id", "123");
///
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get_as::<u32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: HashMap<String, String>,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Get a captured value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a captured value parsed as `T`
    ///
    /// Returns `None` if the group did not participate or does not parse.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Query parameters parsed from a location's query string
///
/// Keys may repeat; values keep their order of appearance.
///
/// # Example
///
/// ```
/// use route_stack::QueryParams;
///
/// let query = QueryParams::from_query_string("page=1&tag=rust&tag=nav&flag");
///
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get_all("tag").unwrap().len(), 2);
/// assert_eq!(query.get("flag"), Some(""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string (without the leading `?`)
    ///
    /// A pair without `=` is kept as a key with an empty value.
    pub fn from_query_string(query: &str) -> Self {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params
                .entry(decode_uri_component(key))
                .or_default()
                .push(decode_uri_component(value));
        }

        Self { params }
    }

    /// First value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.first().map(String::as_str)
    }

    /// All values for a key, in order of appearance
    pub fn get_all(&self, key: &str) -> Option<&Vec<String>> {
        self.params.get(key)
    }

    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Append a value for a key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Encode back into a query string, keys sorted for a stable result
    pub fn to_query_string(&self) -> String {
        let mut keys: Vec<&String> = self.params.keys().collect();
        keys.sort();

        keys.into_iter()
            .flat_map(|key| {
                self.params[key].iter().map(move |value| {
                    format!(
                        "{}={}",
                        encode_uri_component(key),
                        encode_uri_component(value)
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Percent-decode a component; `+` decodes to a space.
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced.
fn decode_uri_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let decoded = s
                    .get(i + 1..i + 3)
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            }
            b'+' => out.push(b' '),
            other => out.push(other),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
