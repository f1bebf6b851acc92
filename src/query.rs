//! Structured query strings with bracket syntax.
//!
//! A query string such as `a=1&tags[]=x&tags[]=y&f[k]=v` is decoded into a
//! [`QueryMap`] holding a scalar, an array and a nested map respectively:
//!
//! ```
//! use loose_uri::query::{self, QueryValue};
//!
//! let map = query::decode("a=1&tags[]=x&tags[]=y&f[k]=v");
//! assert_eq!(map["a"], QueryValue::from("1"));
//! assert_eq!(map["tags"], QueryValue::array(["x", "y"]));
//! assert_eq!(map["f"], QueryValue::nested([("k", "v")]));
//!
//! assert_eq!(query::encode(&map), "a=1&tags[]=x&tags[]=y&f[k]=v");
//! ```

use crate::pct_enc;
use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A decoded query, mapping parameter names to values in insertion order.
pub type QueryMap = IndexMap<String, QueryValue>;

/// The value of a query parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    /// A plain value, written as `name=value`.
    Scalar(String),
    /// An ordered sequence of values, written as `name[]=value` once per element.
    Array(Vec<String>),
    /// A map of sub-keys to values, written as `name[key]=value` once per entry.
    Nested(IndexMap<String, String>),
}

impl QueryValue {
    /// Creates an array value from the given elements.
    pub fn array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Creates a nested value from the given sub-key and value pairs.
    ///
    /// A repeated sub-key keeps its first position and its last value.
    pub fn nested<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Nested(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the value if it is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the elements if the value is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns the entries if the value is a nested map.
    #[must_use]
    pub fn as_nested(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Self::Nested(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        Self::Array(value)
    }
}

impl From<IndexMap<String, String>> for QueryValue {
    fn from(value: IndexMap<String, String>) -> Self {
        Self::Nested(value)
    }
}

/// Splits `name[key]` into `("name", "key")`.
///
/// The key runs from the first `'['` to the first `']'` after it.
/// Anything after that `']'` is ignored.
fn split_bracket(name: &str) -> Option<(&str, &str)> {
    let open = name.find('[')?;
    let len = name[open + 1..].find(']')?;
    Some((&name[..open], &name[open + 1..open + 1 + len]))
}

/// Decodes a value, falling back to an empty string when it is not well-formed.
fn decode_value(raw: &str) -> String {
    match pct_enc::decode(raw) {
        Ok(value) => value.into_owned(),
        Err(e) => {
            tracing::trace!(raw = raw, error = %e, "undecodable query value replaced by empty string");
            String::new()
        }
    }
}

/// Decodes a raw query string (without the leading `"?"`) into a [`QueryMap`].
///
/// The string is split on `'&'`, skipping empty segments, and each segment on
/// its first `'='`. A segment without `'='` gets an empty value. Values are
/// percent-decoded; a value that fails to decode becomes an empty string.
/// Names are kept verbatim.
///
/// Bracket syntax switches the shape of a parameter, and the latest shape wins:
///
/// - `name[]=v` appends to the array under `name`, replacing anything that is not an array.
/// - `name[k]=v` sets `k` in the nested map under `name`, replacing anything that is not a nested map.
/// - `name=v` replaces whatever is under `name` with the scalar.
///
/// # Examples
///
/// ```
/// use loose_uri::query::{self, QueryValue};
///
/// let map = query::decode("a[]=1&a[]=2&a[x]=3&flag&bad=%zz");
/// assert_eq!(map["a"], QueryValue::nested([("x", "3")]));
/// assert_eq!(map["flag"], QueryValue::from(""));
/// assert_eq!(map["bad"], QueryValue::from(""));
/// ```
#[must_use]
pub fn decode(raw: &str) -> QueryMap {
    let mut map = QueryMap::new();

    for segment in raw.split('&').filter(|s| !s.is_empty()) {
        let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
        let value = decode_value(value);

        match split_bracket(name) {
            None => {
                map.insert(name.to_owned(), QueryValue::Scalar(value));
            }
            Some((base, "")) => match map.get_mut(base) {
                Some(QueryValue::Array(items)) => items.push(value),
                _ => {
                    map.insert(base.to_owned(), QueryValue::Array(vec![value]));
                }
            },
            Some((base, key)) => match map.get_mut(base) {
                Some(QueryValue::Nested(entries)) => {
                    entries.insert(key.to_owned(), value);
                }
                _ => {
                    let entries = IndexMap::from_iter([(key.to_owned(), value)]);
                    map.insert(base.to_owned(), QueryValue::Nested(entries));
                }
            },
        }
    }
    map
}

/// Encodes a [`QueryMap`] into a query string (without the leading `"?"`).
///
/// Parameters are written in map order. Values are percent-encoded
/// with [`pct_enc::encode`]; names and sub-keys are written verbatim.
/// Empty arrays and empty nested maps are omitted.
#[must_use]
pub fn encode(map: &QueryMap) -> String {
    let mut buf = String::new();
    encode_to(map, &mut buf);
    buf
}

/// Encodes a [`QueryMap`] and appends the result onto the end of a buffer.
pub fn encode_to(map: &QueryMap, buf: &mut String) {
    let start = buf.len();
    let mut push_pair = |name: &str, brackets: Option<&str>, value: &str| {
        if buf.len() > start {
            buf.push('&');
        }
        buf.push_str(name);
        if let Some(key) = brackets {
            buf.push('[');
            buf.push_str(key);
            buf.push(']');
        }
        buf.push('=');
        pct_enc::encode_to(value, buf);
    };

    for (name, value) in map {
        match value {
            QueryValue::Scalar(v) => push_pair(name, None, v),
            QueryValue::Array(items) => {
                for item in items {
                    push_pair(name, Some(""), item);
                }
            }
            QueryValue::Nested(entries) => {
                for (key, v) in entries {
                    push_pair(name, Some(key), v);
                }
            }
        }
    }
}

#[cfg(feature = "serde")]
impl Serialize for QueryValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Scalar(s) => serializer.serialize_str(s),
            Self::Array(items) => serializer.collect_seq(items),
            Self::Nested(entries) => serializer.collect_map(entries),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for QueryValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = QueryValue;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a string, a sequence of strings, or a map of strings")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<QueryValue, E> {
                Ok(QueryValue::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<QueryValue, E> {
                Ok(QueryValue::Scalar(v))
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<QueryValue, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element::<String>()? {
                    items.push(item);
                }
                Ok(QueryValue::Array(items))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<QueryValue, A::Error> {
                let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((k, v)) = map.next_entry::<String, String>()? {
                    entries.insert(k, v);
                }
                Ok(QueryValue::Nested(entries))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_split() {
        assert_eq!(split_bracket("a"), None);
        assert_eq!(split_bracket("a[]"), Some(("a", "")));
        assert_eq!(split_bracket("a[b]"), Some(("a", "b")));
        assert_eq!(split_bracket("a[b][c]"), Some(("a", "b")));
        assert_eq!(split_bracket("a[b[c]"), Some(("a", "b[c")));
        assert_eq!(split_bracket("a[b"), None);
        assert_eq!(split_bracket("a]b[c]"), Some(("a]b", "c")));
    }

    #[test]
    fn empty() {
        assert!(decode("").is_empty());
        assert!(decode("&&").is_empty());
        assert_eq!(encode(&QueryMap::new()), "");
    }

    #[test]
    fn split_once_on_eq() {
        let map = decode("a=b=c&d==");
        assert_eq!(map["a"], QueryValue::from("b=c"));
        assert_eq!(map["d"], QueryValue::from("="));
    }

    #[test]
    fn last_form_wins() {
        let map = decode("a[x]=1&a[]=2&a[]=3");
        assert_eq!(map["a"], QueryValue::array(["2", "3"]));

        let map = decode("a[]=1&a=2");
        assert_eq!(map["a"], QueryValue::from("2"));

        let map = decode("a=1&a[k]=2&a[k]=3&a[j]=4");
        assert_eq!(map["a"], QueryValue::nested([("k", "3"), ("j", "4")]));
    }

    #[test]
    fn replaced_slot_keeps_position() {
        let map = decode("a=1&b=2&a[]=3");
        assert!(map.keys().eq(["a", "b"]));
        assert_eq!(encode(&map), "a[]=3&b=2");
    }

    #[test]
    fn empty_collections_are_omitted() {
        let mut map = QueryMap::new();
        map.insert("a".into(), QueryValue::Array(Vec::new()));
        map.insert("b".into(), QueryValue::Nested(IndexMap::new()));
        assert_eq!(encode(&map), "");
        map.insert("c".into(), QueryValue::from("1"));
        assert_eq!(encode(&map), "c=1");
    }

    #[test]
    fn encode_to_appends() {
        let mut buf = String::from("/p?");
        encode_to(&decode("x=1&y=2"), &mut buf);
        assert_eq!(buf, "/p?x=1&y=2");
    }

    #[test]
    fn values_are_escaped() {
        let mut map = QueryMap::new();
        map.insert("q".into(), QueryValue::from("a b&c=d"));
        assert_eq!(encode(&map), "q=a%20b%26c%3Dd");
        assert_eq!(decode(&encode(&map)), map);
    }

    #[test]
    fn accessors() {
        let v = QueryValue::from("x");
        assert_eq!(v.as_scalar(), Some("x"));
        assert_eq!(v.as_array(), None);
        let v = QueryValue::array(["x"]);
        assert_eq!(v.as_array(), Some(&["x".to_owned()][..]));
        assert_eq!(v.as_nested(), None);
        let v = QueryValue::nested([("k", "v")]);
        assert_eq!(v.as_nested().map(|m| m["k"].as_str()), Some("v"));
    }
}
