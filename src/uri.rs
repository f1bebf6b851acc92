use crate::{
    base::{self, BaseUri},
    parse::{ParseError, Parts},
    path::PathInfo,
    query::{self, QueryMap, QueryValue},
};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
#[cfg(feature = "serde")]
use std::borrow::Cow;

/// A mutable URI value object.
///
/// A `Uri` holds the eight parts of a URI: protocol, username, password,
/// host, port, path, query and fragment. The query is kept decoded as a
/// [`QueryMap`]. Every part can be read and replaced, and the whole is
/// written back to a string with [`Display`](std::fmt::Display).
///
/// The path is never empty: it defaults to `"/"` and always starts with `"/"`.
///
/// # Examples
///
/// Rewrite a tracking link:
///
/// ```
/// use loose_uri::{QueryValue, Uri};
///
/// let mut uri = Uri::parse("http://shop.example.com/item/42?utm_source=mail&ref=abc#reviews")?;
///
/// uri.set_protocol("https")
///     .set_host("www.example.com")
///     .set_path("products/42")
///     .set_query_param("ref", "newsletter")
///     .set_query_param("tags", QueryValue::array(["sale", "new"]));
/// uri.remove_query_param("utm_source");
///
/// assert_eq!(
///     uri.to_string(),
///     "https://www.example.com/products/42?ref=newsletter&tags[]=sale&tags[]=new#reviews"
/// );
/// # Ok::<_, loose_uri::ParseError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Uri {
    pub(crate) protocol: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<String>,
    pub(crate) path: String,
    pub(crate) query: QueryMap,
    pub(crate) fragment: Option<String>,
}

macro_rules! optional_part {
    ($($name:ident, $set:ident, $take:ident, $desc:literal;)*) => {
        $(
            #[doc = concat!("Returns the ", $desc, ".")]
            #[must_use]
            pub fn $name(&self) -> Option<&str> {
                self.$name.as_deref()
            }

            #[doc = concat!("Sets the ", $desc, ".")]
            pub fn $set(&mut self, value: impl Into<String>) -> &mut Self {
                self.$name = Some(value.into());
                self
            }

            #[doc = concat!("Removes the ", $desc, " and returns it.")]
            pub fn $take(&mut self) -> Option<String> {
                self.$name.take()
            }
        )*
    };
}

impl Uri {
    /// Parses a URI string.
    ///
    /// # Errors
    ///
    /// Returns `Err` if no part at all can be extracted from the string.
    /// See [`Parts::extract`] for the grammar.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Parts::extract(s).map(Self::from)
    }

    /// Creates a `Uri` from the process-wide default base URI.
    ///
    /// See [`base::set_default`]. Without a default this is
    /// equivalent to [`Uri::default`], i.e., the path `"/"`.
    #[must_use]
    pub fn new() -> Self {
        // The default base is validated when it is set.
        Self::parse(base::default_uri()).unwrap_or_default()
    }

    /// Creates a `Uri` from the base URI yielded by the given provider,
    /// or the path `"/"` if it yields nothing.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the provided base URI cannot be parsed.
    pub fn with_base<B: BaseUri + ?Sized>(base: &B) -> Result<Self, ParseError> {
        match base.base_uri() {
            Some(s) => Self::parse(&s),
            None => Ok(Self::default()),
        }
    }

    optional_part! {
        protocol, set_protocol, take_protocol, "protocol (scheme), without `\"://\"`";
        username, set_username, take_username, "username";
        password, set_password, take_password, "password";
        host, set_host, take_host, "host";
        fragment, set_fragment, take_fragment, "fragment, without `\"#\"`";
    }

    /// Alias for [`host`](Self::host).
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.host()
    }

    /// Alias for [`set_host`](Self::set_host).
    pub fn set_hostname(&mut self, value: impl Into<String>) -> &mut Self {
        self.set_host(value)
    }

    /// Returns the port, as it was written.
    #[must_use]
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Converts the port to `u16`.
    ///
    /// Returns `None` if there is no port, or if it is not a number
    /// in the range of `u16`.
    #[must_use]
    pub fn port_to_u16(&self) -> Option<u16> {
        self.port()?.parse().ok()
    }

    /// Sets the port from anything that can be written as a string,
    /// such as `8080` or `"8080"`. The value is not validated.
    pub fn set_port(&mut self, port: impl ToString) -> &mut Self {
        self.port = Some(port.to_string());
        self
    }

    /// Removes the port and returns it.
    pub fn take_port(&mut self) -> Option<String> {
        self.port.take()
    }

    /// Returns the path, which always starts with `"/"`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sets the path, prefixing it with `"/"` if it does not start with one.
    ///
    /// # Examples
    ///
    /// ```
    /// use loose_uri::Uri;
    ///
    /// let mut uri = Uri::default();
    /// assert_eq!(uri.set_path("foo").path(), "/foo");
    /// assert_eq!(uri.set_path("/bar").path(), "/bar");
    /// assert_eq!(uri.set_path("").path(), "/");
    /// ```
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        self.path = path;
        self
    }

    /// Returns filesystem-style information about the current path.
    ///
    /// # Examples
    ///
    /// ```
    /// use loose_uri::Uri;
    ///
    /// let uri = Uri::parse("https://example.com/a/b/c.txt?x=1")?;
    /// let info = uri.pathinfo();
    /// assert_eq!(info.basename(), "c.txt");
    /// assert_eq!(info.dirname(), "/a/b");
    /// assert_eq!(info.extension(), "txt");
    /// assert_eq!(info.filename(), "c");
    /// # Ok::<_, loose_uri::ParseError>(())
    /// ```
    #[must_use]
    pub fn pathinfo(&self) -> PathInfo<'_> {
        PathInfo::derive(&self.path)
    }

    /// Returns the decoded query.
    #[must_use]
    pub fn query(&self) -> &QueryMap {
        &self.query
    }

    /// Returns a mutable reference to the decoded query.
    pub fn query_mut(&mut self) -> &mut QueryMap {
        &mut self.query
    }

    /// Returns the value of a query parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use loose_uri::{QueryValue, Uri};
    ///
    /// let uri = Uri::parse("/?tags[]=x&tags[]=y&f[a]=1")?;
    /// assert_eq!(uri.query_param("tags"), Some(&QueryValue::array(["x", "y"])));
    /// assert_eq!(uri.query_param("f"), Some(&QueryValue::nested([("a", "1")])));
    /// assert_eq!(uri.query_param("missing"), None);
    /// # Ok::<_, loose_uri::ParseError>(())
    /// ```
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&QueryValue> {
        self.query.get(name)
    }

    /// Sets a query parameter.
    ///
    /// An existing parameter keeps its position in the query.
    pub fn set_query_param(
        &mut self,
        name: impl Into<String>,
        value: impl Into<QueryValue>,
    ) -> &mut Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Merges parameters into the query.
    ///
    /// Parameters with a name already in the query replace the existing value
    /// in place; the others are appended in iteration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use loose_uri::Uri;
    ///
    /// let mut uri = Uri::parse("/search?q=rust&page=2")?;
    /// uri.merge_query([("page", "3"), ("lang", "en")]);
    /// assert_eq!(uri.to_string(), "/search?q=rust&page=3&lang=en");
    /// # Ok::<_, loose_uri::ParseError>(())
    /// ```
    pub fn merge_query<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Removes a query parameter and returns its value.
    ///
    /// The remaining parameters keep their order.
    pub fn remove_query_param(&mut self, name: &str) -> Option<QueryValue> {
        self.query.shift_remove(name)
    }

    /// Returns the query encoded as a string, without the leading `"?"`.
    #[must_use]
    pub fn query_string(&self) -> String {
        query::encode(&self.query)
    }
}

impl Default for Uri {
    /// Creates a `Uri` with the path `"/"` and nothing else.
    fn default() -> Self {
        Uri {
            protocol: None,
            username: None,
            password: None,
            host: None,
            port: None,
            path: base::FALLBACK.to_owned(),
            query: QueryMap::new(),
            fragment: None,
        }
    }
}

impl From<Parts<&str>> for Uri {
    /// Creates a `Uri` from extracted parts, decoding the query
    /// and defaulting an absent or empty path to `"/"`.
    fn from(parts: Parts<&str>) -> Self {
        let path = match parts.path {
            Some(path) if !path.is_empty() => path.to_owned(),
            _ => base::FALLBACK.to_owned(),
        };
        Uri {
            protocol: parts.protocol.map(ToOwned::to_owned),
            username: parts.username.map(ToOwned::to_owned),
            password: parts.password.map(ToOwned::to_owned),
            host: parts.host.map(ToOwned::to_owned),
            port: parts.port.map(ToOwned::to_owned),
            path,
            query: parts.query.map(query::decode).unwrap_or_default(),
            fragment: parts.fragment.map(ToOwned::to_owned),
        }
    }
}

impl FromStr for Uri {
    type Err = ParseError;

    /// Equivalent to [`Uri::parse`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = ParseError;

    /// Equivalent to [`Uri::parse`].
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <Cow<'de, str>>::deserialize(deserializer)?;
        Uri::parse(&s)
            .map_err(|e| de::Error::custom(format_args!("failed to parse {s:?} as URI: {e}")))
    }
}
