//! Single-pass extraction of the eight URI parts.

use crate::pct_enc::table::{self, Table};
use borrow_or_share::{BorrowOrShare, Bos};
use std::{
    ops::{Deref, DerefMut},
    str,
};

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

/// Detailed cause of a [`ParseError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// Unexpected character at a position where no URI part can start.
    ///
    /// The error index points to the first byte of the character.
    UnexpectedChar,
}

/// An error occurred when extracting parts from a URI string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub(crate) index: usize,
    pub(crate) kind: ParseErrorKind,
}

impl ParseError {
    /// Returns the index at which the error occurred.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl crate::Error for ParseError {}

type Result<T> = std::result::Result<T, ParseError>;

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError {
            index: $index,
            kind: ParseErrorKind::$kind,
        })
    };
}

/// The raw parts of a URI string, as extracted by [`Parts::extract`].
///
/// # Variants
///
/// - `Parts<&str>`: borrowed from the input string.
/// - `Parts<String>`: owned.
///
/// An absent part is `None`; extraction never yields an empty part
/// except for the query, where `"?"` alone gives `Some("")`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Parts<T> {
    pub(crate) protocol: Option<T>,
    pub(crate) username: Option<T>,
    pub(crate) password: Option<T>,
    pub(crate) host: Option<T>,
    pub(crate) port: Option<T>,
    pub(crate) path: Option<T>,
    pub(crate) query: Option<T>,
    pub(crate) fragment: Option<T>,
}

impl<'a> Parts<&'a str> {
    pub(crate) const EMPTY: Self = Parts {
        protocol: None,
        username: None,
        password: None,
        host: None,
        port: None,
        path: None,
        query: None,
        fragment: None,
    };

    /// Extracts the parts of a URI string.
    ///
    /// The grammar is lenient: each part is optional and is tried once, in order,
    /// at the position where the previous one ended. Input left over after
    /// the last part that could be read is ignored.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is non-empty and no part at all can be read from it.
    ///
    /// # Examples
    ///
    /// ```
    /// use loose_uri::Parts;
    ///
    /// let parts = Parts::extract("https://user:pw@example.com:8443/a/b?x=1#top")?;
    /// assert_eq!(parts.protocol(), Some("https"));
    /// assert_eq!(parts.username(), Some("user"));
    /// assert_eq!(parts.password(), Some("pw"));
    /// assert_eq!(parts.host(), Some("example.com"));
    /// assert_eq!(parts.port(), Some("8443"));
    /// assert_eq!(parts.path(), Some("/a/b"));
    /// assert_eq!(parts.query(), Some("x=1"));
    /// assert_eq!(parts.fragment(), Some("top"));
    ///
    /// assert!(Parts::extract(":x").is_err());
    /// # Ok::<_, loose_uri::ParseError>(())
    /// ```
    pub fn extract(s: &'a str) -> Result<Self> {
        let mut parser = Parser {
            reader: Reader::new(s),
            out: Parts::EMPTY,
        };
        parser.parse_from_protocol();

        if parser.pos == 0 && !s.is_empty() {
            tracing::debug!(len = s.len(), "no URI part could be extracted");
            err!(0, UnexpectedChar);
        }
        Ok(parser.out)
    }

    /// Creates a new `Parts<String>` by cloning the contents of this `Parts<&str>`.
    #[must_use]
    pub fn to_owned(&self) -> Parts<String> {
        Parts {
            protocol: self.protocol.map(ToOwned::to_owned),
            username: self.username.map(ToOwned::to_owned),
            password: self.password.map(ToOwned::to_owned),
            host: self.host.map(ToOwned::to_owned),
            port: self.port.map(ToOwned::to_owned),
            path: self.path.map(ToOwned::to_owned),
            query: self.query.map(ToOwned::to_owned),
            fragment: self.fragment.map(ToOwned::to_owned),
        }
    }
}

impl<T: Bos<str>> Parts<T> {
    /// Borrows these parts as `Parts<&str>`.
    #[must_use]
    pub fn borrow(&self) -> Parts<&str> {
        fn part<T: Bos<str>>(p: &Option<T>) -> Option<&str> {
            p.as_ref().map(|p| p.borrow_or_share())
        }
        Parts {
            protocol: part(&self.protocol),
            username: part(&self.username),
            password: part(&self.password),
            host: part(&self.host),
            port: part(&self.port),
            path: part(&self.path),
            query: part(&self.query),
            fragment: part(&self.fragment),
        }
    }
}

macro_rules! part_getters {
    ($($(#[$doc:meta])* $name:ident)*) => {
        impl<'i, 'o, T: BorrowOrShare<'i, 'o, str>> Parts<T> {
            $(
                $(#[$doc])*
                #[must_use]
                pub fn $name(&'i self) -> Option<&'o str> {
                    self.$name.as_ref().map(|p| p.borrow_or_share())
                }
            )*
        }
    };
}

part_getters! {
    /// Returns the protocol (scheme) part, without the `"://"` delimiter.
    protocol
    /// Returns the username part.
    username
    /// Returns the password part.
    password
    /// Returns the host part.
    host
    /// Returns the port part, as the digits it was written with.
    port
    /// Returns the path part, which starts with `"/"` when present.
    path
    /// Returns the raw query part, without the leading `"?"`.
    query
    /// Returns the fragment part, without the leading `"#"`.
    fragment
}

impl<T: Bos<str>> std::fmt::Debug for Parts<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.borrow();
        f.debug_struct("Parts")
            .field("protocol", &p.protocol)
            .field("username", &p.username)
            .field("password", &p.password)
            .field("host", &p.host)
            .field("port", &p.port)
            .field("path", &p.path)
            .field("query", &p.query)
            .field("fragment", &p.fragment)
            .finish()
    }
}

#[cfg(feature = "serde")]
impl<T: Bos<str>> Serialize for Parts<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let p = self.borrow();
        let mut s = serializer.serialize_struct("Parts", 8)?;
        s.serialize_field("protocol", &p.protocol)?;
        s.serialize_field("username", &p.username)?;
        s.serialize_field("password", &p.password)?;
        s.serialize_field("host", &p.host)?;
        s.serialize_field("port", &p.port)?;
        s.serialize_field("path", &p.path)?;
        s.serialize_field("query", &p.query)?;
        s.serialize_field("fragment", &p.fragment)?;
        s.end()
    }
}

/// Lenient URI part extractor.
///
/// # Invariants
///
/// `pos <= len`, `pos` is non-decreasing and on the boundary of a UTF-8 code point.
///
/// # Guarantees
///
/// Every part in `out` is a non-overlapping subslice of the input, in input order.
struct Parser<'a> {
    reader: Reader<'a>,
    out: Parts<&'a str>,
}

struct Reader<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Deref for Parser<'a> {
    type Target = Reader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl DerefMut for Parser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

impl<'a> Reader<'a> {
    fn new(s: &'a str) -> Self {
        Reader { s, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.s[self.pos..]
    }

    // Any call to this method must keep the invariants.
    fn skip(&mut self, n: usize) {
        // INVARIANT: `pos` is non-decreasing.
        self.pos += n;
        debug_assert!(self.pos <= self.s.len());
    }

    /// Returns the length of the longest run of allowed characters
    /// starting `offset` bytes ahead, without reading it.
    fn scan(&self, offset: usize, table: Table) -> usize {
        self.rest().as_bytes()[offset..]
            .iter()
            .position(|&x| !table.allows_byte(x))
            .unwrap_or(self.rest().len() - offset)
    }

    /// Reads a non-empty run of allowed characters.
    fn read(&mut self, table: Table) -> Option<&'a str> {
        let n = self.scan(0, table);
        if n == 0 {
            return None;
        }
        let s = &self.rest()[..n];
        // INVARIANT: A table either allows all non-ASCII bytes or none of them,
        // so the run always ends on a code point boundary.
        self.skip(n);
        Some(s)
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            // INVARIANT: The remaining input starts with `s` so it's fine to skip `s.len()`.
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.rest().as_bytes().get(i).copied()
    }
}

impl Parser<'_> {
    fn parse_from_protocol(&mut self) {
        let len = self.scan(0, table::PROTOCOL);
        if len > 0 && self.rest()[len..].starts_with("://") {
            self.out.protocol = Some(&self.rest()[..len]);
            // INVARIANT: Skipping the protocol and "://" is fine.
            self.skip(len + 3);
        }
        self.parse_from_userinfo();
    }

    fn parse_from_userinfo(&mut self) {
        // username [":" password] "@", all or nothing.
        let user_len = self.scan(0, table::USERINFO);
        if user_len > 0 {
            let mut end = user_len;
            let mut password = None;

            if self.peek(end) == Some(b':') {
                let pass_len = self.scan(end + 1, table::USERINFO);
                if pass_len > 0 {
                    password = Some((end + 1, end + 1 + pass_len));
                    end += 1 + pass_len;
                }
            }

            if self.peek(end) == Some(b'@') {
                let rest = self.rest();
                self.out.username = Some(&rest[..user_len]);
                self.out.password = password.map(|(start, end)| &rest[start..end]);
                // INVARIANT: Skipping word characters, ":" and "@" is fine.
                self.skip(end + 1);
            }
        }
        self.parse_from_host();
    }

    fn parse_from_host(&mut self) {
        self.out.host = self.read(table::HOST);

        if self.peek(0) == Some(b':') {
            let len = self.scan(1, table::PORT);
            if len > 0 {
                self.out.port = Some(&self.rest()[1..1 + len]);
                // INVARIANT: Skipping ":" and digits is fine.
                self.skip(1 + len);
            }
        }
        self.parse_from_path();
    }

    fn parse_from_path(&mut self) {
        if self.peek(0) == Some(b'/') {
            self.out.path = self.read(table::PATH);
        }

        if self.read_str("?") {
            self.out.query = Some(self.read(table::QUERY).unwrap_or(""));
        }

        if self.peek(0) == Some(b'#') {
            let rest = &self.rest()[1..];
            let len = rest
                .find(['\n', '\r', '\u{2028}', '\u{2029}'])
                .unwrap_or(rest.len());
            if len > 0 {
                self.out.fragment = Some(&rest[..len]);
                // INVARIANT: `len` is the index of a character or the end of input.
                self.skip(1 + len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(s: &str) -> Parts<&str> {
        Parts::extract(s).unwrap()
    }

    #[test]
    fn full() {
        assert_eq!(
            extract("http://u:p@host:8080/path?x=1#frag"),
            Parts {
                protocol: Some("http"),
                username: Some("u"),
                password: Some("p"),
                host: Some("host"),
                port: Some("8080"),
                path: Some("/path"),
                query: Some("x=1"),
                fragment: Some("frag"),
            }
        );
    }

    #[test]
    fn relative() {
        assert_eq!(
            extract("/a/b.html?q#f"),
            Parts {
                path: Some("/a/b.html"),
                query: Some("q"),
                fragment: Some("f"),
                ..Parts::EMPTY
            }
        );
        assert_eq!(
            extract("/?only=query"),
            Parts {
                path: Some("/"),
                query: Some("only=query"),
                ..Parts::EMPTY
            }
        );
    }

    #[test]
    fn host_swallows_delimiters() {
        // The host rule only stops at ":" and "/".
        assert_eq!(
            extract("example.com?x=1#y"),
            Parts {
                host: Some("example.com?x=1#y"),
                ..Parts::EMPTY
            }
        );
    }

    #[test]
    fn userinfo_requires_at() {
        assert_eq!(
            extract("user:secret@example.com"),
            Parts {
                username: Some("user"),
                password: Some("secret"),
                host: Some("example.com"),
                ..Parts::EMPTY
            }
        );
        assert_eq!(
            extract("https://localhost:3000"),
            Parts {
                protocol: Some("https"),
                host: Some("localhost"),
                port: Some("3000"),
                ..Parts::EMPTY
            }
        );
        // A dot is not a word character.
        assert_eq!(
            extract("http://john.doe@example.com/"),
            Parts {
                protocol: Some("http"),
                host: Some("john.doe@example.com"),
                path: Some("/"),
                ..Parts::EMPTY
            }
        );
    }

    #[test]
    fn protocol_rules() {
        assert_eq!(extract("svn+ssh://h").protocol, Some("svn+ssh"));
        // Digits are not allowed, so the whole thing falls back to a host.
        assert_eq!(
            extract("h2c://h"),
            Parts {
                host: Some("h2c"),
                ..Parts::EMPTY
            }
        );
        // Without "//", "scheme:" reads as credentials.
        assert_eq!(
            extract("mailto:john@example.com"),
            Parts {
                username: Some("mailto"),
                password: Some("john"),
                host: Some("example.com"),
                ..Parts::EMPTY
            }
        );
        assert_eq!(extract(":8080x").port, Some("8080"));
    }

    #[test]
    fn trailing_garbage_ignored() {
        assert_eq!(
            extract("http://host:abc/path"),
            Parts {
                protocol: Some("http"),
                host: Some("host"),
                ..Parts::EMPTY
            }
        );
        assert_eq!(
            extract("//x"),
            Parts {
                path: Some("//x"),
                ..Parts::EMPTY
            }
        );
    }

    #[test]
    fn empty_query_and_fragment() {
        assert_eq!(
            extract("/p?#"),
            Parts {
                path: Some("/p"),
                query: Some(""),
                ..Parts::EMPTY
            }
        );
        assert_eq!(extract("/p#a\nb").fragment, Some("a"));
        assert_eq!(extract("/p#a\u{2028}b").fragment, Some("a"));
    }

    #[test]
    fn non_ascii() {
        assert_eq!(
            extract("http://例子.测试/路径?键=值"),
            Parts {
                protocol: Some("http"),
                host: Some("例子.测试"),
                path: Some("/路径"),
                query: Some("键=值"),
                ..Parts::EMPTY
            }
        );
    }

    #[test]
    fn leading_hash_is_host() {
        // A fragment can only follow a port, a path or a query.
        assert_eq!(
            extract("#"),
            Parts {
                host: Some("#"),
                ..Parts::EMPTY
            }
        );
        assert_eq!(
            extract("#top"),
            Parts {
                host: Some("#top"),
                ..Parts::EMPTY
            }
        );
        assert_eq!(extract("#\n").host, Some("#\n"));
        assert_eq!(extract(":1#top").fragment, Some("top"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(extract(""), Parts::EMPTY);
    }

    #[test]
    fn nothing_extracted() {
        for s in [":", ":x", ":/", "::1", ":#"] {
            assert_eq!(
                Parts::extract(s),
                Err(ParseError {
                    index: 0,
                    kind: ParseErrorKind::UnexpectedChar
                }),
                "{s:?}"
            );
        }
    }

    #[test]
    fn to_owned_and_borrow() {
        let parts = extract("ftp://h/x");
        let owned = parts.to_owned();
        assert_eq!(owned.borrow(), parts);
        assert_eq!(owned.host(), Some("h"));
    }
}
