//! Byte pattern tables used by the extractor and the percent-encoder.
//!
//! Unlike the strict ABNF rules of RFC 3986, these tables describe the
//! permissive character classes of a loose URI grammar.

/// A table specifying the characters allowed in a string.
///
/// ASCII characters are allowed individually. Non-ASCII characters
/// are either all allowed or all disallowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Table(u64, u64, bool);

impl Table {
    /// Creates a table that only allows the given ASCII bytes.
    ///
    /// # Panics
    ///
    /// Panics if any of the bytes is not ASCII.
    #[must_use]
    pub const fn new(mut bytes: &[u8]) -> Self {
        let mut table = 0;
        while let [cur, rem @ ..] = bytes {
            assert!(cur.is_ascii(), "cannot allow non-ASCII byte");
            table |= 1u128.wrapping_shl(*cur as u32);
            bytes = rem;
        }
        Self(table as u64, (table >> 64) as u64, false)
    }

    /// Combines two tables into one.
    ///
    /// Returns a new table that allows all the characters allowed
    /// by `self` or by `other`.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0, self.1 | other.1, self.2 | other.2)
    }

    /// Subtracts from this table.
    ///
    /// Returns a new table that allows all the characters allowed
    /// by `self` but not allowed by `other`.
    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self(self.0 & !other.0, self.1 & !other.1, self.2 & !other.2)
    }

    /// Returns a table that allows exactly the characters not allowed by `self`,
    /// non-ASCII ones included.
    #[must_use]
    pub const fn complement(self) -> Self {
        Self(!self.0, !self.1, !self.2)
    }

    #[inline]
    pub(crate) const fn allows_ascii(self, x: u8) -> bool {
        let table = if x < 64 {
            self.0
        } else if x < 128 {
            self.1
        } else {
            return false;
        };
        table & 1u64.wrapping_shl(x as u32) != 0
    }

    /// Checks whether non-ASCII characters are allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows_non_ascii(self) -> bool {
        self.2
    }

    /// Checks whether the given byte may appear in a string allowed by the table.
    ///
    /// Bytes of multi-byte UTF-8 sequences are governed by [`allows_non_ascii`].
    ///
    /// [`allows_non_ascii`]: Self::allows_non_ascii
    #[inline]
    pub(crate) const fn allows_byte(self, x: u8) -> bool {
        if x < 128 {
            self.allows_ascii(x)
        } else {
            self.allows_non_ascii()
        }
    }

    /// Checks whether the given character is allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows(self, ch: char) -> bool {
        if ch.is_ascii() {
            self.allows_ascii(ch as u8)
        } else {
            self.allows_non_ascii()
        }
    }
}

const fn new(bytes: &[u8]) -> Table {
    Table::new(bytes)
}

/// `ALPHA = %x41-5A / %x61-7A`
pub const ALPHA: Table = new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");

/// `DIGIT = %x30-39`
pub const DIGIT: Table = new(b"0123456789");

/// `HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"`, case-insensitive.
pub const HEXDIG: Table = DIGIT.or(new(b"ABCDEFabcdef"));

/// `word = ALPHA / DIGIT / "_"`
pub const WORD: Table = ALPHA.or(DIGIT).or(new(b"_"));

/// `protocol = 1*( ALPHA / "-" / "+" / "." )`
///
/// Digits are not allowed.
pub const PROTOCOL: Table = ALPHA.or(new(b"-+."));

/// `userinfo-part = 1*word`
pub const USERINFO: Table = WORD;

/// Any character except `":"` and `"/"`.
pub const HOST: Table = new(b":/").complement();

/// `port = 1*DIGIT`
pub const PORT: Table = DIGIT;

/// Any character except `"?"` and `"#"`.
pub const PATH: Table = QUERY.sub(new(b"?"));

/// Any character except `"#"`.
pub const QUERY: Table = new(b"#").complement();

/// Characters left unencoded in a query name or value:
///
/// `ALPHA / DIGIT / "-" / "_" / "." / "!" / "~" / "*" / "'" / "(" / ")"`
pub const COMPONENT: Table = ALPHA.or(DIGIT).or(new(b"-_.!~*'()"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_membership() {
        assert!(PROTOCOL.allows('+'));
        assert!(!PROTOCOL.allows('1'));
        assert!(WORD.allows('_'));
        assert!(!WORD.allows('-'));
        assert!(!HOST.allows(':'));
        assert!(!HOST.allows('/'));
        assert!(HOST.allows('@'));
        assert!(HOST.allows('?'));
    }

    #[test]
    fn non_ascii_follows_complement() {
        assert!(!WORD.allows('é'));
        assert!(HOST.allows('é'));
        assert!(PATH.allows('测'));
        assert!(!COMPONENT.allows('测'));
        assert!(!HOST.allows_byte(b':'));
        assert!(HOST.allows_byte(0xe6));
        assert!(!COMPONENT.allows_byte(0xe6));
    }

    #[test]
    fn sub_removes() {
        let t = COMPONENT.sub(new(b"()"));
        assert!(!t.allows('('));
        assert!(t.allows('~'));
        assert!(HOST.sub(HOST) == new(b""));
    }
}
