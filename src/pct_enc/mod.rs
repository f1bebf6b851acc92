//! Percent-encoding utilities.
//!
//! The encoder mirrors the `encodeURIComponent` primitive found in web
//! environments: every character outside [`table::COMPONENT`] is encoded as
//! the uppercase `%XX` triples of its UTF-8 bytes. The decoder is strict and
//! fails on malformed triples or on decoded bytes that are not UTF-8.

pub mod table;

pub use table::Table;

use std::{borrow::Cow, iter::FusedIterator, str};

/// An error occurred when percent-decoding a string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// A percent character `"%"` not followed by two hexadecimal digits.
    InvalidOctet {
        /// The index of the percent character in the input.
        index: usize,
    },
    /// The decoded bytes are not valid UTF-8.
    InvalidUtf8 {
        /// The length of the longest valid UTF-8 prefix of the decoded bytes.
        valid_up_to: usize,
    },
}

impl crate::Error for DecodeError {}

pub(crate) fn encode_byte(x: u8) -> &'static str {
    const TABLE: &[u8; 256 * 3] = &{
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut i = 0;
        let mut table = [0; 256 * 3];
        while i < 256 {
            table[i * 3] = b'%';
            table[i * 3 + 1] = HEX_DIGITS[i >> 4];
            table[i * 3 + 2] = HEX_DIGITS[i & 0b1111];
            i += 1;
        }
        table
    };

    const TABLE_STR: &str = match str::from_utf8(TABLE) {
        Ok(s) => s,
        Err(_) => unreachable!(),
    };

    &TABLE_STR[x as usize * 3..x as usize * 3 + 3]
}

/// Percent-encodes a string, leaving only the characters in [`table::COMPONENT`] unencoded.
///
/// This method allocates only when the string contains any character to encode.
///
/// # Examples
///
/// ```
/// use loose_uri::pct_enc;
///
/// assert_eq!(pct_enc::encode("Ferris the crab!"), "Ferris%20the%20crab!");
/// assert_eq!(pct_enc::encode("a&b=c"), "a%26b%3Dc");
/// assert_eq!(pct_enc::encode("张三"), "%E5%BC%A0%E4%B8%89");
/// ```
#[must_use]
pub fn encode(s: &str) -> Cow<'_, str> {
    encode_with(table::COMPONENT, s)
}

/// Percent-encodes a string with the given table.
///
/// A character is preserved if the table [allows] it; it is percent-encoded otherwise.
///
/// [allows]: Table::allows
#[must_use]
pub fn encode_with(table: Table, s: &str) -> Cow<'_, str> {
    let mut iter = Encode::new(table, s);
    match iter.next() {
        None => Cow::Borrowed(""),
        Some(EncodedChunk::Unencoded(chunk)) if chunk.len() == s.len() => Cow::Borrowed(chunk),
        Some(first) => {
            let mut buf = String::with_capacity(s.len() * 3 / 2);
            buf.push_str(first.as_str());
            iter.for_each(|chunk| buf.push_str(chunk.as_str()));
            Cow::Owned(buf)
        }
    }
}

/// Percent-encodes a string and appends the result onto the end of a buffer.
pub fn encode_to(s: &str, buf: &mut String) {
    for chunk in Encode::new(table::COMPONENT, s) {
        buf.push_str(chunk.as_str());
    }
}

/// An iterator used to percent-encode a string slice.
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
struct Encode<'s> {
    table: Table,
    source: &'s str,
    to_enc: &'s [u8],
}

impl<'s> Encode<'s> {
    fn new(table: Table, source: &'s str) -> Self {
        Self {
            table,
            source,
            to_enc: &[],
        }
    }
}

/// An item returned by the [`Encode`] iterator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EncodedChunk<'a> {
    /// An unencoded subslice.
    Unencoded(&'a str),
    /// A byte, percent-encoded (for example, `0x20` encoded as `"%20"`).
    PctEncoded(&'static str),
}

impl<'a> EncodedChunk<'a> {
    fn as_str(self) -> &'a str {
        match self {
            Self::Unencoded(s) | Self::PctEncoded(s) => s,
        }
    }
}

impl<'a> Iterator for Encode<'a> {
    type Item = EncodedChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let [x, rem @ ..] = self.to_enc {
            self.to_enc = rem;
            return Some(EncodedChunk::PctEncoded(encode_byte(*x)));
        }

        if self.source.is_empty() {
            return None;
        }

        let mut iter = self.source.char_indices();

        let first_unallowed_i = iter
            .find_map(|(i, ch)| (!self.table.allows(ch)).then_some(i))
            .unwrap_or(self.source.len());

        let next_allowed_i = iter
            .find_map(|(i, ch)| self.table.allows(ch).then_some(i))
            .unwrap_or(self.source.len());

        if first_unallowed_i == 0 {
            let (unallowed, rem) = self.source.split_at(next_allowed_i);
            self.source = rem;

            let (x, rem) = unallowed.as_bytes().split_first()?;
            self.to_enc = rem;

            Some(EncodedChunk::PctEncoded(encode_byte(*x)))
        } else {
            let allowed = &self.source[..first_unallowed_i];
            self.to_enc = &self.source.as_bytes()[first_unallowed_i..next_allowed_i];
            self.source = &self.source[next_allowed_i..];

            Some(EncodedChunk::Unencoded(allowed))
        }
    }
}

impl FusedIterator for Encode<'_> {}

const fn gen_octet_table(hi: bool) -> [u8; 256] {
    let mut out = [0xff; 256];
    let shift = if hi { 4 } else { 0 };

    let mut i = 0;
    while i < 10 {
        out[(i + b'0') as usize] = i << shift;
        i += 1;
    }
    while i < 16 {
        out[(i - 10 + b'A') as usize] = i << shift;
        out[(i - 10 + b'a') as usize] = i << shift;
        i += 1;
    }
    out
}

const OCTET_TABLE_HI: &[u8; 256] = &gen_octet_table(true);
const OCTET_TABLE_LO: &[u8; 256] = &gen_octet_table(false);

/// Decodes a percent-encoded octet, assuming that the bytes are hexadecimal.
fn decode_octet(hi: u8, lo: u8) -> u8 {
    debug_assert!(hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit());
    OCTET_TABLE_HI[hi as usize] | OCTET_TABLE_LO[lo as usize]
}

pub(crate) const fn is_hexdig_pair(hi: u8, lo: u8) -> bool {
    table::HEXDIG.allows_ascii(hi) && table::HEXDIG.allows_ascii(lo)
}

/// Checks that every `"%"` in the string starts a well-formed triple.
fn validate(s: &str) -> Result<(), DecodeError> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes[i + 1..] {
                [hi, lo, ..] if is_hexdig_pair(hi, lo) => i += 3,
                _ => return Err(DecodeError::InvalidOctet { index: i }),
            }
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Percent-decodes a string.
///
/// Note that `"+"` is **not** decoded as a space.
///
/// This method allocates only when the string contains any percent-encoded octet.
///
/// # Errors
///
/// Returns `Err` if a `"%"` is not followed by two hexadecimal digits,
/// or if the decoded bytes are not valid UTF-8.
///
/// # Examples
///
/// ```
/// use loose_uri::pct_enc::{self, DecodeError};
///
/// assert_eq!(pct_enc::decode("%C2%A1Hola%21").unwrap(), "¡Hola!");
/// assert_eq!(pct_enc::decode("a+b").unwrap(), "a+b");
/// assert_eq!(pct_enc::decode("100%"), Err(DecodeError::InvalidOctet { index: 3 }));
/// assert_eq!(pct_enc::decode("%FF"), Err(DecodeError::InvalidUtf8 { valid_up_to: 0 }));
/// ```
pub fn decode(s: &str) -> Result<Cow<'_, str>, DecodeError> {
    validate(s)?;

    let mut iter = Decode { source: s };
    let mut buf = match iter.next() {
        None => return Ok(Cow::Borrowed("")),
        Some(DecodedChunk::Unencoded(chunk)) if chunk.len() == s.len() => {
            return Ok(Cow::Borrowed(chunk))
        }
        Some(DecodedChunk::Unencoded(chunk)) => {
            let mut buf = Vec::with_capacity(s.len());
            buf.extend_from_slice(chunk.as_bytes());
            buf
        }
        Some(DecodedChunk::PctDecoded(x)) => {
            let mut buf = Vec::with_capacity(s.len());
            buf.push(x);
            buf
        }
    };

    for chunk in iter {
        match chunk {
            DecodedChunk::Unencoded(s) => buf.extend_from_slice(s.as_bytes()),
            DecodedChunk::PctDecoded(x) => buf.push(x),
        }
    }

    String::from_utf8(buf).map(Cow::Owned).map_err(|e| DecodeError::InvalidUtf8 {
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// An iterator used to decode a validated string.
#[derive(Clone, Debug)]
struct Decode<'a> {
    source: &'a str,
}

/// An item returned by the [`Decode`] iterator.
#[derive(Clone, Copy, Debug)]
enum DecodedChunk<'a> {
    /// An unencoded subslice.
    Unencoded(&'a str),
    /// A percent-encoded octet, decoded (for example, `"%20"` decoded as `0x20`).
    PctDecoded(u8),
}

impl<'a> Iterator for Decode<'a> {
    type Item = DecodedChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.source.is_empty() {
            return None;
        }

        let i = self
            .source
            .bytes()
            .position(|x| x == b'%')
            .unwrap_or(self.source.len());

        let s;
        if i == 0 {
            (s, self.source) = self.source.split_at(3);
            let x = decode_octet(s.as_bytes()[1], s.as_bytes()[2]);
            Some(DecodedChunk::PctDecoded(x))
        } else {
            (s, self.source) = self.source.split_at(i);
            Some(DecodedChunk::Unencoded(s))
        }
    }
}

impl FusedIterator for Decode<'_> {}
