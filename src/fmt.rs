use crate::{
    base::SetDefaultError,
    parse::{ParseError, ParseErrorKind},
    pct_enc::DecodeError,
    query, Uri,
};
use std::fmt::{self, Write};

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ParseErrorKind::UnexpectedChar => "unexpected character at index ",
        };
        write!(f, "{}{}", msg, self.index)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DecodeError::InvalidOctet { index } => {
                write!(f, "invalid percent-encoded octet at index {index}")
            }
            DecodeError::InvalidUtf8 { valid_up_to } => write!(
                f,
                "decoded bytes are not valid UTF-8 after {valid_up_to} bytes"
            ),
        }
    }
}

impl fmt::Display for SetDefaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetDefaultError::AlreadySet => f.write_str("default base URI is already set"),
            SetDefaultError::Parse(e) => write!(f, "invalid default base URI: {e}"),
        }
    }
}

fn non_empty(part: &Option<String>) -> Option<&str> {
    part.as_deref().filter(|s| !s.is_empty())
}

impl fmt::Display for Uri {
    /// Writes the URI.
    ///
    /// The `protocol://[username[:password]@]host[:port]` prefix is written only
    /// when both the protocol and the host are present. Empty parts count as absent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(protocol), Some(host)) = (non_empty(&self.protocol), non_empty(&self.host)) {
            f.write_str(protocol)?;
            f.write_str("://")?;

            match (non_empty(&self.username), non_empty(&self.password)) {
                (Some(username), Some(password)) => write!(f, "{username}:{password}@")?,
                (Some(username), None) => write!(f, "{username}@")?,
                _ => {}
            }

            f.write_str(host)?;
            if let Some(port) = non_empty(&self.port) {
                f.write_char(':')?;
                f.write_str(port)?;
            }
        }

        f.write_str(&self.path)?;

        let query = query::encode(&self.query);
        if !query.is_empty() {
            f.write_char('?')?;
            f.write_str(&query)?;
        }

        if let Some(fragment) = non_empty(&self.fragment) {
            f.write_char('#')?;
            f.write_str(fragment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uri")
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &self.password)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("fragment", &self.fragment)
            .finish()
    }
}
