#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

//! A lenient URI parser and builder.
//!
//! This crate splits a URI string into eight parts (protocol, username,
//! password, host, port, path, query and fragment), lets you read and replace
//! each of them, and writes the result back to a string. Query strings are
//! decoded into a structured map supporting array (`name[]`) and nested
//! (`name[key]`) parameters.
//!
//! Parsing is permissive rather than standards-compliant: a URI that RFC 3986
//! would reject is accepted as long as some part can be read from it, and input
//! that matches no further part is ignored. See [`Parts::extract`] for the grammar.
//!
//! # Examples
//!
//! ```
//! use loose_uri::{QueryValue, Uri};
//!
//! let mut uri = Uri::parse("http://u:p@host:8080/docs/guide.html?x=1&f[a]=1#intro")?;
//!
//! assert_eq!(uri.protocol(), Some("http"));
//! assert_eq!(uri.username(), Some("u"));
//! assert_eq!(uri.password(), Some("p"));
//! assert_eq!(uri.host(), Some("host"));
//! assert_eq!(uri.port(), Some("8080"));
//! assert_eq!(uri.path(), "/docs/guide.html");
//! assert_eq!(uri.query_param("x"), Some(&QueryValue::from("1")));
//! assert_eq!(uri.query_param("f"), Some(&QueryValue::nested([("a", "1")])));
//! assert_eq!(uri.fragment(), Some("intro"));
//! assert_eq!(uri.pathinfo().extension(), "html");
//!
//! uri.set_port(8443).set_query_param("x", "a b");
//! assert_eq!(uri.to_string(), "http://u:p@host:8443/docs/guide.html?x=a%20b&f[a]=1#intro");
//! # Ok::<_, loose_uri::ParseError>(())
//! ```
//!
//! # Crate features
//!
//! - `serde`: Implements `Serialize` for [`Uri`], [`Parts`] and [`QueryValue`],
//!   and `Deserialize` for [`Uri`] and [`QueryValue`].
//!
//! # Logging
//!
//! The crate emits [`tracing`] events at the `debug` and `trace` levels
//! when input is tolerated rather than accepted as is.

pub mod base;
pub mod pct_enc;
pub mod query;

mod fmt;
mod parse;
mod path;
mod uri;

pub use parse::{ParseError, ParseErrorKind, Parts};
pub use path::PathInfo;
pub use query::{QueryMap, QueryValue};
pub use uri::Uri;

use std::error::Error;
