//! Default base URI used when a [`Uri`] is created without input.
//!
//! Web environments expose the location of the current document; elsewhere
//! there is nothing comparable. Rather than looking it up, the location is
//! provided through the [`BaseUri`] trait, either per call with
//! [`Uri::with_base`] or once per process with [`set_default`].
//!
//! [`Uri`]: crate::Uri
//! [`Uri::with_base`]: crate::Uri::with_base

use crate::parse::{ParseError, Parts};
use std::{borrow::Cow, sync::OnceLock};

/// The base URI used when no provider yields one.
pub const FALLBACK: &str = "/";

/// A provider of the base URI.
///
/// Implemented for string types, for `Option` of a provider,
/// for [`NoBase`], and for closures wrapped with [`from_fn`].
pub trait BaseUri {
    /// Returns the base URI, or `None` if there is none.
    fn base_uri(&self) -> Option<Cow<'_, str>>;
}

impl BaseUri for str {
    fn base_uri(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl BaseUri for String {
    fn base_uri(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl<B: BaseUri + ?Sized> BaseUri for &B {
    fn base_uri(&self) -> Option<Cow<'_, str>> {
        (**self).base_uri()
    }
}

impl<B: BaseUri> BaseUri for Option<B> {
    fn base_uri(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(BaseUri::base_uri)
    }
}

/// A provider that never yields a base URI.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBase;

impl BaseUri for NoBase {
    fn base_uri(&self) -> Option<Cow<'_, str>> {
        None
    }
}

/// A provider backed by a closure. Created by [`from_fn`].
#[derive(Clone, Copy, Debug)]
pub struct FromFn<F>(F);

/// Creates a provider that calls the given closure each time it is asked.
///
/// # Examples
///
/// ```
/// use loose_uri::{base, Uri};
///
/// let location = || Some(String::from("https://example.com/page?id=7"));
/// let uri = Uri::with_base(&base::from_fn(location))?;
/// assert_eq!(uri.host(), Some("example.com"));
/// # Ok::<_, loose_uri::ParseError>(())
/// ```
pub fn from_fn<F: Fn() -> Option<String>>(f: F) -> FromFn<F> {
    FromFn(f)
}

impl<F: Fn() -> Option<String>> BaseUri for FromFn<F> {
    fn base_uri(&self) -> Option<Cow<'_, str>> {
        (self.0)().map(Cow::Owned)
    }
}

/// An error occurred when setting the process-wide default base URI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SetDefaultError {
    /// The default was already fixed, either by an earlier call to
    /// [`set_default`] or by a call to [`default_uri`].
    AlreadySet,
    /// The provided base URI could not be parsed.
    Parse(ParseError),
}

impl crate::Error for SetDefaultError {}

static DEFAULT: OnceLock<String> = OnceLock::new();

/// Fixes the process-wide default base URI.
///
/// The provider is asked once; if it yields nothing, [`FALLBACK`] is used.
///
/// # Errors
///
/// Returns `Err` if the default is already fixed or if the provided URI
/// cannot be parsed. The default is left unchanged in both cases.
///
/// # Examples
///
/// ```
/// use loose_uri::{base, Uri};
///
/// base::set_default("https://example.com/docs/")?;
/// assert_eq!(base::default_uri(), "https://example.com/docs/");
/// assert_eq!(Uri::new().path(), "/docs/");
///
/// assert_eq!(base::set_default("/other"), Err(base::SetDefaultError::AlreadySet));
/// # Ok::<_, base::SetDefaultError>(())
/// ```
pub fn set_default<B: BaseUri + ?Sized>(base: &B) -> Result<(), SetDefaultError> {
    let value = base
        .base_uri()
        .map_or_else(|| FALLBACK.to_owned(), Cow::into_owned);

    if let Err(e) = Parts::extract(&value) {
        return Err(SetDefaultError::Parse(e));
    }

    DEFAULT
        .set(value)
        .map_err(|_| SetDefaultError::AlreadySet)?;
    tracing::debug!(base = default_uri(), "default base URI fixed");
    Ok(())
}

/// Returns the process-wide default base URI.
///
/// If no default was set, this fixes it to [`FALLBACK`].
#[must_use]
pub fn default_uri() -> &'static str {
    DEFAULT.get_or_init(|| FALLBACK.to_owned())
}
