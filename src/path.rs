/// Filesystem-style information about a path, borrowed from it.
///
/// Created by [`PathInfo::derive`] or [`Uri::pathinfo`].
///
/// [`Uri::pathinfo`]: crate::Uri::pathinfo
///
/// # Examples
///
/// ```
/// use loose_uri::PathInfo;
///
/// let info = PathInfo::derive("/a/b/c.tar.gz");
/// assert_eq!(info.basename(), "c.tar.gz");
/// assert_eq!(info.dirname(), "/a/b");
/// assert_eq!(info.extension(), "gz");
/// assert_eq!(info.filename(), "c.tar");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathInfo<'a> {
    path: &'a str,
    basename: &'a str,
    dirname: &'a str,
    extension: &'a str,
    filename: &'a str,
}

impl<'a> PathInfo<'a> {
    /// Derives the information from a path. Never fails.
    ///
    /// - `basename`: everything after the last `'/'`, or the whole path if there is none.
    /// - `dirname`: the path without the basename and the `'/'` before it,
    ///   or `"/"` if that leaves nothing.
    /// - `extension`: everything after the last `'.'` of the basename, or `""`.
    /// - `filename`: the basename without `".extension"` when the extension is non-empty.
    #[must_use]
    pub fn derive(path: &'a str) -> Self {
        let (dirname, basename) = match path.rfind('/') {
            Some(i) => (&path[..i], &path[i + 1..]),
            None => ("", path),
        };
        let dirname = if dirname.is_empty() { "/" } else { dirname };

        let (filename, extension) = match basename.rfind('.') {
            Some(i) if i + 1 < basename.len() => (&basename[..i], &basename[i + 1..]),
            _ => (basename, ""),
        };

        PathInfo {
            path,
            basename,
            dirname,
            extension,
            filename,
        }
    }

    /// Returns the path the information was derived from.
    #[must_use]
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Returns the last segment of the path.
    #[must_use]
    pub fn basename(&self) -> &'a str {
        self.basename
    }

    /// Returns the path of the parent directory.
    #[must_use]
    pub fn dirname(&self) -> &'a str {
        self.dirname
    }

    /// Returns the extension of the basename, without the dot.
    #[must_use]
    pub fn extension(&self) -> &'a str {
        self.extension
    }

    /// Returns the basename without its extension.
    #[must_use]
    pub fn filename(&self) -> &'a str {
        self.filename
    }
}
