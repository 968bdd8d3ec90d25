use crate::errors::EntryPathError;
use std::fmt;

/// A normalized, nonempty, forward-slash-separated UTF-8 encoded relative path
///
/// Components are never empty, `.`, or `..`.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntryPath(String);

impl EntryPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the basename of the path
    pub fn file_name(&self) -> &str {
        match self.0.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    /// Return the path with its final component removed, or `None` if the path
    /// has only one component
    pub fn parent(&self) -> Option<EntryPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| EntryPath(parent.to_owned()))
    }

    /// Iterate over the components of the path
    pub fn components(&self) -> std::str::Split<'_, char> {
        self.0.split('/')
    }

    /// Return an iterator over the parent paths of the path, starting at the
    /// first component and stopping before the file name
    ///
    /// ```
    /// # use zarr_checksum_listing::zarr::EntryPath;
    /// let path = EntryPath::try_from("foo/bar/baz").unwrap();
    /// let mut parents = path.parents();
    /// assert_eq!(parents.next().unwrap().to_string(), "foo");
    /// assert_eq!(parents.next().unwrap().to_string(), "foo/bar");
    /// assert_eq!(parents.next(), None);
    /// ```
    pub fn parents(&self) -> Parents<'_> {
        Parents {
            path: &self.0,
            offset: 0,
        }
    }
}

impl fmt::Debug for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_debug())
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<EntryPath> for String {
    fn from(path: EntryPath) -> String {
        path.0
    }
}

impl TryFrom<&str> for EntryPath {
    type Error = EntryPathError;

    fn try_from(path: &str) -> Result<EntryPath, EntryPathError> {
        // Backslashes are part of a name, not separators
        let parts = path
            .split('/')
            .filter(|&s| !s.is_empty() && s != ".")
            .collect::<Vec<_>>();
        if path.starts_with('/') || parts.is_empty() || parts.contains(&"..") {
            return Err(EntryPathError(path.into()));
        }
        Ok(EntryPath(parts.join("/")))
    }
}

impl TryFrom<String> for EntryPath {
    type Error = EntryPathError;

    fn try_from(path: String) -> Result<EntryPath, EntryPathError> {
        EntryPath::try_from(path.as_str())
    }
}

/// Iterator over the parent paths of an [`EntryPath`]
///
/// The iterator's items are themselves [`EntryPath`]s.
///
/// This struct is returned by [`EntryPath::parents()`].
#[derive(Clone, Debug)]
pub struct Parents<'a> {
    path: &'a str,
    offset: usize,
}

impl Iterator for Parents<'_> {
    type Item = EntryPath;

    fn next(&mut self) -> Option<EntryPath> {
        let i = self.path.get(self.offset..)?.find('/')? + self.offset;
        self.offset = i + 1;
        Some(EntryPath(self.path[..i].to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parents() {
        let path = EntryPath::try_from("foo/bar/baz").unwrap();
        let mut parents = path.parents();
        assert_eq!(parents.next().unwrap().to_string(), "foo");
        assert_eq!(parents.next().unwrap().to_string(), "foo/bar");
        assert_eq!(parents.next(), None);
    }

    #[test]
    fn test_parents_len_1() {
        let path = EntryPath::try_from("foo").unwrap();
        let mut parents = path.parents();
        assert_eq!(parents.next(), None);
    }

    #[rstest]
    #[case("foo", "foo", None)]
    #[case("foo/bar", "bar", Some("foo"))]
    #[case("foo/bar/baz.zarr", "baz.zarr", Some("foo/bar"))]
    fn test_file_name_and_parent(
        #[case] path: &str,
        #[case] name: &str,
        #[case] parent: Option<&str>,
    ) {
        let path = EntryPath::try_from(path).unwrap();
        assert_eq!(path.file_name(), name);
        assert_eq!(
            path.parent().map(String::from),
            parent.map(String::from)
        );
    }

    #[rstest]
    #[case("foo", r#""foo""#)]
    #[case("foo/bar", r#""foo/bar""#)]
    #[case("foo\n/\tbar", r#""foo\n/\tbar""#)]
    fn test_debug(#[case] path: &str, #[case] repr: &str) {
        let path = EntryPath::try_from(path).unwrap();
        assert_eq!(format!("{path:?}"), repr);
    }

    #[rstest]
    #[case("foo", "foo")]
    #[case("foo/bar", "foo/bar")]
    #[case("foo/.", "foo")]
    #[case("./foo", "foo")]
    #[case("foo/./bar", "foo/bar")]
    #[case("foo/", "foo")]
    #[case("foo//bar", "foo/bar")]
    #[case("foo\\bar", "foo\\bar")]
    fn test_entrypath_try_from(#[case] path: &str, #[case] displayed: &str) {
        assert_eq!(EntryPath::try_from(path).unwrap().to_string(), displayed);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("/")]
    #[case("/foo")]
    #[case("foo/..")]
    #[case("../foo")]
    #[case("foo/../bar")]
    #[case("foo/bar/..")]
    fn test_entrypath_try_from_err(#[case] path: &str) {
        assert_eq!(
            EntryPath::try_from(path),
            Err(EntryPathError(path.into()))
        );
    }
}
