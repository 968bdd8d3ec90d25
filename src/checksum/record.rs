use std::cmp::Ordering;

/// The digest of a single file or subdirectory within a directory, keyed by
/// its path relative to the Zarr root
///
/// Records are ordered by path alone; see [`ChecksumRecord::cmp_path()`].
/// This type does not implement `Ord`, as two records with the
/// same path but different digests are unequal yet sort as equivalent.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ChecksumRecord {
    path: String,
    digest: String,
}

impl ChecksumRecord {
    pub fn new<P, D>(path: P, digest: D) -> Self
    where
        P: Into<String>,
        D: Into<String>,
    {
        ChecksumRecord {
            path: path.into(),
            digest: digest.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn into_digest(self) -> String {
        self.digest
    }

    /// Compare two records by path only.  The digest never takes part in the
    /// comparison, not even as a tie-breaker.
    pub fn cmp_path(&self, other: &ChecksumRecord) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl<P: Into<String>, D: Into<String>> From<(P, D)> for ChecksumRecord {
    fn from((path, digest): (P, D)) -> ChecksumRecord {
        ChecksumRecord::new(path, digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_dominates_digest() {
        let a = ChecksumRecord::new("1/2/3/a/z", "z");
        let b = ChecksumRecord::new("1/2/3/b/z", "y");
        let mut records = vec![b.clone(), a.clone()];
        records.sort_by(ChecksumRecord::cmp_path);
        assert_eq!(records, [a, b]);
    }

    #[test]
    fn test_equal_paths_compare_equal() {
        let a = ChecksumRecord::new("foo", "aaaa");
        let b = ChecksumRecord::new("foo", "0000");
        assert_eq!(a.cmp_path(&b), Ordering::Equal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_tuple() {
        let r = ChecksumRecord::from(("foo/bar", String::from("abc")));
        assert_eq!(r.path(), "foo/bar");
        assert_eq!(r.digest(), "abc");
        assert_eq!(r.into_digest(), "abc");
    }
}
