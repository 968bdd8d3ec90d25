use super::record::ChecksumRecord;
use crate::errors::KindConflictError;
use std::collections::HashSet;

/// The file and subdirectory checksums of a single directory.  This is the
/// data hashed to calculate the directory's own digest.
///
/// Each list is kept sorted by path with at most one record per path.  Lookups
/// are linear in the size of the list, which is fine for the fan-out of a
/// typical Zarr directory.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ChecksumCollection {
    files: Vec<ChecksumRecord>,
    directories: Vec<ChecksumRecord>,
}

impl ChecksumCollection {
    pub fn new<F, D>(files: F, directories: D) -> Self
    where
        F: IntoIterator<Item = ChecksumRecord>,
        D: IntoIterator<Item = ChecksumRecord>,
    {
        let mut collection = ChecksumCollection::default();
        collection.upsert_files(files);
        collection.upsert_directories(directories);
        collection
    }

    /// Construct from lists that are already known to be sorted and free of
    /// duplicate paths
    pub(super) fn from_sorted(
        files: Vec<ChecksumRecord>,
        directories: Vec<ChecksumRecord>,
    ) -> Self {
        ChecksumCollection { files, directories }
    }

    pub fn files(&self) -> &[ChecksumRecord] {
        &self.files
    }

    pub fn directories(&self) -> &[ChecksumRecord] {
        &self.directories
    }

    /// Total number of records across both lists
    pub fn len(&self) -> usize {
        self.files.len() + self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// Add file records, replacing any existing file record with the same
    /// path.  If the input contains the same path more than once, the last
    /// one wins.
    pub fn upsert_files<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = ChecksumRecord>,
    {
        upsert(&mut self.files, records);
    }

    /// Add directory records, replacing any existing directory record with the
    /// same path.  If the input contains the same path more than once, the
    /// last one wins.
    pub fn upsert_directories<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = ChecksumRecord>,
    {
        upsert(&mut self.directories, records);
    }

    /// Remove every file or directory record whose path is in `paths`.  Paths
    /// not present in the collection are ignored.
    pub fn remove<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .map(|p| p.as_ref().to_owned())
            .collect::<HashSet<_>>();
        self.files.retain(|r| !paths.contains(r.path()));
        self.directories.retain(|r| !paths.contains(r.path()));
    }

    /// Return an error if any path is present in both the file list and the
    /// directory list
    pub fn check_kinds(&self) -> Result<(), KindConflictError> {
        // Both lists are sorted, so walk them in step
        let mut dirs = self.directories.iter().peekable();
        for f in &self.files {
            while dirs.next_if(|d| d.path() < f.path()).is_some() {}
            if dirs.peek().is_some_and(|d| d.path() == f.path()) {
                return Err(KindConflictError {
                    path: f.path().to_owned(),
                });
            }
        }
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<ChecksumRecord>, Vec<ChecksumRecord>) {
        (self.files, self.directories)
    }
}

fn upsert<I>(list: &mut Vec<ChecksumRecord>, records: I)
where
    I: IntoIterator<Item = ChecksumRecord>,
{
    for rec in records {
        match list.iter_mut().find(|r| r.path() == rec.path()) {
            Some(slot) => *slot = rec,
            None => list.push(rec),
        }
    }
    list.sort_by(ChecksumRecord::cmp_path);
}
