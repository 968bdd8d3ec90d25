use super::{aggregate_digest, ChecksumCollection, ChecksumListing, ChecksumRecord};
use crate::zarr::{DirPath, EntryPath};
use enum_dispatch::enum_dispatch;
use log::debug;

/// Trait for behavior shared by [`FileChecksum`] and [`DirChecksum`]
#[enum_dispatch]
pub trait Checksum {
    /// Return the path within the Zarr for which this is a checksum
    fn relpath(&self) -> &EntryPath;

    /// Return the final component of the path
    fn name(&self) -> &str {
        self.relpath().file_name()
    }

    /// Return the digest of the file or directory
    fn checksum(&self) -> &str;

    /// Consume the node and return the digest of the file or directory
    fn into_checksum(self) -> String;

    /// Return the record for this entry in its parent directory's collection
    fn to_record(&self) -> ChecksumRecord {
        ChecksumRecord::new(self.relpath().as_str(), self.checksum())
    }
}

/// A content digest computed elsewhere for a file in a Zarr
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FileChecksum {
    pub(super) relpath: EntryPath,
    pub(super) checksum: String,
}

impl FileChecksum {
    pub fn new<S: Into<String>>(relpath: EntryPath, checksum: S) -> Self {
        FileChecksum {
            relpath,
            checksum: checksum.into(),
        }
    }
}

impl Checksum for FileChecksum {
    fn relpath(&self) -> &EntryPath {
        &self.relpath
    }

    fn checksum(&self) -> &str {
        &self.checksum
    }

    fn into_checksum(self) -> String {
        self.checksum
    }
}

/// The aggregate digest of a directory inside a Zarr
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DirChecksum {
    pub(super) relpath: EntryPath,
    pub(super) checksum: String,
}

impl DirChecksum {
    pub fn new<S: Into<String>>(relpath: EntryPath, checksum: S) -> Self {
        DirChecksum {
            relpath,
            checksum: checksum.into(),
        }
    }
}

impl Checksum for DirChecksum {
    fn relpath(&self) -> &EntryPath {
        &self.relpath
    }

    fn checksum(&self) -> &str {
        &self.checksum
    }

    fn into_checksum(self) -> String {
        self.checksum
    }
}

/// An enum of [`FileChecksum`] and [`DirChecksum`]
#[enum_dispatch(Checksum)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EntryChecksum {
    File(FileChecksum),
    Directory(DirChecksum),
}

impl EntryChecksum {
    /// True iff this node represents a directory checksum
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryChecksum::Directory(_))
    }

    /// True iff this node represents a file checksum
    pub fn is_file(&self) -> bool {
        matches!(self, EntryChecksum::File(_))
    }
}

/// Struct for computing the checksum for a directory.  After creation,
/// [`push()`][Dirsummer::push] the checksums for each directory entry and then
/// call [`checksum()`][Dirsummer::checksum] to fetch the directory's digest.
///
/// Pushing an entry whose path was already pushed with the same kind replaces
/// the earlier checksum, so a `Dirsummer` can be kept around and updated as
/// the directory's entries change.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dirsummer {
    relpath: DirPath,
    collection: ChecksumCollection,
}

impl Dirsummer {
    pub fn new(relpath: DirPath) -> Dirsummer {
        Dirsummer {
            relpath,
            collection: ChecksumCollection::default(),
        }
    }

    /// Construct from record lists that are already sorted by path and free of
    /// duplicate paths
    pub(super) fn from_sorted(
        relpath: DirPath,
        files: Vec<ChecksumRecord>,
        directories: Vec<ChecksumRecord>,
    ) -> Dirsummer {
        Dirsummer {
            relpath,
            collection: ChecksumCollection::from_sorted(files, directories),
        }
    }

    /// Return the path within the Zarr for the directory
    pub fn relpath(&self) -> &DirPath {
        &self.relpath
    }

    /// Add or replace the checksum for an entry of the directory
    pub fn push<N: Into<EntryChecksum>>(&mut self, chksum: N) {
        let node = chksum.into();
        let record = node.to_record();
        match node {
            EntryChecksum::File(_) => self.collection.upsert_files([record]),
            EntryChecksum::Directory(_) => self.collection.upsert_directories([record]),
        }
    }

    /// Forget the checksums for the entries at the given paths
    pub fn remove<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.collection.remove(paths);
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn collection(&self) -> &ChecksumCollection {
        &self.collection
    }

    /// Compute the listing for the directory based on the entry checksums
    /// added so far
    pub fn listing(&self) -> ChecksumListing {
        self.clone().into_listing()
    }

    /// Consume the `Dirsummer` and return the directory's listing
    pub fn into_listing(self) -> ChecksumListing {
        let listing = ChecksumListing::new(self.collection);
        debug!(
            "Computed checksum for directory {}: {}",
            self.relpath,
            listing.digest()
        );
        listing
    }

    /// Compute the digest for the directory based on the entry checksums added
    /// so far
    pub fn checksum(&self) -> String {
        aggregate_digest(&self.collection)
    }
}
