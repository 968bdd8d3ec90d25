//! Paths of entries within a Zarr
mod entrypath;
pub use entrypath::*;
use std::fmt;

/// The path of a directory within a Zarr, which may be the Zarr root itself
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DirPath {
    Root,
    Path(EntryPath),
}

impl fmt::Display for DirPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirPath::Root => f.write_str("<root>"),
            DirPath::Path(ep) => <EntryPath as fmt::Display>::fmt(ep, f),
        }
    }
}

impl From<EntryPath> for DirPath {
    fn from(ep: EntryPath) -> DirPath {
        DirPath::Path(ep)
    }
}

impl From<Option<EntryPath>> for DirPath {
    fn from(ep: Option<EntryPath>) -> DirPath {
        ep.map_or(DirPath::Root, DirPath::Path)
    }
}
