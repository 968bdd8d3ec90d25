use crate::zarr::EntryPath;
use thiserror::Error;

/// Error returned when a checksum listing document cannot be decoded
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("checksum listing is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("checksum listing is missing field {field:?} at {location}")]
    MissingField {
        field: &'static str,
        location: String,
    },

    #[error("checksum listing field {field:?} at {location} is not {expected}")]
    InvalidType {
        field: &'static str,
        location: String,
        expected: &'static str,
    },

    #[error("entries in {list} are not in strictly ascending path order at {path:?}")]
    NotCanonical { list: &'static str, path: String },
}

/// Error returned when a path is recorded as both a file and a directory in
/// the same checksum collection
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("path {path:?} is listed as both a file and a directory")]
pub struct KindConflictError {
    pub path: String,
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("checksum listing digest mismatch: recorded {expected}, computed {actual}")]
    DigestMismatch { expected: String, actual: String },
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ChecksumTreeError {
    #[error("path type conflict error for {path:?}")]
    PathTypeConflict { path: EntryPath },

    #[error("file {path:?} added to checksum tree twice")]
    DoubleAdd { path: EntryPath },

    #[error("no such file or directory in checksum tree: {path:?}")]
    NoSuchPath { path: EntryPath },
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid path within a Zarr: {0:?}")]
pub struct EntryPathError(pub String);

/// Error returned when reading an `md5sum`-style manifest of leaf digests
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("error reading manifest: {0}")]
    Read(#[from] std::io::Error),

    #[error("manifest line {lineno} is not of the form \"<digest>  <path>\": {line:?}")]
    Syntax { lineno: usize, line: String },

    #[error("manifest line {lineno} has an invalid path")]
    Path {
        lineno: usize,
        source: EntryPathError,
    },

    #[error("manifest line {lineno} has a digest that is not lowercase hex: {digest:?}")]
    Digest { lineno: usize, digest: String },

    #[error(transparent)]
    Tree(#[from] ChecksumTreeError),
}
