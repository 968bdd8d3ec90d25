//! Canonical checksum listings and aggregate digests for Zarr directory trees
//!
//! Every directory in a Zarr is summarized by a *checksum listing*: the
//! sorted digests of the directory's files and subdirectories, together with
//! the MD5 digest of the canonical JSON encoding of those records.  The digest
//! of the root directory thus identifies the contents of the entire Zarr.
//!
//! ```
//! use zarr_checksum_listing::{compute_directory_digest, EMPTY_CHECKSUM};
//!
//! let no_dirs: [(&str, &str); 0] = [];
//! assert_eq!(compute_directory_digest(no_dirs, no_dirs), EMPTY_CHECKSUM);
//! assert_eq!(
//!     compute_directory_digest([("foo/bar", "a")], no_dirs),
//!     "1c22c75195e7e4ad83d07379091375e0",
//! );
//! ```
pub mod checksum;
pub mod errors;
pub mod manifest;
mod util;
pub mod zarr;
pub use crate::checksum::{
    build_listing, compute_directory_digest, deserialize, serialize, ChecksumCollection,
    ChecksumListing, ChecksumRecord, ChecksumTree, EMPTY_CHECKSUM,
};
pub use crate::errors::{ListingError, ParseError};
