//! Aggregation of entry digests into directory digests
//!
//! A directory's digest is the MD5 digest of the canonical JSON encoding of
//! the [`ChecksumCollection`] of its entries.  Each subdirectory's digest is
//! in turn recorded in its parent's collection, up to the root of the Zarr.
mod collection;
mod json;
mod listing;
pub mod nodes;
mod record;
mod tree;
pub use self::collection::*;
pub use self::listing::*;
pub use self::record::*;
pub use self::tree::*;
use self::json::collection_json;
use crate::errors::ParseError;
use crate::util::md5_string;
use log::warn;

/// The checksum of a directory with no entries, i.e., the MD5 digest of
/// `{"directories":[],"files":[]}`.
///
/// Empty directories do not get a checksum listing of their own, as most
/// object stores cannot represent them, but they still have this checksum in
/// their parent's listing.
pub const EMPTY_CHECKSUM: &str = "481a2f77ab786a0f45aafd5db0971caa";

/// Compute the aggregate digest of a checksum collection
pub fn aggregate_digest(collection: &ChecksumCollection) -> String {
    md5_string(&collection_json(collection))
}

/// Pair a checksum collection with its aggregate digest
pub fn build_listing(collection: ChecksumCollection) -> ChecksumListing {
    ChecksumListing::new(collection)
}

/// Encode a checksum listing in canonical JSON form
pub fn serialize(listing: &ChecksumListing) -> String {
    listing.to_json()
}

/// Decode a checksum listing from JSON
pub fn deserialize(s: &str) -> Result<ChecksumListing, ParseError> {
    ChecksumListing::from_json(s)
}

/// Compute the digest of a directory from maps of the paths of its files and
/// subdirectories to their respective digests.
///
/// The iteration order of the maps does not affect the result.  If a path is
/// given in both `files` and `directories`, it is included in both parts of
/// the collection.
pub fn compute_directory_digest<F, D, FP, FD, DP, DD>(files: F, directories: D) -> String
where
    F: IntoIterator<Item = (FP, FD)>,
    D: IntoIterator<Item = (DP, DD)>,
    FP: Into<String>,
    FD: Into<String>,
    DP: Into<String>,
    DD: Into<String>,
{
    let collection = ChecksumCollection::new(
        files.into_iter().map(ChecksumRecord::from),
        directories.into_iter().map(ChecksumRecord::from),
    );
    if let Err(e) = collection.check_kinds() {
        warn!("{e}");
    }
    build_listing(collection).into_parts().1
}
