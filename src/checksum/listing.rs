use super::json::listing_json;
use super::{aggregate_digest, ChecksumCollection, ChecksumRecord};
use crate::errors::{ListingError, ParseError};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::str::FromStr;

/// A directory's checksum collection paired with the aggregate digest of that
/// collection.  This is the document persisted as the checksum file for a
/// non-empty directory.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ChecksumListing {
    checksums: ChecksumCollection,
    digest: String,
}

impl ChecksumListing {
    /// Compute the aggregate digest of `checksums` and pair the two together
    pub fn new(checksums: ChecksumCollection) -> Self {
        let digest = aggregate_digest(&checksums);
        ChecksumListing { checksums, digest }
    }

    /// Pair a collection with a digest as-is, e.g., as read from a file.  Use
    /// [`verify()`][ChecksumListing::verify] to check that they agree.
    pub(crate) fn new_unchecked(checksums: ChecksumCollection, digest: String) -> Self {
        ChecksumListing { checksums, digest }
    }

    pub fn checksums(&self) -> &ChecksumCollection {
        &self.checksums
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn into_parts(self) -> (ChecksumCollection, String) {
        (self.checksums, self.digest)
    }

    /// Encode the listing in canonical JSON form
    pub fn to_json(&self) -> String {
        listing_json(self)
    }

    /// Decode a listing from JSON.  The record lists must be in canonical
    /// order.  Members other than those of the canonical form are ignored.
    pub fn from_json(s: &str) -> Result<ChecksumListing, ParseError> {
        let value = serde_json::from_str::<Value>(s)?;
        let top = as_object(&value, "listing", "<document>")?;
        let checksums = as_object(
            get_field(top, "checksums", "listing")?,
            "checksums",
            "listing",
        )?;
        let directories = parse_records(checksums, "directories")?;
        let files = parse_records(checksums, "files")?;
        let digest = as_str(get_field(top, "digest", "listing")?, "digest", "listing")?;
        let checksums = ChecksumCollection::from_sorted(files, directories);
        if let Err(e) = checksums.check_kinds() {
            warn!("{e}");
        }
        Ok(ChecksumListing::new_unchecked(checksums, digest.to_owned()))
    }

    /// Check that the recorded digest is the aggregate digest of the recorded
    /// checksums
    pub fn verify(&self) -> Result<(), ListingError> {
        let actual = aggregate_digest(&self.checksums);
        if actual == self.digest {
            debug!("Checksum listing digest {actual} verified");
            Ok(())
        } else {
            Err(ListingError::DigestMismatch {
                expected: self.digest.clone(),
                actual,
            })
        }
    }
}

impl From<ChecksumCollection> for ChecksumListing {
    fn from(checksums: ChecksumCollection) -> ChecksumListing {
        ChecksumListing::new(checksums)
    }
}

impl FromStr for ChecksumListing {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<ChecksumListing, ParseError> {
        ChecksumListing::from_json(s)
    }
}

fn parse_records(
    checksums: &Map<String, Value>,
    list: &'static str,
) -> Result<Vec<ChecksumRecord>, ParseError> {
    let items = get_field(checksums, list, "checksums")?
        .as_array()
        .ok_or_else(|| ParseError::InvalidType {
            field: list,
            location: String::from("checksums"),
            expected: "an array",
        })?;
    let mut records: Vec<ChecksumRecord> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let location = format!("checksums.{list}[{i}]");
        let obj = as_object(item, list, &location)?;
        let digest = as_str(get_field(obj, "digest", &location)?, "digest", &location)?;
        let path = as_str(get_field(obj, "path", &location)?, "path", &location)?;
        if records.last().is_some_and(|prev| prev.path() >= path) {
            return Err(ParseError::NotCanonical {
                list,
                path: path.to_owned(),
            });
        }
        records.push(ChecksumRecord::new(path, digest));
    }
    Ok(records)
}

fn get_field<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
    location: &str,
) -> Result<&'a Value, ParseError> {
    obj.get(field).ok_or_else(|| ParseError::MissingField {
        field,
        location: location.to_owned(),
    })
}

fn as_object<'a>(
    value: &'a Value,
    field: &'static str,
    location: &str,
) -> Result<&'a Map<String, Value>, ParseError> {
    value.as_object().ok_or_else(|| ParseError::InvalidType {
        field,
        location: location.to_owned(),
        expected: "an object",
    })
}

fn as_str<'a>(
    value: &'a Value,
    field: &'static str,
    location: &str,
) -> Result<&'a str, ParseError> {
    value.as_str().ok_or_else(|| ParseError::InvalidType {
        field,
        location: location.to_owned(),
        expected: "a string",
    })
}
