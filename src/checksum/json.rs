//! Canonical JSON encoding of checksum collections and listings
//!
//! Objects are written with their members in ascending order of member name
//! and without any insignificant whitespace.  Strings are escaped the same way
//! as Python's `json.dumps()` with `ensure_ascii=True`.
use super::{ChecksumCollection, ChecksumListing, ChecksumRecord};
use std::fmt::{Error, Write};

pub(super) fn collection_json(collection: &ChecksumCollection) -> String {
    let mut buf = String::new();
    write_collection(collection, &mut buf).expect("writing to a String should not fail");
    buf
}

pub(super) fn listing_json(listing: &ChecksumListing) -> String {
    let mut buf = String::new();
    write_listing(listing, &mut buf).expect("writing to a String should not fail");
    buf
}

fn write_record<W: Write>(record: &ChecksumRecord, writer: &mut W) -> Result<(), Error> {
    writer.write_str(r#"{"digest":"#)?;
    write_json_str(record.digest(), writer)?;
    writer.write_str(r#","path":"#)?;
    write_json_str(record.path(), writer)?;
    writer.write_char('}')?;
    Ok(())
}

fn write_records<W: Write>(records: &[ChecksumRecord], writer: &mut W) -> Result<(), Error> {
    writer.write_char('[')?;
    for (i, r) in records.iter().enumerate() {
        if i > 0 {
            writer.write_char(',')?;
        }
        write_record(r, writer)?;
    }
    writer.write_char(']')?;
    Ok(())
}

fn write_collection<W: Write>(
    collection: &ChecksumCollection,
    writer: &mut W,
) -> Result<(), Error> {
    writer.write_str(r#"{"directories":"#)?;
    write_records(collection.directories(), writer)?;
    writer.write_str(r#","files":"#)?;
    write_records(collection.files(), writer)?;
    writer.write_char('}')?;
    Ok(())
}

fn write_listing<W: Write>(listing: &ChecksumListing, writer: &mut W) -> Result<(), Error> {
    writer.write_str(r#"{"checksums":"#)?;
    write_collection(listing.checksums(), writer)?;
    writer.write_str(r#","digest":"#)?;
    write_json_str(listing.digest(), writer)?;
    writer.write_char('}')?;
    Ok(())
}

fn write_json_str<W: Write>(s: &str, writer: &mut W) -> Result<(), Error> {
    writer.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => writer.write_str("\\\"")?,
            '\\' => writer.write_str(r"\\")?,
            '\x08' => writer.write_str("\\b")?,
            '\x0C' => writer.write_str("\\f")?,
            '\n' => writer.write_str("\\n")?,
            '\r' => writer.write_str("\\r")?,
            '\t' => writer.write_str("\\t")?,
            ' '..='~' => writer.write_char(c)?,
            c => {
                let mut buf = [0u16; 2];
                for b in c.encode_utf16(&mut buf) {
                    write!(writer, "\\u{b:04x}")?;
                }
            }
        }
    }
    writer.write_char('"')?;
    Ok(())
}
