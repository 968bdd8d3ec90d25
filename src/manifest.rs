//! Reading file checksums from `md5sum`-style manifests
//!
//! Each nonblank line of a manifest has the form `<digest>  <path>`, as
//! produced by running `md5sum` on the files of a Zarr from within the Zarr's
//! root directory.  A `*` in front of the path (binary mode marker) is
//! ignored.
use crate::checksum::nodes::FileChecksum;
use crate::checksum::ChecksumTree;
use crate::errors::ManifestError;
use crate::util::is_lower_hex;
use crate::zarr::EntryPath;
use std::io::BufRead;

/// Parse a single manifest line.  `lineno` is only used for error messages.
pub fn parse_manifest_line(line: &str, lineno: usize) -> Result<FileChecksum, ManifestError> {
    let syntax_error = || ManifestError::Syntax {
        lineno,
        line: line.to_owned(),
    };
    let (digest, path) = line.split_once(' ').ok_or_else(syntax_error)?;
    let path = path
        .strip_prefix(' ')
        .or_else(|| path.strip_prefix('*'))
        .ok_or_else(syntax_error)?;
    if !is_lower_hex(digest) {
        return Err(ManifestError::Digest {
            lineno,
            digest: digest.to_owned(),
        });
    }
    let relpath =
        EntryPath::try_from(path).map_err(|source| ManifestError::Path { lineno, source })?;
    Ok(FileChecksum::new(relpath, digest))
}

/// Read all of the file checksums in a manifest
pub fn read_manifest<R: BufRead>(reader: R) -> Result<Vec<FileChecksum>, ManifestError> {
    let mut files = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        files.push(parse_manifest_line(line, i + 1)?);
    }
    log::debug!("Read {} file checksums from manifest", files.len());
    Ok(files)
}

/// Build a checksum tree from the file checksums in a manifest
pub fn tree_from_manifest<R: BufRead>(reader: R) -> Result<ChecksumTree, ManifestError> {
    Ok(ChecksumTree::from_files(read_manifest(reader)?)?)
}
