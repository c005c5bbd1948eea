//! Provides the archive stream of a physical OPC package (ZIP file).
//!
//! The whole archive is read into memory once and its entries are inflated in
//! parallel. The result is an ordered list of `(partname, bytes)` records; what
//! they mean is decided later by a single resolver.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use rayon::prelude::*;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// Upper bound on the buffer reserved up front for one entry.
const MAX_PREALLOC: u64 = 1 << 20;

/// One inflated archive entry.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Normalized part name of the entry
    pub partname: PackURI,
    /// Decompressed content
    pub blob: Vec<u8>,
}

/// Owned archive bytes of a package.
pub struct PhysPkgReader {
    /// The owned data buffer
    data: Vec<u8>,
}

impl PhysPkgReader {
    /// Open an OPC package from a file path.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, isn't a valid ZIP file,
    /// or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }

        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Create a new reader from owned bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        // Validate the ZIP archive can be parsed
        let _ = ZipArchive::new(Cursor::new(data.as_slice()))?;
        Ok(Self { data })
    }

    /// Inflate every file entry, in archive order.
    ///
    /// Entries are decompressed on the rayon pool; each worker reads through its own
    /// clone of the archive index, so no entry waits on another.
    pub fn entries(&self) -> Result<Vec<ArchiveEntry>> {
        let archive = ZipArchive::new(Cursor::new(self.data.as_slice()))?;

        (0..archive.len())
            .into_par_iter()
            .map_init(
                || archive.clone(),
                |archive, index| -> Result<Option<ArchiveEntry>> {
                    let mut file = archive.by_index(index)?;
                    if file.is_dir() {
                        return Ok(None);
                    }

                    let partname = PackURI::from_member(file.name());
                    let mut blob = Vec::with_capacity(prealloc_hint(file.size()));
                    file.read_to_end(&mut blob)?;
                    Ok(Some(ArchiveEntry { partname, blob }))
                },
            )
            .filter_map(|entry| entry.transpose())
            .collect()
    }
}

/// Capacity to reserve for an entry whose header declares `declared` bytes.
///
/// The header is untrusted, so the reservation is capped; `read_to_end` grows the
/// buffer past the cap for entries that really are larger.
fn prealloc_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        zip.add_directory("word/", options).unwrap();
        for (name, bytes) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_entries_in_archive_order() {
        let data = build_zip(&[
            ("[Content_Types].xml", b"<Types/>"),
            ("_rels/.rels", b"<Relationships/>"),
            ("word/document.xml", b"<document/>"),
        ]);

        let reader = PhysPkgReader::from_bytes(data).unwrap();
        let entries = reader.entries().unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.partname.as_str()).collect();
        assert_eq!(
            names,
            vec!["/[Content_Types].xml", "/_rels/.rels", "/word/document.xml"]
        );
        assert_eq!(entries[2].blob, b"<document/>");
    }

    #[test]
    fn test_prealloc_ignores_forged_sizes() {
        assert_eq!(prealloc_hint(512), 512);
        assert_eq!(prealloc_hint(u64::MAX), MAX_PREALLOC as usize);
    }

    #[test]
    fn test_large_entry_reads_past_prealloc_cap() {
        let big = vec![b'x'; MAX_PREALLOC as usize + 17];
        let data = build_zip(&[("xl/media/blob.bin", big.as_slice())]);

        let entries = PhysPkgReader::from_bytes(data).unwrap().entries().unwrap();
        assert_eq!(entries[0].blob.len(), big.len());
    }

    #[test]
    fn test_rejects_non_zip_data() {
        assert!(PhysPkgReader::from_bytes(b"not a zip".to_vec()).is_err());
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            PhysPkgReader::open("/definitely/not/here.docx"),
            Err(OpcError::PackageNotFound(_))
        ));
    }
}
