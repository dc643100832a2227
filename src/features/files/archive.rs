//! ZIP assembly for collection downloads.
//!
//! Entries are compressed into an anonymous temporary file one at a time, so
//! memory use stays bounded by a single entry regardless of collection size.
//! The finished file is streamed back to the client.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::{AppError, Result};

/// Archive being written to a spool file
///
/// Every method does blocking I/O; call them from the blocking pool.
pub struct ArchiveWriter {
    zip: ZipWriter<File>,
    options: SimpleFileOptions,
    used: HashSet<String>,
    entries: usize,
}

impl ArchiveWriter {
    pub fn new() -> Result<Self> {
        let spool = tempfile::tempfile()
            .map_err(|e| AppError::Internal(format!("Failed to create archive file: {}", e)))?;

        Ok(Self {
            zip: ZipWriter::new(spool),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
            used: HashSet::new(),
            entries: 0,
        })
    }

    /// Copy `source` into a new entry named after `name`
    ///
    /// A source that fails mid-copy leaves no entry behind.
    pub fn add(&mut self, name: &str, source: &mut dyn Read) -> Result<()> {
        let entry_name = unique_entry_name(name, &mut self.used);
        self.zip
            .start_file(entry_name.as_str(), self.options)
            .map_err(|e| {
                AppError::Internal(format!("Failed to add '{}' to ZIP: {}", entry_name, e))
            })?;

        if let Err(e) = std::io::copy(source, &mut self.zip) {
            self.used.remove(&entry_name);
            self.zip.abort_file().map_err(|abort| {
                AppError::Internal(format!(
                    "Failed to drop partial entry '{}': {}",
                    entry_name, abort
                ))
            })?;
            return Err(AppError::Storage(format!(
                "Failed to read '{}' into ZIP: {}",
                entry_name, e
            )));
        }

        self.entries += 1;
        Ok(())
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the central directory and rewind; returns the file and its length
    pub fn finish(self) -> Result<(File, u64)> {
        let mut file = self
            .zip
            .finish()
            .map_err(|e| AppError::Internal(format!("Failed to finish ZIP: {}", e)))?;

        let spool_error = |e: std::io::Error| AppError::Internal(format!("ZIP spool file: {}", e));
        let len = file.seek(SeekFrom::End(0)).map_err(spool_error)?;
        file.seek(SeekFrom::Start(0)).map_err(spool_error)?;

        Ok((file, len))
    }
}

/// `name`, or `stem (n).ext` for the first free `n` when `name` is taken
fn unique_entry_name(name: &str, used: &mut HashSet<String>) -> String {
    let name = if name.trim().is_empty() { "file" } else { name };
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let extension = path.extension().and_then(|e| e.to_str());

    let mut n = 1;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::ZipArchive;

    /// Yields `good` bytes, then fails
    struct BrokenReader {
        good: usize,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.good == 0 {
                return Err(std::io::Error::other("disk went away"));
            }
            let n = self.good.min(buf.len());
            buf[..n].fill(b'x');
            self.good -= n;
            Ok(n)
        }
    }

    fn entry_contents(archive: &mut ZipArchive<File>, name: &str) -> String {
        let mut contents = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        contents
    }

    #[test]
    fn test_unique_entry_name() {
        let mut used = HashSet::new();
        assert_eq!(unique_entry_name("a.pdf", &mut used), "a.pdf");
        assert_eq!(unique_entry_name("a.pdf", &mut used), "a (1).pdf");
        assert_eq!(unique_entry_name("a.pdf", &mut used), "a (2).pdf");
        assert_eq!(unique_entry_name("README", &mut used), "README");
        assert_eq!(unique_entry_name("README", &mut used), "README (1)");
    }

    #[test]
    fn test_archive_writer_disambiguates_names() {
        let mut writer = ArchiveWriter::new().unwrap();
        writer
            .add("notes.pdf", &mut Cursor::new(b"first".to_vec()))
            .unwrap();
        writer
            .add("notes.pdf", &mut Cursor::new(b"second".to_vec()))
            .unwrap();
        assert_eq!(writer.entries(), 2);

        let (file, len) = writer.finish().unwrap();
        assert_eq!(file.metadata().unwrap().len(), len);

        let mut archive = ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(entry_contents(&mut archive, "notes.pdf"), "first");
        assert_eq!(entry_contents(&mut archive, "notes (1).pdf"), "second");
    }

    #[test]
    fn test_failed_source_leaves_no_entry() {
        let mut writer = ArchiveWriter::new().unwrap();
        writer
            .add("a.pdf", &mut Cursor::new(b"kept".to_vec()))
            .unwrap();

        let err = writer
            .add("b.pdf", &mut BrokenReader { good: 200_000 })
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        // The failed name is free again
        writer
            .add("b.pdf", &mut Cursor::new(b"retried".to_vec()))
            .unwrap();
        assert_eq!(writer.entries(), 2);

        let (file, _) = writer.finish().unwrap();
        let mut archive = ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(entry_contents(&mut archive, "a.pdf"), "kept");
        assert_eq!(entry_contents(&mut archive, "b.pdf"), "retried");
    }

    #[test]
    fn test_failed_last_source_keeps_archive_readable() {
        let mut writer = ArchiveWriter::new().unwrap();
        writer
            .add("a.pdf", &mut Cursor::new(b"kept".to_vec()))
            .unwrap();
        assert!(writer
            .add("b.pdf", &mut BrokenReader { good: 200_000 })
            .is_err());

        let (file, _) = writer.finish().unwrap();
        let mut archive = ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(entry_contents(&mut archive, "a.pdf"), "kept");
    }
}
