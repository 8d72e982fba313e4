// src/services/signature.rs

//! Byte-signature classification.
//!
//! The signature is authoritative over the file extension: downloaded attachments are
//! frequently misnamed, and only the leading bytes say what the container really is.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::Format;

/// Number of leading bytes inspected.
pub const SIGNATURE_LEN: usize = 8;

/// OLE2 compound file (legacy `.hwp`, `.doc`).
pub const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// ZIP local file header (`.hwpx`, `.docx`).
pub const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Read up to [`SIGNATURE_LEN`] leading bytes. Unreadable files yield an empty vector.
pub fn read_signature(path: &Path) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
    let read = File::open(path).and_then(|file| {
        file.take(SIGNATURE_LEN as u64).read_to_end(&mut bytes)
    });

    match read {
        Ok(_) => bytes,
        Err(e) => {
            log::debug!("Cannot read signature of {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Classify leading bytes.
///
/// OLE maps to [`Format::Hwp`] and ZIP to [`Format::Hwpx`]; the caller narrows these to
/// `doc`/`docx` using the declared extension.
pub fn detect(bytes: &[u8]) -> Format {
    if bytes.starts_with(&OLE_MAGIC) {
        Format::Hwp
    } else if bytes.starts_with(&ZIP_MAGIC) {
        Format::Hwpx
    } else if bytes.starts_with(PDF_MAGIC) {
        Format::Pdf
    } else {
        Format::Unknown
    }
}

/// Classify a file by its byte header. Never fails; I/O errors give [`Format::Unknown`].
pub fn classify(path: &Path) -> Format {
    detect(&read_signature(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_detect_magic() {
        assert_eq!(detect(&OLE_MAGIC), Format::Hwp);
        assert_eq!(detect(b"PK\x03\x04\x14\x00\x06\x00"), Format::Hwpx);
        assert_eq!(detect(b"%PDF-1.7"), Format::Pdf);
        assert_eq!(detect(b"<html>"), Format::Unknown);
        assert_eq!(detect(b""), Format::Unknown);
    }

    #[test]
    fn test_classification_ignores_extension() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "공고문.pdf", b"%PDF-1.4 body");
        let b = write(&dir, "공고문.hwp", b"%PDF-1.4 body");
        assert_eq!(classify(&a), classify(&b));
        assert_eq!(classify(&a), Format::Pdf);
    }

    #[test]
    fn test_short_and_missing_files_are_unknown() {
        let dir = TempDir::new().unwrap();
        let short = write(&dir, "x.hwp", &OLE_MAGIC[..3]);
        assert_eq!(classify(&short), Format::Unknown);
        assert_eq!(classify(&dir.path().join("missing.hwp")), Format::Unknown);
    }
}
