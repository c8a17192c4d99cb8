//! PDF signature and filename checks.
//!
//! Validation stops at the magic header: a buffer is a PDF when it starts with
//! `%PDF-`. Nothing past the first five bytes is inspected.

/// The five-byte header every PDF file starts with (`%PDF-`).
pub const PDF_MAGIC: [u8; 5] = [0x25, 0x50, 0x44, 0x46, 0x2D];

/// Extension accepted by the multipart adapter, compared case-insensitively.
pub const PDF_EXTENSION: &str = "pdf";

/// Returns true when `bytes` starts with the PDF magic signature.
///
/// Buffers shorter than the signature are never valid.
///
/// ```rust
/// use ingest::is_valid_pdf;
///
/// assert!(is_valid_pdf(b"%PDF-1.4"));
/// assert!(is_valid_pdf(b"%PDF-"));
/// assert!(!is_valid_pdf(b"%PDF"));
/// assert!(!is_valid_pdf(b"PK\x03\x04"));
/// ```
pub fn is_valid_pdf(bytes: &[u8]) -> bool {
    bytes.len() >= PDF_MAGIC.len() && bytes[..PDF_MAGIC.len()] == PDF_MAGIC
}

/// Strips any directory components from a client-supplied filename.
///
/// Both `/` and `\` count as separators since browsers on Windows may send
/// full paths.
pub fn base_name(filename: &str) -> &str {
    filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename)
}

/// Returns the extension of `filename` (without the dot), if any.
///
/// A leading dot counts as an extension separator, so `".pdf"` has the
/// extension `pdf`.
pub fn extension(filename: &str) -> Option<&str> {
    base_name(filename)
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Returns true when the filename's extension is `pdf`, ignoring case.
///
/// ```rust
/// use ingest::has_pdf_extension;
///
/// assert!(has_pdf_extension("report.PDF"));
/// assert!(!has_pdf_extension("doc.txt"));
/// assert!(!has_pdf_extension("pdf"));
/// ```
pub fn has_pdf_extension(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_signature_is_valid() {
        assert!(is_valid_pdf(&PDF_MAGIC));
        assert!(is_valid_pdf(&[0x25, 0x50, 0x44, 0x46, 0x2D, 0x31, 0x2E, 0x34]));
    }

    #[test]
    fn short_or_wrong_prefix_is_invalid() {
        assert!(!is_valid_pdf(b""));
        assert!(!is_valid_pdf(b"%PDF"));
        assert!(!is_valid_pdf(b"%pdf-1.7"));
        assert!(!is_valid_pdf(b" %PDF-1.7"));
        assert!(!is_valid_pdf(b"\x89PNG\r\n"));
    }

    #[test]
    fn extension_checks() {
        let cases = [
            ("doc.pdf", true),
            ("DOC.PDF", true),
            ("archive.tar.pdf", true),
            ("C:\\Users\\me\\scan.Pdf", true),
            ("/tmp/upload/scan.pdf", true),
            (".pdf", true),
            ("doc.txt", false),
            ("doc.pdf.exe", false),
            ("doc.", false),
            ("pdf", false),
            ("", false),
            ("dir.pdf/file", false),
        ];

        for (name, expected) in cases {
            assert_eq!(has_pdf_extension(name), expected, "{name}");
        }
    }

    #[test]
    fn base_name_strips_directories() {
        assert_eq!(base_name("a/b/c.pdf"), "c.pdf");
        assert_eq!(base_name("a\\b\\c.pdf"), "c.pdf");
        assert_eq!(base_name("c.pdf"), "c.pdf");
        assert_eq!(base_name("dir/"), "");
    }

    proptest! {
        #[test]
        fn signature_prefix_always_valid(tail in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut bytes = PDF_MAGIC.to_vec();
            bytes.extend_from_slice(&tail);
            prop_assert!(is_valid_pdf(&bytes));
        }

        #[test]
        fn short_buffers_never_valid(bytes in proptest::collection::vec(any::<u8>(), 0..5)) {
            prop_assert!(!is_valid_pdf(&bytes));
        }

        #[test]
        fn mismatched_prefix_never_valid(bytes in proptest::collection::vec(any::<u8>(), 5..64)) {
            prop_assume!(bytes[..5] != PDF_MAGIC);
            prop_assert!(!is_valid_pdf(&bytes));
        }
    }
}
