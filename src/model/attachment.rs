//! Attachment payloads.

/// One named file embedded in a message.
///
/// Parts without a resolvable filename never become an `Attachment`; the
/// parsers skip them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename as declared by the container (not sanitized).
    pub filename: String,

    /// MIME content type when the container declares one (e.g. `"application/pdf"`).
    pub content_type: Option<String>,

    /// Decoded payload bytes.
    pub data: Vec<u8>,
}

impl Attachment {
    /// `true` when the filename ends in `extension` (compared case-insensitively).
    ///
    /// `extension` is given without the leading dot, e.g. `"pdf"`.
    pub fn has_extension(&self, extension: &str) -> bool {
        let suffix = format!(".{}", extension.to_lowercase());
        self.filename.to_lowercase().ends_with(&suffix)
    }

    /// Size of the decoded payload in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
