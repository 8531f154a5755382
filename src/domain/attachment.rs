//! File attachment records and file-type classification.

use crate::domain::NoteId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions accepted by `attach`, lowercase with a leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".pdf", ".txt", ".md", ".js", ".ts", ".py", ".java",
    ".cpp", ".c", ".go", ".rs",
];

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp"];
const CODE_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".py", ".java", ".cpp", ".c", ".go", ".rs", ".jsx", ".tsx",
];
const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".txt", ".doc", ".docx", ".md"];

/// Broad category of an attached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Document,
    Code,
    Other,
}

impl AttachmentKind {
    /// Classifies a file by extension, falling back to its MIME type.
    ///
    /// Code extensions are checked before documents so `.ts` is never
    /// mistaken for text.
    pub fn classify(file_name: &str, mime_type: &str) -> Self {
        let ext = extension_of(Path::new(file_name));
        let ext = ext.as_str();

        if IMAGE_EXTENSIONS.contains(&ext) || mime_type.starts_with("image/") {
            return Self::Image;
        }
        if CODE_EXTENSIONS.contains(&ext) {
            return Self::Code;
        }
        if DOCUMENT_EXTENSIONS.contains(&ext) || mime_type.contains("pdf") || mime_type.contains("text")
        {
            return Self::Document;
        }
        Self::Other
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Code => "code",
            Self::Other => "other",
        };
        f.pad(s)
    }
}

/// A file copied into the attachments directory and linked to a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub note_id: NoteId,
    pub file_name: String,
    pub original_path: PathBuf,
    pub stored_path: PathBuf,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub size: u64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// Returns the lowercase extension of `path` with its leading dot, or "".
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Returns true if files with this path's extension may be attached.
pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Guesses a MIME type from the file extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    match extension_of(path).as_str() {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".pdf" => "application/pdf",
        ".txt" => "text/plain",
        ".md" => "text/markdown",
        ".js" => "application/javascript",
        ".ts" => "application/typescript",
        ".py" => "text/x-python",
        ".java" => "text/x-java",
        ".cpp" => "text/x-c++",
        ".c" => "text/x-c",
        _ => "application/octet-stream",
    }
}
