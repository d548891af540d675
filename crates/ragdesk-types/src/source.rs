//! Content sources and the indexing submission boundary.
//!
//! A user adds content as one [`Submission`] (a file, a URL, or pasted
//! context). The dispatcher turns it into an [`IndexRequest`] for the
//! indexing service and records a [`SourceRef`] for display.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Number of context characters kept in a context source's label.
const CONTEXT_LABEL_CHARS: usize = 50;

/// Which tab/kind of input produced a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Files,
    Url,
    Context,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Files => write!(f, "files"),
            SourceKind::Url => write!(f, "url"),
            SourceKind::Context => write!(f, "context"),
        }
    }
}

/// Display entry in the source list. Does not imply ingestion succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub label: String,
    pub kind: SourceKind,
}

/// Content-type discriminator sent with every indexing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Pdf,
    Text,
    Image,
    Video,
    Audio,
    Other,
    Website,
}

impl IndexType {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::Pdf => "pdf",
            IndexType::Text => "text",
            IndexType::Image => "image",
            IndexType::Video => "video",
            IndexType::Audio => "audio",
            IndexType::Other => "other",
            IndexType::Website => "website",
        }
    }

    /// Categorize a file by its MIME type.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("pdf") {
            IndexType::Pdf
        } else if mime.starts_with("text/") {
            IndexType::Text
        } else if mime.starts_with("image/") {
            IndexType::Image
        } else if mime.starts_with("video/") {
            IndexType::Video
        } else if mime.starts_with("audio/") {
            IndexType::Audio
        } else {
            IndexType::Other
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single source chosen by the user: exactly one file, URL, or context text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    File {
        name: String,
        /// MIME type claimed by the picker, if any. Sniffing takes precedence.
        mime: Option<String>,
        data: Vec<u8>,
    },
    Url(String),
    Context(String),
}

impl Submission {
    pub fn kind(&self) -> SourceKind {
        match self {
            Submission::File { .. } => SourceKind::Files,
            Submission::Url(_) => SourceKind::Url,
            Submission::Context(_) => SourceKind::Context,
        }
    }

    /// True when there is nothing to index.
    pub fn is_empty(&self) -> bool {
        match self {
            Submission::File { data, .. } => data.is_empty(),
            Submission::Url(url) => url.trim().is_empty(),
            Submission::Context(text) => text.trim().is_empty(),
        }
    }

    /// Source-list entry for this submission.
    pub fn source_ref(&self) -> SourceRef {
        let label = match self {
            Submission::File { name, .. } => name.clone(),
            Submission::Url(url) => url.trim().to_string(),
            Submission::Context(text) => {
                let head: String = text.trim().chars().take(CONTEXT_LABEL_CHARS).collect();
                format!("Context: {head}...")
            }
        };
        SourceRef {
            label,
            kind: self.kind(),
        }
    }
}

/// Raw payload carried in the request's `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexPayload {
    Bytes {
        file_name: String,
        mime: String,
        data: Vec<u8>,
    },
    Text(String),
}

/// One request to the indexing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRequest {
    pub index_type: IndexType,
    pub payload: IndexPayload,
}

/// Uniform indexing result, matching the service's JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IndexResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_type_from_mime() {
        assert_eq!(IndexType::from_mime("application/pdf"), IndexType::Pdf);
        assert_eq!(IndexType::from_mime("text/markdown"), IndexType::Text);
        assert_eq!(IndexType::from_mime("text/csv"), IndexType::Text);
        assert_eq!(IndexType::from_mime("image/png"), IndexType::Image);
        assert_eq!(IndexType::from_mime("video/mp4"), IndexType::Video);
        assert_eq!(IndexType::from_mime("audio/mpeg"), IndexType::Audio);
        assert_eq!(IndexType::from_mime("application/msword"), IndexType::Other);
        assert_eq!(IndexType::from_mime(""), IndexType::Other);
    }

    #[test]
    fn test_context_label_truncates() {
        let text = format!("  {}  ", "a".repeat(80));
        let source = Submission::Context(text).source_ref();
        assert_eq!(source.kind, SourceKind::Context);
        assert_eq!(source.label, format!("Context: {}...", "a".repeat(50)));
    }

    #[test]
    fn test_url_label_is_trimmed() {
        let source = Submission::Url("  https://example.com  ".into()).source_ref();
        assert_eq!(source.label, "https://example.com");
        assert_eq!(source.kind, SourceKind::Url);
    }

    #[test]
    fn test_empty_submissions() {
        assert!(Submission::Url("   ".into()).is_empty());
        assert!(Submission::Context("\n".into()).is_empty());
        assert!(
            Submission::File {
                name: "a.txt".into(),
                mime: None,
                data: Vec::new(),
            }
            .is_empty()
        );
        assert!(!Submission::Context("notes".into()).is_empty());
    }

    #[test]
    fn test_index_response_parses_partial_body() {
        let resp: IndexResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.success);
        assert!(resp.message.is_none());

        let resp: IndexResponse =
            serde_json::from_str(r#"{"success":false,"error":"bad file"}"#).unwrap();
        assert_eq!(resp.error.as_deref(), Some("bad file"));
    }
}
