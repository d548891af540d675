//! MIME type resolution for uploaded files.

use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";

/// Resolve the MIME type of an uploaded file.
///
/// Order: magic bytes (via `infer`), then the file extension, then the type
/// claimed by the picker, then `application/octet-stream`.
pub fn detect_content_type(filename: &str, data: &[u8], claimed: Option<&str>) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if let Some(mime) = mime_from_extension(filename) {
        return mime.to_string();
    }

    match claimed.map(str::trim) {
        Some(claimed) if !claimed.is_empty() => claimed.to_string(),
        _ => OCTET_STREAM.to_string(),
    }
}

/// Map a file extension to a MIME type. `None` for unknown extensions.
pub fn mime_from_extension(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();

    let mime = match ext.as_str() {
        // Text
        "txt" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "xml" => "text/xml",
        "yaml" | "yml" => "text/yaml",
        "toml" => "text/toml",

        // Code
        "rs" => "text/x-rust",
        "py" => "text/x-python",
        "js" | "mjs" | "cjs" | "jsx" => "text/javascript",
        "ts" | "tsx" => "text/typescript",
        "json" => "application/json",
        "sh" | "bash" => "text/x-shellscript",
        "sql" => "text/x-sql",

        // Documents
        "pdf" => "application/pdf",
        "doc" | "docx" => "application/msword",

        // Media with no recognizable header
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",

        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_win_over_extension_and_claim() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(
            detect_content_type("notes.txt", &png, Some("text/plain")),
            "image/png"
        );
    }

    #[test]
    fn test_pdf_magic_bytes() {
        let pdf = b"%PDF-1.7 rest of document";
        assert_eq!(
            detect_content_type("upload.bin", pdf, None),
            "application/pdf"
        );
    }

    #[test]
    fn test_extension_fallback_for_text() {
        assert_eq!(
            detect_content_type("README.md", b"# Title", Some("application/octet-stream")),
            "text/markdown"
        );
        assert_eq!(
            detect_content_type("server.JS", b"const x = 1;", None),
            "text/javascript"
        );
    }

    #[test]
    fn test_claimed_type_when_nothing_else_matches() {
        assert_eq!(
            detect_content_type("data", b"plain words", Some("text/plain")),
            "text/plain"
        );
    }

    #[test]
    fn test_octet_stream_last_resort() {
        assert_eq!(detect_content_type("blob", b"???", None), OCTET_STREAM);
        assert_eq!(detect_content_type("blob", b"???", Some("  ")), OCTET_STREAM);
    }

    #[test]
    fn test_mime_from_extension_unknown() {
        assert_eq!(mime_from_extension("archive.xyz"), None);
        assert_eq!(mime_from_extension("Makefile"), None);
        assert_eq!(mime_from_extension("data.CSV"), Some("text/csv"));
    }
}
