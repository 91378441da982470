// src/input.rs
use std::path::{Path, PathBuf};

use crate::errors::{AnalyzerError, Result};

const PLAIN_TEXT_MIME: &str = "text/plain";
const FALLBACK_MIME: &str = "application/octet-stream";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Whitespace as browsers trim it: Unicode white space plus the byte order
/// mark, but not NEL (U+0085).
pub fn is_form_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{FEFF}'
}

/// Trims text the way the form does before sending it.
pub fn trim_input(text: &str) -> &str {
    text.trim_matches(is_form_whitespace)
}

/// Where an imported file came from. Only dropped files are filtered; the
/// picker is trusted to offer what the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOrigin {
    Picker,
    Drop,
}

/// A local file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: Option<String>,
}

/// File contents ready for the multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl AttachedFile {
    /// Describes `path`, guessing the MIME type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_guess::from_path(&path)
            .first()
            .map(|m| m.essence_str().to_string());
        Self { path, name, mime }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Accepts `text/plain` or anything named `*.txt`.
    pub fn is_plain_text(&self) -> bool {
        self.mime.as_deref() == Some(PLAIN_TEXT_MIME) || self.name.ends_with(".txt")
    }

    /// Reads the file as text, dropping a leading UTF-8 BOM and replacing
    /// invalid UTF-8 sequences.
    pub async fn read_text(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
        Ok(String::from_utf8_lossy(content).into_owned())
    }

    pub async fn read_upload(&self) -> Result<UploadFile> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(UploadFile {
            name: self.name.clone(),
            mime: self.mime.clone().unwrap_or_else(|| FALLBACK_MIME.to_string()),
            bytes,
        })
    }
}

/// The payload chosen for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Text(String),
    File(AttachedFile),
}

/// The text field and the attached file, as the user left them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub text: String,
    pub file: Option<AttachedFile>,
}

impl InputState {
    /// Non-blank text wins and is sent trimmed; otherwise the attached file.
    pub fn source(&self) -> Result<InputSource> {
        let text = trim_input(&self.text);
        if !text.is_empty() {
            return Ok(InputSource::Text(text.to_string()));
        }
        match &self.file {
            Some(file) => Ok(InputSource::File(file.clone())),
            None => Err(AnalyzerError::EmptyInput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mime_is_guessed_from_extension() {
        let file = AttachedFile::from_path("/tmp/context/notes.txt");
        assert_eq!(file.name, "notes.txt");
        assert_eq!(file.mime.as_deref(), Some("text/plain"));
        assert!(file.is_plain_text());
    }

    #[test]
    fn test_pdf_is_not_plain_text() {
        let file = AttachedFile::from_path("notes.pdf").with_mime("application/pdf");
        assert!(!file.is_plain_text());
    }

    #[test]
    fn test_txt_name_accepted_whatever_the_mime() {
        let file = AttachedFile::from_path("dump.txt").with_mime("application/octet-stream");
        assert!(file.is_plain_text());

        let file = AttachedFile::from_path("README").with_mime("text/plain");
        assert!(file.is_plain_text());
    }

    #[test]
    fn test_text_takes_precedence_and_is_trimmed() {
        let state = InputState {
            text: "  payments hub \n".to_string(),
            file: Some(AttachedFile::from_path("context.txt")),
        };
        assert_eq!(
            state.source().unwrap(),
            InputSource::Text("payments hub".to_string())
        );
    }

    #[test]
    fn test_blank_text_falls_back_to_file() {
        let file = AttachedFile::from_path("context.txt");
        let state = InputState {
            text: " \t\n".to_string(),
            file: Some(file.clone()),
        };
        assert_eq!(state.source().unwrap(), InputSource::File(file));
    }

    #[test]
    fn test_nothing_to_send_is_a_validation_error() {
        let err = InputState::default().source().unwrap_err();
        assert!(matches!(err, AnalyzerError::EmptyInput));
    }

    #[tokio::test]
    async fn test_read_text_is_lossy() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"caf\xc3\xa9 \xff end").unwrap();
        let file = AttachedFile::from_path(tmp.path());
        assert_eq!(file.read_text().await.unwrap(), "café \u{FFFD} end");
    }

    #[tokio::test]
    async fn test_read_text_drops_utf8_bom() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"\xEF\xBB\xBFName: Hub").unwrap();
        let file = AttachedFile::from_path(tmp.path());
        let text = file.read_text().await.unwrap();
        assert_eq!(text, "Name: Hub");

        let state = InputState { text, file: None };
        assert_eq!(state.source().unwrap(), InputSource::Text("Name: Hub".to_string()));
    }

    #[test]
    fn test_bom_only_text_counts_as_empty() {
        let state = InputState {
            text: "\u{FEFF} \u{FEFF}\n".to_string(),
            file: None,
        };
        assert!(matches!(state.source(), Err(AnalyzerError::EmptyInput)));
    }

    #[test]
    fn test_trim_matches_browser_whitespace() {
        assert_eq!(trim_input("\u{FEFF}\u{A0} text \u{2028}"), "text");
        // NEL is not whitespace for the form
        assert_eq!(trim_input("\u{85}text\u{85}"), "\u{85}text\u{85}");
    }

    #[tokio::test]
    async fn test_read_upload_defaults_mime() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"raw").unwrap();
        let mut file = AttachedFile::from_path(tmp.path());
        file.mime = None;
        let upload = file.read_upload().await.unwrap();
        assert_eq!(upload.mime, "application/octet-stream");
        assert_eq!(upload.bytes, b"raw");
    }
}
