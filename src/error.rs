//! Error types for the gemini-pdf2md library.
//!
//! Every stage of the pipeline fails with a [`Pdf2MdError`]. There is no
//! non-fatal variant: the conversion is a single linear sequence, so the first
//! failure aborts it and is reported to the caller once, at the orchestrator
//! boundary ([`crate::convert::convert_file`]).
//!
//! Variants that come from the remote service carry the HTTP status code and
//! the raw response body so the message shown to the user is actionable
//! without turning on debug logs.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the gemini-pdf2md library.
#[derive(Debug, Error)]
pub enum Pdf2MdError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// The API key is empty or whitespace-only. Raised before any network call.
    #[error("Gemini API key is not set.\nAdd it to the settings or pass --api-key / GEMINI_API_KEY.")]
    MissingApiKey,

    /// A setting has a value the pipeline cannot use.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The persisted settings file exists but could not be read or parsed.
    #[error("Failed to load settings from '{}': {detail}", .path.display())]
    SettingsLoadFailed { path: PathBuf, detail: String },

    /// The settings file could not be written.
    #[error("Failed to save settings to '{}': {source}", .path.display())]
    SettingsSaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Source errors ─────────────────────────────────────────────────────
    /// No entry exists at the source path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: String },

    /// The source exists but reading it failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file does not carry a `.pdf` extension.
    #[error("'{path}' is not a PDF file (expected a .pdf extension)")]
    UnsupportedFile { path: String },

    // ── Upload errors ─────────────────────────────────────────────────────
    /// The upload-session request returned a non-success status.
    #[error("Failed to start upload session (HTTP {status}): {body}")]
    UploadStart { status: u16, body: String },

    /// The upload-session response had no `x-goog-upload-url` header.
    #[error("Upload session response did not include an x-goog-upload-url header")]
    MissingUploadUrl,

    /// Sending the file bytes returned a non-success status.
    #[error("Failed to upload file content (HTTP {status}): {body}")]
    UploadContent { status: u16, body: String },

    /// The finalize response parsed as JSON but had no `file.uri`.
    #[error("Upload response did not include a file URI: {body}")]
    MissingFileUri { body: String },

    // ── Generation errors ─────────────────────────────────────────────────
    /// The generateContent call returned a non-success status.
    #[error("Gemini API error (HTTP {status}): {body}")]
    GenerationHttp { status: u16, body: String },

    /// The generateContent response contained zero candidates.
    #[error("Gemini API returned no candidates")]
    NoCandidates,

    /// The first candidate carried no text, e.g. output blocked for safety.
    #[error("Gemini API returned a candidate without text (finish reason: {finish_reason})")]
    EmptyCandidate { finish_reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or overwrite the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Transport failure, malformed JSON or any other unexpected fault.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Pdf2MdError {
    /// HTTP status code reported by the remote service, if this error has one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Pdf2MdError::UploadStart { status, .. }
            | Pdf2MdError::UploadContent { status, .. }
            | Pdf2MdError::GenerationHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for errors raised before any network traffic could happen.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Pdf2MdError::MissingApiKey
                | Pdf2MdError::InvalidConfig(_)
                | Pdf2MdError::SettingsLoadFailed { .. }
                | Pdf2MdError::SettingsSaveFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_start_display_carries_status_and_body() {
        let e = Pdf2MdError::UploadStart {
            status: 500,
            body: "internal".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("500"), "got: {msg}");
        assert!(msg.contains("internal"), "got: {msg}");
        assert_eq!(e.status(), Some(500));
    }

    #[test]
    fn generation_http_display() {
        let e = Pdf2MdError::GenerationHttp {
            status: 400,
            body: r#"{"error":"bad model"}"#.into(),
        };
        assert!(e.to_string().contains("400"));
        assert!(e.to_string().contains("bad model"));
    }

    #[test]
    fn missing_api_key_is_config_error() {
        assert!(Pdf2MdError::MissingApiKey.is_config_error());
        assert!(!Pdf2MdError::NoCandidates.is_config_error());
        assert_eq!(Pdf2MdError::MissingApiKey.status(), None);
    }

    #[test]
    fn empty_candidate_display_carries_finish_reason() {
        let e = Pdf2MdError::EmptyCandidate {
            finish_reason: "SAFETY".into(),
        };
        assert!(e.to_string().contains("SAFETY"));
        assert!(!e.is_config_error());
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = Pdf2MdError::OutputWriteFailed {
            path: "notes/report.md".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(e.to_string().contains("notes/report.md"));
        assert!(e.source().is_some());
    }
}
