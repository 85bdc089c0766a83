//! # gemini-pdf2md
//!
//! Convert PDF documents to Markdown with the Google Gemini file API.
//!
//! The crate does no PDF parsing of its own. It uploads the file to Gemini,
//! asks a model to transcribe it as Markdown, strips the code fence the
//! model tends to wrap its answer in, and writes the result next to the
//! source as `name.md`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF (FileStore)
//!  │
//!  ├─ 1. Settings  API key present? (abort before any request if blank)
//!  ├─ 2. Upload    POST /upload/v1beta/files (start) → POST <session> (upload, finalize)
//!  ├─ 3. Generate  POST /v1beta/models/{model}:generateContent
//!  ├─ 4. Strip     remove ```markdown fences
//!  └─ 5. Write     create or overwrite the sibling .md (FileStore)
//! ```
//!
//! The host (an editor plugin, the bundled CLI, a test) supplies the
//! [`FileStore`] and the [`ConversionProgress`] notice channel; the pipeline
//! takes an explicitly owned [`Settings`] value per invocation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_pdf2md::{convert_file, FsFileStore, GeminiClient, LogProgress, SettingsStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SettingsStore::new("settings.json");
//!     let settings = store.load().await?;
//!     let client = GeminiClient::new()?;
//!     let files = FsFileStore::new(".");
//!     let output = convert_file("paper.pdf", &settings, &client, &files, &LogProgress).await?;
//!     eprintln!("{} → {}", output.source_path, output.output_path);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod host;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::GeminiClient;
pub use config::{Settings, SettingsBuilder, SettingsStore};
pub use convert::{convert_bytes, convert_file};
pub use error::Pdf2MdError;
pub use host::{FileStore, FsFileStore};
pub use output::ConversionOutput;
pub use pipeline::input::{is_convertible, SourceDocument};
pub use pipeline::postprocess::strip;
pub use pipeline::write::{output_path, WriteOutcome};
pub use progress::{ConversionProgress, ConversionState, LogProgress, NoopProgress};
