//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one step and returns a `Result`, so the
//! orchestrator in [`crate::convert`] is a straight sequence of `?` and each
//! stage can be tested on its own against a mock server or a temp directory.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ upload ──▶ generate ──▶ postprocess ──▶ write
//! (store)   (2 calls)  (1 call)     (fences)        (store)
//! ```
//!
//! 1. [`input`]      : read the PDF bytes through the host [`crate::host::FileStore`]
//! 2. [`upload`]     : start a resumable session, send all bytes, get a file URI
//! 3. [`generate`]   : `generateContent` with both prompts and the file URI
//! 4. [`postprocess`]: strip a wrapping code fence
//! 5. [`write`]      : create or overwrite the sibling `.md` file

pub mod generate;
pub mod input;
pub mod postprocess;
pub mod upload;
pub mod write;
