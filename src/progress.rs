//! Progress notices and state reporting for a conversion.
//!
//! The host supplies a [`ConversionProgress`] implementation; the pipeline
//! calls it as it moves through the [`ConversionState`] sequence. `notify`
//! is the user-facing toast channel. Diagnostic detail (status codes, bodies,
//! upload URLs) goes to `tracing` instead and never through this trait.
//!
//! # Example
//!
//! ```rust
//! use gemini_pdf2md::ConversionProgress;
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Collect(Mutex<Vec<String>>);
//!
//! impl ConversionProgress for Collect {
//!     fn notify(&self, message: &str) {
//!         self.0.lock().unwrap().push(message.to_string());
//!     }
//! }
//!
//! let c = Collect::default();
//! c.notify("Uploading file...");
//! assert_eq!(c.0.lock().unwrap().len(), 1);
//! ```

use crate::error::Pdf2MdError;
use std::fmt;
use tracing::{debug, error, info};

/// Linear states of one conversion.
///
/// Each state is entered only after the previous step succeeded. Any failure
/// returns to [`ConversionState::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    Idle,
    /// Checking that an API key is configured.
    AwaitingApiKey,
    /// Upload session created; the server handed back an upload URL.
    SessionStarted,
    /// File bytes accepted; a remote file reference exists.
    Uploaded,
    /// Generation call returned at least one candidate.
    Generated,
    /// Code fences stripped.
    PostProcessed,
    /// Markdown written to the file store.
    Written,
}

impl fmt::Display for ConversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionState::Idle => "idle",
            ConversionState::AwaitingApiKey => "awaiting-api-key",
            ConversionState::SessionStarted => "session-started",
            ConversionState::Uploaded => "uploaded",
            ConversionState::Generated => "generated",
            ConversionState::PostProcessed => "post-processed",
            ConversionState::Written => "written",
        };
        f.write_str(name)
    }
}

/// Receives notices and state transitions from the pipeline.
///
/// Only `notify` is required. `on_state` defaults to a no-op and
/// `on_failure` defaults to a single notice carrying the error text.
pub trait ConversionProgress: Send + Sync {
    /// Show a short, human-readable notice.
    fn notify(&self, message: &str);

    /// Called on every state transition.
    fn on_state(&self, state: ConversionState) {
        let _ = state;
    }

    /// Called exactly once when a conversion aborts.
    fn on_failure(&self, error: &Pdf2MdError) {
        self.notify(&format!("PDF to Markdown conversion failed: {error}"));
    }
}

/// Discards everything. Used by [`crate::convert::convert_bytes`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ConversionProgress for NoopProgress {
    fn notify(&self, _message: &str) {}
}

/// Forwards notices to `tracing` at INFO and failures at ERROR.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ConversionProgress for LogProgress {
    fn notify(&self, message: &str) {
        info!("{}", message);
    }

    fn on_state(&self, state: ConversionState) {
        debug!("conversion state: {}", state);
    }

    fn on_failure(&self, error: &Pdf2MdError) {
        error!("PDF to Markdown conversion failed: {}", error);
    }
}

impl<P: ConversionProgress + ?Sized> ConversionProgress for &P {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }

    fn on_state(&self, state: ConversionState) {
        (**self).on_state(state);
    }

    fn on_failure(&self, error: &Pdf2MdError) {
        (**self).on_failure(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        notices: Mutex<Vec<String>>,
        states: Mutex<Vec<ConversionState>>,
    }

    impl ConversionProgress for Recorder {
        fn notify(&self, message: &str) {
            self.notices.lock().unwrap().push(message.to_string());
        }

        fn on_state(&self, state: ConversionState) {
            self.states.lock().unwrap().push(state);
        }
    }

    #[test]
    fn default_failure_notice_carries_error_text() {
        let r = Recorder::default();
        r.on_failure(&Pdf2MdError::UploadStart {
            status: 500,
            body: "boom".into(),
        });
        let notices = r.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("500"));
        assert!(notices[0].contains("boom"));
    }

    #[test]
    fn reference_forwards_to_inner() {
        fn drive<P: ConversionProgress>(p: P) {
            p.on_state(ConversionState::Uploaded);
            p.notify("hello");
        }

        let r = Recorder::default();
        drive(&r);
        assert_eq!(*r.states.lock().unwrap(), vec![ConversionState::Uploaded]);
        assert_eq!(r.notices.lock().unwrap().len(), 1);
    }

    #[test]
    fn noop_and_log_do_not_panic() {
        NoopProgress.notify("x");
        NoopProgress.on_failure(&Pdf2MdError::NoCandidates);
        LogProgress.notify("x");
        LogProgress.on_state(ConversionState::Generated);
        LogProgress.on_failure(&Pdf2MdError::NoCandidates);
    }

    #[test]
    fn state_display() {
        assert_eq!(ConversionState::PostProcessed.to_string(), "post-processed");
    }
}
