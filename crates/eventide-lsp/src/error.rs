use thiserror::Error;

/// Closed error taxonomy for dispatcher construction.
///
/// Once a [`crate::LanguageServer`] is running, failures no longer surface
/// through this type: malformed inbound messages are dropped silently,
/// handler failures become JSON-RPC error responses, and transport failure
/// ends the main loop by returning from [`crate::LanguageServer::start`].
#[derive(Debug, Error)]
pub enum LspError {
    /// The dispatcher's runtime or transport could not be constructed.
    #[error("language server failed to start: {0}")]
    StartupFailed(String),
}

impl LspError {
    /// Stable machine-readable tag.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StartupFailed(_) => "startup_failed",
        }
    }
}
