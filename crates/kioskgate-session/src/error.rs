//! Error types for the session layer.

/// Errors that can occur when starting a validation.
///
/// Validation *results* (accepted, rejected, directory down, timed out) are
/// not errors at this level; they are the
/// [`ValidationOutcome`](crate::ValidationOutcome) of a validation that ran.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Another validation is still in flight. The kiosk serves one card at
    /// a time, so the new card is turned away rather than queued.
    #[error("validation already in flight, card {tag} dropped")]
    Busy { tag: String },
}
