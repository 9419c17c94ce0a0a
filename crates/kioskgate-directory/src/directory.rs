//! The [`Directory`] trait: the seam between the session layer and the
//! employee directory.
//!
//! Production code uses [`HttpDirectory`](crate::HttpDirectory). Tests plug
//! in a scripted directory that completes lookups however the test needs,
//! including never completing at all.

use crate::PendingLookup;

/// Looks employees up by RFID tag.
///
/// # Trait bounds
///
/// - `Send + Sync` so the directory can be shared with the task that owns
///   the session.
/// - `'static` because it lives as long as the kiosk.
///
/// # Contract
///
/// `lookup` starts the request and returns immediately. The returned
/// [`PendingLookup`] resolves to exactly one
/// [`LookupCompletion`](crate::LookupCompletion). Implementations do not
/// retry; a bounded wait is the caller's business.
///
/// # Example
///
/// ```rust
/// use kioskgate_directory::{
///     Directory, DirectoryResponse, LookupCompletion, PendingLookup,
/// };
///
/// /// A directory that knows nobody.
/// struct EmptyDirectory;
///
/// impl Directory for EmptyDirectory {
///     fn lookup(&self, _rfid_tag: &str) -> PendingLookup {
///         PendingLookup::ready(LookupCompletion::Success(DirectoryResponse {
///             count: 0,
///             results: Vec::new(),
///         }))
///     }
/// }
/// ```
pub trait Directory: Send + Sync + 'static {
    /// Issues one lookup for `rfid_tag`.
    fn lookup(&self, rfid_tag: &str) -> PendingLookup;
}
