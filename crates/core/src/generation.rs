//! Input normalization for generation submissions.
//!
//! The HTTP layer hands over raw form values; these helpers apply the
//! defaults and checks that every submission must satisfy before any
//! side effect happens.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Description used when the submitter leaves the field empty.
pub const DEFAULT_DESCRIPTION: &str = "Professional product shot";

/// Output size used when the submitter does not pick one.
pub const DEFAULT_SIZE: &str = "1024x1024";

/// Prefix of every hosted asset name.
const ASSET_PREFIX: &str = "generated";

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Return the trimmed description, or [`DEFAULT_DESCRIPTION`] when absent or blank.
pub fn normalize_description(description: Option<&str>) -> String {
    match description.map(str::trim) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    }
}

/// Return the trimmed size, or [`DEFAULT_SIZE`] when absent or blank.
pub fn normalize_size(size: Option<&str>) -> String {
    match size.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => DEFAULT_SIZE.to_string(),
    }
}

/// Validate and normalize a submitter email.
///
/// Only shape is checked (non-empty, one `@` with text on both sides).
/// Identity itself is vouched for by the external auth provider.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(CoreError::Validation("userEmail is required".into()));
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email.to_string())
        }
        _ => Err(CoreError::Validation(format!(
            "userEmail '{email}' is not a valid email address"
        ))),
    }
}

/// Build the hosted asset name for an image generated at `unix_millis`.
pub fn asset_file_name(unix_millis: i64) -> String {
    format!("{ASSET_PREFIX}-{unix_millis}.png")
}
