//! Client version rules for synchronization.

use crate::error::ValidationError;

/// Parse a version code as configured on the server (e.g. `"2"`).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidVersion`] when `raw` is not an unsigned
/// integer.
pub fn parse_version_code(raw: &str) -> Result<u64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidVersion(raw.to_string()))
}

/// Whether an installed client may synchronize given the configured minimum.
///
/// No minimum means no restriction.
#[must_use]
pub fn is_version_allowed(installed: u64, minimum: Option<u64>) -> bool {
    minimum.is_none_or(|minimum| installed >= minimum)
}
