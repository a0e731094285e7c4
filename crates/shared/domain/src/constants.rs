//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Guest account
// =============================================================================

/// Reserved identifier of the shared guest/demo user group.
///
/// No ordinary account may ever be placed in this group.
pub const GUEST_USER_GROUP_ID: i32 = 0;

/// Mail domain reserved for seeded guest accounts
pub const GUEST_EMAIL_DOMAIN: &str = "guest.lookback.invalid";

/// Check if an email address belongs to the reserved guest domain
pub fn is_guest_email(email: &str) -> bool {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.eq_ignore_ascii_case(GUEST_EMAIL_DOMAIN))
        .unwrap_or(false)
}

// =============================================================================
// Validation
// =============================================================================

/// Minimum length of user, user group and category names
pub const MIN_NAME_LENGTH: usize = 1;

/// Maximum length of user, user group and category names
pub const MAX_NAME_LENGTH: usize = 30;

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length accepted before hashing
pub const MAX_PASSWORD_LENGTH: usize = 255;

/// Maximum task title length
pub const MAX_TITLE_LENGTH: usize = 255;

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
