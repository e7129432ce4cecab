//! CLI Exit Code Registry
//!
//! Single source of truth for `tcgsync` exit codes. Scripts chaining the
//! pipeline stages rely on them.
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 1       | Universal  | General error (unspecified)              |
//! | 2       | Universal  | CLI usage error (bad args, missing file) |
//! | 3-9     | stores     | Local files and configuration            |
//! | 50-59   | fetch      | Upstream feeds and detail pages          |

// =============================================================================
// Universal (0-2)
// =============================================================================

pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Stores (3-9)
// =============================================================================

/// Writing a store failed (permissions, disk full).
pub const EXIT_IO: u8 = 3;

/// Config file unreadable, unparsable or invalid.
pub const EXIT_CONFIG: u8 = 4;

/// Cross-reference export matched no known layout.
pub const EXIT_REFERENCE_FORMAT: u8 = 5;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Auth rejected by upstream (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Request rejected by upstream (400, 404, other 4xx).
pub const EXIT_FETCH_REJECTED: u8 = 52;

/// Rate limited after retries (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), network failure after retries, or a payload of
/// the wrong shape.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;
