//! Protocol constants
//!
//! Status codes and defaults shared by every stored-procedure endpoint.

// Protocol status codes reported in the `statusCode` field of every envelope
/// Call succeeded with data.
pub const STATUS_SUCCESS: i64 = 100_200;
/// Call succeeded, nothing to return.
pub const STATUS_EMPTY: i64 = 100_204;
/// Input rejected by the procedure.
pub const STATUS_VALIDATION_ERROR: i64 = 100_400;
/// Lookup matched no record.
pub const STATUS_NOT_FOUND: i64 = 100_404;
/// Deprecated alias of [`STATUS_NOT_FOUND`] still emitted by older procedures.
pub const STATUS_NOT_FOUND_LEGACY: i64 = 100_422;

// Timeout tiers (seconds)
/// Interactive reads.
pub const TIMEOUT_SHORT_SECS: u64 = 10;
/// Standard reads and writes.
pub const TIMEOUT_DEFAULT_SECS: u64 = 30;
/// Reports and exports.
pub const TIMEOUT_LONG_RUNNING_SECS: u64 = 120;
/// Uploads.
pub const TIMEOUT_UPLOAD_SECS: u64 = 300;

// Retry defaults
/// Retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Delay before the first retry.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;

/// HTTP statuses that indicate a transient failure worth retrying.
pub const RETRYABLE_HTTP_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Base address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/api";
