//! Global limits and defaults for configuration and runtime

/// Minimum accepted length of a candidate name
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum accepted length of a candidate name
pub const MAX_NAME_LENGTH: usize = 50;

/// Minimum allowed per-call provider timeout in milliseconds
pub const MIN_PROVIDER_TIMEOUT_MS: u64 = 100; // 100ms

/// Maximum allowed per-call provider timeout in milliseconds
pub const MAX_PROVIDER_TIMEOUT_MS: u64 = 30_000; // 30s

/// Default per-call provider timeout in milliseconds
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 2_000; // 2s

/// Default overall timeout for one fan-out batch in milliseconds
pub const DEFAULT_GLOBAL_TIMEOUT_MS: u64 = 10_000; // 10s

/// Default TTL of a cached provider result in seconds
pub const DEFAULT_AVAILABILITY_CACHE_TTL_SECONDS: u64 = 300;

/// Validity window of a returned name check in minutes
pub const NAME_CHECK_TTL_MINUTES: i64 = 15;

/// Default rate limit for providers without an explicit quota: requests per window
pub const DEFAULT_PROVIDER_RATE_LIMIT_REQUESTS: u32 = 100;

/// Default rate limit window for providers without an explicit quota, in seconds
pub const DEFAULT_PROVIDER_RATE_LIMIT_WINDOW_SECONDS: u64 = 3_600;

/// Maximum number of names accepted by one bulk check
pub const MAX_BULK_NAMES: usize = 50;

/// Default number of names checked concurrently within one bulk check
pub const DEFAULT_BULK_CONCURRENCY: usize = 5;

/// Providers listed per name in the available/taken highlights of a bulk check
pub const BULK_TOP_PROVIDERS: usize = 5;

/// Error text reported when a provider's rate limit rejects a check
pub const RATE_LIMIT_EXCEEDED_ERROR: &str = "Rate limit exceeded";

/// Error text reported when a single provider call exceeds its timeout
pub const REQUEST_TIMEOUT_ERROR: &str = "Request timeout";
