//! Brandmark Service
//!
//! Fan-out of name checks across providers: per-provider rate limiting,
//! result caching, timeouts, and live progress sessions.

pub mod cache;
pub mod check;
pub mod coordinator;
pub mod invoker;
pub mod rate_limiter;
pub mod realtime;
pub mod sessions;

pub use cache::{cache_key, AvailabilityCache, CacheLayerTrait};
pub use check::{CheckService, CheckServiceError, CheckServiceTrait};
pub use coordinator::{
	execute_task, global_timeout_message, FanoutCoordinator, ProgressSink,
	RATE_LIMIT_EXCEEDED_ERROR,
};
pub use invoker::{ProviderInvoker, ProviderInvokerTrait, TimeoutPolicy, REQUEST_TIMEOUT_ERROR};
pub use rate_limiter::{ProviderRateLimiter, RateLimiterTrait};
pub use realtime::RealtimeChecker;
pub use sessions::{EventReceiver, SessionManager, SessionProgressSink};
