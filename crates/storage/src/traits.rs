//! Storage traits for pluggable storage implementations

// Re-export the storage traits from types crate
pub use brandmark_types::storage::{
	AvailabilityCacheTrait as AvailabilityCache, RateLimitCheck,
	RateLimitStoreTrait as RateLimitStore, StorageError, StorageResult, StorageStats,
	StorageTrait as Storage,
};
