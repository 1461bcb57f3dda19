//! Service startup logging for the Brandmark aggregator

use std::env;
use tracing::info;

use crate::Settings;

/// Logs service information at startup
pub fn log_service_info() {
	// Use the root package name, not the current crate
	let service_name = "brandmark-aggregator";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Brandmark Aggregator Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	if let Ok(config_path) = env::var("CONFIG_PATH") {
		info!("📋 Config Path: {}", config_path);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the effective check configuration
pub fn log_settings_summary(settings: &Settings) {
	let enabled = settings.enabled_providers();
	info!(
		"🔌 Providers: {} enabled ({} configured){}",
		enabled.len(),
		settings.providers.len(),
		if settings.environment.mock_providers {
			", mock mode"
		} else {
			""
		}
	);
	info!(
		"⏱️ Timeouts: global {}ms, domains {}ms, social {}ms, app_stores {}ms, package_registries {}ms, dev_platforms {}ms",
		settings.timeouts.global_ms,
		settings.timeouts.domains_ms,
		settings.timeouts.social_ms,
		settings.timeouts.app_stores_ms,
		settings.timeouts.package_registries_ms,
		settings.timeouts.dev_platforms_ms
	);
	info!(
		"💾 Storage: {:?}, availability cache {} (ttl {}s)",
		settings.storage.backend,
		if settings.cache.enabled { "on" } else { "off" },
		settings.cache.availability_ttl_seconds
	);
	info!(
		"🚦 Provider rate limits: {} ({} explicit quotas)",
		if settings.rate_limits.enabled { "on" } else { "off" },
		settings.rate_limits.providers.len()
	);
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 Brandmark Aggregator Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs startup completion information
pub fn log_startup_complete(bind_address: &str) {
	info!("✅ Brandmark Aggregator Started Successfully");
	info!("🌐 Server listening on: {}", bind_address);
	info!("📡 Ready to accept checks");
}
