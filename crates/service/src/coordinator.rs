//! Fan-out of one name check across every resolved provider
//!
//! Each provider task runs independently (rate limit, cache, invoke) and the
//! whole check is bounded by a global deadline. Tasks still running at the
//! deadline are aborted and reported as timed out; the check then ends
//! `partial` or `failed` depending on whether anything settled in time.

use brandmark_providers::ProviderRegistry;
use brandmark_types::{
	CheckResults, CheckStatus, CheckTask, NameCheck, NameCheckOptions, ProviderGroup,
	ProviderResult,
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::CacheLayerTrait;
use crate::invoker::ProviderInvokerTrait;
use crate::rate_limiter::RateLimiterTrait;

pub use brandmark_types::constants::limits::RATE_LIMIT_EXCEEDED_ERROR;

/// Receives provider results as they settle
///
/// Calls arrive in completion order from a single task, so implementations
/// observe a strictly increasing number of settled providers.
pub trait ProgressSink: Send + Sync {
	fn on_result(&self, group: ProviderGroup, result: &ProviderResult);
}

/// Aborts the tracked tasks when dropped
///
/// Ties spawned work to the future that owns it: if the caller stops polling
/// (client gone, outer task aborted) the provider calls stop too.
#[derive(Debug, Default)]
pub(crate) struct AbortOnDrop(Vec<AbortHandle>);

impl AbortOnDrop {
	pub(crate) fn new(handle: AbortHandle) -> Self {
		Self(vec![handle])
	}

	fn push(&mut self, handle: AbortHandle) {
		self.0.push(handle);
	}

	fn abort(&self, index: usize) {
		if let Some(handle) = self.0.get(index) {
			handle.abort();
		}
	}
}

impl Drop for AbortOnDrop {
	fn drop(&mut self) {
		for handle in &self.0 {
			handle.abort();
		}
	}
}

/// Message of results synthesized when the global deadline fires
pub fn global_timeout_message(timeout: Duration) -> String {
	let seconds = if timeout.subsec_millis() == 0 {
		timeout.as_secs().to_string()
	} else {
		format!("{:.1}", timeout.as_secs_f64())
	};
	format!("Request timeout - check took longer than {} seconds", seconds)
}

/// Runs name checks across providers under a global deadline
pub struct FanoutCoordinator {
	registry: Arc<ProviderRegistry>,
	rate_limiter: Arc<dyn RateLimiterTrait>,
	cache: Arc<dyn CacheLayerTrait>,
	invoker: Arc<dyn ProviderInvokerTrait>,
	global_timeout: Duration,
}

impl FanoutCoordinator {
	pub fn new(
		registry: Arc<ProviderRegistry>,
		rate_limiter: Arc<dyn RateLimiterTrait>,
		cache: Arc<dyn CacheLayerTrait>,
		invoker: Arc<dyn ProviderInvokerTrait>,
		global_timeout: Duration,
	) -> Self {
		Self {
			registry,
			rate_limiter,
			cache,
			invoker,
			global_timeout,
		}
	}

	pub fn registry(&self) -> &Arc<ProviderRegistry> {
		&self.registry
	}

	pub fn rate_limiter(&self) -> &Arc<dyn RateLimiterTrait> {
		&self.rate_limiter
	}

	pub fn cache(&self) -> &Arc<dyn CacheLayerTrait> {
		&self.cache
	}

	pub fn invoker(&self) -> &Arc<dyn ProviderInvokerTrait> {
		&self.invoker
	}

	pub fn global_timeout(&self) -> Duration {
		self.global_timeout
	}

	/// Resolve the provider tasks a check of `name` would dispatch
	pub fn plan(
		&self,
		name: &str,
		groups: &[ProviderGroup],
		options: &NameCheckOptions,
	) -> Vec<CheckTask> {
		self.registry
			.resolve(groups, options)
			.into_iter()
			.map(|(group, provider)| CheckTask::new(group, provider, name, options.clone()))
			.collect()
	}

	/// Plan and run a check
	pub async fn run(
		&self,
		name: &str,
		groups: &[ProviderGroup],
		options: &NameCheckOptions,
		sink: Option<Arc<dyn ProgressSink>>,
	) -> NameCheck {
		let tasks = self.plan(name, groups, options);
		self.run_tasks(name, tasks, sink).await
	}

	/// Run already planned tasks concurrently and aggregate their results
	pub async fn run_tasks(
		&self,
		name: &str,
		tasks: Vec<CheckTask>,
		sink: Option<Arc<dyn ProgressSink>>,
	) -> NameCheck {
		let started = Instant::now();
		let deadline = started + self.global_timeout;
		let check = NameCheck::pending(name);

		info!(
			"🔍 Checking '{}' across {} providers (check {})",
			name,
			tasks.len(),
			check.id
		);

		let mut abort_handles = AbortOnDrop::default();
		let mut pending = FuturesUnordered::new();
		for (index, task) in tasks.iter().enumerate() {
			let handle = tokio::spawn(execute_task(
				task.clone(),
				Arc::clone(&self.rate_limiter),
				Arc::clone(&self.cache),
				Arc::clone(&self.invoker),
			));
			abort_handles.push(handle.abort_handle());
			pending.push(async move { (index, handle.await) });
		}

		let mut settled: Vec<Option<ProviderResult>> = vec![None; tasks.len()];
		let mut truncated = false;

		loop {
			match tokio::time::timeout_at(deadline, pending.next()).await {
				Ok(Some((index, joined))) => {
					let task = &tasks[index];
					let result = joined.unwrap_or_else(|e| {
						warn!("Task {} for '{}' did not finish: {}", task.label(), name, e);
						ProviderResult::failed(&task.provider, name, format!("Task failed: {}", e))
					});
					if let Some(sink) = &sink {
						sink.on_result(task.group, &result);
					}
					settled[index] = Some(result);
				},
				Ok(None) => break,
				Err(_) => {
					truncated = true;
					break;
				},
			}
		}
		drop(pending);

		let settled_count = settled.iter().filter(|result| result.is_some()).count();
		if truncated {
			warn!(
				"⏱️ Global timeout for '{}': {}/{} providers settled",
				name,
				settled_count,
				tasks.len()
			);
			let message = global_timeout_message(self.global_timeout);
			for (index, slot) in settled.iter_mut().enumerate() {
				if slot.is_some() {
					continue;
				}
				abort_handles.abort(index);
				let task = &tasks[index];
				let result = ProviderResult::failed(&task.provider, name, message.clone());
				if let Some(sink) = &sink {
					sink.on_result(task.group, &result);
				}
				*slot = Some(result);
			}
		}

		let status = if !truncated {
			CheckStatus::Complete
		} else if settled_count > 0 {
			CheckStatus::Partial
		} else {
			CheckStatus::Failed
		};

		let mut results = CheckResults::new();
		for (task, result) in tasks.iter().zip(settled) {
			if let Some(result) = result {
				results
					.entry(task.group)
					.or_default()
					.insert(task.provider.clone(), result);
			}
		}

		let duration_ms = started.elapsed().as_millis() as u64;
		let check = check.finalize(results, status, duration_ms);
		info!(
			"✅ Check of '{}' finished {:?} in {}ms: {} available, {} unavailable, {} pending",
			name,
			check.status,
			duration_ms,
			check.summary.available,
			check.summary.unavailable,
			check.summary.pending
		);
		check
	}
}

/// One provider task: rate limit gate, cache lookup, invocation, cache store
pub async fn execute_task(
	task: CheckTask,
	rate_limiter: Arc<dyn RateLimiterTrait>,
	cache: Arc<dyn CacheLayerTrait>,
	invoker: Arc<dyn ProviderInvokerTrait>,
) -> ProviderResult {
	if !rate_limiter.check_rate_limit(&task.provider).await {
		debug!("Skipping {} for '{}': rate limited", task.label(), task.name);
		return ProviderResult::failed(&task.provider, &task.name, RATE_LIMIT_EXCEEDED_ERROR);
	}

	if let Some(cached) = cache.get_availability(&task.provider, &task.name).await {
		return cached;
	}

	let result = invoker
		.check_availability(task.group, &task.provider, &task.name, &task.options)
		.await;
	cache
		.set_availability(&task.provider, &task.name, &result)
		.await;
	result
}
