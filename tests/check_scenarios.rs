//! End-to-end behavior of name checks across scripted providers

mod mocks;

use std::time::Duration;

use brandmark_aggregator::mocks::{mock_settings, ScriptedConnector};
use brandmark_aggregator::{
	Availability, CheckServiceTrait, CheckStatus, NameCheckRequest, ProviderGroup,
	RateLimitQuota,
};
use mocks::fixtures;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn acme_domains_with_one_slow_registry() {
	let connectors = [
		ScriptedConnector::unavailable(".com", ProviderGroup::Domains, 50),
		ScriptedConnector::hanging(".io", ProviderGroup::Domains),
	];
	let service = fixtures::default_service(&connectors);
	let started = Instant::now();

	let check = service
		.check_name(&NameCheckRequest::new("acme", &[ProviderGroup::Domains]))
		.await
		.unwrap();

	// The hanging registry is cut off by the 5s per-call timeout of its category
	assert_eq!(started.elapsed().as_secs(), 5);
	assert_eq!(check.status, CheckStatus::Complete);

	let com = check.result(ProviderGroup::Domains, ".com").unwrap();
	assert_eq!(com.available, Availability::Unavailable);
	assert!(com.error.is_none());

	let io = check.result(ProviderGroup::Domains, ".io").unwrap();
	assert_eq!(io.available, Availability::Unknown);
	assert_eq!(io.error.as_deref(), Some("Request timeout"));

	assert_eq!(check.summary.total_checked, 2);
	assert_eq!(check.summary.available, 0);
	assert_eq!(check.summary.unavailable, 1);
	assert_eq!(check.summary.pending, 1);
	assert_eq!(check.summary.overall_score, 0.0);
}

#[tokio::test(start_paused = true)]
async fn overall_timeout_keeps_settled_answers() {
	let connectors = [
		ScriptedConnector::available(".com", ProviderGroup::Domains, 200),
		ScriptedConnector::unavailable("twitter", ProviderGroup::Social, 400),
		ScriptedConnector::available("npm", ProviderGroup::PackageRegistries, 600),
		ScriptedConnector::available("github", ProviderGroup::DevPlatforms, 1_000),
		ScriptedConnector::hanging("google_play", ProviderGroup::AppStores),
	];
	let coordinator =
		fixtures::coordinator(&connectors, Duration::from_secs(30), Duration::from_secs(10));
	let started = Instant::now();

	let check = coordinator
		.run(
			"acme",
			&ProviderGroup::ALL,
			&Default::default(),
			None,
		)
		.await;

	let elapsed = started.elapsed();
	assert!(elapsed >= Duration::from_secs(10));
	assert!(elapsed < Duration::from_millis(10_100));

	assert_eq!(check.status, CheckStatus::Partial);
	assert_eq!(check.result_count(), 5);
	assert_eq!(check.summary.available, 3);
	assert_eq!(check.summary.unavailable, 1);
	assert_eq!(check.summary.pending, 1);

	let hung = check.result(ProviderGroup::AppStores, "google_play").unwrap();
	assert_eq!(
		hung.error.as_deref(),
		Some("Request timeout - check took longer than 10 seconds")
	);
}

#[tokio::test]
async fn rate_limited_provider_is_not_called() {
	let com = ScriptedConnector::available(".com", ProviderGroup::Domains, 0);
	let tracker = com.tracker();

	let mut settings = mock_settings();
	settings
		.rate_limits
		.providers
		.insert(".com".to_string(), RateLimitQuota::new(1, 60));
	let service = fixtures::service(&[com], &settings);

	let first = service
		.check_name(&NameCheckRequest::new("acme", &[ProviderGroup::Domains]))
		.await
		.unwrap();
	let second = service
		.check_name(&NameCheckRequest::new("zenith", &[ProviderGroup::Domains]))
		.await
		.unwrap();

	assert!(first.result(ProviderGroup::Domains, ".com").unwrap().error.is_none());
	let limited = second.result(ProviderGroup::Domains, ".com").unwrap();
	assert_eq!(limited.available, Availability::Unknown);
	assert_eq!(limited.error.as_deref(), Some("Rate limit exceeded"));
	assert_eq!(tracker.call_count(), 1);
}

#[tokio::test]
async fn cached_answer_skips_provider() {
	let npm = ScriptedConnector::unavailable("npm", ProviderGroup::PackageRegistries, 0);
	let tracker = npm.tracker();
	let service = fixtures::default_service(&[npm]);
	let request = NameCheckRequest::new("acme", &[ProviderGroup::PackageRegistries]);

	let first = service.check_name(&request).await.unwrap();
	fixtures::settle().await;
	let second = service.check_name(&request).await.unwrap();

	assert_eq!(tracker.call_count(), 1);
	assert_eq!(
		first.result(ProviderGroup::PackageRegistries, "npm"),
		second.result(ProviderGroup::PackageRegistries, "npm")
	);
	assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn failed_answers_are_retried() {
	let reddit = ScriptedConnector::failing("reddit", ProviderGroup::Social, 0);
	let tracker = reddit.tracker();
	let service = fixtures::default_service(&[reddit]);
	let request = NameCheckRequest::new("acme", &[ProviderGroup::Social]);

	let first = service.check_name(&request).await.unwrap();
	fixtures::settle().await;
	service.check_name(&request).await.unwrap();

	let result = first.result(ProviderGroup::Social, "reddit").unwrap();
	assert_eq!(result.error.as_deref(), Some("Network error: connection reset"));
	assert_eq!(tracker.call_count(), 2);
}

#[tokio::test]
async fn one_result_per_resolved_provider() {
	let connectors = [
		ScriptedConnector::available(".com", ProviderGroup::Domains, 0),
		ScriptedConnector::available(".io", ProviderGroup::Domains, 0),
		ScriptedConnector::unavailable("github", ProviderGroup::DevPlatforms, 0),
		ScriptedConnector::available("npm", ProviderGroup::PackageRegistries, 0),
	];
	let service = fixtures::default_service(&connectors);

	let check = service
		.check_name(&NameCheckRequest::new(
			"acme",
			&[ProviderGroup::Domains, ProviderGroup::DevPlatforms],
		))
		.await
		.unwrap();

	assert_eq!(check.result_count(), 3);
	assert!(check.result(ProviderGroup::PackageRegistries, "npm").is_none());

	let summary = &check.summary;
	assert_eq!(
		summary.available + summary.unavailable + summary.pending,
		summary.total_checked
	);
	assert!((0.0..=1.0).contains(&summary.overall_score));
	assert_eq!(
		*summary,
		brandmark_aggregator::NameCheckSummary::from_results(&check.results)
	);
}
