use std::sync::Arc;

use brandmark_service::{CheckServiceTrait, RealtimeChecker, SessionManager};
use brandmark_storage::Storage;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub check_service: Arc<dyn CheckServiceTrait>,
	pub realtime: RealtimeChecker,
	pub sessions: Arc<SessionManager>,
	pub storage: Arc<dyn Storage>,
}

impl AppState {
	pub fn new(check_service: Arc<dyn CheckServiceTrait>, storage: Arc<dyn Storage>) -> Self {
		let sessions = Arc::new(SessionManager::new());
		let realtime = RealtimeChecker::new(Arc::clone(&check_service), Arc::clone(&sessions));
		Self {
			check_service,
			realtime,
			sessions,
			storage,
		}
	}
}
