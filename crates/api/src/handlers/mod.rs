pub mod checks;
pub mod common;
pub mod health;
pub mod providers;
pub mod ws;

pub use checks::{get_provider_check, post_bulk_check, post_check};
pub use health::{health, ready};
pub use providers::get_providers;
pub use ws::ws_handler;
