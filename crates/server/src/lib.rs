pub mod config;
pub mod orchestrator;
pub mod routes;
pub mod schedule;
pub mod startup;
pub mod state;

pub use config::{ConfigError, LogFormat, ViewerConfig};
pub use orchestrator::{FetchError, FetchOutcome, Orchestrator, RefreshMode};
pub use routes::{build_router, ApiError};
pub use schedule::spawn_refresh_loop;
pub use startup::{import_csv_file, open_database};
pub use state::{AppState, SharedState, StatusLevel, StatusMessage};
