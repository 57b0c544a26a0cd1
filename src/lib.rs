pub mod cli;
pub mod display;
pub mod error;
pub mod manager;
pub mod models;
pub mod reconcile;
pub mod schema;
pub mod session;
pub mod settings;
pub mod store;

pub use error::{Error, Result};

use crate::manager::{AttendanceManager, ReportOptions};
use crate::settings::Settings;
use crate::store::FsStore;

/// Creates a manager over the file-system store and report options named in `settings`.
pub fn create_default_manager(settings: &Settings) -> Result<AttendanceManager<FsStore>> {
    let store = FsStore::new(&settings.store.root);
    let options = ReportOptions::from_settings(settings)?;

    Ok(AttendanceManager::new(store, options))
}

/// Installs the `tracing` subscriber used by every binary. Logs go to stderr so that reports on
/// stdout can be piped; `RUST_LOG` overrides the default `warn` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
