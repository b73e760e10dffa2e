pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use std::sync::{Arc, Mutex};

use tracing::info;

pub use crate::application::CleanTableUseCase;
pub use crate::domain::error::{AppError, Result};
pub use crate::domain::table::{CleanOptions, CleanReport, CleanedFile, UploadedFile};
pub use crate::infrastructure::config::ServerConfig;

/// Install the global `tracing` subscriber; a second call is a no-op
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load configuration, start the HTTP server and wait for it to stop
pub async fn run() -> Result<()> {
    let config = ServerConfig::load()?;
    init_tracing(&config.log_filter);
    info!(
        address = %config.bind_address(),
        max_upload_bytes = config.max_upload_bytes,
        "Starting sheet cleaner"
    );

    let logs = Arc::new(Mutex::new(Vec::new()));
    let server = crate::interfaces::http::start_server(config, logs)?;
    server.await?;
    Ok(())
}
