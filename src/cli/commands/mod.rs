pub mod campaigns;
pub mod exists;
pub mod progress;
pub mod report;
pub mod upload;

use crate::api::BackendClient;
use crate::config::AppConfig;
use crate::dashboard::Dashboard;
use crate::errors::AppResult;
use tracing::info;

/// Load configuration, apply the CLI override and build a dashboard over HTTP
///
/// An invalid config file or `BOUNCE_*` setting is an error, not a silent
/// fallback to defaults.
pub(crate) fn connect(
    backend_url: Option<&str>,
) -> AppResult<(AppConfig, Dashboard<BackendClient>)> {
    let mut app_config = AppConfig::load()?;
    if let Some(url) = backend_url {
        app_config.backend.url = url.to_string();
    }

    info!("Using backend at {}", app_config.backend.url);
    let client = BackendClient::new(&app_config.backend)?;
    let dashboard = Dashboard::new(client, app_config.polling.clone());
    Ok((app_config, dashboard))
}
