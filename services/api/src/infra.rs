use metrics_exporter_prometheus::PrometheusHandle;
use mbti_survey::config::AppConfig;
use mbti_survey::error::AppError;
use mbti_survey::store::Store;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the configured database, creating the schema on first use.
pub(crate) async fn open_store(config: &AppConfig) -> Result<Store, AppError> {
    Ok(Store::connect(&config.database.url).await?)
}
