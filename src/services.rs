//! Startup selection of the generation service and the transcript store.

use std::path::Path;
use std::sync::Arc;

use generation_http::{HttpService, HttpServiceConfig, HTTP_SERVICE_ID};
use generation_service::GenerationService;
use generation_service_mock::{MockService, MOCK_SERVICE_ID};
use transcript_store::{FileStore, KeyValueStore, MemoryStore};

use crate::config::{EnvConfig, HTTP_CONFIG_PATH_ENV_VAR};

pub const DEFAULT_SERVICE_ID: &str = MOCK_SERVICE_ID;

pub fn service_from_env(config: &EnvConfig) -> Result<Arc<dyn GenerationService>, String> {
    service_for_id(
        config.service_id.as_deref().unwrap_or(DEFAULT_SERVICE_ID),
        config.http_config_path.as_deref(),
    )
}

pub fn service_for_id(
    service_id: &str,
    http_config_path: Option<&Path>,
) -> Result<Arc<dyn GenerationService>, String> {
    match service_id {
        MOCK_SERVICE_ID => Ok(Arc::new(MockService::default())),
        HTTP_SERVICE_ID => {
            let path = http_config_path.ok_or_else(|| {
                format!("{HTTP_CONFIG_PATH_ENV_VAR} must be set when using the '{HTTP_SERVICE_ID}' service")
            })?;
            let config = HttpServiceConfig::from_json_file(path).map_err(|error| error.to_string())?;
            let service = HttpService::new(config).map_err(|error| error.to_string())?;
            Ok(Arc::new(service))
        }
        unknown => Err(format!(
            "Unsupported service '{unknown}'. Available services: {MOCK_SERVICE_ID}, {HTTP_SERVICE_ID}"
        )),
    }
}

pub fn store_from_env(config: &EnvConfig) -> Box<dyn KeyValueStore> {
    if config.ephemeral {
        tracing::info!("using in-memory transcript store");
        return Box::new(MemoryStore::new());
    }

    let store = FileStore::new(config.store_dir.clone());
    tracing::info!(root = %store.root().display(), "using file transcript store");
    Box::new(store)
}
