pub mod cache;
pub mod init;
pub mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use websearch_cache::ResultCache;
use websearch_config::AppConfig;
use websearch_pipeline::{MacroTable, SlotTable, WebSearchPipeline};
use websearch_providers::SerpApiClient;

/// Path of the config file in effect.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load the config from `explicit` or the default location, with env overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit);
    AppConfig::load_with_env(&path).map_err(|e| format!("Failed to load config: {e}").into())
}

/// Open the configured cache store.
pub async fn open_cache(config: &AppConfig) -> Result<Arc<ResultCache>, Box<dyn std::error::Error>> {
    let path = config.cache.resolved_path();
    let store = websearch_cache::open_store(&config.cache.backend, &path).await?;
    Ok(Arc::new(ResultCache::new(store)))
}

/// Wire a pipeline from config. The returned slot table receives its writes.
pub async fn build_pipeline(
    config: &AppConfig,
) -> Result<(WebSearchPipeline, Arc<SlotTable>), Box<dyn std::error::Error>> {
    let cache = open_cache(config).await?;
    let client = Arc::new(SerpApiClient::from_config(&config.search)?);
    let slots = Arc::new(SlotTable::new());
    let macros: MacroTable = config.macros.iter().collect();

    let pipeline = WebSearchPipeline::new(cache, client, Arc::new(config.clone()), slots.clone())
        .with_macros(Arc::new(macros))
        .with_search_timeout(Duration::from_secs(config.search.timeout_secs));

    debug!(
        backend = %config.cache.backend,
        endpoint = %config.search.endpoint,
        "Pipeline ready"
    );
    Ok((pipeline, slots))
}
