//! `websearch cache` - Result cache administration.

use std::path::Path;

pub async fn clear(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let (pipeline, _) = super::build_pipeline(&config).await?;
    pipeline.clear_cache().await?;
    println!("Cache cleared ({})", config.cache.resolved_path().display());
    Ok(())
}

pub async fn stats(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let cache = super::open_cache(&config).await?;
    let path = config.cache.resolved_path();

    println!("Web Search Cache");
    println!("================");
    println!("  Backend:  {}", cache.store_name());
    if config.cache.backend != "memory" {
        match std::fs::metadata(&path) {
            Ok(meta) => println!(
                "  File:     {} ({:.1} KB)",
                path.display(),
                meta.len() as f64 / 1024.0
            ),
            Err(_) => println!("  File:     {} (not created yet)", path.display()),
        }
    }
    println!("  Entries:  {}", cache.len().await?);
    println!("  Lifetime: {}s", config.websearch.cache_lifetime_secs);

    Ok(())
}
