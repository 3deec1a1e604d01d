//! `websearch init` - Write a starter config file.

use std::path::Path;
use websearch_config::AppConfig;

pub async fn run(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config_path);

    if path.exists() && !force {
        println!("Config already exists at: {}", path.display());
        println!("Edit it manually or re-run with --force to overwrite.");
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;

    println!("Created config at: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set search.api_key (or export SERPAPI_API_KEY)");
    println!("  2. Set websearch.enabled = true");
    println!("  3. Try it: websearch test \"what is rust\"");
    Ok(())
}
