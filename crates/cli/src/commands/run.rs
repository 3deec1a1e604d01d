//! `websearch run` - One pipeline turn over a chat history file.

use std::path::Path;
use websearch_core::message::ChatTurn;
use websearch_pipeline::SLOT_ID;

pub async fn run(
    config_path: Option<&Path>,
    chat_path: &Path,
    enable: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    if enable {
        config.websearch.enabled = true;
    }

    let raw = std::fs::read_to_string(chat_path)
        .map_err(|e| format!("Failed to read {}: {e}", chat_path.display()))?;
    let chat: Vec<ChatTurn> = serde_json::from_str(&raw)
        .map_err(|e| format!("Invalid chat history in {}: {e}", chat_path.display()))?;

    let (pipeline, slots) = super::build_pipeline(&config).await?;

    match pipeline.run(&chat, &config.websearch).await {
        Ok(injection) => {
            eprintln!(
                "query: {} ({})",
                injection.query,
                if injection.cached { "cached" } else { "fresh" }
            );
            if let Some(slot) = slots.get(SLOT_ID) {
                eprintln!("slot:  {} depth {}", slot.position, slot.depth);
                println!("{}", slot.content);
            }
        }
        Err(e) => eprintln!("No injection: {e}"),
    }

    Ok(())
}
