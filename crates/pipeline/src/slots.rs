//! In-process prompt slot table.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use websearch_core::prompt::{PromptPosition, PromptSlot};

/// Writes kept in [`SlotTable::history`]; older ones are dropped.
pub const HISTORY_LIMIT: usize = 32;

/// Content stored under one slot id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotContent {
    pub content: String,
    pub position: PromptPosition,
    pub depth: u32,
}

/// A [`PromptSlot`] that keeps slots in memory.
///
/// Used by the CLI in place of a host prompt builder. The most recent
/// [`HISTORY_LIMIT`] writes are also kept so callers can inspect what a run did.
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: RwLock<HashMap<String, SlotContent>>,
    history: RwLock<VecDeque<(String, SlotContent)>>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of `id`, if any non-empty content is stored.
    pub fn get(&self, id: &str) -> Option<SlotContent> {
        let slots = self.slots.read().unwrap_or_else(|p| p.into_inner());
        slots.get(id).filter(|s| !s.content.is_empty()).cloned()
    }

    /// Recent writes in order, including clears.
    pub fn history(&self) -> Vec<(String, SlotContent)> {
        self.history
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PromptSlot for SlotTable {
    async fn set_slot(&self, id: &str, content: &str, position: PromptPosition, depth: u32) {
        let entry = SlotContent {
            content: content.to_string(),
            position,
            depth,
        };
        {
            let mut history = self.history.write().unwrap_or_else(|p| p.into_inner());
            if history.len() == HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back((id.to_string(), entry.clone()));
        }
        self.slots
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(id.to_string(), entry);
    }
}
