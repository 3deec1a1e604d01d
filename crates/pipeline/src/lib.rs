//! # websearch pipeline
//!
//! Decides whether a chat turn warrants a web search, runs it through the
//! result cache, and injects the extracted text into a prompt slot.
//!
//! The stages are plain functions ([`normalize`], [`detect_query`],
//! [`extract`], [`render_template`]) composed by [`WebSearchPipeline`].

pub mod answer_box;
pub mod extract;
pub mod inject;
pub mod normalize;
pub mod pipeline;
pub mod slots;
pub mod trigger;

pub use answer_box::AnswerBox;
pub use extract::{assemble, extract, fragments};
pub use inject::{MacroTable, SLOT_ID, render_template};
pub use normalize::normalize;
pub use pipeline::{DEFAULT_SEARCH_TIMEOUT, Injection, WebSearchPipeline};
pub use slots::{HISTORY_LIMIT, SlotContent, SlotTable};
pub use trigger::detect_query;
