//! # websearch core
//!
//! Domain types, traits, and error definitions for the web-search prompt
//! context pipeline. This crate has **no I/O dependencies**: it defines the
//! seams that the cache, provider, and pipeline crates implement against.
//!
//! ## Collaborators
//!
//! Everything the pipeline talks to is a trait here:
//! - [`CacheStore`]: durable key/value storage for extracted text
//! - [`SearchClient`]: the network call to the search provider
//! - [`PromptSlot`]: the host's named prompt insertion point
//! - [`MacroExpander`]: the host's generic `{{macro}}` pass
//! - [`Credentials`]: "is an API key configured?"
//! - [`Clock`]: wall-clock milliseconds, swappable in tests

pub mod cache;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod message;
pub mod prompt;
pub mod search;

// Re-export key types at crate root for ergonomics
pub use cache::{CacheEntry, CacheStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{Credentials, SERPAPI_SECRET};
pub use error::{CacheError, PipelineError, SearchError};
pub use message::{ChatTurn, latest_user_turn, rfind_turn};
pub use prompt::{MacroExpander, NoMacros, PromptPosition, PromptSlot};
pub use search::SearchClient;
