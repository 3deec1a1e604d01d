//! Search provider clients for websearch.
//!
//! All clients implement the `websearch_core::SearchClient` trait.

pub mod serpapi;

pub use serpapi::SerpApiClient;
