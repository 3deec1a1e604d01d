//! Host prompt integration: where injected text ends up.

use async_trait::async_trait;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Where in the assembled prompt a slot is placed.
///
/// Deserializes from either the snake_case name or the host's numeric code,
/// so settings exported by the host can be used as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptPosition {
    /// Before the main prompt / story string
    BeforeMain,
    /// After the main prompt / story string
    #[default]
    AfterMain,
    /// Inside the chat history, `depth` messages from the end
    InChat,
}

impl PromptPosition {
    /// The numeric code used by host slot APIs (after = 0, in-chat = 1, before = 2).
    pub fn host_code(self) -> u8 {
        match self {
            Self::AfterMain => 0,
            Self::InChat => 1,
            Self::BeforeMain => 2,
        }
    }

    /// Inverse of [`PromptPosition::host_code`].
    pub fn from_host_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::AfterMain),
            1 => Some(Self::InChat),
            2 => Some(Self::BeforeMain),
            _ => None,
        }
    }
}

impl std::str::FromStr for PromptPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before_main" => Ok(Self::BeforeMain),
            "after_main" => Ok(Self::AfterMain),
            "in_chat" => Ok(Self::InChat),
            other => Err(format!(
                "unknown prompt position {other:?} (expected before_main, after_main or in_chat)"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for PromptPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u8),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => Self::from_host_code(code)
                .ok_or_else(|| D::Error::custom(format!("unknown prompt position code {code}"))),
            Repr::Name(name) => name.parse().map_err(D::Error::custom),
        }
    }
}

impl std::fmt::Display for PromptPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeforeMain => write!(f, "before_main"),
            Self::AfterMain => write!(f, "after_main"),
            Self::InChat => write!(f, "in_chat"),
        }
    }
}

/// The host's named prompt insertion point.
///
/// A write under an id fully replaces whatever was previously stored under
/// that id; writing an empty string clears it.
#[async_trait]
pub trait PromptSlot: Send + Sync {
    async fn set_slot(&self, id: &str, content: &str, position: PromptPosition, depth: u32);
}

/// The host's generic macro substitution pass, run over the filled template.
pub trait MacroExpander: Send + Sync {
    fn expand(&self, text: &str) -> String;
}

/// A macro pass that leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMacros;

impl MacroExpander for NoMacros {
    fn expand(&self, text: &str) -> String {
        text.to_string()
    }
}
