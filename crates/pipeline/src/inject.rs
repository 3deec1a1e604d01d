//! Template rendering and the `{{macro}}` expander.

use regex_lite::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use websearch_config::DEFAULT_INSERTION_TEMPLATE;
use websearch_core::prompt::MacroExpander;

/// Fixed slot id the pipeline writes under.
pub const SLOT_ID: &str = "___WebSearch___";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{(query|text)\}\}").expect("placeholder pattern is valid")
});

static MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z0-9_.-]+)\}\}").expect("macro pattern is valid")
});

/// Fill `{{query}}` and `{{text}}` in `template`.
///
/// Placeholders match case-insensitively and only the first occurrence of
/// each is replaced. Substituted values are not scanned again. An empty
/// template uses the default one; a template without `{{text}}` gets it
/// appended on a new line.
pub fn render_template(template: &str, query: &str, text: &str) -> String {
    let mut template = if template.trim().is_empty() {
        DEFAULT_INSERTION_TEMPLATE.to_string()
    } else {
        template.to_string()
    };

    let has_text = PLACEHOLDER
        .captures_iter(&template)
        .any(|caps| caps[1].eq_ignore_ascii_case("text"));
    if !has_text {
        template.push_str("\n{{text}}");
    }

    let mut query_done = false;
    let mut text_done = false;
    PLACEHOLDER
        .replace_all(&template, |caps: &Captures<'_>| {
            let done = if caps[1].eq_ignore_ascii_case("query") {
                &mut query_done
            } else {
                &mut text_done
            };
            if *done {
                return caps[0].to_string();
            }
            *done = true;
            if caps[1].eq_ignore_ascii_case("query") {
                query.to_string()
            } else {
                text.to_string()
            }
        })
        .into_owned()
}

/// Name → value table applied as `{{name}}` substitutions.
///
/// Names match case-insensitively. Unknown macros are left in place.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    values: BTreeMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.values
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for MacroTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

impl MacroExpander for MacroTable {
    fn expand(&self, text: &str) -> String {
        if self.values.is_empty() {
            return text.to_string();
        }
        MACRO
            .replace_all(text, |caps: &Captures<'_>| {
                self.values
                    .get(&caps[1].to_ascii_lowercase())
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}
