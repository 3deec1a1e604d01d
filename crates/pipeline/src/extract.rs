//! Turn a search payload into budgeted prompt text.

use crate::answer_box::{AnswerBox, scalar_text};
use serde_json::Value;
use tracing::debug;

/// Organic results and related questions each contribute at most this many snippets.
pub const MAX_LISTED_RESULTS: usize = 5;

/// Collect text fragments in priority order: answer box, knowledge graph,
/// organic results, related questions.
pub fn fragments(payload: &Value) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(answer) = payload.get("answer_box").and_then(AnswerBox::from_json) {
        out.extend(answer.fragments());
    }

    if let Some(graph) = payload.get("knowledge_graph").and_then(Value::as_object) {
        out.extend(
            ["description", "snippet", "merchant_description", "title"]
                .iter()
                .find_map(|name| graph.get(*name).and_then(scalar_text)),
        );
    }

    for list in ["organic_results", "related_questions"] {
        if let Some(items) = payload.get(list).and_then(Value::as_array) {
            out.extend(
                items
                    .iter()
                    .take(MAX_LISTED_RESULTS)
                    .filter_map(|item| item.get("snippet").and_then(scalar_text)),
            );
        }
    }

    out
}

/// Join fragments, one per line, until the text grows past `budget_chars`.
///
/// Length is counted in UTF-16 code units, so an astral character such as an
/// emoji counts twice. The budget is checked after each fragment, so the
/// result can overshoot by one fragment. Empty fragments are skipped. Returns
/// `None` if nothing was appended.
pub fn assemble<I, S>(fragments: I, budget_chars: usize) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    let mut units = 0usize;

    for fragment in fragments {
        let fragment = fragment.as_ref();
        if !fragment.is_empty() {
            text.push_str(fragment);
            text.push('\n');
            units += fragment.encode_utf16().count() + 1;
        }
        if units > budget_chars {
            break;
        }
    }

    (!text.is_empty()).then_some(text)
}

/// Extract prompt text from a search payload.
pub fn extract(payload: &Value, budget_chars: usize) -> Option<String> {
    let text = assemble(fragments(payload), budget_chars);
    match &text {
        Some(t) => debug!(
            length = t.encode_utf16().count(),
            budget = budget_chars,
            "Extracted text"
        ),
        None => debug!("Search produced no text"),
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_box_comes_before_organic_results() {
        let payload = json!({
            "organic_results": [{"snippet": "math site"}],
            "answer_box": {"type": "calculator_result", "result": "4"},
        });
        assert_eq!(extract(&payload, 1500).as_deref(), Some("4\nmath site\n"));
    }

    #[test]
    fn full_priority_order() {
        let payload = json!({
            "related_questions": [{"snippet": "related"}],
            "organic_results": [{"snippet": "organic"}],
            "knowledge_graph": {"title": "Graph title", "description": "Graph description"},
            "answer_box": {"type": "flight_duration", "duration": "2h"},
        });
        assert_eq!(
            fragments(&payload),
            vec!["2h", "Graph description", "organic", "related"]
        );
    }

    #[test]
    fn budget_is_a_soft_cap() {
        assert_eq!(assemble(["abcdef", "ghij"], 5).as_deref(), Some("abcdef\n"));
        assert_eq!(
            assemble(["ab", "cd", "ef"], 5).as_deref(),
            Some("ab\ncd\n"),
            "stops once the length exceeds the budget"
        );
        assert_eq!(assemble(["ab", "cd"], 6).as_deref(), Some("ab\ncd\n"));
    }

    #[test]
    fn budget_counts_utf16_units() {
        // BMP characters count once regardless of their UTF-8 width.
        assert_eq!(assemble(["ééé", "x"], 4).as_deref(), Some("ééé\nx\n"));
        assert_eq!(assemble(["éééé", "x"], 4).as_deref(), Some("éééé\n"));

        // Each emoji is a surrogate pair: "🍞🍞\n" is 5 units.
        assert_eq!(assemble(["🍞🍞", "x"], 5).as_deref(), Some("🍞🍞\nx\n"));
        assert_eq!(assemble(["🍞🍞", "x"], 4).as_deref(), Some("🍞🍞\n"));
    }

    #[test]
    fn fragments_are_never_truncated() {
        let long = "x".repeat(100);
        assert_eq!(assemble([long.as_str()], 10).unwrap().len(), 101);
    }

    #[test]
    fn empty_fragments_are_skipped() {
        assert_eq!(assemble(["", "a", ""], 100).as_deref(), Some("a\n"));
        assert_eq!(assemble(Vec::<String>::new(), 100), None);
        assert_eq!(assemble([""], 100), None);
    }

    #[test]
    fn lists_are_capped_at_five() {
        let organic: Vec<Value> = (0..8).map(|i| json!({"snippet": format!("o{i}")})).collect();
        let related: Vec<Value> = (0..7).map(|i| json!({"snippet": format!("r{i}")})).collect();
        let payload = json!({"organic_results": organic, "related_questions": related});

        let got = fragments(&payload);
        assert_eq!(got.len(), 10);
        assert_eq!(got[4], "o4");
        assert_eq!(got[5], "r0");
    }

    #[test]
    fn missing_snippets_contribute_nothing() {
        let payload = json!({
            "organic_results": [{"title": "no snippet"}, {"snippet": ""}, {"snippet": "kept"}],
        });
        assert_eq!(extract(&payload, 1500).as_deref(), Some("kept\n"));
    }

    #[test]
    fn knowledge_graph_fallback_chain() {
        let payload = json!({"knowledge_graph": {"merchant_description": "shop", "title": "T"}});
        assert_eq!(fragments(&payload), vec!["shop"]);
    }

    #[test]
    fn malformed_sections_are_ignored() {
        let payload = json!({
            "answer_box": "not an object",
            "knowledge_graph": [],
            "organic_results": {"snippet": "not a list"},
        });
        assert_eq!(extract(&payload, 1500), None);
        assert_eq!(extract(&json!({}), 1500), None);
        assert_eq!(extract(&json!(null), 1500), None);
    }
}
