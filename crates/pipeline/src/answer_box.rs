//! The `answer_box` direct-answer payload, one variant per known `type`.

use serde_json::{Map, Value};

/// A parsed `answer_box`.
///
/// Fields are kept as already-rendered text. Anything the provider omitted
/// (or sent as null / empty string) is `None` or an empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerBox {
    Organic {
        snippet: Option<String>,
        result: Option<String>,
        title: Option<String>,
        list: Option<String>,
        table: Option<String>,
    },
    Translation {
        target: Option<String>,
    },
    Calculator {
        result: Option<String>,
    },
    Population {
        place: Option<String>,
        population: Option<String>,
    },
    CurrencyConverter {
        result: Option<String>,
    },
    Finance {
        title: Option<String>,
        exchange: Option<String>,
        stock: Option<String>,
        price: Option<String>,
        currency: Option<String>,
    },
    Weather {
        location: Option<String>,
        weather: Option<String>,
        temperature: Option<String>,
        unit: Option<String>,
    },
    FlightDuration {
        duration: Option<String>,
    },
    Dictionary {
        definitions: Option<String>,
    },
    Time {
        result: Option<String>,
        date: Option<String>,
    },
    /// Missing or unrecognised `type`.
    Unknown(Map<String, Value>),
}

impl AnswerBox {
    /// Parse an `answer_box` value. Non-objects yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |name: &str| obj.get(name).and_then(scalar_text);

        let parsed = match obj.get("type").and_then(Value::as_str) {
            Some("organic_result") => Self::Organic {
                snippet: field("snippet"),
                result: field("result"),
                title: field("title"),
                list: obj.get("list").and_then(joined_lines),
                table: obj.get("table").and_then(joined_lines),
            },
            Some("translation_result") => Self::Translation {
                target: value
                    .pointer("/translation/target/text")
                    .and_then(scalar_text),
            },
            Some("calculator_result") => Self::Calculator {
                result: field("result"),
            },
            Some("population_result") => Self::Population {
                place: field("place"),
                population: field("population"),
            },
            Some("currency_converter") => Self::CurrencyConverter {
                result: field("result"),
            },
            Some("finance_results") => Self::Finance {
                title: field("title"),
                exchange: field("exchange"),
                stock: field("stock"),
                price: field("price"),
                currency: field("currency"),
            },
            Some("weather_result") => Self::Weather {
                location: field("location"),
                weather: field("weather"),
                temperature: field("temperature"),
                unit: field("unit"),
            },
            Some("flight_duration") => Self::FlightDuration {
                duration: field("duration"),
            },
            Some("dictionary_results") => Self::Dictionary {
                definitions: obj.get("definitions").and_then(joined_lines),
            },
            Some("time") => Self::Time {
                result: field("result"),
                date: field("date"),
            },
            _ => Self::Unknown(obj.clone()),
        };

        Some(parsed)
    }

    /// Text fragments this answer contributes, in order.
    pub fn fragments(&self) -> Vec<String> {
        match self {
            Self::Organic {
                snippet,
                result,
                title,
                list,
                table,
            } => first_present([snippet, result, title])
                .into_iter()
                .chain(list.clone())
                .chain(table.clone())
                .collect(),
            Self::Translation { target } => target.iter().cloned().collect(),
            Self::Calculator { result } | Self::CurrencyConverter { result } => {
                result.iter().cloned().collect()
            }
            Self::Population { place, population } => {
                join_present(&[place, population]).into_iter().collect()
            }
            Self::Finance {
                title,
                exchange,
                stock,
                price,
                currency,
            } => join_present(&[title, exchange, stock, price, currency])
                .into_iter()
                .collect(),
            Self::Weather {
                location,
                weather,
                temperature,
                unit,
            } => join_present(&[location, weather, temperature, unit])
                .into_iter()
                .collect(),
            Self::FlightDuration { duration } => duration.iter().cloned().collect(),
            Self::Dictionary { definitions } => definitions.iter().cloned().collect(),
            Self::Time { result, date } => join_present(&[result, date]).into_iter().collect(),
            Self::Unknown(obj) => ["result", "answer", "title"]
                .iter()
                .find_map(|name| obj.get(*name).and_then(scalar_text))
                .into_iter()
                .collect(),
        }
    }
}

/// Render a scalar as text. Empty strings, `false`, null and containers are absent.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Newline-join a list of lines. Nested arrays (table rows) join their cells
/// with commas; a bare string counts as a single line.
fn joined_lines(value: &Value) -> Option<String> {
    let text = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(cells) => cells
                    .iter()
                    .map(|c| scalar_text(c).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(","),
                other => scalar_text(other).unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => scalar_text(other)?,
    };
    (!text.is_empty()).then_some(text)
}

fn first_present<const N: usize>(fields: [&Option<String>; N]) -> Option<String> {
    fields.into_iter().find_map(Clone::clone)
}

fn join_present(fields: &[&Option<String>]) -> Option<String> {
    let parts: Vec<&str> = fields.iter().filter_map(|f| f.as_deref()).collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}
