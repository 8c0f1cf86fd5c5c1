//! Column-value encoding keyed by declared column type.
//!
//! | type         | shape                                   |
//! |--------------|-----------------------------------------|
//! | link         | `{"url": .., "text": ..}`               |
//! | text         | raw string                              |
//! | numbers      | decimal string                          |
//! | rating       | `{"rating": n}`                         |
//! | status/color | `{"label": ..}`                         |
//! | long_text    | raw string                              |
//! | email        | `{"email": .., "text": ..}`             |
//!
//! Empty values encode to `None` and must be left out of the payload.

use serde_json::{json, Value};

use super::ColumnType;

/// A record field before it is shaped for a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Link { url: String, label: String },
    Number(i64),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn link(url: impl Into<String>, label: impl Into<String>) -> Self {
        FieldValue::Link {
            url: url.into(),
            label: label.into(),
        }
    }

    /// Plain string form, `None` when blank.
    fn as_plain(&self) -> Option<String> {
        let s = match self {
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Link { url, .. } => url.trim().to_string(),
            FieldValue::Number(n) => n.to_string(),
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}

/// Encode `value` for a column of type `kind`. Pure and deterministic.
pub fn encode_value(value: &FieldValue, kind: &ColumnType) -> Option<Value> {
    let plain = value.as_plain()?;
    match kind {
        ColumnType::Link => {
            let label = match value {
                FieldValue::Link { label, .. } if !label.trim().is_empty() => label.trim().to_string(),
                _ => plain.clone(),
            };
            Some(json!({ "url": plain, "text": label }))
        }
        ColumnType::Numeric => match value {
            FieldValue::Number(n) => Some(Value::String(n.to_string())),
            _ => plain
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|_| Value::String(plain)),
        },
        ColumnType::Rating => {
            let n = match value {
                FieldValue::Number(n) => *n,
                _ => plain.parse::<i64>().ok()?,
            };
            Some(json!({ "rating": n }))
        }
        ColumnType::Status => Some(json!({ "label": plain })),
        ColumnType::Email => match value {
            FieldValue::Number(_) => None,
            _ => Some(json!({ "email": plain, "text": plain })),
        },
        ColumnType::Text | ColumnType::LongText | ColumnType::Other(_) => Some(Value::String(plain)),
    }
}

/// Map a 0–100 score onto 1–5 stars.
pub fn score_to_stars(score: i32) -> i64 {
    let stars = (f64::from(score) / 20.0).round() as i64;
    stars.clamp(1, 5)
}
