use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FALLBACK_ANSWER: &str = "I'm sorry, I couldn't process that query.";
pub const DEFAULT_CATEGORY: &str = "General";
pub const ERROR_ANSWER: &str = "An error occurred while contacting the HR Intelligence module.";
pub const ERROR_CATEGORY: &str = "Error";

/// Fully populated outcome of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub citations: Vec<String>,
    pub category: String,
}

impl QueryResult {
    /// Shown in place of an answer when the model could not be reached or
    /// replied with something unparseable.
    pub fn error() -> Self {
        Self {
            answer: ERROR_ANSWER.to_string(),
            citations: Vec::new(),
            category: ERROR_CATEGORY.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == ERROR_CATEGORY
    }
}

/// Fills every missing or ill-typed field with its default. Never fails.
///
/// Empty strings count as missing. Citations keep only string entries, in
/// order. Anything other than an object gets all defaults.
pub fn normalize(raw: Option<&Value>) -> QueryResult {
    let object = raw.and_then(Value::as_object);
    let field = |key: &str| object.and_then(|map| map.get(key));

    let answer = field("answer")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or(FALLBACK_ANSWER)
        .to_string();

    let citations = field("citations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let category = field("category")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    QueryResult {
        answer,
        citations,
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_well_formed(result: &QueryResult) {
        assert!(!result.answer.is_empty());
        assert!(!result.category.trim().is_empty());
    }

    #[test]
    fn complete_payload_passes_through_unchanged() {
        let raw = json!({
            "answer": "15 days in your first year.",
            "citations": ["15 days first year."],
            "category": "Benefits"
        });

        let result = normalize(Some(&raw));

        assert_eq!(
            result,
            QueryResult {
                answer: "15 days in your first year.".to_string(),
                citations: vec!["15 days first year.".to_string()],
                category: "Benefits".to_string(),
            }
        );
    }

    #[test]
    fn empty_object_gets_every_default() {
        let result = normalize(Some(&json!({})));
        assert_eq!(result.answer, FALLBACK_ANSWER);
        assert!(result.citations.is_empty());
        assert_eq!(result.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn absent_payload_gets_every_default() {
        let result = normalize(None);
        assert_eq!(result.answer, FALLBACK_ANSWER);
        assert_eq!(result.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn malformed_payloads_never_escape_partially_typed() {
        let payloads = [
            json!(null),
            json!("just a string"),
            json!(42),
            json!([1, 2, 3]),
            json!({ "answer": null, "citations": null, "category": null }),
            json!({ "answer": 7, "citations": "not a list", "category": ["x"] }),
            json!({ "answer": "", "category": "   " }),
            json!({ "citations": [1, "kept", null, { "a": 1 }] }),
        ];

        for payload in &payloads {
            let result = normalize(Some(payload));
            assert_well_formed(&result);
        }

        let mixed = normalize(Some(&payloads[7]));
        assert_eq!(mixed.citations, vec!["kept".to_string()]);
    }

    #[test]
    fn unknown_category_is_kept_verbatim() {
        let result = normalize(Some(&json!({ "answer": "a", "category": "Payroll" })));
        assert_eq!(result.category, "Payroll");
    }

    #[test]
    fn error_result_shape() {
        let result = QueryResult::error();
        assert!(result.is_error());
        assert!(result.citations.is_empty());
        assert_eq!(result.answer, ERROR_ANSWER);
    }
}
