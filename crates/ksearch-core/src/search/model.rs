//! Search domain models and their wire representations.

use serde::{Deserialize, Serialize};

/// Default value sent as the `key` of a feedback submission.
pub const DEFAULT_FEEDBACK_KEY: &str = "user-feedback";

/// A supporting document referenced by a generated answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Identifier referenced by `[id]` markers in the answer text
    pub id: i64,
    pub title: String,
    pub url: String,
    pub excerpt: String,

    /// Publication date as sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Document type (e.g., "article", "pdf")
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The answer to a search, immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The query that produced this result
    pub query: String,
    pub answer_text: String,
    pub reasoning_text: String,
    pub sources: Vec<Source>,

    /// Join key for feedback submission; empty when the server omitted it
    pub run_id: String,
}

impl SearchResult {
    /// Looks up a source by id.
    pub fn source(&self, id: i64) -> Option<&Source> {
        self.sources.iter().find(|source| source.id == id)
    }

    /// Returns true if feedback can be attached to this result.
    pub fn accepts_feedback(&self) -> bool {
        !self.run_id.trim().is_empty()
    }
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub session_id: String,
}

/// Successful body of `POST /search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub query: String,
    pub result: SearchResponseResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponseResult {
    pub content: SearchResponseContent,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub run_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponseContent {
    pub answer: String,
    #[serde(default)]
    pub reasoning: String,
}

/// Failure body of `POST /search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchErrorResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl SearchResponse {
    /// Converts the wire payload into the domain result.
    ///
    /// `fallback_query` is used when the server echoes an empty query.
    pub fn into_result(self, fallback_query: &str) -> SearchResult {
        let query = if self.query.is_empty() {
            fallback_query.to_string()
        } else {
            self.query
        };

        SearchResult {
            query,
            answer_text: self.result.content.answer,
            reasoning_text: self.result.content.reasoning,
            sources: self.result.sources,
            run_id: self.result.run_id,
        }
    }
}

/// Thumbs-up / thumbs-down rating of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackScore {
    Helpful,
    NotHelpful,
}

impl FeedbackScore {
    /// Numeric score sent to the server.
    pub fn value(self) -> f64 {
        match self {
            FeedbackScore::Helpful => 1.0,
            FeedbackScore::NotHelpful => 0.0,
        }
    }
}

/// Body of `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRequest {
    pub run_id: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub key: String,
}

impl FeedbackRequest {
    pub fn new(run_id: impl Into<String>, score: FeedbackScore, comment: Option<String>) -> Self {
        Self {
            run_id: run_id.into(),
            score: score.value(),
            comment: comment.filter(|c| !c.trim().is_empty()),
            key: DEFAULT_FEEDBACK_KEY.to_string(),
        }
    }

    /// Overrides the feedback key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_uses_camel_case_session_id() {
        let request = SearchRequest {
            query: "What are the fees?".to_string(),
            session_id: "abc".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["query"], "What are the fees?");
    }

    #[test]
    fn test_search_response_into_result() {
        let body = r#"{
            "status": "success",
            "query": "fees",
            "result": {
                "content": {"answer": "Low [1].", "reasoning": "Because [1]."},
                "sources": [
                    {"id": 1, "title": "Fee guide", "url": "https://example.com/fees",
                     "excerpt": "Fees are low.", "date": "2024-01-02", "type": "article"}
                ],
                "run_id": "run-42"
            }
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let result = response.into_result("ignored");

        assert_eq!(result.query, "fees");
        assert_eq!(result.answer_text, "Low [1].");
        assert_eq!(result.reasoning_text, "Because [1].");
        assert_eq!(result.run_id, "run-42");
        assert_eq!(result.sources[0].kind.as_deref(), Some("article"));
        assert_eq!(result.source(1).map(|s| s.title.as_str()), Some("Fee guide"));
        assert!(result.source(2).is_none());
        assert!(result.accepts_feedback());
    }

    #[test]
    fn test_missing_run_id_disables_feedback() {
        let body = r#"{"status": "success", "query": "",
            "result": {"content": {"answer": "a", "reasoning": "r"}, "sources": []}}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let result = response.into_result("original");

        assert_eq!(result.query, "original");
        assert!(!result.accepts_feedback());
    }

    #[test]
    fn test_feedback_request_shape() {
        let request = FeedbackRequest::new("run-1", FeedbackScore::NotHelpful, Some("  ".into()));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["run_id"], "run-1");
        assert_eq!(json["score"], 0.0);
        assert_eq!(json["key"], "user-feedback");
        assert!(json.get("comment").is_none());

        let helpful = FeedbackRequest::new("run-1", FeedbackScore::Helpful, Some("great".into()))
            .with_key("custom");
        assert_eq!(helpful.score, 1.0);
        assert_eq!(helpful.comment.as_deref(), Some("great"));
        assert_eq!(helpful.key, "custom");
    }
}
