//! # Structured Extraction
//!
//! The model returns free text that is expected to contain a JSON object.
//! Extraction here is two-phase: locate the object in the text, then
//! deserialize it into a strongly typed schema. Serde enforces field types,
//! so a shape mismatch fails the same way as non-JSON output. Every parser
//! returns a `Result`; the caller decides whether a neutral default is the
//! right fallback for its flow.

use crate::{errors::AssistantError, questions::QUESTION_COUNT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Confidence recorded on stored transcript analyses. The model is not
/// asked to self-assess; this is a fixed policy value.
pub const DEFAULT_ANALYSIS_CONFIDENCE: f64 = 0.8;

/// Finds the first `{` ... last `}` span in the model's output, tolerating
/// prose or code fences around the object.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Extracts and deserializes a JSON object from raw model output.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, AssistantError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| AssistantError::AnalysisParse("no JSON object in response".to_string()))?;
    serde_json::from_str(json).map_err(|e| AssistantError::AnalysisParse(e.to_string()))
}

/// The documented schema for a single call-transcript analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default = "neutral_sentiment")]
    pub sentiment: String,
}

fn neutral_sentiment() -> String {
    "neutral".to_string()
}

impl TranscriptAnalysis {
    /// The neutral substitute stored when the model's output cannot be
    /// parsed, so downstream aggregation never sees missing fields.
    pub fn fallback() -> Self {
        Self {
            summary: "Analysis failed to parse".to_string(),
            key_points: Vec::new(),
            pain_points: Vec::new(),
            opportunities: Vec::new(),
            action_items: Vec::new(),
            sentiment: neutral_sentiment(),
        }
    }
}

// --- Trend analysis schema ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    #[serde(default)]
    pub trending_topics: Vec<TrendingTopic>,
    #[serde(default)]
    pub coaching_patterns: Vec<CoachingPattern>,
    #[serde(default)]
    pub client_insights: Vec<ClientInsight>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTopic {
    pub topic: String,
    #[serde(default)]
    pub frequency: f64,
    #[serde(default = "neutral_sentiment")]
    pub sentiment: String,
    #[serde(default)]
    pub trend_direction: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingPattern {
    pub pattern: String,
    #[serde(default)]
    pub effectiveness: f64,
    #[serde(default)]
    pub frequency: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInsight {
    pub insight: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommendation: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub action: String,
}

/// A single model-generated insight derived from trend data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedInsight {
    pub insight: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub impact: String,
}

/// Parses the prefill task's answer map: a JSON object whose keys are the
/// question indices `"1"`..`"30"`. Missing or non-string values come back
/// as empty answers so every index is accounted for.
pub fn parse_prefill_answers(raw: &str) -> Result<Vec<(u32, String)>, AssistantError> {
    let value: serde_json::Value = parse_structured(raw)?;
    let object = value
        .as_object()
        .ok_or_else(|| AssistantError::AnalysisParse("prefill response is not an object".into()))?;

    let mut answers = Vec::with_capacity(QUESTION_COUNT);
    for index in 1..=QUESTION_COUNT as u32 {
        let answer = object
            .get(&index.to_string())
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        answers.push((index, answer));
    }
    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_fenced_output() {
        let raw = "Here you go:\n```json\n{\"summary\": \"ok\"}\n```";
        assert_eq!(extract_json_object(raw), Some("{\"summary\": \"ok\"}"));
    }

    #[test]
    fn parse_transcript_analysis_fills_missing_fields() {
        let raw = r#"{"summary": "A good call", "painPoints": ["churn risk"]}"#;
        let analysis: TranscriptAnalysis = parse_structured(raw).unwrap();
        assert_eq!(analysis.summary, "A good call");
        assert_eq!(analysis.pain_points, vec!["churn risk"]);
        assert!(analysis.key_points.is_empty());
        assert_eq!(analysis.sentiment, "neutral");
    }

    #[test]
    fn type_mismatch_is_a_parse_failure() {
        // painPoints must be an array of strings, not a string.
        let raw = r#"{"summary": "x", "painPoints": "churn"}"#;
        let result: Result<TranscriptAnalysis, _> = parse_structured(raw);
        assert!(matches!(result, Err(AssistantError::AnalysisParse(_))));
    }

    #[test]
    fn non_json_output_is_a_parse_failure() {
        let result: Result<TranscriptAnalysis, _> = parse_structured("I cannot help with that.");
        assert!(matches!(result, Err(AssistantError::AnalysisParse(_))));
    }

    #[test]
    fn prefill_answers_cover_all_indices() {
        let raw = r#"{"1": "first", "3": "third", "30": "last", "7": 42}"#;
        let answers = parse_prefill_answers(raw).unwrap();
        assert_eq!(answers.len(), 30);
        assert_eq!(answers[0], (1, "first".to_string()));
        assert_eq!(answers[2], (3, "third".to_string()));
        // Non-string values degrade to empty.
        assert_eq!(answers[6], (7, String::new()));
        assert_eq!(answers[29], (30, "last".to_string()));
    }

    #[test]
    fn trend_report_default_is_empty_but_complete() {
        let report = TrendReport::default();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["trendingTopics"].as_array().unwrap().is_empty());
        assert!(json["recommendations"].as_array().unwrap().is_empty());
    }
}
