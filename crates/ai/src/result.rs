use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Highest compatibility score the service produces.
pub const MAX_SCORE: u8 = 5;

/// Result of a compatibility analysis.
///
/// This is an AI insight, not domain state: it is displayed and discarded on
/// reset, never merged back into a routine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Compatibility score in 0..=5. Out-of-range or fractional values from the
    /// service are rounded and clamped on receipt.
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: u8,

    #[serde(default)]
    pub explanation: String,

    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    pub fn new(score: u8) -> Self {
        Self {
            score: score.min(MAX_SCORE),
            explanation: String::new(),
            recommendations: Vec::new(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn verdict(&self) -> CompatibilityVerdict {
        CompatibilityVerdict::from_score(self.score)
    }
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<f64> = Option::deserialize(deserializer)?;
    Ok(clamp_score(raw.unwrap_or(0.0)))
}

/// Round and clamp a raw score into 0..=5. NaN maps to 0.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// Display band for a compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityVerdict {
    PerfectFit,
    GoodFit,
    Caution,
    NotRecommended,
}

impl CompatibilityVerdict {
    pub fn from_score(score: u8) -> Self {
        match score {
            4.. => CompatibilityVerdict::PerfectFit,
            3 => CompatibilityVerdict::GoodFit,
            2 => CompatibilityVerdict::Caution,
            _ => CompatibilityVerdict::NotRecommended,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CompatibilityVerdict::PerfectFit => "Perfect fit! This product complements your routine.",
            CompatibilityVerdict::GoodFit => "Good fit. This product works with your routine.",
            CompatibilityVerdict::Caution => "Caution. There may be some compatibility issues.",
            CompatibilityVerdict::NotRecommended => {
                "Not recommended. This product may damage your skin."
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_rounded_and_clamped() {
        let parsed: AnalysisResult = serde_json::from_str(r#"{"score": 7.4}"#).unwrap();
        assert_eq!(parsed.score, 5);

        let parsed: AnalysisResult = serde_json::from_str(r#"{"score": -2}"#).unwrap();
        assert_eq!(parsed.score, 0);

        let parsed: AnalysisResult = serde_json::from_str(r#"{"score": 3.6}"#).unwrap();
        assert_eq!(parsed.score, 4);
    }

    #[test]
    fn missing_fields_default() {
        let parsed: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, AnalysisResult::default());

        let parsed: AnalysisResult = serde_json::from_str(r#"{"score": null}"#).unwrap();
        assert_eq!(parsed.score, 0);
    }

    #[test]
    fn full_payload_parses() {
        let parsed: AnalysisResult = serde_json::from_str(
            r#"{"score":4,"explanation":"Gentle","recommendations":["Use at night","Patch test"]}"#,
        )
        .unwrap();

        assert_eq!(parsed.score, 4);
        assert_eq!(parsed.explanation, "Gentle");
        assert_eq!(parsed.recommendations.len(), 2);
        assert_eq!(parsed.verdict(), CompatibilityVerdict::PerfectFit);
    }

    #[test]
    fn verdict_bands() {
        assert_eq!(CompatibilityVerdict::from_score(5), CompatibilityVerdict::PerfectFit);
        assert_eq!(CompatibilityVerdict::from_score(4), CompatibilityVerdict::PerfectFit);
        assert_eq!(CompatibilityVerdict::from_score(3), CompatibilityVerdict::GoodFit);
        assert_eq!(CompatibilityVerdict::from_score(2), CompatibilityVerdict::Caution);
        assert_eq!(CompatibilityVerdict::from_score(1), CompatibilityVerdict::NotRecommended);
        assert_eq!(CompatibilityVerdict::from_score(0), CompatibilityVerdict::NotRecommended);
    }
}
