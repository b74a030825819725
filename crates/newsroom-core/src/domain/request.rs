//! The inbound news request.

use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// Default critique budget when the caller does not supply one.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Default quality threshold. Accepted and carried, not consulted by the gate.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.8;

/// An immutable, validated request to generate one article.
///
/// Fields are private so a `NewsRequest` can only exist in a valid state:
/// non-empty trimmed topic, `max_iterations >= 1`, threshold in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNewsRequest")]
pub struct NewsRequest {
    topic: String,
    max_iterations: u32,
    quality_threshold: f64,
}

/// Wire form of [`NewsRequest`]; only reachable through validation.
#[derive(Deserialize)]
struct RawNewsRequest {
    topic: String,
    #[serde(default)]
    max_iterations: Option<u32>,
    #[serde(default)]
    quality_threshold: Option<f64>,
}

impl TryFrom<RawNewsRequest> for NewsRequest {
    type Error = ValidationError;

    fn try_from(raw: RawNewsRequest) -> Result<Self, Self::Error> {
        Self::with_options(raw.topic, raw.max_iterations, raw.quality_threshold)
    }
}

impl NewsRequest {
    /// Build a request with default iteration budget and threshold.
    pub fn new(topic: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_options(topic, None, None)
    }

    /// Build a request, falling back to defaults for absent options.
    pub fn with_options(
        topic: impl Into<String>,
        max_iterations: Option<u32>,
        quality_threshold: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }

        let max_iterations = max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(ValidationError::InvalidMaxIterations(max_iterations));
        }

        let quality_threshold = quality_threshold.unwrap_or(DEFAULT_QUALITY_THRESHOLD);
        if !(0.0..=1.0).contains(&quality_threshold) {
            return Err(ValidationError::InvalidQualityThreshold(quality_threshold));
        }

        Ok(Self {
            topic,
            max_iterations,
            quality_threshold,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn quality_threshold(&self) -> f64 {
        self.quality_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let req = NewsRequest::new("elecciones en X").unwrap();
        assert_eq!(req.topic(), "elecciones en X");
        assert_eq!(req.max_iterations(), DEFAULT_MAX_ITERATIONS);
        assert!((req.quality_threshold() - DEFAULT_QUALITY_THRESHOLD).abs() < f64::EPSILON);
    }

    #[test]
    fn test_topic_is_trimmed() {
        let req = NewsRequest::new("  sequía en el sur \n").unwrap();
        assert_eq!(req.topic(), "sequía en el sur");
    }

    #[test]
    fn test_blank_topic_rejected() {
        assert_eq!(NewsRequest::new("   ").unwrap_err(), ValidationError::EmptyTopic);
        assert_eq!(NewsRequest::new("").unwrap_err(), ValidationError::EmptyTopic);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = NewsRequest::with_options("tema", Some(0), None).unwrap_err();
        assert_eq!(err, ValidationError::InvalidMaxIterations(0));
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = r#"{"topic":"   ","max_iterations":0,"quality_threshold":7.5}"#;
        assert!(serde_json::from_str::<NewsRequest>(bad).is_err());
        let zero = r#"{"topic":"tema","max_iterations":0}"#;
        assert!(serde_json::from_str::<NewsRequest>(zero).is_err());

        let req: NewsRequest = serde_json::from_str(r#"{"topic":" tema "}"#).unwrap();
        assert_eq!(req.topic(), "tema");
        assert_eq!(req.max_iterations(), DEFAULT_MAX_ITERATIONS);

        let round = serde_json::to_string(&req).unwrap();
        assert_eq!(serde_json::from_str::<NewsRequest>(&round).unwrap(), req);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        assert!(NewsRequest::with_options("tema", None, Some(1.01)).is_err());
        assert!(NewsRequest::with_options("tema", None, Some(-0.1)).is_err());
        assert!(NewsRequest::with_options("tema", None, Some(f64::NAN)).is_err());
        assert!(NewsRequest::with_options("tema", None, Some(0.0)).is_ok());
        assert!(NewsRequest::with_options("tema", None, Some(1.0)).is_ok());
    }
}
