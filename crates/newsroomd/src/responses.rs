//! Request and response bodies

use newsroom_core::{CritiqueCode, PipelineResult};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const HEALTH_MESSAGE: &str = "Servidor de agente IA funcionando";

/// POST /generate-news
#[derive(Debug, Default, Deserialize)]
pub struct GenerateNewsRequest {
    #[serde(default)]
    pub solicitud: Option<String>,
    #[serde(default)]
    pub max_iterations: Option<u32>,
    #[serde(default)]
    pub quality_threshold: Option<f64>,
}

/// POST /agent/query
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

/// POST /agent/suggestions
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub context: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: HEALTH_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSuccess {
    pub status: String,
    pub message: String,
    pub solicitud: String,
    pub noticia: String,
    pub plan: String,
    pub iteraciones_critica: u32,
    pub codigo_final: CritiqueCode,
}

/// Critique budget spent without approval. Still a 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsWarning {
    pub status: String,
    pub message: String,
    pub solicitud: String,
    pub plan: String,
    pub ultimo_informe: String,
    pub ultimo_analisis: String,
    pub iteraciones: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerateNewsResponse {
    Success(NewsSuccess),
    Warning(NewsWarning),
}

impl GenerateNewsResponse {
    /// Render a pipeline result. `Failure` becomes a 500.
    pub fn from_result(
        solicitud: &str,
        max_iterations: u32,
        result: PipelineResult,
    ) -> Result<Self, ApiError> {
        match result {
            PipelineResult::Success {
                article,
                plan,
                iterations_used,
                final_code,
            } => Ok(Self::Success(NewsSuccess {
                status: "success".to_string(),
                message: "Noticia generada exitosamente".to_string(),
                solicitud: solicitud.to_string(),
                noticia: article.into_html(),
                plan,
                iteraciones_critica: iterations_used,
                codigo_final: final_code,
            })),
            PipelineResult::QualityExhausted {
                plan,
                last_report,
                last_verdict,
                iterations_used,
            } => Ok(Self::Warning(NewsWarning {
                status: "warning".to_string(),
                message: format!(
                    "No se pudo alcanzar el umbral de calidad después de {max_iterations} iteraciones"
                ),
                solicitud: solicitud.to_string(),
                plan,
                ultimo_informe: last_report,
                ultimo_analisis: last_verdict.text,
                iteraciones: iterations_used,
            })),
            PipelineResult::Failure { error, .. } => Err(ApiError::internal(format!(
                "Error generando la noticia: {error}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub status: String,
    pub query: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub status: String,
    pub query: String,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsroom_core::{classify, Article, Stage};

    #[test]
    fn test_success_shape() {
        let result = PipelineResult::Success {
            article: Article::unchecked("<article>x</article>"),
            plan: "P".to_string(),
            iterations_used: 1,
            final_code: CritiqueCode::Approved,
        };
        let response = GenerateNewsResponse::from_result("tema", 3, result).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["noticia"], "<article>x</article>");
        assert_eq!(json["codigo_final"], "CODE02");
        assert_eq!(json["iteraciones_critica"], 1);
    }

    #[test]
    fn test_warning_names_budget() {
        let result = PipelineResult::QualityExhausted {
            plan: "P".to_string(),
            last_report: "R".to_string(),
            last_verdict: classify("CODE01 sesgo"),
            iterations_used: 2,
        };
        let response = GenerateNewsResponse::from_result("tema", 2, result).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(
            json["message"],
            "No se pudo alcanzar el umbral de calidad después de 2 iteraciones"
        );
        assert_eq!(json["ultimo_analisis"], "CODE01 sesgo");
        assert!(json.get("noticia").is_none());
    }

    #[test]
    fn test_failure_is_error() {
        let result = PipelineResult::Failure {
            stage: Some(Stage::Writer),
            error: "timeout".to_string(),
        };
        let err = GenerateNewsResponse::from_result("tema", 3, result).unwrap_err();
        assert_eq!(err.message, "Error generando la noticia: timeout");
    }
}
