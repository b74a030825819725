//! Router tests against scripted backends.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use newsroom_core::fakes::ScriptedReasoningClient;
use newsroom_core::{
    NewsAssistant, PipelineConfig, PipelineOrchestrator, Stage, UpstreamError,
};
use newsroomd::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const ARTICLE: &str = r#"<article>
  <header><h1>Elecciones en X</h1><p>Entradilla</p></header>
  <section class="cuerpo"><p>Cuerpo.</p></section>
  <footer><p>Conclusión</p><div class="fuentes"><ul><li>Fuente A</li></ul></div></footer>
</article>"#;

fn router(client: &Arc<ScriptedReasoningClient>) -> Router {
    let orchestrator = PipelineOrchestrator::new(client.clone(), PipelineConfig::default());
    let assistant = NewsAssistant::new(client.clone(), Duration::from_secs(5));
    app(AppState::new(orchestrator, assistant))
}

async fn send(router: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, "POST", uri, Some(&body.to_string())).await
}

#[tokio::test]
async fn health_endpoints() {
    let client = Arc::new(ScriptedReasoningClient::new());
    for uri in ["/", "/agent/health"] {
        let (status, body) = send(router(&client), "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Servidor de agente IA funcionando");
    }
}

#[tokio::test]
async fn missing_or_blank_solicitud_is_400_without_stage_calls() {
    let client = Arc::new(ScriptedReasoningClient::new().respond(Stage::Planner, "P"));
    for body in [json!({}), json!({"solicitud": ""}), json!({"solicitud": "   "})] {
        let (status, body) = post(router(&client), "/generate-news", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "La solicitud de noticia es requerida");
        assert!(body["detail"].is_string());
    }
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn invalid_options_and_bodies_are_400() {
    let client = Arc::new(ScriptedReasoningClient::new());
    let cases = [
        json!({"solicitud": "tema", "max_iterations": 0}).to_string(),
        json!({"solicitud": "tema", "quality_threshold": 1.5}).to_string(),
        json!({"solicitud": "tema", "max_iterations": -1}).to_string(),
        "{not json".to_string(),
    ];
    for body in cases {
        let (status, body) = send(router(&client), "POST", "/generate-news", Some(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(body["error"].is_string());
    }
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn end_to_end_success_response() {
    let client = Arc::new(
        ScriptedReasoningClient::new()
            .respond(Stage::Planner, "P")
            .respond(Stage::Investigator, "R1")
            .respond(Stage::Critic, "CODE02 información aprobada")
            .respond(Stage::Writer, ARTICLE)
            .respond(Stage::Reviewer, ARTICLE),
    );

    let (status, body) = post(
        router(&client),
        "/generate-news",
        json!({"solicitud": "elecciones en X", "max_iterations": 1}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Noticia generada exitosamente");
    assert_eq!(body["solicitud"], "elecciones en X");
    assert_eq!(body["plan"], "P");
    assert_eq!(body["noticia"], ARTICLE);
    assert_eq!(body["iteraciones_critica"], 1);
    assert_eq!(body["codigo_final"], "CODE02");
    assert_eq!(client.calls_for(Stage::Writer), 1);
    assert_eq!(client.calls_for(Stage::Reviewer), 1);
}

#[tokio::test]
async fn backtracking_reports_two_iterations() {
    let client = Arc::new(
        ScriptedReasoningClient::new()
            .respond(Stage::Planner, "P")
            .respond_seq(Stage::Investigator, ["R1", "R2"])
            .respond_seq(Stage::Critic, ["CODE01 sesgo", "CODE02 corregido"])
            .respond(Stage::Writer, ARTICLE)
            .respond(Stage::Reviewer, ARTICLE),
    );

    let (status, body) = post(
        router(&client),
        "/generate-news",
        json!({"solicitud": "elecciones en X", "max_iterations": 2}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["iteraciones_critica"], 2);
    assert!(client.prompts_for(Stage::Writer)[0].contains("CODE02 corregido"));
}

#[tokio::test]
async fn exhausted_budget_is_warning() {
    let client = Arc::new(
        ScriptedReasoningClient::new()
            .respond(Stage::Planner, "P")
            .respond_seq(Stage::Investigator, ["R1", "R2"])
            .respond(Stage::Critic, "CODE01 dato falso"),
    );

    let (status, body) = post(
        router(&client),
        "/generate-news",
        json!({"solicitud": "tema", "max_iterations": 2}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "warning");
    assert_eq!(
        body["message"],
        "No se pudo alcanzar el umbral de calidad después de 2 iteraciones"
    );
    assert_eq!(body["ultimo_informe"], "R2");
    assert_eq!(body["ultimo_analisis"], "CODE01 dato falso");
    assert_eq!(body["iteraciones"], 2);
    assert_eq!(client.calls_for(Stage::Writer), 0);
    assert_eq!(client.calls_for(Stage::Reviewer), 0);
}

#[tokio::test]
async fn upstream_failure_is_500() {
    let client = Arc::new(ScriptedReasoningClient::new().fail(
        Stage::Planner,
        UpstreamError::Transport("connection refused".to_string()),
    ));

    let (status, body) = post(router(&client), "/generate-news", json!({"solicitud": "tema"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Error generando la noticia: "));
    assert!(message.contains("connection refused"));
}

#[tokio::test]
async fn query_endpoint() {
    let client =
        Arc::new(ScriptedReasoningClient::new().respond_key("assistant", "Resumen del tema"));

    let (status, body) = post(router(&client), "/agent/query", json!({"query": "¿Qué pasó?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["query"], "¿Qué pasó?");
    assert_eq!(body["response"], "Resumen del tema");
}

#[tokio::test]
async fn blank_query_is_400() {
    let client = Arc::new(ScriptedReasoningClient::new());
    for uri in ["/agent/query", "/agent/suggestions"] {
        let (status, body) = post(router(&client), uri, json!({"query": " "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "El campo 'query' es requerido");
    }
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn suggestions_endpoint_caps_list() {
    let client = Arc::new(
        ScriptedReasoningClient::new().respond_key("assistant", "a\nb\n\nc\nd\ne\nf\n"),
    );

    let (status, body) = post(
        router(&client),
        "/agent/suggestions",
        json!({"query": "clima", "context": ["sequía"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"], json!(["a", "b", "c", "d", "e"]));
}

#[tokio::test]
async fn query_backend_failure_is_500() {
    let client = Arc::new(ScriptedReasoningClient::new());

    let (status, body) = post(router(&client), "/agent/query", json!({"query": "tema"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Error procesando la consulta: "));
}
