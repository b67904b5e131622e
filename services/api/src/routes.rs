use crate::infra::AppState;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use screening::survey::{survey_router, EvaluationService, QuestionSetProvider};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const INDEX_DOCUMENT: &str = "index.html";

pub(crate) fn with_survey_routes(
    service: Arc<EvaluationService>,
    questions: Arc<dyn QuestionSetProvider>,
) -> axum::Router {
    survey_router(service, questions)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .fallback(frontend_asset)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Maps a request path onto the front-end bundle, refusing anything that could
/// escape it.
pub(crate) fn resolve_asset(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in uri_path.split('/').filter(|segment| !segment.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

async fn read_asset(path: &Path) -> Option<Response> {
    if !tokio::fs::metadata(path).await.ok()?.is_file() {
        return None;
    }

    let body = tokio::fs::read(path).await.ok()?;
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    Some((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// Serves bundled front-end files; unknown paths get the index document so
/// client-side routing keeps working.
pub(crate) async fn frontend_asset(Extension(state): Extension<AppState>, uri: Uri) -> Response {
    let root = state.frontend_dir.as_path();

    if let Some(path) = resolve_asset(root, uri.path()) {
        if let Some(response) = read_asset(&path).await {
            return response;
        }
    }

    if let Some(response) = read_asset(&root.join(INDEX_DOCUMENT)).await {
        return response;
    }

    debug!(path = uri.path(), "front-end asset not found");
    let payload = json!({
        "error": format!("no resource at {}", uri.path()),
        "kind": "not_found",
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use screening::survey::{
        DirectoryQuestionSets, DisabledResultSink, RecommendationCatalog, ScoringEngine,
    };
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(frontend_dir: PathBuf, ready: bool) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            frontend_dir,
        };
        let service = Arc::new(EvaluationService::new(
            ScoringEngine::standard(),
            RecommendationCatalog::standard(),
            Arc::new(DisabledResultSink),
        ));

        let questions = Arc::new(DirectoryQuestionSets::new("/nonexistent/question-sets"));

        with_survey_routes(service, questions).layer(Extension(state))
    }

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, content_type, body.to_vec())
    }

    fn frontend_bundle() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<html>screen</html>").expect("index");
        std::fs::create_dir_all(dir.path().join("static/js")).expect("static dir");
        std::fs::write(dir.path().join("static/js/app.js"), "console.log(1);").expect("bundle");
        dir
    }

    #[tokio::test]
    async fn health_and_readiness_report_status() {
        let (status, _, body) = get(app(PathBuf::from("missing"), false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, br#"{"status":"ok"}"#.to_vec());

        let (status, _, _) = get(app(PathBuf::from("missing"), false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _, _) = get(app(PathBuf::from("missing"), true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn serves_static_assets_with_guessed_content_type() {
        let bundle = frontend_bundle();

        let (status, content_type, body) =
            get(app(bundle.path().to_path_buf(), true), "/static/js/app.js").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap_or_default().contains("javascript"));
        assert_eq!(body, b"console.log(1);".to_vec());
    }

    #[tokio::test]
    async fn unknown_paths_fall_back_to_the_index_document() {
        let bundle = frontend_bundle();

        for uri in ["/", "/results/summary", "/static/missing.css"] {
            let (status, content_type, body) =
                get(app(bundle.path().to_path_buf(), true), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(content_type.as_deref(), Some("text/html"));
            assert_eq!(body, b"<html>screen</html>".to_vec());
        }
    }

    #[tokio::test]
    async fn missing_bundle_returns_not_found_json() {
        let empty = tempfile::tempdir().expect("tempdir");

        let (status, _, body) = get(app(empty.path().to_path_buf(), true), "/anything").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(payload["kind"], json!("not_found"));
    }

    #[tokio::test]
    async fn survey_routes_are_mounted() {
        let (status, _, body) = get(app(PathBuf::from("missing"), true), "/survey/en/age1").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(payload["kind"], json!("not_found"));
    }

    #[test]
    fn resolve_asset_rejects_traversal() {
        let root = Path::new("/srv/frontend");

        assert_eq!(
            resolve_asset(root, "/static/js/app.js"),
            Some(PathBuf::from("/srv/frontend/static/js/app.js"))
        );
        assert_eq!(resolve_asset(root, "/"), Some(PathBuf::from("/srv/frontend")));
        assert!(resolve_asset(root, "/../etc/passwd").is_none());
        assert!(resolve_asset(root, "/static/./app.js").is_none());
    }
}
