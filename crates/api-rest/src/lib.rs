//! # API REST
//!
//! REST API for clinical document generation.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Every assembly failure is collapsed into one generic `500` response; details go to the
//! server log only.

#![warn(rust_2018_idioms)]

use artifacts_core::{ArtifactService, AssemblyWarning, ClinicalData};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use fhir::BundleCodec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ArtifactService>,
}

impl AppState {
    pub fn new(service: ArtifactService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct WarningRes {
    pub category: String,
    pub item: String,
    pub kind: String,
}

impl From<&AssemblyWarning> for WarningRes {
    fn from(w: &AssemblyWarning) -> Self {
        Self {
            category: w.category.as_str().to_owned(),
            item: w.item.clone(),
            kind: w.kind.as_str().to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateRes {
    /// The FHIR document bundle.
    #[schema(value_type = Object)]
    pub bundle: serde_json::Value,
    pub warnings: Vec<WarningRes>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, generate_artifacts),
    components(schemas(HealthRes, ErrorRes, WarningRes, GenerateRes))
)]
struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/clinical-artifacts", post(generate_artifacts))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint, used for monitoring and load balancer checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Clinical artifacts REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/clinical-artifacts",
    responses(
        (status = 200, description = "OP consultation document", body = GenerateRes),
        (status = 400, description = "Malformed JSON body"),
        (status = 422, description = "Body does not match the clinical input model"),
        (status = 500, description = "Assembly failed", body = ErrorRes)
    )
)]
/// Generate an OP consultation document bundle
///
/// Assembles the document from the posted clinical data and returns the FHIR bundle alongside
/// any non-fatal warnings (unresolved terminology, skipped items).
///
/// # Errors
/// Returns `500 Internal Server Error` with a generic body if assembly or encoding fails.
#[axum::debug_handler]
async fn generate_artifacts(
    State(state): State<AppState>,
    Json(req): Json<ClinicalData>,
) -> Result<Json<GenerateRes>, (StatusCode, Json<ErrorRes>)> {
    let failed = |message: &str| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorRes {
                error: message.to_owned(),
            }),
        )
    };

    let doc = state.service.assemble(&req).map_err(|e| failed(e.public_message()))?;
    let bundle = BundleCodec::to_value(&doc.bundle).map_err(|e| {
        tracing::error!("Encode bundle error: {:?}", e);
        failed("assembly failed")
    })?;

    Ok(Json(GenerateRes {
        bundle,
        warnings: doc.warnings.iter().map(WarningRes::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifacts_core::AssemblyConfig;
    use artifacts_uuid::{FixedClock, SequentialIdProvider};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        let service = ArtifactService::with_collaborators(
            Arc::new(AssemblyConfig::default()),
            Arc::new(SequentialIdProvider::new("rest").unwrap()),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())),
        );
        router(AppState::new(service))
    }

    async fn post_json(body: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/clinical-artifacts")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthRes = serde_json::from_slice(&bytes).unwrap();
        assert!(health.ok);
    }

    #[tokio::test]
    async fn generate_returns_bundle_and_warnings() {
        let (status, json) = post_json(
            r#"{"patient": {"id": "pat-1"},
                "coMorbidities": [{"name": "Hypertension"}, {"name": "Gout"}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["bundle"]["resourceType"], "Bundle");
        assert_eq!(json["bundle"]["type"], "document");
        assert_eq!(json["bundle"]["entry"].as_array().unwrap().len(), 3);
        assert_eq!(json["warnings"][0]["item"], "Gout");
        assert_eq!(json["warnings"][0]["kind"], "unresolvedTerm");
        assert_eq!(json["warnings"][0]["category"], "comorbidities");
    }

    #[tokio::test]
    async fn assembly_failure_is_generic() {
        let (status, json) = post_json(r#"{"patient": {"id": "not a valid id"}}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({"error": "assembly failed"}));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_before_assembly() {
        let (status, _) = post_json(r#"{"patient": "#).await;
        assert!(status.is_client_error());

        let (status, _) = post_json(r#"{"patient": {"id": "p"}, "unknownCategory": []}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
