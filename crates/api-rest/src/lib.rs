//! # API REST
//!
//! REST API implementation for NurseNote.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for wire types and `nursenote-core` for everything else.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{ErrorRes, GenerateReq, HealthRes, HealthService, ListRecordsRes, ParseReq};
use nursenote_core::{
    parse_response, AiError, GenerationService, NoteError, NoteResult, ParsedResponse, RecordId,
    VisitRecord,
};

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    service: GenerationService,
}

impl AppState {
    pub fn new(service: GenerationService) -> Self {
        Self { service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, parse, generate, list_records, read_record),
    components(schemas(
        HealthRes,
        ParseReq,
        GenerateReq,
        ListRecordsRes,
        ErrorRes,
        api_shared::ParsedResponse,
        api_shared::SoapNote,
        api_shared::Assessment,
        api_shared::PlanOfCare,
        api_shared::CarePlanDraft,
        api_shared::VisitRecord,
        nursenote_core::VisitRecordSummary,
    ))
)]
pub struct ApiDoc;

type ApiError = (StatusCode, Json<ErrorRes>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorRes {
            error: message.into(),
        }),
    )
}

/// Maps a core error onto a status code and a message that is safe to show to the user.
fn error_response(err: NoteError) -> ApiError {
    match err {
        NoteError::InvalidInput(message) => api_error(StatusCode::BAD_REQUEST, message),
        NoteError::Types(e) => api_error(StatusCode::BAD_REQUEST, format!("入力形式が不正です: {e}")),
        NoteError::RecordId(e) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        NoteError::RecordNotFound(id) => api_error(
            StatusCode::NOT_FOUND,
            format!("訪問記録が見つかりませんでした（ID: {id}）。"),
        ),
        NoteError::Ai(AiError::NotConfigured) => {
            tracing::error!("generation requested but OPENAI_API_KEY is not configured");
            api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "AI生成機能が設定されていません。",
            )
        }
        NoteError::Ai(e) => {
            tracing::error!("AI generation error: {}", e);
            api_error(StatusCode::BAD_GATEWAY, "AI生成中にエラーが発生しました。")
        }
        e => {
            tracing::error!("internal error: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// Runs a store call on the blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> NoteResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result.map_err(error_response),
        Err(e) => {
            tracing::error!("blocking store task failed: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

/// CORS policy: the listed origins, or any origin when none are configured.
fn cors_layer(allowed_origins: Option<Vec<String>>) -> CorsLayer {
    let Some(origins) = allowed_origins else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the REST router with Swagger UI at `/swagger-ui`.
pub fn router(state: AppState, allowed_origins: Option<Vec<String>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/parse", post(parse))
        .route("/generate", post(generate))
        .route("/records", get(list_records))
        .route("/records/:id", get(read_record))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/parse",
    request_body = ParseReq,
    responses(
        (status = 200, description = "Parsed SOAP note and care-plan draft", body = ParsedResponse)
    )
)]
/// Parse raw model output into structured records.
///
/// Never fails: fields that cannot be located come back as empty strings.
#[axum::debug_handler]
async fn parse(State(_state): State<AppState>, Json(req): Json<ParseReq>) -> Json<ParsedResponse> {
    let parsed = parse_response(&req.text);
    let missing = parsed.missing_fields();
    if !missing.is_empty() {
        tracing::debug!(?missing, "parsed response is missing fields");
    }
    Json(parsed)
}

#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateReq,
    responses(
        (status = 200, description = "Generated SOAP note and care plan", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid visit details", body = ErrorRes),
        (status = 502, description = "Language model failure", body = ErrorRes),
        (status = 503, description = "Language model not configured", body = ErrorRes)
    )
)]
/// Generate a SOAP note and care plan for a visit.
///
/// Returns the model output as plain text. The visit is stored as a side effect; a storage
/// failure is logged and does not fail the request.
#[axum::debug_handler]
async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateReq>,
) -> Result<String, ApiError> {
    let note = state
        .service
        .generate(req.into())
        .await
        .map_err(error_response)?;
    Ok(note.output)
}

#[utoipa::path(
    get,
    path = "/records",
    responses(
        (status = 200, description = "Stored visit records, newest visit first", body = ListRecordsRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_records(State(state): State<AppState>) -> Result<Json<ListRecordsRes>, ApiError> {
    let store = state.service.store().clone();
    let records = run_blocking(move || store.list()).await?;
    Ok(Json(ListRecordsRes { records }))
}

#[utoipa::path(
    get,
    path = "/records/{id}",
    params(
        ("id" = String, Path, description = "Record id, 32 lowercase hex characters")
    ),
    responses(
        (status = 200, description = "Stored visit record", body = VisitRecord),
        (status = 400, description = "Malformed record id", body = ErrorRes),
        (status = 404, description = "No such record", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn read_record(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<VisitRecord>, ApiError> {
    let id = RecordId::parse(&id).map_err(|e| error_response(e.into()))?;
    let store = state.service.store().clone();
    let record = run_blocking(move || store.read(&id)).await?;
    Ok(Json(record))
}
