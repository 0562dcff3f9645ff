//! Axum Handlers for the REST API
//!
//! Session issuance, call scheduling, partner applications and the template
//! catalog. It uses `utoipa` doc comments to generate OpenAPI documentation.
//!
//! Request bodies are taken as raw bytes and decoded here, so a malformed
//! body produces the same JSON error envelope as every other failure.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use onthego_core::partner::{FieldError, PartnerApplication, PartnerFormError};
use onthego_core::template::{filter_by_category, find_by_slug};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{Span, error, field, info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::ConfigError,
    models::{
        ChatKitSessionPayload, ClientSecretResponse, ErrorResponse, HealthResponse,
        PartnerApplicationPayload, ScheduleCallPayload, ScheduleCallResponse, SubmittedResponse,
        TemplateListResponse, TemplatePreview, TemplateQuery, TemplateSummary,
    },
    providers::{UpstreamError, awaz::AwazCalls, openai::OpenAiSessions},
    state::AppState,
};

const CHATKIT_FAILURE: &str = "Failed to create ChatKit session";
const REALTIME_FAILURE: &str = "Failed to create session with OpenAI";
const SCHEDULE_FAILURE: &str = "Failed to schedule call";
const PARTNER_FAILURE: &str = "Submission Failed";

pub enum ApiError {
    BadRequest(String),
    InvalidFields(Vec<FieldError>),
    MissingConfiguration(String),
    /// A provider answered with a non-success status; it is passed through.
    Upstream {
        error: &'static str,
        status: StatusCode,
        details: Value,
    },
    /// Like `Upstream`, but the provider's body stays in the logs.
    UpstreamStatusOnly {
        error: &'static str,
        status: StatusCode,
    },
    Unexpected {
        error: String,
        details: Option<String>,
        kind: Option<&'static str>,
    },
}

impl ApiError {
    fn from_upstream(error: &'static str, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, details } => ApiError::Upstream {
                error,
                status,
                details,
            },
            other => ApiError::Unexpected {
                error: error.to_string(),
                kind: Some(other.kind()),
                details: Some(other.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
            }
            ApiError::InvalidFields(fields) => {
                let body = ErrorResponse {
                    fields: Some(fields.into_iter().map(Into::into).collect()),
                    ..ErrorResponse::new("Invalid application")
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::MissingConfiguration(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(message)),
            )
                .into_response(),
            ApiError::Upstream {
                error,
                status,
                details,
            } => {
                let body = ErrorResponse {
                    status: Some(status.as_u16()),
                    details: Some(details),
                    ..ErrorResponse::new(error)
                };
                (status, Json(body)).into_response()
            }
            ApiError::UpstreamStatusOnly { error, status } => {
                (status, Json(ErrorResponse::new(error))).into_response()
            }
            ApiError::Unexpected {
                error,
                details,
                kind,
            } => {
                let body = ErrorResponse {
                    details: details.map(Value::String),
                    kind: kind.map(str::to_string),
                    ..ErrorResponse::new(error)
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

fn openai_not_configured(err: ConfigError) -> ApiError {
    error!(error = %err, "OpenAI session endpoint is not configured");
    let message = match &err {
        ConfigError::MissingVar(var) if var == "OPENAI_WORKFLOW_ID" => {
            "ChatKit Workflow ID not configured"
        }
        _ => "OpenAI API key not configured",
    };
    ApiError::MissingConfiguration(message.to_string())
}

/// Create a ChatKit session and return its client secret.
#[utoipa::path(
    post,
    path = "/api/chatkit/session",
    request_body = ChatKitSessionPayload,
    responses(
        (status = 200, description = "Session created", body = ClientSecretResponse),
        (status = 400, description = "Missing userId", body = ErrorResponse),
        (status = 500, description = "Not configured or unexpected failure", body = ErrorResponse),
        (status = "default", description = "Provider error, passed through with its status", body = ErrorResponse)
    )
)]
#[instrument(
    name = "chatkit_session",
    skip_all,
    fields(request_id = %Uuid::new_v4(), user_id = field::Empty)
)]
pub async fn create_chatkit_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ClientSecretResponse>, ApiError> {
    info!("ChatKit session creation started");

    let (api_key, workflow_id) = state
        .config
        .chatkit_credentials()
        .map_err(openai_not_configured)?;

    let payload: ChatKitSessionPayload = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "Request body is not valid JSON");
        ApiError::Unexpected {
            error: CHATKIT_FAILURE.to_string(),
            details: Some(e.to_string()),
            kind: Some("InvalidRequestBody"),
        }
    })?;

    let user_id = payload.valid_user_id().ok_or_else(|| {
        warn!("Missing userId in request body");
        ApiError::BadRequest("Missing userId in request body".to_string())
    })?;
    Span::current().record("user_id", user_id);

    let sessions = OpenAiSessions {
        http: &state.http,
        api_base: &state.config.openai_api_base,
        api_key,
    };
    match sessions.create_chatkit_session(workflow_id, user_id).await {
        Ok(client_secret) => {
            info!("ChatKit session created");
            Ok(Json(ClientSecretResponse { client_secret }))
        }
        Err(e) => {
            error!(error = %e, "ChatKit session creation failed");
            Err(ApiError::from_upstream(CHATKIT_FAILURE, e))
        }
    }
}

/// Create a realtime voice session and return its ephemeral client secret.
#[utoipa::path(
    post,
    path = "/api/create-session",
    responses(
        (status = 200, description = "Session created", body = ClientSecretResponse),
        (status = 500, description = "Not configured or unexpected failure", body = ErrorResponse),
        (status = "default", description = "Provider error, passed through with its status", body = ErrorResponse)
    )
)]
#[instrument(name = "realtime_session", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn create_realtime_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClientSecretResponse>, ApiError> {
    let (api_key, _) = state
        .config
        .chatkit_credentials()
        .map_err(openai_not_configured)?;

    let sessions = OpenAiSessions {
        http: &state.http,
        api_base: &state.config.openai_api_base,
        api_key,
    };
    match sessions
        .create_realtime_session(&state.config.realtime_model, &state.config.realtime_voice)
        .await
    {
        Ok(client_secret) => {
            info!("Realtime session created");
            Ok(Json(ClientSecretResponse { client_secret }))
        }
        Err(e) => {
            error!(error = %e, "Realtime session creation failed");
            Err(ApiError::from_upstream(REALTIME_FAILURE, e))
        }
    }
}

/// Schedule an outbound call to the given phone number in about two minutes.
#[utoipa::path(
    post,
    path = "/api/schedule-call",
    request_body = ScheduleCallPayload,
    responses(
        (status = 200, description = "Call scheduled", body = ScheduleCallResponse),
        (status = 400, description = "Missing name or phone", body = ErrorResponse),
        (status = 500, description = "Not configured or unexpected failure", body = ErrorResponse),
        (status = "default", description = "Provider error, passed through with its status", body = ErrorResponse)
    )
)]
#[instrument(name = "schedule_call", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn schedule_call(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ScheduleCallResponse>, ApiError> {
    let payload: ScheduleCallPayload =
        serde_json::from_slice(&body).map_err(|e| ApiError::Unexpected {
            error: e.to_string(),
            details: None,
            kind: None,
        })?;

    let (name, phone) = match (payload.name, payload.phone) {
        (Some(name), Some(phone)) if !name.trim().is_empty() && !phone.trim().is_empty() => {
            (name, phone)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Name and phone number are required".to_string(),
            ));
        }
    };

    let (api_key, agent_id) = state.config.awaz_credentials().map_err(|e| {
        error!(error = %e, "Call scheduling is not configured");
        ApiError::MissingConfiguration("API configuration error".to_string())
    })?;

    let calls = AwazCalls {
        http: &state.http,
        api_base: &state.config.awaz_api_base,
        api_key,
        agent_id,
        caller_number: &state.config.awaz_caller_number,
    };
    match calls.schedule(&name, &phone).await {
        Ok(data) => {
            info!("Call scheduled");
            Ok(Json(ScheduleCallResponse {
                success: true,
                data,
            }))
        }
        Err(UpstreamError::Status { status, details }) => {
            warn!(status = status.as_u16(), %details, "Call provider rejected the request");
            Err(ApiError::UpstreamStatusOnly {
                error: SCHEDULE_FAILURE,
                status,
            })
        }
        Err(e) => {
            error!(error = %e, "Error scheduling call");
            Err(ApiError::Unexpected {
                error: e.to_string(),
                details: None,
                kind: None,
            })
        }
    }
}

/// Validate a partner program application and forward it to the collecting form.
#[utoipa::path(
    post,
    path = "/api/partner-application",
    request_body = PartnerApplicationPayload,
    responses(
        (status = 200, description = "Application submitted", body = SubmittedResponse),
        (status = 400, description = "Invalid application", body = ErrorResponse),
        (status = 502, description = "Form endpoint rejected the submission", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
#[instrument(name = "partner_application", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn submit_partner_application(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SubmittedResponse>, ApiError> {
    let payload: PartnerApplicationPayload = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid application body: {e}")))?;

    match state.forms.submit(&PartnerApplication::from(payload)).await {
        Ok(()) => Ok(Json(SubmittedResponse { success: true })),
        Err(PartnerFormError::Invalid(fields)) => Err(ApiError::InvalidFields(fields)),
        Err(PartnerFormError::Rejected(code)) => Err(ApiError::Upstream {
            error: PARTNER_FAILURE,
            status: StatusCode::BAD_GATEWAY,
            details: json!({ "upstream_status": code }),
        }),
        Err(e @ PartnerFormError::Transport(_)) => {
            error!(error = %e, "Partner application submission failed");
            Err(ApiError::Unexpected {
                error: PARTNER_FAILURE.to_string(),
                details: Some(e.to_string()),
                kind: Some("NetworkError"),
            })
        }
    }
}

/// List templates, optionally filtered by category, with an optional preview selection.
#[utoipa::path(
    get,
    path = "/api/templates",
    params(TemplateQuery),
    responses(
        (status = 200, description = "Templates", body = TemplateListResponse)
    )
)]
pub async fn list_templates(Query(query): Query<TemplateQuery>) -> Json<TemplateListResponse> {
    let templates = filter_by_category(query.category.as_deref())
        .into_iter()
        .map(TemplateSummary::from)
        .collect();

    let preview = query
        .template
        .as_deref()
        .and_then(find_by_slug)
        .map(|t| TemplatePreview {
            template: TemplateSummary::from(t),
            heading: t.demo_heading().to_string(),
            is_voice_bot: t.is_voice_bot(),
        });

    Json(TemplateListResponse { templates, preview })
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
