//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ChatKitSessionPayload, ClientSecretResponse, ErrorResponse, FieldErrorBody,
        HealthResponse, PartnerApplicationPayload, ScheduleCallPayload, ScheduleCallResponse,
        SubmittedResponse, TemplateListResponse, TemplatePreview, TemplateSummary,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_chatkit_session,
        handlers::create_realtime_session,
        handlers::schedule_call,
        handlers::submit_partner_application,
        handlers::list_templates,
        handlers::health,
    ),
    components(
        schemas(
            ChatKitSessionPayload, ClientSecretResponse, ScheduleCallPayload, ScheduleCallResponse,
            PartnerApplicationPayload, SubmittedResponse, TemplateListResponse, TemplateSummary,
            TemplatePreview, HealthResponse, ErrorResponse, FieldErrorBody
        )
    ),
    tags(
        (name = "On the Go API", description = "Session issuance and integrations for the On the Go site")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/api/chatkit/session", post(handlers::create_chatkit_session))
        .route("/api/create-session", post(handlers::create_realtime_session))
        .route("/api/schedule-call", post(handlers::schedule_call))
        .route(
            "/api/partner-application",
            post(handlers::submit_partner_application),
        )
        .route("/api/templates", get(handlers::list_templates))
        .route("/health", get(handlers::health))
        .with_state(app_state);

    // Swagger UI is stateless, so it is merged alongside the stateful routes.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
