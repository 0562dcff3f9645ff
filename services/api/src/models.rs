//! API Models
//!
//! Request and response bodies for the HTTP API, annotated for OpenAPI
//! generation with `utoipa`.

use onthego_core::partner::{FieldError, PartnerApplication};
use onthego_core::template::TemplateDescriptor;
use onthego_core::widget::WidgetKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct ChatKitSessionPayload {
    /// Opaque per-browser identifier, forwarded to the provider.
    #[serde(rename = "userId", default)]
    #[schema(value_type = Option<String>, example = "user_k3j9x0a1b2c3d")]
    pub user_id: Option<Value>,
}

impl ChatKitSessionPayload {
    /// The user id, if it is a string with non-whitespace content.
    pub fn valid_user_id(&self) -> Option<&str> {
        self.user_id
            .as_ref()
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct ClientSecretResponse {
    pub client_secret: String,
}

#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct ScheduleCallPayload {
    #[serde(default)]
    #[schema(example = "Dana Reyes")]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(example = "+15550102000")]
    pub phone: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ScheduleCallResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct SubmittedResponse {
    pub success: bool,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
}

impl From<FieldError> for FieldErrorBody {
    fn from(err: FieldError) -> Self {
        Self {
            field: err.field.to_string(),
            message: err.message.to_string(),
        }
    }
}

/// The error envelope shared by every endpoint. Only `error` is always present.
#[derive(Serialize, ToSchema, Debug, Default)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldErrorBody>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }
}

#[derive(Deserialize, IntoParams, Debug, Default)]
pub struct TemplateQuery {
    /// `all`, `sales`, `support` or `booking`.
    pub category: Option<String>,
    /// Slug of the template to preview, e.g. `restaurant-reservation-bot`.
    pub template: Option<String>,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct TemplateSummary {
    #[schema(example = "Restaurant Reservation Bot")]
    pub title: String,
    #[schema(example = "restaurant-reservation-bot")]
    pub slug: String,
    pub description: String,
    #[schema(example = "booking")]
    pub category: String,
    pub features: Vec<String>,
    pub sample_questions: Vec<String>,
    #[schema(value_type = String, example = "voice")]
    pub widget: WidgetKind,
}

impl From<&TemplateDescriptor> for TemplateSummary {
    fn from(t: &TemplateDescriptor) -> Self {
        Self {
            title: t.title.to_string(),
            slug: t.slug(),
            description: t.description.to_string(),
            category: t.category.as_str().to_string(),
            features: t.features.iter().map(|s| s.to_string()).collect(),
            sample_questions: t.sample_questions.iter().map(|s| s.to_string()).collect(),
            widget: t.widget_kind(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct TemplatePreview {
    pub template: TemplateSummary,
    pub heading: String,
    pub is_voice_bot: bool,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<TemplatePreview>,
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PartnerApplicationPayload {
    #[schema(example = "Dana Reyes")]
    pub full_name: String,
    #[schema(example = "dana@example.com")]
    pub email: String,
    #[schema(example = "+1 555 010 2000")]
    pub phone: String,
    #[serde(default)]
    pub business_name: Option<String>,
    pub experience: String,
    pub why_partner: String,
}

impl From<PartnerApplicationPayload> for PartnerApplication {
    fn from(p: PartnerApplicationPayload) -> Self {
        Self {
            full_name: p.full_name,
            email: p.email,
            phone: p.phone,
            business_name: p.business_name,
            experience: p.experience,
            why_partner: p.why_partner,
        }
    }
}
