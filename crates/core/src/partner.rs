//! Partner program application form.
//!
//! Applications are validated locally and then posted, form-encoded, to the
//! Google Form that collects them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::{info, warn};

pub const DEFAULT_FORM_ACTION_URL: &str = "https://docs.google.com/forms/d/e/1FAIpQLSf4UWrDamqw4Fw0SiG2j9M8kAOkFwMl6d7xQMqwlDakCT1GeQ/formResponse";

// Google Form entry ids, in form order.
const ENTRY_NAME: &str = "entry.96804154";
const ENTRY_EMAIL: &str = "entry.1811682831";
const ENTRY_PHONE: &str = "entry.1455157687";
const ENTRY_COMPANY: &str = "entry.1673054986";
const ENTRY_EXPERIENCE: &str = "entry.814604571";
const ENTRY_WHY_PARTNER: &str = "entry.58399267";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerApplication {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub business_name: Option<String>,
    pub experience: String,
    pub why_partner: String,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PartnerFormError {
    #[error("invalid partner application ({} field(s) rejected)", .0.len())]
    Invalid(Vec<FieldError>),
    #[error("form submission failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("form endpoint rejected the submission with status {0}")]
    Rejected(u16),
}

fn check_len(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
    too_short: &'static str,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError {
            field,
            message: too_short,
        });
    } else if len > max {
        errors.push(FieldError {
            field,
            message: "Too long",
        });
    }
}

// The regex crate has no lookahead, so leading and doubled dots are checked separately.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("email pattern compiles")
});

fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

impl PartnerApplication {
    /// Returns a copy with every field trimmed and an empty business name dropped.
    pub fn trimmed(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            business_name: self
                .business_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            experience: self.experience.trim().to_string(),
            why_partner: self.why_partner.trim().to_string(),
        }
    }

    /// Trims and validates the application, returning the trimmed copy.
    pub fn validate(&self) -> Result<Self, Vec<FieldError>> {
        let app = self.trimmed();
        let mut errors = Vec::new();

        check_len(
            &mut errors,
            "fullName",
            &app.full_name,
            2,
            100,
            "Name must be at least 2 characters",
        );
        if !is_valid_email(&app.email) {
            errors.push(FieldError {
                field: "email",
                message: "Invalid email address",
            });
        } else if app.email.chars().count() > 255 {
            errors.push(FieldError {
                field: "email",
                message: "Too long",
            });
        }
        check_len(
            &mut errors,
            "phone",
            &app.phone,
            10,
            20,
            "Phone number must be at least 10 digits",
        );
        if let Some(business) = &app.business_name {
            check_len(&mut errors, "businessName", business, 0, 100, "");
        }
        check_len(
            &mut errors,
            "experience",
            &app.experience,
            10,
            1000,
            "Please provide more details about your experience",
        );
        check_len(
            &mut errors,
            "whyPartner",
            &app.why_partner,
            10,
            1000,
            "Please tell us why you want to partner",
        );

        if errors.is_empty() { Ok(app) } else { Err(errors) }
    }

    /// The Google Form fields for this application.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (ENTRY_NAME, self.full_name.clone()),
            (ENTRY_EMAIL, self.email.clone()),
            (ENTRY_PHONE, self.phone.clone()),
            (ENTRY_COMPANY, self.business_name.clone().unwrap_or_default()),
            (ENTRY_EXPERIENCE, self.experience.clone()),
            (ENTRY_WHY_PARTNER, self.why_partner.clone()),
        ]
    }
}

/// Posts applications to the collecting Google Form.
pub struct GoogleFormClient {
    http: reqwest::Client,
    action_url: String,
}

impl GoogleFormClient {
    pub fn new(http: reqwest::Client, action_url: impl Into<String>) -> Self {
        Self {
            http,
            action_url: action_url.into(),
        }
    }

    pub fn action_url(&self) -> &str {
        &self.action_url
    }

    pub async fn submit(&self, application: &PartnerApplication) -> Result<(), PartnerFormError> {
        let application = application.validate().map_err(PartnerFormError::Invalid)?;

        let response = self
            .http
            .post(&self.action_url)
            .form(&application.form_fields())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                "Partner application was rejected by the form endpoint"
            );
            return Err(PartnerFormError::Rejected(status.as_u16()));
        }
        info!("Partner application submitted");
        Ok(())
    }
}
