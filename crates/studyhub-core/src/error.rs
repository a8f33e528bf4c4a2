//! Error types module
//!
//! All backend failures are unified under the `ApiError` enum. Classification
//! happens exactly once, in the API client, from the HTTP status code plus the
//! parsed `detail` body. Orchestrators branch on the variant rather than
//! re-parsing response text.

use serde::{Deserialize, Serialize};

pub type ApiResult<T> = Result<T, ApiError>;

/// One field-level failure from a 422 validation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401. Callers must clear any stored session.
    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },

    /// 404. May be an expected-empty collection, see [`is_empty_collection`].
    #[error("Not found: {detail}")]
    NotFound { detail: String },

    /// 400/409 whose detail names a uniqueness conflict.
    #[error("Duplicate: {detail}")]
    Duplicate { detail: String },

    /// 422 with structured field errors.
    #[error("Validation failed: {}", summarize_fields(errors))]
    Validation { errors: Vec<FieldError> },

    /// Any other non-2xx status.
    #[error("Request failed with status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Transport failure: connect error or the fixed request timeout.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx body that was not the expected JSON shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Detail phrases the backend uses for collections that simply have no rows.
/// A 404 carrying one of these is an empty result, not a failure.
const EMPTY_COLLECTION_MARKERS: &[&str] = &[
    "no channels",
    "no topics",
    "no notes",
    "no invitations",
    "no organizations",
    "no members",
    "no memberships",
];

/// Whether a 404 detail describes an empty collection rather than a missing
/// resource. Case-insensitive substring match, same spirit as the duplicate
/// heuristic below.
pub fn is_empty_collection(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    EMPTY_COLLECTION_MARKERS.iter().any(|m| lower.contains(m))
}

fn detail_names_duplicate(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    lower.contains("duplicate") || lower.contains("already exists") || lower.contains("unique")
}

fn summarize_fields(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "invalid request".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// FastAPI-style 422 item: `{"loc": ["body", "content"], "msg": "..."}`.
#[derive(Debug, Deserialize)]
struct RawValidationItem {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    #[serde(default)]
    msg: String,
}

fn parse_field_errors(detail: &serde_json::Value) -> Vec<FieldError> {
    let items: Vec<RawValidationItem> = match detail {
        serde_json::Value::Array(_) => {
            serde_json::from_value(detail.clone()).unwrap_or_default()
        }
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(|item| {
            // Skip the leading "body"/"query" segment, keep the field path.
            let field = item
                .loc
                .iter()
                .skip(1)
                .filter_map(|seg| match seg {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(".");
            FieldError {
                field: if field.is_empty() {
                    "request".to_string()
                } else {
                    field
                },
                message: item.msg,
            }
        })
        .collect()
}

fn extract_detail_text(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
        if let Some(serde_json::Value::String(s)) = value.get("message") {
            return s.clone();
        }
    }
    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.trim().to_string()
    }
}

impl ApiError {
    /// Classify a non-2xx response. The body is the raw response text; the
    /// backend reports failures as `{"detail": ...}` but plain-text bodies
    /// are tolerated.
    pub fn from_response_parts(status: u16, body: &str) -> Self {
        match status {
            401 => ApiError::Unauthorized {
                detail: extract_detail_text(body),
            },
            404 => ApiError::NotFound {
                detail: extract_detail_text(body),
            },
            422 => {
                let errors = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("detail").cloned())
                    .map(|detail| parse_field_errors(&detail))
                    .unwrap_or_default();
                ApiError::Validation { errors }
            }
            400 | 409 => {
                let detail = extract_detail_text(body);
                if detail_names_duplicate(&detail) {
                    ApiError::Duplicate { detail }
                } else {
                    ApiError::Status { status, detail }
                }
            }
            _ => ApiError::Status {
                status,
                detail: extract_detail_text(body),
            },
        }
    }

    /// True for a 404 that stands for an empty collection.
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, ApiError::NotFound { detail } if is_empty_collection(detail))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Network(e) if e.is_timeout())
    }

    /// Aggregate field errors into one user-facing line.
    pub fn validation_summary(&self) -> Option<String> {
        match self {
            ApiError::Validation { errors } => Some(summarize_fields(errors)),
            _ => None,
        }
    }
}
