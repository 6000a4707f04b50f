//! Every call the dashboard makes to the analysis backend.
//!
//! The controller only sees `Arc<dyn Backend>`; `HttpBackend` is the reqwest
//! implementation, tests substitute an in-memory one.

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod models;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::profiles::ProfileQuery;

pub use client::HttpBackend;
pub use models::{
    AskRequest, AskResponse, ChatSessionSummary, JobAnalysisRequest, ResumeRequest,
    SavedReportSummary, SavedResume, StudentSummary,
};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx without a usable `error` field; `body` is kept for logs.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    /// The payload carried an `error` field (or `success: false`).
    #[error("{0}")]
    Reported(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// An id that cannot stand as a single path segment.
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),
}

/// Pulls a backend-reported error out of a payload: a non-empty `error` field, or
/// `success: false` (with `details` as the message when present).
pub fn reported_error(payload: &Value) -> Option<String> {
    let text = |v: &Value| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Null => None,
        Value::String(_) => None,
        other => Some(other.to_string()),
    };
    if let Some(message) = payload.get("error").and_then(text) {
        return Some(message);
    }
    if payload.get("success") == Some(&Value::Bool(false)) {
        return Some(
            payload
                .get("details")
                .and_then(text)
                .unwrap_or_else(|| "Request failed".to_string()),
        );
    }
    None
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// GET /api/students
    async fn students(&self) -> Result<Vec<StudentSummary>, BackendError>;

    /// GET /api/report/{enrollment_no}
    async fn report(&self, enrollment_no: &str) -> Result<Value, BackendError>;

    /// GET /api/report/load/{enrollment_no}/{report_id}
    async fn saved_report(
        &self,
        enrollment_no: &str,
        report_id: &str,
    ) -> Result<Value, BackendError>;

    /// GET /api/reports/history/{enrollment_no}
    async fn report_history(
        &self,
        enrollment_no: &str,
    ) -> Result<Vec<SavedReportSummary>, BackendError>;

    /// POST /api/job-analysis. Returns the `data` object.
    async fn job_analysis(&self, request: &JobAnalysisRequest) -> Result<Value, BackendError>;

    /// POST /api/ask
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError>;

    /// GET /api/chat/history/{enrollment_no}
    async fn chat_history(
        &self,
        enrollment_no: &str,
    ) -> Result<Vec<ChatSessionSummary>, BackendError>;

    /// POST /api/resume/generate. Returns the markdown body.
    async fn generate_resume(&self, request: &ResumeRequest) -> Result<String, BackendError>;

    /// GET /api/resume/history/{enrollment_no}
    async fn resume_history(&self, enrollment_no: &str) -> Result<Vec<SavedResume>, BackendError>;

    /// GET /api/dashboard/metrics/{enrollment_no}
    async fn dashboard_metrics(&self, enrollment_no: &str) -> Result<Value, BackendError>;

    /// GET /api/dashboard/students
    async fn dashboard_students(&self) -> Result<Value, BackendError>;

    /// GET /api/all. The combined payload is returned even when `success` is false:
    /// per-source failures are rendered as error cards, not raised.
    async fn all_profiles(&self, query: &ProfileQuery) -> Result<Value, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reported_error_variants() {
        assert_eq!(reported_error(&json!({"error": "boom"})).as_deref(), Some("boom"));
        assert_eq!(reported_error(&json!({"error": null, "ok": 1})), None);
        assert_eq!(
            reported_error(&json!({"success": false, "details": "bad id"})).as_deref(),
            Some("bad id")
        );
        assert_eq!(
            reported_error(&json!({"success": false})).as_deref(),
            Some("Request failed")
        );
        assert_eq!(reported_error(&json!({"success": true, "data": {}})), None);
        assert_eq!(reported_error(&json!([1, 2])), None);
    }

    #[test]
    fn test_reported_error_displays_raw_message() {
        let err = BackendError::Reported("Student not found".into());
        assert_eq!(err.to_string(), "Student not found");
    }
}
