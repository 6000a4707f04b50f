//! reqwest implementation of `Backend`.
//!
//! Bodies are read even on non-2xx responses: the backend reports most failures as
//! `{"error": "..."}` with a 4xx/5xx status, and that message is what the user sees.
//! No retries; a timeout applies only when configured.
//!
//! Ids are appended as single percent-encoded path segments, never spliced into the
//! path text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::models::{decode_rows, AskResponse, ResumeResponse};
use super::{
    reported_error, AskRequest, Backend, BackendError, ChatSessionSummary, JobAnalysisRequest,
    ResumeRequest, SavedReportSummary, SavedResume, StudentSummary,
};
use crate::profiles::ProfileQuery;

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(BackendError::InvalidId((*bad).to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_value(&self, segments: &[&str]) -> Result<Value, BackendError> {
        let url = self.url(segments)?;
        debug!("GET {}", url.path());
        let path = url.path().to_string();
        let response = self.client.get(url).send().await?;
        checked(&path, response).await
    }

    async fn post_value<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Value, BackendError> {
        let url = self.url(segments)?;
        debug!("POST {}", url.path());
        let path = url.path().to_string();
        let response = self.client.post(url).json(body).send().await?;
        checked(&path, response).await
    }

    /// Decodes a list payload row by row; malformed rows are dropped.
    async fn get_rows<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Vec<T>, BackendError> {
        let value = self.get_value(segments).await?;
        let rows: Vec<Value> = serde_json::from_value(value)?;
        Ok(decode_rows(rows))
    }
}

/// Reads the body as JSON and maps every failure shape onto `BackendError`.
async fn checked(path: &str, response: Response) -> Result<Value, BackendError> {
    let status = response.status();
    let text = response.text().await?;

    let payload = match serde_json::from_str::<Value>(&text) {
        Ok(payload) => payload,
        Err(e) if status.is_success() => return Err(BackendError::Parse(e)),
        Err(_) => {
            warn!("{path} returned {status}");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
    };

    if let Some(message) = reported_error(&payload) {
        warn!("{path} reported an error: {message}");
        return Err(BackendError::Reported(message));
    }
    if !status.is_success() {
        warn!("{path} returned {status}");
        return Err(BackendError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(payload)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn students(&self) -> Result<Vec<StudentSummary>, BackendError> {
        self.get_rows(&["api", "students"]).await
    }

    async fn report(&self, enrollment_no: &str) -> Result<Value, BackendError> {
        self.get_value(&["api", "report", enrollment_no]).await
    }

    async fn saved_report(
        &self,
        enrollment_no: &str,
        report_id: &str,
    ) -> Result<Value, BackendError> {
        self.get_value(&["api", "report", "load", enrollment_no, report_id])
            .await
    }

    async fn report_history(
        &self,
        enrollment_no: &str,
    ) -> Result<Vec<SavedReportSummary>, BackendError> {
        self.get_rows(&["api", "reports", "history", enrollment_no])
            .await
    }

    async fn job_analysis(&self, request: &JobAnalysisRequest) -> Result<Value, BackendError> {
        let mut payload = self.post_value(&["api", "job-analysis"], request).await?;
        match payload.get_mut("data") {
            Some(data) if data.is_object() => Ok(data.take()),
            _ => Err(BackendError::Reported("Job analysis returned no data".into())),
        }
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        let payload = self.post_value(&["api", "ask"], request).await?;
        let response: AskResponse = serde_json::from_value(payload)?;
        if response.answer.is_none() {
            return Err(BackendError::Reported(
                response.error.unwrap_or_else(|| "No answer returned".into()),
            ));
        }
        Ok(response)
    }

    async fn chat_history(
        &self,
        enrollment_no: &str,
    ) -> Result<Vec<ChatSessionSummary>, BackendError> {
        self.get_rows(&["api", "chat", "history", enrollment_no])
            .await
    }

    async fn generate_resume(&self, request: &ResumeRequest) -> Result<String, BackendError> {
        let payload = self.post_value(&["api", "resume", "generate"], request).await?;
        let response: ResumeResponse = serde_json::from_value(payload)?;
        match response.resume {
            Some(resume) if response.success || response.error.is_none() => Ok(resume),
            _ => Err(BackendError::Reported(
                response.error.unwrap_or_else(|| "Resume generation failed".into()),
            )),
        }
    }

    async fn resume_history(&self, enrollment_no: &str) -> Result<Vec<SavedResume>, BackendError> {
        self.get_rows(&["api", "resume", "history", enrollment_no])
            .await
    }

    async fn dashboard_metrics(&self, enrollment_no: &str) -> Result<Value, BackendError> {
        self.get_value(&["api", "dashboard", "metrics", enrollment_no])
            .await
    }

    async fn dashboard_students(&self) -> Result<Value, BackendError> {
        self.get_value(&["api", "dashboard", "students"]).await
    }

    async fn all_profiles(&self, query: &ProfileQuery) -> Result<Value, BackendError> {
        debug!("GET /api/all");
        let response = self
            .client
            .get(self.url(&["api", "all"])?)
            .query(&query.query_pairs())
            .send()
            .await?;
        let status = response.status();
        let payload: Value = response.json().await?;
        // a partial payload still carries cards worth rendering
        if payload.get("data").is_some_and(Value::is_object) {
            return Ok(payload);
        }
        match reported_error(&payload) {
            Some(message) => Err(BackendError::Reported(message)),
            None if !status.is_success() => Err(BackendError::Status {
                status: status.as_u16(),
                body: payload.to_string(),
            }),
            None => Ok(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(router: Router) -> HttpBackend {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        HttpBackend::new(&format!("http://{addr}/"), None).unwrap()
    }

    #[tokio::test]
    async fn test_students_decode() {
        let backend = serve(Router::new().route(
            "/api/students",
            get(|| async { Json(json!([{"enrollment_no": "1", "name": "Asha"}])) }),
        ))
        .await;
        let students = backend.students().await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Asha");
    }

    #[tokio::test]
    async fn test_ids_stay_inside_their_path_segment() {
        let backend = serve(
            Router::new()
                .route("/api/students", get(|| async { Json(json!({"hijacked": true})) }))
                .route(
                    "/api/report/:id",
                    get(|Path(id): Path<String>| async move { Json(json!({"id": id})) }),
                ),
        )
        .await;
        let echoed = backend.report("../students").await.unwrap();
        assert_eq!(echoed, json!({"id": "../students"}));
        let echoed = backend.report("a/b?c=1").await.unwrap();
        assert_eq!(echoed, json!({"id": "a/b?c=1"}));
        match backend.report("..").await {
            Err(BackendError::InvalidId(id)) => assert_eq!(id, ".."),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(backend.report("").await, Err(BackendError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route(
            "/backend/api/students",
            get(|| async { Json(json!([{"enrollment_no": "1", "name": "Asha"}])) }),
        );
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let backend = HttpBackend::new(&format!("http://{addr}/backend/"), None).unwrap();
        assert_eq!(backend.students().await.unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url", None),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_history_skips_malformed_rows() {
        let backend = serve(Router::new().route(
            "/api/chat/history/:id",
            get(|| async {
                Json(json!([
                    {"id": "s1", "title": "Intro", "messages": [{"sender": "system", "text": "x"}]},
                    {"title": "no id"},
                    {"id": 7, "title": "Numeric id"}
                ]))
            }),
        ))
        .await;
        let sessions = backend.chat_history("01").await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].messages.is_empty());
        assert_eq!(sessions[1].id, "7");
    }

    #[tokio::test]
    async fn test_error_body_on_non_2xx_is_reported() {
        let backend = serve(Router::new().route(
            "/api/report/:id",
            get(|Path(id): Path<String>| async move {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": format!("Student {id} not found")})),
                )
            }),
        ))
        .await;
        let err = backend.report("42").await.unwrap_err();
        assert_eq!(err.to_string(), "Student 42 not found");
    }

    #[tokio::test]
    async fn test_non_json_failure_maps_to_status() {
        let backend = serve(Router::new().route(
            "/api/dashboard/students",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        ))
        .await;
        match backend.dashboard_students().await {
            Err(BackendError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_job_analysis_unwraps_data() {
        let backend = serve(Router::new().route(
            "/api/job-analysis",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"success": true, "data": {"echo": body["job_description"]}}))
            }),
        ))
        .await;
        let data = backend
            .job_analysis(&JobAnalysisRequest {
                enrollment_no: "1".into(),
                job_description: "Rust dev".into(),
            })
            .await
            .unwrap();
        assert_eq!(data, json!({"echo": "Rust dev"}));
    }

    #[tokio::test]
    async fn test_ask_failure_is_reported() {
        let backend = serve(Router::new().route(
            "/api/ask",
            post(|| async { Json(json!({"success": false, "error": "index missing"})) }),
        ))
        .await;
        let err = backend
            .ask(&AskRequest {
                enrollment_no: "1".into(),
                question: "hi".into(),
                session_id: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "index missing");
    }

    #[tokio::test]
    async fn test_all_profiles_passes_query_and_keeps_partial_payload() {
        let backend = serve(Router::new().route(
            "/api/all",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                (
                    StatusCode::MULTI_STATUS,
                    Json(json!({
                        "success": false,
                        "data": {"github": {"login": q.get("github").cloned()}},
                        "errors": {"leetcode": "not found"}
                    })),
                )
            }),
        ))
        .await;
        let query = ProfileQuery {
            github: Some("octo".into()),
            leetcode: Some("lc".into()),
            ..Default::default()
        };
        let payload = backend.all_profiles(&query).await.unwrap();
        assert_eq!(payload["data"]["github"]["login"], "octo");
        assert_eq!(payload["errors"]["leetcode"], "not found");
    }

    #[tokio::test]
    async fn test_generate_resume_returns_markdown() {
        let backend = serve(Router::new().route(
            "/api/resume/generate",
            post(|| async { Json(json!({"success": true, "resume": "# Asha"})) }),
        ))
        .await;
        let resume = backend
            .generate_resume(&ResumeRequest {
                enrollment_no: "1".into(),
                job_description: "jd".into(),
                company: "Acme".into(),
                role: "Dev".into(),
            })
            .await
            .unwrap();
        assert_eq!(resume, "# Asha");
    }
}
