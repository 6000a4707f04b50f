//! In-memory `Backend` for controller and router tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::models::{Sender, StoredMessage};
use super::{
    AskRequest, AskResponse, Backend, BackendError, ChatSessionSummary, JobAnalysisRequest,
    ResumeRequest, SavedReportSummary, SavedResume, StudentSummary,
};
use crate::profiles::ProfileQuery;

#[derive(Default)]
pub struct FakeBackend {
    pub students: Vec<StudentSummary>,
    /// Report payload per enrollment number. Missing → `Status 404`.
    pub reports: HashMap<String, Value>,
    /// Artificial latency per enrollment number for `report`.
    pub report_delays: HashMap<String, Duration>,
    pub saved_reports: HashMap<String, Value>,
    pub job_analysis: Option<Value>,
    /// Metrics payload. `None` → `Status 500`.
    pub metrics: Option<Value>,
    pub overview: Option<Value>,
    pub profiles: Option<Value>,
    pub resume: Option<String>,
    pub resumes: Vec<SavedResume>,
    pub sessions: Mutex<Vec<ChatSessionSummary>>,
    /// Every call made, as `"method:arg"`.
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_students(names: &[(&str, &str)]) -> Self {
        Self {
            students: names
                .iter()
                .map(|(id, name)| StudentSummary {
                    enrollment_no: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn not_found() -> BackendError {
    BackendError::Status {
        status: 404,
        body: "not found".into(),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn students(&self) -> Result<Vec<StudentSummary>, BackendError> {
        self.record("students".into());
        Ok(self.students.clone())
    }

    async fn report(&self, enrollment_no: &str) -> Result<Value, BackendError> {
        self.record(format!("report:{enrollment_no}"));
        if let Some(delay) = self.report_delays.get(enrollment_no) {
            tokio::time::sleep(*delay).await;
        }
        let payload = self.reports.get(enrollment_no).cloned().ok_or_else(not_found)?;
        match super::reported_error(&payload) {
            Some(message) => Err(BackendError::Reported(message)),
            None => Ok(payload),
        }
    }

    async fn saved_report(
        &self,
        enrollment_no: &str,
        report_id: &str,
    ) -> Result<Value, BackendError> {
        self.record(format!("saved_report:{enrollment_no}/{report_id}"));
        self.saved_reports.get(report_id).cloned().ok_or_else(not_found)
    }

    async fn report_history(
        &self,
        enrollment_no: &str,
    ) -> Result<Vec<SavedReportSummary>, BackendError> {
        self.record(format!("report_history:{enrollment_no}"));
        Ok(self
            .saved_reports
            .keys()
            .map(|id| SavedReportSummary {
                id: id.clone(),
                title: format!("Report {id}"),
                timestamp: None,
            })
            .collect())
    }

    async fn job_analysis(&self, request: &JobAnalysisRequest) -> Result<Value, BackendError> {
        self.record(format!("job_analysis:{}", request.enrollment_no));
        self.job_analysis
            .clone()
            .ok_or_else(|| BackendError::Reported("Could not fetch job description".into()))
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        self.record(format!("ask:{}", request.question));
        if request.question == "fail" {
            return Err(BackendError::Status {
                status: 500,
                body: "boom".into(),
            });
        }
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| BackendError::Reported("session store poisoned".into()))?;
        let session_id = match &request.session_id {
            Some(id) => id.clone(),
            None => format!("session-{}", sessions.len() + 1),
        };
        let next = sessions.len() + 1;
        let answer = format!("**Answer** to {}", request.question);
        let messages = vec![
            StoredMessage {
                sender: Sender::User,
                text: request.question.clone(),
                timestamp: None,
            },
            StoredMessage {
                sender: Sender::Ai,
                text: answer.clone(),
                timestamp: None,
            },
        ];
        match sessions.iter_mut().find(|s| s.id == session_id) {
            Some(session) => session.messages.extend(messages),
            None => sessions.push(ChatSessionSummary {
                id: session_id.clone(),
                title: request.question.clone(),
                timestamp: Some(format!("2025-01-{next:02}T10:00:00")),
                messages,
            }),
        }
        Ok(AskResponse {
            success: true,
            answer: Some(answer),
            session_id: Some(session_id),
            error: None,
        })
    }

    async fn chat_history(
        &self,
        enrollment_no: &str,
    ) -> Result<Vec<ChatSessionSummary>, BackendError> {
        self.record(format!("chat_history:{enrollment_no}"));
        self.sessions
            .lock()
            .map(|s| s.clone())
            .map_err(|_| BackendError::Reported("session store poisoned".into()))
    }

    async fn generate_resume(&self, request: &ResumeRequest) -> Result<String, BackendError> {
        self.record(format!("generate_resume:{}", request.company));
        self.resume
            .clone()
            .ok_or_else(|| BackendError::Reported("Resume generation failed".into()))
    }

    async fn resume_history(&self, enrollment_no: &str) -> Result<Vec<SavedResume>, BackendError> {
        self.record(format!("resume_history:{enrollment_no}"));
        Ok(self.resumes.clone())
    }

    async fn dashboard_metrics(&self, enrollment_no: &str) -> Result<Value, BackendError> {
        self.record(format!("metrics:{enrollment_no}"));
        self.metrics.clone().ok_or(BackendError::Status {
            status: 500,
            body: "metrics unavailable".into(),
        })
    }

    async fn dashboard_students(&self) -> Result<Value, BackendError> {
        self.record("dashboard_students".into());
        Ok(self.overview.clone().unwrap_or_else(|| json!([])))
    }

    async fn all_profiles(&self, query: &ProfileQuery) -> Result<Value, BackendError> {
        self.record(format!("all_profiles:{}", query.query_pairs().len()));
        self.profiles.clone().ok_or_else(not_found)
    }
}
