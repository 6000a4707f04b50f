//! Dashboard actions. Each handler runs one controller operation and answers
//! with the rendered surface plus any alerts it raised.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::resolve_student;
use crate::dashboard::state::Section;
use crate::errors::AppError;
use crate::state::AppState;
use crate::view::surface::SurfaceSnapshot;

#[derive(Debug, Default, Deserialize)]
pub struct StudentBody {
    #[serde(default)]
    pub enrollment_no: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobAnalysisBody {
    #[serde(default)]
    pub enrollment_no: Option<String>,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub enrollment_no: Option<String>,
    #[serde(default)]
    pub question: String,
}

async fn snapshot(state: &AppState) -> Json<SurfaceSnapshot> {
    Json(state.controller.snapshot().await)
}

/// GET /ui/snapshot
pub async fn handle_snapshot(State(state): State<AppState>) -> Json<SurfaceSnapshot> {
    snapshot(&state).await
}

/// POST /ui/navigate/:section
pub async fn handle_navigate(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Json<SurfaceSnapshot>, AppError> {
    let section: Section = section.parse()?;
    state.controller.navigate(section).await;
    Ok(snapshot(&state).await)
}

/// POST /ui/students/load
pub async fn handle_load_students(State(state): State<AppState>) -> Json<SurfaceSnapshot> {
    state.controller.load_students().await;
    snapshot(&state).await
}

/// POST /ui/students/select
pub async fn handle_select_student(
    State(state): State<AppState>,
    Json(body): Json<StudentBody>,
) -> Json<SurfaceSnapshot> {
    state
        .controller
        .select_student(body.enrollment_no.as_deref().unwrap_or_default())
        .await;
    snapshot(&state).await
}

/// POST /ui/report
pub async fn handle_generate_report(
    State(state): State<AppState>,
    Json(body): Json<StudentBody>,
) -> Json<SurfaceSnapshot> {
    let enrollment_no = resolve_student(&state, body.enrollment_no).await;
    state.controller.generate_report(&enrollment_no).await;
    snapshot(&state).await
}

/// POST /ui/reports/history
pub async fn handle_report_history(
    State(state): State<AppState>,
    Json(body): Json<StudentBody>,
) -> Json<SurfaceSnapshot> {
    let enrollment_no = resolve_student(&state, body.enrollment_no).await;
    state.controller.load_report_history(&enrollment_no).await;
    snapshot(&state).await
}

/// POST /ui/reports/:report_id
pub async fn handle_load_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
    Json(body): Json<StudentBody>,
) -> Json<SurfaceSnapshot> {
    let enrollment_no = resolve_student(&state, body.enrollment_no).await;
    state
        .controller
        .load_saved_report(&enrollment_no, &report_id)
        .await;
    snapshot(&state).await
}

/// POST /ui/job-analysis
pub async fn handle_job_analysis(
    State(state): State<AppState>,
    Json(body): Json<JobAnalysisBody>,
) -> Json<SurfaceSnapshot> {
    let enrollment_no = resolve_student(&state, body.enrollment_no).await;
    state
        .controller
        .analyze_job(&enrollment_no, &body.job_description)
        .await;
    snapshot(&state).await
}

/// POST /ui/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Json<SurfaceSnapshot> {
    let enrollment_no = resolve_student(&state, body.enrollment_no).await;
    state
        .controller
        .send_chat_message(&enrollment_no, &body.question)
        .await;
    snapshot(&state).await
}

/// POST /ui/chat/new
pub async fn handle_new_chat(State(state): State<AppState>) -> Json<SurfaceSnapshot> {
    state.controller.new_chat().await;
    snapshot(&state).await
}

/// POST /ui/chat/history
pub async fn handle_chat_history(
    State(state): State<AppState>,
    Json(body): Json<StudentBody>,
) -> Json<SurfaceSnapshot> {
    let enrollment_no = resolve_student(&state, body.enrollment_no).await;
    state.controller.load_chat_history(&enrollment_no).await;
    snapshot(&state).await
}

/// POST /ui/chat/sessions/:id
pub async fn handle_select_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<StudentBody>,
) -> Json<SurfaceSnapshot> {
    let enrollment_no = resolve_student(&state, body.enrollment_no).await;
    state
        .controller
        .select_chat_session(&enrollment_no, &session_id)
        .await;
    snapshot(&state).await
}

/// POST /ui/overview
pub async fn handle_overview(State(state): State<AppState>) -> Json<SurfaceSnapshot> {
    state.controller.load_student_overview().await;
    snapshot(&state).await
}
