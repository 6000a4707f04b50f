//! Job listings and profile search, served as HTML fragments.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse},
};
use serde::Deserialize;

use super::resolve_student;
use crate::errors::AppError;
use crate::jobs::{self, resume, Category};
use crate::profiles::ProfileQuery;
use crate::state::AppState;
use crate::view::{HtmlRenderer, Node};

#[derive(Debug, Default, Deserialize)]
pub struct StudentParams {
    pub enrollment_no: Option<String>,
}

fn fragment(nodes: &[Node]) -> Html<String> {
    Html(HtmlRenderer.render_fragment(nodes))
}

/// GET /profiles?leetcode=&github=&codeforces=&enrollment=
pub async fn handle_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Html<String> {
    fragment(&state.controller.search(&query).await)
}

/// GET /jobs/:category
pub async fn handle_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Html<String>, AppError> {
    let category: Category = category.parse()?;
    Ok(fragment(&state.jobs.load_category(category)))
}

/// GET /jobs/posting/:id
pub async fn handle_posting(Path(id): Path<u32>) -> Result<Html<String>, AppError> {
    Ok(fragment(&[jobs::open_posting(id)?]))
}

/// POST /jobs/posting/:id/resume
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Query(params): Query<StudentParams>,
) -> Result<Html<String>, AppError> {
    let enrollment_no = resolve_student(&state, params.enrollment_no).await;
    let modal = state.jobs.generate_resume(id, &enrollment_no).await?;
    Ok(fragment(&[modal]))
}

/// GET /jobs/posting/:id/resume/download
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<impl IntoResponse, AppError> {
    let resume = state.jobs.download(id).await?;
    let disposition = format!("attachment; filename=\"{}\"", resume.filename());
    Ok((
        [
            (header::CONTENT_TYPE, resume::MARKDOWN_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        resume.markdown,
    ))
}

/// GET /jobs/resumes/history
pub async fn handle_resume_history(
    State(state): State<AppState>,
    Query(params): Query<StudentParams>,
) -> Result<Html<String>, AppError> {
    let enrollment_no = resolve_student(&state, params.enrollment_no).await;
    Ok(fragment(&state.jobs.resume_history(&enrollment_no).await?))
}
