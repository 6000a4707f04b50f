pub mod health;
pub mod jobs;
pub mod ui;

use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Router,
};

use crate::jobs::Category;
use crate::state::AppState;
use crate::view::{Element, HtmlRenderer, Node, RenderAdapter};

/// The explicit enrollment number, else the current selection, else empty
/// (which the operation guards reject).
pub(crate) async fn resolve_student(state: &AppState, explicit: Option<String>) -> String {
    match explicit.filter(|s| !s.trim().is_empty()) {
        Some(id) => id,
        None => state.controller.selected_student().await.unwrap_or_default(),
    }
}

/// GET /
/// Full page: every surface container plus the on-campus listings.
pub async fn handle_page(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.controller.snapshot().await;

    let containers = snapshot.containers.iter().map(|(name, container)| {
        let class = if container.visible { "surface" } else { "surface hidden" };
        Element::new("div")
            .class(class)
            .id(name.clone())
            .markup(container.html.clone())
    });
    let alerts = snapshot
        .alerts
        .iter()
        .map(|a| Element::new("div").class("alert").text(a.clone()));
    let listings = state.jobs.load_category(Category::OnCampus);

    let page: Node = Element::new("html")
        .child(
            Element::new("head")
                .child(Element::new("title").text("Student Performance Dashboard")),
        )
        .child(
            Element::new("body")
                .attr("data-active-section", snapshot.active_section.clone())
                .child(Element::new("div").class("alerts").children(alerts))
                .children(containers)
                .child(Element::new("section").id("job-listings").children(listings)),
        )
        .into();

    Html(format!("<!DOCTYPE html>{}", HtmlRenderer.render(&page)))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(handle_page))
        // Dashboard actions
        .route("/ui/snapshot", get(ui::handle_snapshot))
        .route("/ui/navigate/:section", post(ui::handle_navigate))
        .route("/ui/students/load", post(ui::handle_load_students))
        .route("/ui/students/select", post(ui::handle_select_student))
        .route("/ui/report", post(ui::handle_generate_report))
        .route("/ui/reports/history", post(ui::handle_report_history))
        .route("/ui/reports/:report_id", post(ui::handle_load_report))
        .route("/ui/job-analysis", post(ui::handle_job_analysis))
        .route("/ui/chat", post(ui::handle_chat))
        .route("/ui/chat/new", post(ui::handle_new_chat))
        .route("/ui/chat/history", post(ui::handle_chat_history))
        .route("/ui/chat/sessions/:id", post(ui::handle_select_session))
        .route("/ui/overview", post(ui::handle_overview))
        // Profiles and job listings
        .route("/profiles", get(jobs::handle_profiles))
        .route("/jobs/resumes/history", get(jobs::handle_resume_history))
        .route("/jobs/posting/:id", get(jobs::handle_posting))
        .route("/jobs/posting/:id/resume", post(jobs::handle_generate_resume))
        .route(
            "/jobs/posting/:id/resume/download",
            get(jobs::handle_download_resume),
        )
        .route("/jobs/:category", get(jobs::handle_category))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::config::Config;
    use crate::dashboard::DashboardController;
    use crate::jobs::recommend::StudentSkillProfile;
    use crate::jobs::JobBoard;

    fn app(backend: FakeBackend) -> Router {
        let backend = Arc::new(backend);
        let config = Config {
            backend_url: "http://backend.test".into(),
            port: 0,
            rust_log: "debug".into(),
            diagram_settle: Duration::ZERO,
            student_skills: None,
            request_timeout: None,
        };
        build_router(AppState {
            controller: Arc::new(DashboardController::new(backend.clone(), config.diagram_settle)),
            jobs: Arc::new(JobBoard::new(backend, StudentSkillProfile::default())),
            config,
        })
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send_json(&app(FakeBackend::default()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_students_then_report_uses_selection() {
        let mut backend = FakeBackend::with_students(&[("01", "Asha")]);
        backend
            .reports
            .insert("01".into(), json!({"overall_summary": "Steady progress"}));
        let app = app(backend);

        let (status, body) = send_json(&app, "POST", "/ui/students/load", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["containers"]["student-selector"]["html"]
            .as_str()
            .unwrap()
            .contains("Asha (01)"));

        send_json(&app, "POST", "/ui/students/select", Some(json!({"enrollment_no": "01"}))).await;
        let (_, body) = send_json(&app, "POST", "/ui/report", Some(json!({}))).await;
        assert_eq!(body["active_section"], "reports");
        let report = &body["containers"]["report-view"];
        assert_eq!(report["visible"], true);
        assert!(report["html"].as_str().unwrap().contains("Steady progress"));
        assert_eq!(body["alerts"], json!([]));
    }

    #[tokio::test]
    async fn test_job_analysis_guard_alert() {
        let app = app(FakeBackend::default());
        let (_, body) = send_json(
            &app,
            "POST",
            "/ui/job-analysis",
            Some(json!({"job_description": "https://jobs.test/1"})),
        )
        .await;
        assert_eq!(
            body["alerts"],
            json!(["Please select a student and provide a job application link."])
        );
    }

    #[tokio::test]
    async fn test_unknown_section_is_404() {
        let app = app(FakeBackend::default());
        let (status, body) = send_json(&app, "POST", "/ui/navigate/settings", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let app = app(FakeBackend::default());
        let (_, body) = send_json(
            &app,
            "POST",
            "/ui/chat",
            Some(json!({"enrollment_no": "01", "question": "Hi"})),
        )
        .await;
        let history = body["containers"]["chat-history"]["html"].as_str().unwrap();
        assert!(history.contains("<strong>Answer</strong> to Hi"));
        assert!(!history.contains("Thinking..."));
        assert!(body["containers"]["chat-sessions"]["html"]
            .as_str()
            .unwrap()
            .contains(r#"data-session-id="session-1""#));
    }

    #[tokio::test]
    async fn test_job_listing_routes() {
        let app = app(FakeBackend::default());
        let (status, html) = send(&app, "GET", "/jobs/off-campus", None).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(html).unwrap();
        assert!(html.contains("off-campus-recommended-listings"));
        assert!(html.contains("Full Stack Developer"));

        let (status, _) = send(&app, "GET", "/jobs/remote", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, html) = send(&app, "GET", "/jobs/posting/3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(html).unwrap().contains("Frontend Developer"));

        let (status, _) = send(&app, "GET", "/jobs/posting/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resume_generate_and_download() {
        let backend = FakeBackend {
            resume: Some("# Tailored".into()),
            ..Default::default()
        };
        let app = app(backend);

        let (status, _) = send(&app, "GET", "/jobs/posting/1/resume/download", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "POST", "/jobs/posting/1/resume", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = "/jobs/posting/1/resume?enrollment_no=01";
        let (status, html) = send(&app, "POST", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(html).unwrap().contains("<h1>Tailored</h1>"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/jobs/posting/1/resume/download")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/markdown");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Tailored_Resume_TechCorp.md\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"# Tailored");
    }

    #[tokio::test]
    async fn test_page_renders_surface() {
        let (status, html) = send(&app(FakeBackend::default()), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(html).unwrap();
        assert!(html.starts_with("<!DOCTYPE html><html>"));
        assert!(html.contains(r#"id="nav""#));
        assert!(html.contains("on-campus-recommended-listings"));
    }
}
