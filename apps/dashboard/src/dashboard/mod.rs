//! Dashboard controller.
//!
//! One `DashboardController` owns the page state behind an async mutex. Every
//! operation takes the lock to record intent, releases it across the backend call,
//! then takes it again to apply the response. Each request kind carries a
//! generation ticket; a response whose ticket has been superseded is dropped.

pub mod charts;
pub mod chat;
pub mod diagrams;
pub mod job_analysis;
pub mod metrics;
pub mod report;
pub mod state;
pub mod videos;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::models::report_body;
use crate::backend::{AskRequest, Backend, BackendError, JobAnalysisRequest};
use crate::markdown;
use crate::profiles::{self, Platform, ProfileCard, ProfileQuery};
use crate::view::surface::SurfaceSnapshot;
use crate::view::{Element, HtmlRenderer, Node};

use self::diagrams::DiagramRenderer;
use self::job_analysis::JobAnalysis;
use self::metrics::Counters;
use self::report::{Report, NO_CGPA_DATA};
use self::state::{
    canvases, containers, ChatMessage, ChatSession, DashboardState, RequestKind, Section, Ticket,
};

pub const MISSING_JOB_INPUT: &str = "Please select a student and provide a job application link.";
pub const NO_PROFILE_QUERY: &str = "Please enter at least one username or enrollment number.";

/// Alert text for a failed request: backend-reported errors keep the operation's
/// prefix, transport failures get the generic one.
pub fn alert_text(prefix: &str, err: &BackendError) -> String {
    match err {
        BackendError::Reported(message) => format!("{prefix}: {message}"),
        other => format!("An unexpected error occurred: {other}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportSource {
    Generated,
    Saved,
}

pub struct DashboardController {
    backend: Arc<dyn Backend>,
    state: Mutex<DashboardState>,
    diagrams: DiagramRenderer,
    renderer: HtmlRenderer,
}

impl DashboardController {
    pub fn new(backend: Arc<dyn Backend>, settle: Duration) -> Self {
        let mut state = DashboardState::default();
        render_nav(&mut state);
        state.set_loading(false);
        Self {
            backend,
            state: Mutex::new(state),
            diagrams: DiagramRenderer::new(settle),
            renderer: HtmlRenderer,
        }
    }

    /// Renders every container and drains pending alerts.
    pub async fn snapshot(&self) -> SurfaceSnapshot {
        let mut state = self.state.lock().await;
        let active = state.active.slug();
        state.surface.snapshot(active, &self.renderer)
    }

    #[cfg(test)]
    pub async fn active_section(&self) -> Section {
        self.state.lock().await.active
    }

    pub async fn selected_student(&self) -> Option<String> {
        self.state.lock().await.selected_student.clone()
    }

    /// Runs `f` against the state under the lock.
    #[cfg(test)]
    pub async fn inspect<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    // ── Navigation ─────────────────────────────────────────────────────────

    pub async fn navigate(&self, section: Section) {
        {
            let mut state = self.state.lock().await;
            activate(&mut state, section);
        }
        if section == Section::Dashboard {
            self.refresh_metrics().await;
        }
    }

    // ── Students ───────────────────────────────────────────────────────────

    pub async fn load_students(&self) {
        let ticket = self.state.lock().await.issue(RequestKind::Students);
        let result = self.backend.students().await;

        let mut state = self.state.lock().await;
        if !state.is_current(ticket) {
            debug!("stale student list discarded");
            return;
        }
        match result {
            Ok(students) => {
                info!(count = students.len(), "students loaded");
                state.students = students;
                render_selector(&mut state);
            }
            Err(e) => error!("Error fetching students: {e}"),
        }
    }

    /// Records the selection. An empty id clears it.
    pub async fn select_student(&self, enrollment_no: &str) {
        let on_dashboard = {
            let mut state = self.state.lock().await;
            let id = enrollment_no.trim();
            state.selected_student = (!id.is_empty()).then(|| id.to_string());
            debug!(student = ?state.selected_student, "student selection changed");
            render_selector(&mut state);
            state.active == Section::Dashboard
        };
        if on_dashboard {
            self.refresh_metrics().await;
        }
    }

    // ── Reports ────────────────────────────────────────────────────────────

    pub async fn generate_report(&self, enrollment_no: &str) {
        let enrollment_no = enrollment_no.trim();
        if enrollment_no.is_empty() {
            return;
        }
        let ticket = self.begin(Section::Reports, RequestKind::Report).await;
        info!(enrollment_no, "generating report");
        let result = self.backend.report(enrollment_no).await;
        self.show_report(ticket, enrollment_no, result, ReportSource::Generated)
            .await;
    }

    pub async fn load_saved_report(&self, enrollment_no: &str, report_id: &str) {
        let (enrollment_no, report_id) = (enrollment_no.trim(), report_id.trim());
        if enrollment_no.is_empty() || report_id.is_empty() {
            return;
        }
        let ticket = self.begin(Section::Reports, RequestKind::Report).await;
        let result = self
            .backend
            .saved_report(enrollment_no, report_id)
            .await
            .map(report_body);
        self.show_report(ticket, enrollment_no, result, ReportSource::Saved)
            .await;
    }

    pub async fn load_report_history(&self, enrollment_no: &str) {
        let enrollment_no = enrollment_no.trim();
        if enrollment_no.is_empty() {
            return;
        }
        let ticket = self.state.lock().await.issue(RequestKind::ReportHistory);
        let result = self.backend.report_history(enrollment_no).await;

        let mut state = self.state.lock().await;
        if !state.is_current(ticket) {
            return;
        }
        match result {
            Ok(reports) => state
                .surface
                .replace(containers::REPORT_HISTORY, report::history_nodes(&reports)),
            Err(e) => {
                warn!("report history for {enrollment_no} failed: {e}");
                state.surface.alert(alert_text("Error loading report history", &e));
            }
        }
    }

    /// Shows the loading indicator, hides both result containers and switches
    /// section. Returns the request's ticket.
    async fn begin(&self, section: Section, kind: RequestKind) -> Ticket {
        let mut state = self.state.lock().await;
        state.set_loading(true);
        state.surface.set_visible(containers::REPORT, false);
        state.surface.set_visible(containers::JOB_ANALYSIS, false);
        activate(&mut state, section);
        state.issue(kind)
    }

    async fn show_report(
        &self,
        ticket: Ticket,
        enrollment_no: &str,
        result: Result<Value, BackendError>,
        source: ReportSource,
    ) {
        let flowcharts = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            if !state.is_current(ticket) {
                debug!(enrollment_no, "stale report discarded");
                return;
            }
            state.set_loading(false);

            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("report for {enrollment_no} failed: {e}");
                    let prefix = match source {
                        ReportSource::Generated => "Error generating report",
                        ReportSource::Saved => "Error loading report",
                    };
                    state.surface.alert(alert_text(prefix, &e));
                    return;
                }
            };

            let report = Report::normalize(&raw);
            match report.cgpa_chart() {
                Some(spec) => {
                    state.charts.create(canvases::CGPA_TREND, spec);
                }
                None => state.charts.placeholder(canvases::CGPA_TREND, NO_CGPA_DATA),
            }
            let chart = state.charts.to_node(canvases::CGPA_TREND);
            let title = format!("Performance Report for {}", state.student_label(enrollment_no));
            state
                .surface
                .replace(containers::REPORT, report.to_nodes(&title, chart));
            state.surface.set_visible(containers::REPORT, true);

            state.diagrams.destroy_prefixed(containers::FLOWCHART_PREFIX);
            for container in std::mem::take(&mut state.flowchart_containers) {
                state.surface.clear(&container);
            }
            let flowcharts = report.flowcharts();
            for (container, _) in &flowcharts {
                state.surface.replace(
                    container,
                    vec![Element::new("div")
                        .class("flowchart-container flowchart-pending")
                        .id(container.clone())
                        .text("Rendering flowchart...")
                        .into()],
                );
            }
            state.flowchart_containers = flowcharts.iter().map(|(c, _)| c.clone()).collect();

            if source == ReportSource::Generated {
                state.reports_generated += 1;
            }
            info!(enrollment_no, flowcharts = flowcharts.len(), "report displayed");
            flowcharts
        };

        self.render_flowcharts(ticket, flowcharts).await;
    }

    /// Renders each flowchart after the settle delay and wraps it in a fresh
    /// pan/zoom controller. Stops as soon as a newer report takes over.
    async fn render_flowcharts(&self, ticket: Ticket, flowcharts: Vec<(String, String)>) {
        for (container, source) in flowcharts {
            let rendered = self.diagrams.render(&source).await;

            let mut state = self.state.lock().await;
            if !state.is_current(ticket) {
                return;
            }
            let node = match rendered {
                Ok(svg) => {
                    let handle = state.diagrams.attach(&container);
                    diagrams::diagram_node(&container, &svg, &handle)
                }
                Err(e) => {
                    warn!(container = %container, "flowchart failed to render: {e}");
                    state.diagrams.destroy(&container);
                    diagrams::diagram_error_node(&container, &e)
                }
            };
            state.surface.replace(&container, vec![node]);
        }
    }

    // ── Job analysis ───────────────────────────────────────────────────────

    pub async fn analyze_job(&self, enrollment_no: &str, job_description: &str) {
        let (enrollment_no, job_description) = (enrollment_no.trim(), job_description.trim());
        if enrollment_no.is_empty() || job_description.is_empty() {
            self.state.lock().await.surface.alert(MISSING_JOB_INPUT);
            return;
        }
        let ticket = self.begin(Section::JobAnalysis, RequestKind::JobAnalysis).await;
        let request = JobAnalysisRequest {
            enrollment_no: enrollment_no.to_string(),
            job_description: job_description.to_string(),
        };
        let result = self.backend.job_analysis(&request).await;

        let mut state = self.state.lock().await;
        if !state.is_current(ticket) {
            debug!(enrollment_no, "stale job analysis discarded");
            return;
        }
        state.set_loading(false);
        match result {
            Ok(data) => {
                let analysis = JobAnalysis::normalize(&data);
                state.surface.replace(containers::JOB_ANALYSIS, analysis.to_nodes());
                state.surface.set_visible(containers::JOB_ANALYSIS, true);
                state.job_analyses += 1;
                info!(enrollment_no, "job analysis displayed");
            }
            Err(e) => {
                warn!("job analysis for {enrollment_no} failed: {e}");
                state
                    .surface
                    .alert(alert_text("Error analyzing job application", &e));
            }
        }
    }

    // ── Chat ───────────────────────────────────────────────────────────────

    /// Sends a question in the open session (a new one when none is open).
    pub async fn send_chat_message(&self, enrollment_no: &str, question: &str) {
        let (enrollment_no, question) = (enrollment_no.trim(), question.trim());
        if enrollment_no.is_empty() || question.is_empty() {
            return;
        }

        let (session, request_no, session_id) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            activate(state, Section::Chat);
            if state.chat.is_blank() {
                debug!("starting a new local chat session");
            }
            let message = ChatMessage::user(question);
            state.surface.append(containers::CHAT_HISTORY, chat::bubble(&message));
            state.chat.messages.push(message);

            state.chat_requests += 1;
            let request_no = state.chat_requests;
            state
                .surface
                .append(containers::CHAT_HISTORY, chat::thinking_bubble(request_no));
            (
                state.generations.current(RequestKind::Chat),
                request_no,
                state.chat.id.clone(),
            )
        };

        let request = AskRequest {
            enrollment_no: enrollment_no.to_string(),
            question: question.to_string(),
            session_id,
        };
        let result = self.backend.ask(&request).await;

        let new_session = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            state
                .surface
                .remove_keyed(containers::CHAT_HISTORY, &chat::thinking_key(request_no));
            if !state.is_current(session) {
                debug!("answer for a closed chat session discarded");
                return;
            }
            match result {
                Ok(response) => {
                    let answer =
                        markdown::format_str(response.answer.as_deref().unwrap_or_default());
                    let message = ChatMessage::ai(answer);
                    state.surface.append(containers::CHAT_HISTORY, chat::bubble(&message));
                    state.chat.messages.push(message);
                    match response.session_id {
                        Some(id) if state.chat.id.as_deref() != Some(id.as_str()) => {
                            info!(session_id = %id, "chat session assigned");
                            state.chat.id = Some(id);
                            true
                        }
                        _ => false,
                    }
                }
                Err(e) => {
                    warn!("chat request failed: {e}");
                    let message = ChatMessage::ai(chat::ERROR_TEXT);
                    state.surface.append(containers::CHAT_HISTORY, chat::bubble(&message));
                    state.chat.messages.push(message);
                    state.surface.alert(alert_text("Error answering question", &e));
                    false
                }
            }
        };

        if new_session {
            self.load_chat_history(enrollment_no).await;
        }
    }

    pub async fn load_chat_history(&self, enrollment_no: &str) {
        let enrollment_no = enrollment_no.trim();
        if enrollment_no.is_empty() {
            return;
        }
        let ticket = self.state.lock().await.issue(RequestKind::ChatHistory);
        let result = self.backend.chat_history(enrollment_no).await;

        let mut state = self.state.lock().await;
        if !state.is_current(ticket) {
            return;
        }
        match result {
            Ok(mut sessions) => {
                chat::sort_sessions(&mut sessions);
                debug!(count = sessions.len(), "chat sessions loaded");
                state.chat_sessions = sessions;
                render_sessions(&mut state);
            }
            Err(e) => {
                warn!("chat history for {enrollment_no} failed: {e}");
                state.surface.alert(alert_text("Error loading chat history", &e));
            }
        }
    }

    /// Opens a saved session, replacing the open one. Fetches the session list
    /// first when the id is not in it.
    pub async fn select_chat_session(&self, enrollment_no: &str, session_id: &str) {
        let known = self
            .state
            .lock()
            .await
            .chat_sessions
            .iter()
            .any(|s| s.id == session_id);
        if !known {
            self.load_chat_history(enrollment_no).await;
        }

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(saved) = state.chat_sessions.iter().find(|s| s.id == session_id).cloned() else {
            state.surface.alert(format!("Chat session {session_id} not found."));
            return;
        };
        state.issue(RequestKind::Chat);
        state.chat = ChatSession {
            id: Some(saved.id.clone()),
            messages: saved.messages.iter().map(chat::from_stored).collect(),
        };
        let bubbles = state.chat.messages.iter().map(chat::bubble).collect();
        state.surface.replace(containers::CHAT_HISTORY, bubbles);
        activate(state, Section::Chat);
        render_sessions(state);
    }

    pub async fn new_chat(&self) {
        let mut state = self.state.lock().await;
        state.issue(RequestKind::Chat);
        state.chat = ChatSession::default();
        state.surface.clear(containers::CHAT_HISTORY);
        render_sessions(&mut state);
    }

    // ── Metrics ────────────────────────────────────────────────────────────

    /// Rebuilds the three dashboard charts for the selected student. Existing
    /// charts are destroyed before anything else happens.
    pub async fn refresh_metrics(&self) {
        let (enrollment_no, ticket) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            for canvas in canvases::DASHBOARD {
                state.charts.destroy(canvas);
            }
            let ticket = state.issue(RequestKind::Metrics);
            match state.selected_student.clone() {
                Some(id) => (id, ticket),
                None => {
                    metrics::placeholders(&mut state.charts, metrics::SELECT_STUDENT);
                    render_metrics(state, Counters::unavailable());
                    return;
                }
            }
        };

        let result = self.backend.dashboard_metrics(&enrollment_no).await;

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if !state.is_current(ticket) {
            debug!(enrollment_no, "stale metrics discarded");
            return;
        }
        match result {
            Ok(data) => metrics::apply(&mut state.charts, &data),
            Err(e) => {
                warn!("Error loading dashboard data for {enrollment_no}: {e}");
                metrics::placeholders(&mut state.charts, metrics::LOAD_ERROR);
            }
        }
        let counters = Counters {
            total_students: Some(state.students.len()),
            reports_generated: Some(state.reports_generated),
            job_analyses: Some(state.job_analyses),
        };
        render_metrics(state, counters);
    }

    pub async fn load_student_overview(&self) {
        let ticket = self.state.lock().await.issue(RequestKind::Overview);
        let result = self.backend.dashboard_students().await;

        let mut state = self.state.lock().await;
        if !state.is_current(ticket) {
            return;
        }
        match result {
            Ok(payload) => state
                .surface
                .replace(containers::STUDENT_OVERVIEW, metrics::overview_table(&payload)),
            Err(e) => {
                warn!("student overview failed: {e}");
                state.surface.alert(alert_text("Error loading student overview", &e));
            }
        }
    }

    // ── Profiles ───────────────────────────────────────────────────────────

    /// Combined profile search. One card per requested identifier.
    pub async fn search(&self, query: &ProfileQuery) -> Vec<Node> {
        let nodes = if query.is_empty() {
            vec![profiles::no_results(NO_PROFILE_QUERY)]
        } else {
            let cards = match self.backend.all_profiles(query).await {
                Ok(payload) => profiles::cards_from_combined(&payload, query),
                Err(e) => {
                    warn!("profile search failed: {e}");
                    Platform::ALL
                        .iter()
                        .filter_map(|p| {
                            query
                                .identifier(*p)
                                .map(|id| ProfileCard::error(*p, id, e.to_string()))
                        })
                        .collect()
                }
            };
            cards.iter().map(ProfileCard::to_node).collect()
        };

        let mut state = self.state.lock().await;
        activate(&mut state, Section::Profiles);
        state.surface.replace(containers::PROFILE_RESULTS, nodes.clone());
        nodes
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Container renderers
// ────────────────────────────────────────────────────────────────────────────

fn activate(state: &mut DashboardState, section: Section) {
    state.active = section;
    render_nav(state);
}

fn render_nav(state: &mut DashboardState) {
    let active = state.active;
    let links = Section::ALL.iter().map(|s| {
        let class = if *s == active { "nav-link active" } else { "nav-link" };
        Element::new("li").child(
            Element::new("a")
                .class(class)
                .attr("href", format!("#{}", s.slug()))
                .text(s.title()),
        )
    });
    let nav = Element::new("ul").class("nav-links").children(links);
    state.surface.replace(containers::NAV, vec![nav.into()]);
}

fn render_selector(state: &mut DashboardState) {
    let selected = state.selected_student.as_deref();
    let mut select = Element::new("select")
        .id(containers::STUDENT_SELECTOR)
        .child(Element::new("option").attr("value", "").text("Select a student"));
    for student in &state.students {
        let mut option = Element::new("option").attr("value", student.enrollment_no.clone());
        if selected == Some(student.enrollment_no.as_str()) {
            option = option.attr("selected", "selected");
        }
        select = select.child(option.text(format!("{} ({})", student.name, student.enrollment_no)));
    }
    state
        .surface
        .replace(containers::STUDENT_SELECTOR, vec![select.into()]);
}

fn render_sessions(state: &mut DashboardState) {
    let nodes = chat::session_list(&state.chat_sessions, state.chat.id.as_deref());
    state.surface.replace(containers::CHAT_SESSIONS, nodes);
}

fn render_metrics(state: &mut DashboardState, counters: Counters) {
    let charts = metrics::chart_nodes(&state.charts);
    state.surface.replace(containers::DASHBOARD_CHARTS, charts);
    state
        .surface
        .replace(containers::DASHBOARD_COUNTERS, counters.to_nodes());
}
