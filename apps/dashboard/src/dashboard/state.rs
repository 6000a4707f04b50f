//! The controller's owned client state.
//!
//! Everything the page depends on between actions lives here: the active section,
//! the student list and selection, the open chat session, chart and pan/zoom
//! handles, and the rendered page surface.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::charts::ChartRegistry;
use super::diagrams::PanZoomRegistry;
use crate::backend::models::Sender;
use crate::backend::{ChatSessionSummary, StudentSummary};
use crate::view::PageSurface;

/// Surface container names.
pub mod containers {
    pub const NAV: &str = "nav";
    pub const STUDENT_SELECTOR: &str = "student-selector";
    pub const LOADING: &str = "loading-spinner";
    pub const REPORT: &str = "report-view";
    pub const REPORT_HISTORY: &str = "report-history";
    pub const JOB_ANALYSIS: &str = "job-analysis-view";
    pub const CHAT_HISTORY: &str = "chat-history";
    pub const CHAT_SESSIONS: &str = "chat-sessions";
    pub const DASHBOARD_CHARTS: &str = "dashboard-charts";
    pub const DASHBOARD_COUNTERS: &str = "dashboard-counters";
    pub const STUDENT_OVERVIEW: &str = "student-overview";
    pub const PROFILE_RESULTS: &str = "profile-results";

    /// Per-item flowchart containers in the action plan.
    pub const FLOWCHART_PREFIX: &str = "action-plan-flowchart-";

    pub fn flowchart(index: usize) -> String {
        format!("{FLOWCHART_PREFIX}{index}")
    }
}

/// Canvas ids.
pub mod canvases {
    pub const SKILLS: &str = "skills-chart-canvas";
    pub const DSA: &str = "dsa-chart-canvas";
    pub const JOB_MATCH: &str = "job-match-chart-canvas";
    pub const CGPA_TREND: &str = "cgpa-trend-canvas";

    pub const DASHBOARD: [&str; 3] = [SKILLS, DSA, JOB_MATCH];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Dashboard,
    Reports,
    JobAnalysis,
    Chat,
    JobListings,
    Profiles,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Dashboard,
        Section::Reports,
        Section::JobAnalysis,
        Section::Chat,
        Section::JobListings,
        Section::Profiles,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Reports => "reports",
            Section::JobAnalysis => "job-analysis",
            Section::Chat => "chat",
            Section::JobListings => "job-listings",
            Section::Profiles => "profiles",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Reports => "Reports",
            Section::JobAnalysis => "Job Analysis",
            Section::Chat => "Chat",
            Section::JobListings => "Job Listings",
            Section::Profiles => "Profiles",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().trim_start_matches('#').to_ascii_lowercase();
        Section::ALL
            .into_iter()
            .find(|section| section.slug() == slug || slug == section.slug().replace('-', "_"))
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request tickets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Students,
    Report,
    ReportHistory,
    JobAnalysis,
    Chat,
    ChatHistory,
    Metrics,
    Overview,
}

/// Issued when a request starts. A response is applied only while its ticket is
/// still the latest for that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: RequestKind,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct Generations {
    latest: HashMap<RequestKind, u64>,
}

impl Generations {
    pub fn issue(&mut self, kind: RequestKind) -> Ticket {
        let generation = self.latest.entry(kind).or_insert(0);
        *generation += 1;
        Ticket {
            kind,
            generation: *generation,
        }
    }

    /// The latest ticket for `kind` without superseding it.
    pub fn current(&self, kind: RequestKind) -> Ticket {
        Ticket {
            kind,
            generation: self.latest.get(&kind).copied().unwrap_or(0),
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current(ticket.kind) == ticket
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Chat
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    /// Whether `text` is markdown-lite output rendered as markup.
    pub markdown: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            markdown: false,
        }
    }

    pub fn ai(html: impl Into<String>) -> Self {
        Self {
            text: html.into(),
            sender: Sender::Ai,
            markdown: true,
        }
    }
}

/// The open conversation. `id` is `None` until the backend assigns one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    pub id: Option<String>,
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn is_blank(&self) -> bool {
        self.id.is_none() && self.messages.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// State
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct DashboardState {
    pub active: Section,
    pub students: Vec<StudentSummary>,
    pub selected_student: Option<String>,
    pub loading: bool,
    pub chat: ChatSession,
    pub chat_sessions: Vec<ChatSessionSummary>,
    pub charts: ChartRegistry,
    pub diagrams: PanZoomRegistry,
    /// Flowchart containers filled by the current report.
    pub flowchart_containers: Vec<String>,
    /// Sequence for pending chat requests, keys their "Thinking..." bubbles.
    pub chat_requests: u64,
    pub reports_generated: u64,
    pub job_analyses: u64,
    pub surface: PageSurface,
    pub generations: Generations,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            active: Section::Dashboard,
            students: Vec::new(),
            selected_student: None,
            loading: false,
            chat: ChatSession::default(),
            chat_sessions: Vec::new(),
            charts: ChartRegistry::new(),
            diagrams: PanZoomRegistry::new(),
            flowchart_containers: Vec::new(),
            chat_requests: 0,
            reports_generated: 0,
            job_analyses: 0,
            surface: PageSurface::new(),
            generations: Generations::default(),
        }
    }
}

impl DashboardState {
    pub fn issue(&mut self, kind: RequestKind) -> Ticket {
        self.generations.issue(kind)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generations.is_current(ticket)
    }

    /// Selector option text, `"{name} ({enrollment_no})"`, or the bare id when the
    /// student is not in the loaded list.
    pub fn student_label(&self, enrollment_no: &str) -> String {
        self.students
            .iter()
            .find(|s| s.enrollment_no == enrollment_no)
            .map(|s| format!("{} ({})", s.name, s.enrollment_no))
            .unwrap_or_else(|| enrollment_no.to_string())
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.surface.set_visible(containers::LOADING, loading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_parsing() {
        assert_eq!("job-analysis".parse::<Section>(), Ok(Section::JobAnalysis));
        assert_eq!("#Dashboard".parse::<Section>(), Ok(Section::Dashboard));
        assert_eq!("job_listings".parse::<Section>(), Ok(Section::JobListings));
        assert!("settings".parse::<Section>().is_err());
        for section in Section::ALL {
            assert_eq!(section.slug().parse::<Section>(), Ok(section));
        }
    }

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut generations = Generations::default();
        let first = generations.issue(RequestKind::Report);
        let second = generations.issue(RequestKind::Report);
        let other = generations.issue(RequestKind::Metrics);

        assert!(!generations.is_current(first));
        assert!(generations.is_current(second));
        assert!(generations.is_current(other));
        assert_eq!(generations.current(RequestKind::Chat).generation, 0);
    }

    #[test]
    fn test_student_label() {
        let mut state = DashboardState::default();
        state.students.push(StudentSummary {
            enrollment_no: "0101".into(),
            name: "Asha".into(),
        });
        assert_eq!(state.student_label("0101"), "Asha (0101)");
        assert_eq!(state.student_label("9999"), "9999");
    }
}
