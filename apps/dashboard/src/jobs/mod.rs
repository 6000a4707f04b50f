//! Job listings: the static catalog split into recommended and other postings,
//! the posting detail view and tailored resume generation.

pub mod catalog;
pub mod recommend;
pub mod resume;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::backend::{Backend, BackendError, ResumeRequest};
use crate::view::{Element, Node};

use self::catalog::JobPosting;
use self::recommend::StudentSkillProfile;
use self::resume::TailoredResume;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    OnCampus,
    OffCampus,
}

impl Category {
    pub fn slug(self) -> &'static str {
        match self {
            Category::OnCampus => "on-campus",
            Category::OffCampus => "off-campus",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown job category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "on-campus" | "oncampus" => Ok(Category::OnCampus),
            "off-campus" | "offcampus" => Ok(Category::OffCampus),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum JobsError {
    #[error("Job posting {0} not found")]
    UnknownPosting(u32),

    #[error("Please select a student first.")]
    NoStudent,

    #[error("Error generating resume: {0}")]
    Generation(String),

    #[error("An error occurred while generating the resume.")]
    Backend(#[source] BackendError),

    #[error("No resume has been generated for posting {0}")]
    NoResume(u32),
}

impl From<BackendError> for JobsError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Reported(message) => JobsError::Generation(message),
            other => JobsError::Backend(other),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Listings
// ────────────────────────────────────────────────────────────────────────────

pub fn job_card(posting: &JobPosting, recommended: bool) -> Node {
    let skills = posting.required_skills.join(", ");
    let (card_class, skills_class, skills_text, apply_class) = if recommended {
        (
            "job-card recommended",
            "aligns-with",
            format!("Aligns with: {skills}"),
            "btn btn-primary apply-btn",
        )
    } else {
        (
            "job-card non-recommended",
            "mismatch",
            format!("Requires: {skills}"),
            "btn btn-secondary apply-btn",
        )
    };
    let detail = format!("/jobs/posting/{}", posting.id);

    Element::new("div")
        .class(card_class)
        .attr("data-job-id", posting.id.to_string())
        .child(Element::new("h4").text(posting.title))
        .child(Element::new("p").class("company").text(posting.company))
        .child(Element::new("p").class("location").text(posting.location))
        .child(
            Element::new("p")
                .class("salary-preview")
                .text(posting.salary.unwrap_or("Salary not disclosed")),
        )
        .child(Element::new("p").class(skills_class).text(skills_text))
        .child(
            Element::new("div")
                .class("card-actions")
                .child(
                    Element::new("a")
                        .class("btn btn-outline view-details-btn")
                        .attr("href", detail.clone())
                        .text("View Details"),
                )
                .child(Element::new("a").class(apply_class).attr("href", detail).text("Apply")),
        )
        .into()
}

/// One category's postings, recommended first.
pub fn load_category(category: Category, profile: &StudentSkillProfile) -> Vec<Node> {
    let (recommended, others): (Vec<&JobPosting>, Vec<&JobPosting>) =
        catalog::in_category(category).partition(|p| profile.recommends(p));
    let slug = category.slug();

    let listing = |id: String, postings: &[&JobPosting], flag: bool| {
        Element::new("div")
            .class("job-listings")
            .id(id)
            .children(postings.iter().map(|p| job_card(p, flag)))
    };

    vec![Element::new("div")
        .class("job-category-section")
        .attr("data-category", slug)
        .child(Element::new("h3").text("Recommended for You"))
        .child(listing(format!("{slug}-recommended-listings"), &recommended, true))
        .child(Element::new("h3").text("Other Opportunities"))
        .child(listing(format!("{slug}-non-recommended-listings"), &others, false))
        .into()]
}

fn detail_list(id: &str, items: &[&str]) -> Element {
    let list = Element::new("ul").id(id.to_string());
    if items.is_empty() {
        return list.child(Element::new("li").text("Not specified"));
    }
    list.children(items.iter().map(|item| Element::new("li").text(*item)))
}

/// Detail view with the apply action.
pub fn posting_detail(posting: &JobPosting) -> Node {
    let section = |title: &str, id: &str, items: &[&str]| {
        Element::new("div")
            .class("apply-section")
            .child(Element::new("h4").text(title.to_string()))
            .child(detail_list(id, items))
    };

    Element::new("div")
        .class("modal")
        .id("apply-modal")
        .attr("data-job-id", posting.id.to_string())
        .child(
            Element::new("div")
                .class("modal-content")
                .child(Element::new("h3").id("apply-role").text(posting.title))
                .child(Element::new("p").id("apply-company").text(posting.company))
                .child(
                    Element::new("p")
                        .id("apply-salary")
                        .text(posting.salary.unwrap_or("Competitive Salary")),
                )
                .child(Element::new("p").id("apply-description").text(posting.description))
                .child(section(
                    "Responsibilities",
                    "apply-responsibilities",
                    posting.responsibilities,
                ))
                .child(section("Requirements", "apply-requirements", posting.requirements))
                .child(section("Benefits", "apply-benefits", posting.benefits))
                .child(
                    Element::new("form")
                        .attr("method", "post")
                        .attr("action", format!("/jobs/posting/{}/resume", posting.id))
                        .child(
                            Element::new("button")
                                .class("btn btn-primary")
                                .id("generate-resume-btn")
                                .text("Generate Best Fit Resume & Apply"),
                        ),
                ),
        )
        .into()
}

pub fn open_posting(id: u32) -> Result<Node, JobsError> {
    catalog::find(id)
        .map(posting_detail)
        .ok_or(JobsError::UnknownPosting(id))
}

// ────────────────────────────────────────────────────────────────────────────
// Board
// ────────────────────────────────────────────────────────────────────────────

/// Listings bound to a skill profile, plus the last resume generated per posting.
pub struct JobBoard {
    backend: Arc<dyn Backend>,
    profile: StudentSkillProfile,
    resumes: Mutex<HashMap<u32, TailoredResume>>,
}

impl JobBoard {
    pub fn new(backend: Arc<dyn Backend>, profile: StudentSkillProfile) -> Self {
        Self {
            backend,
            profile,
            resumes: Mutex::new(HashMap::new()),
        }
    }

    pub fn load_category(&self, category: Category) -> Vec<Node> {
        load_category(category, &self.profile)
    }

    /// Generates a resume tailored to `posting_id` and returns its modal.
    pub async fn generate_resume(
        &self,
        posting_id: u32,
        enrollment_no: &str,
    ) -> Result<Node, JobsError> {
        let posting = catalog::find(posting_id).ok_or(JobsError::UnknownPosting(posting_id))?;
        let enrollment_no = enrollment_no.trim();
        if enrollment_no.is_empty() {
            return Err(JobsError::NoStudent);
        }

        let request = ResumeRequest {
            enrollment_no: enrollment_no.to_string(),
            job_description: posting.description.to_string(),
            company: posting.company.to_string(),
            role: posting.title.to_string(),
        };
        let markdown = self.backend.generate_resume(&request).await.map_err(|e| {
            warn!(posting_id, "resume generation failed: {e}");
            JobsError::from(e)
        })?;
        info!(posting_id, enrollment_no, "tailored resume generated");

        let resume = TailoredResume {
            posting_id,
            company: posting.company.to_string(),
            markdown,
        };
        let modal = resume.modal();
        self.resumes.lock().await.insert(posting_id, resume);
        Ok(modal)
    }

    pub async fn download(&self, posting_id: u32) -> Result<TailoredResume, JobsError> {
        self.resumes
            .lock()
            .await
            .get(&posting_id)
            .cloned()
            .ok_or(JobsError::NoResume(posting_id))
    }

    pub async fn resume_history(&self, enrollment_no: &str) -> Result<Vec<Node>, JobsError> {
        let enrollment_no = enrollment_no.trim();
        if enrollment_no.is_empty() {
            return Err(JobsError::NoStudent);
        }
        match self.backend.resume_history(enrollment_no).await {
            Ok(resumes) => Ok(resume::history_nodes(&resumes)),
            Err(e) => {
                warn!("Error fetching resume history: {e}");
                Ok(resume::history_error())
            }
        }
    }
}
