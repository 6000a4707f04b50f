//! Academic (IPU) record card.
//!
//! Only semesters with a positive SGPA count as completed; everything below is
//! derived from that filtered, `result_no`-ordered list.

use serde_json::Value;

use super::fields::{value_text, Fields};
use super::widgets::{two_decimals, TagCloud, TAG_CLOUD_CAP};
use super::{
    Avatar, AvatarFallback, CardView, Detail, Platform, ProfileCard, ProfileHeader, Section,
    SectionBody, Stat,
};
use crate::view::{Element, Node};

const IMAGE_BASE: &str = "https://ipuranklist.com/student_images";
const DSA_PAPER_CODES: [&str; 2] = ["AIDS303", "AIDS353"];
const DSA_SUBJECT_NAME: &str = "design and analysis of algorithms";

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectResult {
    pub subject_id: Option<String>,
    pub name: String,
    pub total_marks: String,
    pub max_marks: String,
    pub grade: String,
    pub minor: Option<String>,
    pub major: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemesterResult {
    pub result_no: i64,
    pub sgpa: f64,
    pub percentage: Option<f64>,
    pub subjects: Vec<SubjectResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcademicRecord {
    pub name: String,
    pub enrollment: String,
    pub image: Option<String>,
    pub programme: Option<String>,
    pub institute: Option<String>,
    pub course: Option<String>,
    pub cgpa: Option<f64>,
    /// Completed semesters (SGPA > 0), ascending by `result_no`.
    pub semesters: Vec<SemesterResult>,
    pub dsa: Option<SubjectResult>,
}

impl AcademicRecord {
    pub fn latest(&self) -> Option<&SemesterResult> {
        self.semesters.last()
    }

    /// Grade counts across every completed semester, in encounter order.
    pub fn grade_distribution(&self) -> Vec<(String, i64)> {
        let mut counts: Vec<(String, i64)> = Vec::new();
        for subject in self.semesters.iter().flat_map(|s| &s.subjects) {
            match counts.iter_mut().find(|(g, _)| *g == subject.grade) {
                Some((_, n)) => *n += 1,
                None => counts.push((subject.grade.clone(), 1)),
            }
        }
        counts
    }
}

fn subject_result(s: &Value) -> SubjectResult {
    let max_marks = s
        .f64_field("max_credits")
        .map(|c| ((c * 100.0).round() as i64).to_string())
        .unwrap_or_else(|| "N/A".to_string());
    SubjectResult {
        subject_id: s.text_field("subject_id"),
        name: s
            .str_field("subject_name")
            .unwrap_or("Unknown Subject")
            .to_string(),
        total_marks: s.text_field("total_marks").unwrap_or_else(|| "N/A".to_string()),
        max_marks,
        grade: s.str_field("grade").unwrap_or("N/A").to_string(),
        minor: s.get("minor").and_then(value_text),
        major: s.get("major").and_then(value_text),
    }
}

pub fn normalize(data: &Value, identifier: &str) -> AcademicRecord {
    let mut semesters: Vec<SemesterResult> = data
        .array_field("results")
        .iter()
        .filter_map(|r| {
            let sgpa = r.f64_field("sgpa").filter(|s| *s > 0.0)?;
            Some(SemesterResult {
                result_no: r.i64_field("result_no").unwrap_or(0),
                sgpa,
                percentage: r.f64_field("percentage"),
                subjects: r.array_field("subject_results").iter().map(subject_result).collect(),
            })
        })
        .collect();
    semesters.sort_by_key(|s| s.result_no);

    let dsa = data
        .array_field("subjects")
        .iter()
        .find(|s| {
            let by_name = s
                .str_field("name")
                .map(|n| n.to_lowercase().contains(DSA_SUBJECT_NAME))
                .unwrap_or(false);
            let by_code = s
                .str_field("paper_code")
                .map(|c| DSA_PAPER_CODES.contains(&c))
                .unwrap_or(false);
            by_name || by_code
        })
        .and_then(|s| s.text_field("_id"))
        .and_then(|id| {
            semesters
                .iter()
                .flat_map(|sem| &sem.subjects)
                .find(|r| r.subject_id.as_deref() == Some(id.as_str()))
                .cloned()
        });

    let programme = data.nested("programme");
    AcademicRecord {
        name: data.str_field("name").unwrap_or("Student").to_string(),
        enrollment: data
            .text_field("enrollment_no")
            .unwrap_or_else(|| identifier.to_string()),
        image: data.str_field("img").map(str::to_string),
        programme: programme
            .and_then(|p| p.str_field("branch_name"))
            .map(str::to_string),
        institute: data
            .nested("institute")
            .and_then(|i| i.str_field("insti_name"))
            .map(str::to_string),
        course: programme
            .and_then(|p| p.str_field("course_name"))
            .map(str::to_string),
        cgpa: data.f64_field("cgpa").filter(|c| *c > 0.0),
        semesters,
        dsa,
    }
}

pub fn render(data: Option<&Value>, identifier: &str) -> ProfileCard {
    match data.filter(|d| d.is_object()) {
        Some(data) => card(&normalize(data, identifier)),
        None => ProfileCard::missing(Platform::Academic, identifier),
    }
}

fn decimals_or_na(value: Option<f64>) -> String {
    value.map(two_decimals).unwrap_or_else(|| "N/A".to_string())
}

pub fn card(r: &AcademicRecord) -> ProfileCard {
    let details = [
        ("Program", &r.programme),
        ("Institute", &r.institute),
        ("Course", &r.course),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| Detail::labeled(label, v.clone())))
    .collect();

    let header = ProfileHeader {
        avatar: r.image.as_ref().map(|img| Avatar {
            src: format!("{IMAGE_BASE}/{img}.jpg"),
            fallback: AvatarFallback::Hide,
        }),
        display_name: r.name.clone(),
        handle: format!("Enrollment: {}", r.enrollment),
        details,
    };

    let latest = r.latest();
    let stats = vec![
        Stat::new("Latest SGPA", decimals_or_na(latest.map(|s| s.sgpa))),
        Stat::new(
            "Percentage",
            match latest.and_then(|s| s.percentage) {
                Some(p) => format!("{}%", two_decimals(p)),
                None => "N/A".to_string(),
            },
        ),
        Stat::new("Completed Semesters", r.semesters.len().to_string()),
        Stat::new(
            "Current Sem",
            latest
                .map(|s| s.result_no.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        Stat::new("Overall CGPA", decimals_or_na(r.cgpa)),
    ];

    let mut sections = Vec::new();

    if !r.semesters.is_empty() {
        let history = r
            .semesters
            .iter()
            .map(|s| {
                let percentage = decimals_or_na(s.percentage);
                Element::new("span")
                    .child(Element::new("strong").text(format!("Semester {}:", s.result_no)))
                    .text(format!(
                        " SGPA: {} | Percentage: {percentage}%",
                        two_decimals(s.sgpa)
                    ))
                    .into()
            })
            .collect();
        sections.push(Section::new("Academic History", SectionBody::List(history)));
    }

    for semester in r.semesters.iter().filter(|s| !s.subjects.is_empty()) {
        let items = semester.subjects.iter().map(subject_item).collect();
        sections.push(Section::new(
            format!("Semester {} Subjects", semester.result_no),
            SectionBody::List(items),
        ));
    }

    let grades = r.grade_distribution();
    if !grades.is_empty() {
        sections.push(Section::new(
            "Grade Distribution",
            SectionBody::Tags(TagCloud::by_count(grades, TAG_CLOUD_CAP)),
        ));
    }

    if let Some(dsa) = &r.dsa {
        let na = || "N/A".to_string();
        sections.push(Section::new(
            "DSA Course Performance",
            SectionBody::Stats(vec![
                Stat::new("Total Marks", dsa.total_marks.clone()),
                Stat::new("Grade", dsa.grade.clone()),
                Stat::new("Minor Exam", dsa.minor.clone().unwrap_or_else(na)),
                Stat::new("Major Exam", dsa.major.clone().unwrap_or_else(na)),
            ]),
        ));
    }

    ProfileCard {
        platform: Platform::Academic,
        view: CardView::Profile {
            header,
            stats,
            sections,
        },
    }
}

fn subject_item(subject: &SubjectResult) -> Node {
    let mut item = Element::new("span")
        .child(Element::new("strong").text(format!("{}:", subject.name)))
        .text(format!(" {}/{} ", subject.total_marks, subject.max_marks))
        .child(Element::new("span").class("tag").text(&subject.grade));
    if let (Some(minor), Some(major)) = (&subject.minor, &subject.major) {
        item = item.child(
            Element::new("div")
                .class("subject-breakdown")
                .text(format!("Minor: {minor}/25 | Major: {major}/75")),
        );
    }
    item.into()
}
