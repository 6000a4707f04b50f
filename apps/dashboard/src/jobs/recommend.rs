//! Skill-overlap recommendation.

use super::catalog::JobPosting;

/// Minimum number of shared skills for a posting to count as recommended.
pub const RECOMMEND_THRESHOLD: usize = 2;

const SAMPLE_SKILLS: [&str; 9] = [
    "Python", "JavaScript", "React", "Node.js", "SQL", "DSA", "Git", "HTML", "CSS",
];

#[derive(Debug, Clone, PartialEq)]
pub struct StudentSkillProfile {
    pub skills: Vec<String>,
}

impl Default for StudentSkillProfile {
    fn default() -> Self {
        Self {
            skills: SAMPLE_SKILLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StudentSkillProfile {
    /// Comma-separated skill list. Blank entries are dropped; an empty list
    /// falls back to the built-in sample profile.
    pub fn from_list(list: &str) -> Self {
        let skills: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if skills.is_empty() {
            Self::default()
        } else {
            Self { skills }
        }
    }

    /// Required skills of `posting` the student has, compared case-insensitively.
    pub fn matching<'a>(&self, posting: &'a JobPosting) -> Vec<&'a str> {
        let known: Vec<String> = self.skills.iter().map(|s| s.to_lowercase()).collect();
        posting
            .required_skills
            .iter()
            .copied()
            .filter(|skill| known.contains(&skill.to_lowercase()))
            .collect()
    }

    pub fn recommends(&self, posting: &JobPosting) -> bool {
        self.matching(posting).len() >= RECOMMEND_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::catalog;

    fn profile() -> StudentSkillProfile {
        StudentSkillProfile::from_list("python, sql,Docker")
    }

    #[test]
    fn test_threshold_is_two_shared_skills() {
        let profile = profile();
        // Python + SQL
        assert!(profile.recommends(catalog::find(2).unwrap()));
        // Python only
        assert!(!profile.recommends(catalog::find(1).unwrap()));
        // Docker only
        assert!(!profile.recommends(catalog::find(8).unwrap()));

        let wider = StudentSkillProfile::from_list("sql, docker, node.js");
        assert!(wider.recommends(catalog::find(6).unwrap()));
        assert!(wider.recommends(catalog::find(8).unwrap()));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let matched = profile().matching(catalog::find(2).unwrap());
        assert_eq!(matched, vec!["Python", "SQL"]);
    }

    #[test]
    fn test_empty_list_falls_back_to_sample() {
        assert_eq!(StudentSkillProfile::from_list(" , "), StudentSkillProfile::default());
        let sample = StudentSkillProfile::default();
        assert!(sample.recommends(catalog::find(1).unwrap()));
        assert!(!sample.recommends(catalog::find(9).unwrap()));
    }
}
