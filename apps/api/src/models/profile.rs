use serde::{Deserialize, Serialize};

use crate::pipeline::stage::AssessmentStage;

/// Display name given to a profile created on first sign-in.
pub const NEW_CANDIDATE_NAME: &str = "New Candidate";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A citation returned by a search-grounded AI call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// The literal code a candidate submitted for one challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingSolution {
    pub challenge_title: String,
    pub code: String,
    pub topic: String,
}

/// Result of the coding stage. Replaced wholesale on retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalScore {
    pub score: f64,
    pub total: f64,
    pub feedback: String,
    pub integrity_violations: u32,
    #[serde(default)]
    pub solutions: Vec<CodingSolution>,
}

/// Result of the interview stage. Replaced wholesale on retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewEvaluation {
    pub clarity: f64,
    pub confidence: f64,
    pub sentiment: String,
    /// Ordered `"AI: ..."` / `"USER: ..."` lines.
    #[serde(default)]
    pub transcript: Vec<String>,
    pub feedback: String,
    pub integrity_violations: u32,
}

/// The whole candidate record. Stored as one JSON document keyed by user id.
///
/// Every field defaults so partially written documents still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub university: String,
    pub experience: String,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub work_experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certificates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_role: Option<String>,
    #[serde(rename = "targetJD", skip_serializing_if = "Option::is_none")]
    pub target_jd: Option<String>,
    pub current_stage: AssessmentStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_document_key: Option<String>,
    pub is_resume_passed: bool,
    pub is_coding_passed: bool,
    pub is_interview_passed: bool,
    pub technical_result: Option<TechnicalScore>,
    pub interview_result: Option<InterviewEvaluation>,
    pub grounding_sources: Vec<GroundingSource>,
}

impl CandidateProfile {
    /// The record created on a candidate's first sign-in.
    pub fn new_candidate() -> Self {
        Self {
            name: NEW_CANDIDATE_NAME.to_string(),
            current_stage: AssessmentStage::ProcessGuide,
            ..Self::default()
        }
    }

    pub fn role_or_default(&self) -> &str {
        self.selected_role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("Software Engineer")
    }

    pub fn target_jd_or_empty(&self) -> &str {
        self.target_jd.as_deref().unwrap_or("")
    }

    /// Integrity violations across both proctored stages.
    pub fn total_integrity_violations(&self) -> u32 {
        self.technical_result
            .as_ref()
            .map_or(0, |t| t.integrity_violations)
            + self
                .interview_result
                .as_ref()
                .map_or(0, |i| i.integrity_violations)
    }
}

/// Candidate-editable fields. Stage, pass flags and results are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub university: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<Vec<String>>,
    pub education: Option<Vec<EducationEntry>>,
    pub work_experience: Option<Vec<ExperienceEntry>>,
    pub projects: Option<Vec<ProjectEntry>>,
    pub certificates: Option<Vec<String>>,
    pub avatar_url: Option<String>,
}

impl ProfileEdit {
    pub fn apply_to(self, profile: &mut CandidateProfile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(email) = self.email {
            profile.email = email;
        }
        if let Some(university) = self.university {
            profile.university = university;
        }
        if let Some(experience) = self.experience {
            profile.experience = experience;
        }
        if let Some(skills) = self.skills {
            profile.skills = dedup_skills(skills);
        }
        if let Some(education) = self.education {
            profile.education = education;
        }
        if let Some(work_experience) = self.work_experience {
            profile.work_experience = work_experience;
        }
        if let Some(projects) = self.projects {
            profile.projects = projects;
        }
        if let Some(certificates) = self.certificates {
            profile.certificates = certificates;
        }
        if let Some(avatar_url) = self.avatar_url {
            profile.avatar_url = Some(avatar_url).filter(|u| !u.trim().is_empty());
        }
    }
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping first-seen order.
pub fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_candidate_defaults() {
        let profile = CandidateProfile::new_candidate();
        assert_eq!(profile.name, NEW_CANDIDATE_NAME);
        assert_eq!(profile.current_stage, AssessmentStage::ProcessGuide);
        assert!(!profile.is_resume_passed);
        assert!(!profile.is_coding_passed);
        assert!(!profile.is_interview_passed);
        assert!(profile.technical_result.is_none());
    }

    #[test]
    fn test_profile_uses_camel_case_field_names() {
        let mut profile = CandidateProfile::new_candidate();
        profile.target_jd = Some("Build APIs".to_string());
        profile.is_resume_passed = true;
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["targetJD"], "Build APIs");
        assert_eq!(json["isResumePassed"], true);
        assert_eq!(json["currentStage"], "PROCESS_GUIDE");
        assert!(json.get("workExperience").is_some());
    }

    #[test]
    fn test_partial_document_loads_with_defaults() {
        let json = r#"{"name": "Asha", "currentStage": "RESUME", "isResumePassed": true}"#;
        let profile: CandidateProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.current_stage, AssessmentStage::Resume);
        assert!(profile.is_resume_passed);
        assert!(profile.skills.is_empty());
        assert!(profile.interview_result.is_none());
    }

    #[test]
    fn test_edit_never_touches_flags_or_stage() {
        let mut profile = CandidateProfile::new_candidate();
        profile.is_coding_passed = true;
        profile.current_stage = AssessmentStage::Interview;

        ProfileEdit {
            name: Some("Ravi".to_string()),
            skills: Some(vec!["Rust".to_string()]),
            ..ProfileEdit::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.name, "Ravi");
        assert_eq!(profile.skills, vec!["Rust"]);
        assert!(profile.is_coding_passed);
        assert_eq!(profile.current_stage, AssessmentStage::Interview);
    }

    #[test]
    fn test_dedup_skills_preserves_order() {
        let skills = vec![
            "React".to_string(),
            " node.js ".to_string(),
            "react".to_string(),
            "".to_string(),
            "SQL".to_string(),
        ];
        assert_eq!(dedup_skills(skills), vec!["React", "node.js", "SQL"]);
    }

    #[test]
    fn test_total_integrity_violations_sums_both_stages() {
        let mut profile = CandidateProfile::new_candidate();
        assert_eq!(profile.total_integrity_violations(), 0);
        profile.technical_result = Some(TechnicalScore {
            score: 70.0,
            total: 100.0,
            feedback: String::new(),
            integrity_violations: 2,
            solutions: vec![],
        });
        profile.interview_result = Some(InterviewEvaluation {
            clarity: 80.0,
            confidence: 75.0,
            sentiment: "Positive".to_string(),
            transcript: vec![],
            feedback: String::new(),
            integrity_violations: 1,
        });
        assert_eq!(profile.total_integrity_violations(), 3);
    }
}
