use serde::{Deserialize, Serialize};

use crate::models::profile::CandidateProfile;

/// Position of a candidate in the assessment pipeline.
///
/// The linear path is `ProcessGuide → RoleSelection → Resume → TechnicalCoding
/// → Interview → Results`. `Profile` sits beside it and is reachable from anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentStage {
    #[default]
    ProcessGuide,
    Profile,
    RoleSelection,
    Resume,
    TechnicalCoding,
    Interview,
    Results,
}

/// Precondition that must hold before a stage may be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageGate {
    Open,
    ResumePassed,
    CodingPassed,
    InterviewPassed,
}

impl StageGate {
    pub fn is_satisfied(self, profile: &CandidateProfile) -> bool {
        match self {
            StageGate::Open => true,
            StageGate::ResumePassed => profile.is_resume_passed,
            StageGate::CodingPassed => profile.is_coding_passed,
            StageGate::InterviewPassed => profile.is_interview_passed,
        }
    }
}

impl AssessmentStage {
    pub const ALL: [AssessmentStage; 7] = [
        AssessmentStage::ProcessGuide,
        AssessmentStage::Profile,
        AssessmentStage::RoleSelection,
        AssessmentStage::Resume,
        AssessmentStage::TechnicalCoding,
        AssessmentStage::Interview,
        AssessmentStage::Results,
    ];

    pub fn gate(self) -> StageGate {
        match self {
            AssessmentStage::TechnicalCoding => StageGate::ResumePassed,
            AssessmentStage::Interview => StageGate::CodingPassed,
            AssessmentStage::Results => StageGate::InterviewPassed,
            AssessmentStage::ProcessGuide
            | AssessmentStage::Profile
            | AssessmentStage::RoleSelection
            | AssessmentStage::Resume => StageGate::Open,
        }
    }

    /// The stage a candidate moves to after passing this one.
    pub fn next(self) -> Option<AssessmentStage> {
        match self {
            AssessmentStage::ProcessGuide => Some(AssessmentStage::RoleSelection),
            AssessmentStage::RoleSelection => Some(AssessmentStage::Resume),
            AssessmentStage::Resume => Some(AssessmentStage::TechnicalCoding),
            AssessmentStage::TechnicalCoding => Some(AssessmentStage::Interview),
            AssessmentStage::Interview => Some(AssessmentStage::Results),
            AssessmentStage::Results | AssessmentStage::Profile => None,
        }
    }

    /// Timed stages watched by the integrity tracker.
    pub fn is_proctored(self) -> bool {
        matches!(
            self,
            AssessmentStage::TechnicalCoding | AssessmentStage::Interview
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentStage::ProcessGuide => "PROCESS_GUIDE",
            AssessmentStage::Profile => "PROFILE",
            AssessmentStage::RoleSelection => "ROLE_SELECTION",
            AssessmentStage::Resume => "RESUME",
            AssessmentStage::TechnicalCoding => "TECHNICAL_CODING",
            AssessmentStage::Interview => "INTERVIEW",
            AssessmentStage::Results => "RESULTS",
        }
    }

    /// Every stage whose gate the profile currently satisfies.
    pub fn unlocked_for(profile: &CandidateProfile) -> Vec<AssessmentStage> {
        Self::ALL
            .into_iter()
            .filter(|s| s.gate().is_satisfied(profile))
            .collect()
    }
}

impl std::fmt::Display for AssessmentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match_stored_documents() {
        for stage in AssessmentStage::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
            let back: AssessmentStage = serde_json::from_str(&json).unwrap();
            assert_eq!(back, stage);
        }
    }

    #[test]
    fn test_only_three_stages_are_gated() {
        let gated: Vec<_> = AssessmentStage::ALL
            .into_iter()
            .filter(|s| s.gate() != StageGate::Open)
            .collect();
        assert_eq!(
            gated,
            vec![
                AssessmentStage::TechnicalCoding,
                AssessmentStage::Interview,
                AssessmentStage::Results
            ]
        );
    }

    #[test]
    fn test_linear_order() {
        let mut stage = AssessmentStage::ProcessGuide;
        let mut path = vec![stage];
        while let Some(next) = stage.next() {
            path.push(next);
            stage = next;
        }
        assert_eq!(path.len(), 6);
        assert_eq!(path.last(), Some(&AssessmentStage::Results));
        assert!(!path.contains(&AssessmentStage::Profile));
    }

    #[test]
    fn test_unlocked_follows_flags() {
        let mut profile = CandidateProfile::new_candidate();
        let unlocked = AssessmentStage::unlocked_for(&profile);
        assert_eq!(unlocked.len(), 4);
        assert!(!unlocked.contains(&AssessmentStage::TechnicalCoding));

        profile.is_resume_passed = true;
        profile.is_coding_passed = true;
        let unlocked = AssessmentStage::unlocked_for(&profile);
        assert!(unlocked.contains(&AssessmentStage::Interview));
        assert!(!unlocked.contains(&AssessmentStage::Results));
    }

    #[test]
    fn test_proctored_stages() {
        assert!(AssessmentStage::TechnicalCoding.is_proctored());
        assert!(AssessmentStage::Interview.is_proctored());
        assert!(!AssessmentStage::Resume.is_proctored());
    }
}
