use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::profile::CandidateProfile;
use crate::pipeline::stage::AssessmentStage;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatePasses {
    pub resume: usize,
    pub coding: usize,
    pub interview: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedCandidate {
    pub user_id: Uuid,
    pub name: String,
    pub integrity_violations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub total_candidates: usize,
    /// Every stage is listed, including those with no candidates.
    pub by_stage: BTreeMap<&'static str, usize>,
    pub passed: GatePasses,
    pub mean_resume_score: Option<f64>,
    pub mean_coding_score: Option<f64>,
    /// Candidates with at least one violation, most violations first.
    pub flagged: Vec<FlaggedCandidate>,
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

pub fn summarize(profiles: &[(Uuid, CandidateProfile)]) -> AdminSummary {
    let mut by_stage: BTreeMap<&'static str, usize> =
        AssessmentStage::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    let mut passed = GatePasses::default();
    let mut resume_scores = Vec::new();
    let mut coding_scores = Vec::new();
    let mut flagged = Vec::new();

    for (user_id, profile) in profiles {
        *by_stage.entry(profile.current_stage.as_str()).or_default() += 1;

        passed.resume += usize::from(profile.is_resume_passed);
        passed.coding += usize::from(profile.is_coding_passed);
        passed.interview += usize::from(profile.is_interview_passed);

        if let Some(score) = profile.resume_score {
            resume_scores.push(score);
        }
        if let Some(technical) = &profile.technical_result {
            coding_scores.push(technical.score);
        }

        let violations = profile.total_integrity_violations();
        if violations > 0 {
            flagged.push(FlaggedCandidate {
                user_id: *user_id,
                name: profile.name.clone(),
                integrity_violations: violations,
            });
        }
    }

    flagged.sort_by(|a, b| {
        b.integrity_violations
            .cmp(&a.integrity_violations)
            .then_with(|| a.name.cmp(&b.name))
    });

    AdminSummary {
        total_candidates: profiles.len(),
        by_stage,
        passed,
        mean_resume_score: mean(&resume_scores),
        mean_coding_score: mean(&coding_scores),
        flagged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{InterviewEvaluation, TechnicalScore};

    fn candidate(name: &str, stage: AssessmentStage) -> CandidateProfile {
        let mut profile = CandidateProfile::new_candidate();
        profile.name = name.to_string();
        profile.current_stage = stage;
        profile
    }

    fn technical(score: f64, violations: u32) -> TechnicalScore {
        TechnicalScore {
            score,
            total: 100.0,
            feedback: String::new(),
            integrity_violations: violations,
            solutions: vec![],
        }
    }

    #[test]
    fn test_empty_cohort() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_candidates, 0);
        assert_eq!(summary.by_stage.len(), AssessmentStage::ALL.len());
        assert!(summary.by_stage.values().all(|&n| n == 0));
        assert_eq!(summary.mean_resume_score, None);
        assert!(summary.flagged.is_empty());
    }

    #[test]
    fn test_aggregates_cohort() {
        let fresh = candidate("Fresh", AssessmentStage::ProcessGuide);

        let mut coder = candidate("Coder", AssessmentStage::TechnicalCoding);
        coder.resume_score = Some(72.0);
        coder.is_resume_passed = true;
        coder.technical_result = Some(technical(40.0, 1));

        let mut finisher = candidate("Finisher", AssessmentStage::Results);
        finisher.resume_score = Some(90.0);
        finisher.is_resume_passed = true;
        finisher.is_coding_passed = true;
        finisher.is_interview_passed = true;
        finisher.technical_result = Some(technical(80.0, 2));
        finisher.interview_result = Some(InterviewEvaluation {
            clarity: 80.0,
            confidence: 75.0,
            sentiment: "Positive".to_string(),
            transcript: vec![],
            feedback: String::new(),
            integrity_violations: 1,
        });

        let profiles = vec![
            (Uuid::new_v4(), fresh),
            (Uuid::new_v4(), coder),
            (Uuid::new_v4(), finisher),
        ];
        let summary = summarize(&profiles);

        assert_eq!(summary.total_candidates, 3);
        assert_eq!(summary.by_stage["PROCESS_GUIDE"], 1);
        assert_eq!(summary.by_stage["TECHNICAL_CODING"], 1);
        assert_eq!(summary.by_stage["RESULTS"], 1);
        assert_eq!(summary.by_stage["INTERVIEW"], 0);
        assert_eq!(
            summary.passed,
            GatePasses {
                resume: 2,
                coding: 1,
                interview: 1
            }
        );
        assert_eq!(summary.mean_resume_score, Some(81.0));
        assert_eq!(summary.mean_coding_score, Some(60.0));
        assert_eq!(summary.flagged.len(), 2);
        assert_eq!(summary.flagged[0].name, "Finisher");
        assert_eq!(summary.flagged[0].integrity_violations, 3);
    }
}
