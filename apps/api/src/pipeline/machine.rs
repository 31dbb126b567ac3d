//! The assessment pipeline state machine.
//!
//! `Pipeline` owns a candidate's profile and accepts typed [`Command`]s. It never
//! touches storage; `PipelineController` persists after each applied command.

use serde::Serialize;
use thiserror::Error;

use crate::models::assessment::ResumeAnalysis;
use crate::models::profile::{
    dedup_skills, CandidateProfile, GroundingSource, InterviewEvaluation, ProfileEdit,
    TechnicalScore,
};
use crate::pipeline::gates::{coding_passes, resume_passes};
use crate::pipeline::stage::{AssessmentStage, StageGate};

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("{command} can only be recorded at stage {expected}, candidate is at {actual}")]
    WrongStage {
        command: &'static str,
        expected: AssessmentStage,
        actual: AssessmentStage,
    },
}

/// A scored resume plus the document metadata it came from.
#[derive(Debug, Clone)]
pub struct ResumeOutcome {
    pub analysis: ResumeAnalysis,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub document_key: Option<String>,
    pub grounding_sources: Vec<GroundingSource>,
}

impl ResumeOutcome {
    pub fn from_analysis(analysis: ResumeAnalysis) -> Self {
        Self {
            analysis,
            file_name: None,
            file_type: None,
            document_key: None,
            grounding_sources: vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Advance(AssessmentStage),
    SelectRole { role: String, target_jd: String },
    RecordResume(ResumeOutcome),
    RecordCoding(TechnicalScore),
    RecordInterview(InterviewEvaluation),
    EditProfile(ProfileEdit),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Advance(_) => "advance",
            Command::SelectRole { .. } => "select_role",
            Command::RecordResume(_) => "record_resume",
            Command::RecordCoding(_) => "record_coding",
            Command::RecordInterview(_) => "record_interview",
            Command::EditProfile(_) => "edit_profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Moved {
        from: AssessmentStage,
        to: AssessmentStage,
    },
    Stayed {
        stage: AssessmentStage,
    },
    Denied {
        target: AssessmentStage,
        gate: StageGate,
    },
}

/// What applying one command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub transition: Transition,
    /// Pass/fail of a recorded stage result; `None` for other commands.
    pub passed: Option<bool>,
    /// Whether the profile changed and must be persisted.
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    profile: CandidateProfile,
}

impl Pipeline {
    /// Re-hydrates the machine at the profile's stored stage.
    pub fn from_profile(profile: CandidateProfile) -> Self {
        Self { profile }
    }

    pub fn stage(&self) -> AssessmentStage {
        self.profile.current_stage
    }

    pub fn profile(&self) -> &CandidateProfile {
        &self.profile
    }

    pub fn into_profile(self) -> CandidateProfile {
        self.profile
    }

    pub fn apply(&mut self, command: Command) -> Result<Applied, PipelineError> {
        match command {
            Command::Advance(target) => {
                let transition = self.advance(target);
                Ok(Applied {
                    transition,
                    passed: None,
                    changed: matches!(transition, Transition::Moved { .. }),
                })
            }
            Command::SelectRole { role, target_jd } => {
                self.profile.selected_role = Some(role);
                self.profile.target_jd = Some(target_jd);
                Ok(Applied {
                    transition: self.advance(AssessmentStage::Resume),
                    passed: None,
                    changed: true,
                })
            }
            Command::RecordResume(outcome) => {
                self.expect_stage("record_resume", AssessmentStage::Resume)?;
                let passed = resume_passes(outcome.analysis.resume_score);
                self.write_resume(outcome, passed);
                Ok(self.after_record(passed))
            }
            Command::RecordCoding(result) => {
                self.expect_stage("record_coding", AssessmentStage::TechnicalCoding)?;
                let passed = coding_passes(result.score);
                self.profile.is_coding_passed = passed;
                self.profile.technical_result = Some(result);
                Ok(self.after_record(passed))
            }
            Command::RecordInterview(evaluation) => {
                self.expect_stage("record_interview", AssessmentStage::Interview)?;
                // Any completed interview passes; scores only feed the readiness report.
                self.profile.is_interview_passed = true;
                self.profile.interview_result = Some(evaluation);
                Ok(self.after_record(true))
            }
            Command::EditProfile(edit) => {
                edit.apply_to(&mut self.profile);
                Ok(Applied {
                    transition: Transition::Stayed { stage: self.stage() },
                    passed: None,
                    changed: true,
                })
            }
        }
    }

    fn advance(&mut self, target: AssessmentStage) -> Transition {
        let from = self.stage();
        if from == target {
            return Transition::Stayed { stage: from };
        }
        let gate = target.gate();
        if !gate.is_satisfied(&self.profile) {
            return Transition::Denied { target, gate };
        }
        self.profile.current_stage = target;
        Transition::Moved { from, to: target }
    }

    /// Failed stages keep the candidate in place for a retry.
    fn after_record(&mut self, passed: bool) -> Applied {
        let stage = self.stage();
        let transition = match stage.next() {
            Some(next) if passed => self.advance(next),
            _ => Transition::Stayed { stage },
        };
        Applied {
            transition,
            passed: Some(passed),
            changed: true,
        }
    }

    fn expect_stage(
        &self,
        command: &'static str,
        expected: AssessmentStage,
    ) -> Result<(), PipelineError> {
        if self.stage() == expected {
            Ok(())
        } else {
            Err(PipelineError::WrongStage {
                command,
                expected,
                actual: self.stage(),
            })
        }
    }

    fn write_resume(&mut self, outcome: ResumeOutcome, passed: bool) {
        let ResumeOutcome {
            analysis,
            file_name,
            file_type,
            document_key,
            grounding_sources,
        } = outcome;
        let profile = &mut self.profile;

        if !analysis.name.trim().is_empty() {
            profile.name = analysis.name;
        }
        if !analysis.skills.is_empty() {
            profile.skills = dedup_skills(analysis.skills);
        }
        profile.resume_score = Some(analysis.resume_score);
        profile.resume_feedback = Some(analysis.resume_feedback);
        profile.resume_file_name = file_name;
        profile.resume_file_type = file_type;
        if document_key.is_some() {
            profile.resume_document_key = document_key;
        }
        profile.grounding_sources = grounding_sources;
        profile.is_resume_passed = passed;
    }
}
