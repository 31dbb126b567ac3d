use serde::{Deserialize, Serialize};

use crate::models::profile::GroundingSource;

/// Final hiring verdict on the readiness report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    Selected,
    HighlyRecommended,
    NeedsGrowth,
    /// Any label the model returns outside the three known verdicts.
    Unrated,
}

impl From<String> for Verdict {
    fn from(label: String) -> Self {
        let normalized = label
            .trim()
            .to_ascii_uppercase()
            .replace(|c: char| c == ' ' || c == '-', "_");
        match normalized.as_str() {
            "SELECTED" => Verdict::Selected,
            "HIGHLY_RECOMMENDED" => Verdict::HighlyRecommended,
            "NEEDS_GROWTH" => Verdict::NeedsGrowth,
            _ => Verdict::Unrated,
        }
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Selected => "SELECTED",
            Verdict::HighlyRecommended => "HIGHLY_RECOMMENDED",
            Verdict::NeedsGrowth => "NEEDS_GROWTH",
            Verdict::Unrated => "UNRATED",
        }
        .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainImprovement {
    pub domain: String,
    pub score: f64,
    pub gap: String,
    pub action_plan: Vec<String>,
    pub suggested_resources: Vec<String>,
}

/// Job Readiness Index report. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JriReport {
    pub overall_score: f64,
    pub verdict: Verdict,
    #[serde(default)]
    pub decision_summary: String,
    #[serde(default)]
    pub resume_quality: f64,
    #[serde(default)]
    pub technical_proficiency: f64,
    #[serde(default)]
    pub communication_level: f64,
    #[serde(default)]
    pub ethical_behavior: f64,
    #[serde(default)]
    pub improvements: Vec<DomainImprovement>,
    #[serde(default)]
    pub grounding_sources: Vec<GroundingSource>,
}
