use serde::Serialize;

use crate::ai_client::{tasks, AiGateway};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PresetRole {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const PRESET_ROLES: [PresetRole; 4] = [
    PresetRole {
        id: "java",
        title: "Java Developer",
        description: "Focus on enterprise-grade applications, Spring Boot microservices, \
                      multithreading, and robust backend architecture.",
    },
    PresetRole {
        id: "python",
        title: "Python Developer",
        description: "Expertise in scalable scripting, Django/Flask web frameworks, \
                      automation, and backend integration.",
    },
    PresetRole {
        id: "data-analysis",
        title: "Data Analysis",
        description: "Specializing in SQL-driven insights, data visualization, statistical \
                      modeling, and actionable business intelligence.",
    },
    PresetRole {
        id: "mern",
        title: "MERN Stack Developer",
        description: "Full-stack mastery of MongoDB, Express, React, and Node.js for modern, \
                      high-performance web applications.",
    },
];

/// Case-insensitive lookup by id or title.
pub fn find_preset(role: &str) -> Option<&'static PresetRole> {
    let role = role.trim();
    PRESET_ROLES
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(role) || p.title.eq_ignore_ascii_case(role))
}

/// A role title and the job description the candidate is assessed against.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTarget {
    pub role: String,
    pub target_jd: String,
}

/// Resolves the role a candidate picked.
///
/// Presets use their catalogue description unless the candidate supplied a JD.
/// Custom roles need a JD, either supplied or generated when `generate_jd` is set.
pub async fn resolve_role(
    ai: &dyn AiGateway,
    role: &str,
    target_jd: Option<&str>,
    generate_jd: bool,
) -> Result<RoleTarget, AppError> {
    let role = role.trim();
    if role.is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }
    let supplied = target_jd.map(str::trim).filter(|jd| !jd.is_empty());

    if let Some(preset) = find_preset(role) {
        return Ok(RoleTarget {
            role: preset.title.to_string(),
            target_jd: supplied.unwrap_or(preset.description).to_string(),
        });
    }

    if let Some(jd) = supplied {
        return Ok(RoleTarget {
            role: role.to_string(),
            target_jd: jd.to_string(),
        });
    }

    if !generate_jd {
        return Err(AppError::Validation(
            "custom roles need a job description (supply targetJD or set generateJD)".to_string(),
        ));
    }

    let generated = generate_job_description(ai, role).await?;
    Ok(RoleTarget {
        role: role.to_string(),
        target_jd: generated,
    })
}

pub async fn generate_job_description(ai: &dyn AiGateway, role: &str) -> Result<String, AppError> {
    let jd = tasks::generate_job_description(ai, role)
        .await?
        .into_parsed()?
        .job_description;
    if jd.trim().is_empty() {
        return Err(AppError::Ai(format!(
            "empty job description generated for '{role}'"
        )));
    }
    Ok(jd)
}
