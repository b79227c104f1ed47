use serde::{Deserialize, Serialize};

/// Status of a contractor's project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            "cancelled" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractorProject {
    pub id: Option<i64>,
    pub contractor_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_ts: i64,
}

/// Subcontractor with specializations and aggregates loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contractor {
    pub id: Option<i64>,
    pub company_name: String,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub verified: bool,
    pub experience_years: Option<i64>,
    pub specializations: Vec<String>,
    pub completed_projects: i64,
    pub rating: Option<f64>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

/// Input for creating or editing a contractor (`None` = unchanged on edit)
#[derive(Debug, Clone, Default)]
pub struct ContractorFields {
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub experience_years: Option<i64>,
    pub specializations: Option<Vec<String>>,
}
