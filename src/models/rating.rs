use serde::{Deserialize, Serialize};

/// Review left on a supplier or contractor.
///
/// `subject_id` is the supplier/contractor id; `reference_id` optionally
/// points at the order or project the review is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Option<i64>,
    pub subject_id: i64,
    pub reference_id: Option<i64>,
    pub rating: i64,
    pub comment: Option<String>,
    pub author_name: String,
    pub created_ts: i64,
}

/// Render an average rating as stars out of five, e.g. "★★★★☆ 4.2"
pub fn format_stars(avg: Option<f64>) -> String {
    match avg {
        Some(value) => {
            let full = value.round().clamp(0.0, 5.0) as usize;
            format!("{}{} {:.1}", "★".repeat(full), "☆".repeat(5 - full), value)
        }
        None => "-".to_string(),
    }
}
