use serde::{Deserialize, Serialize};

/// Service catalog seeded into the `services` table: (code, label).
pub const SERVICE_CATALOG: [(&str, &str); 6] = [
    ("landscape-design", "Ландшафтный дизайн"),
    ("auto-irrigation", "Автополив"),
    ("lawn", "Газон"),
    ("planting", "Посадка растений"),
    ("hardscape", "Мощение"),
    ("maintenance", "Обслуживание"),
];

/// Look up the display label for a service code
pub fn service_label(code: &str) -> Option<&'static str> {
    SERVICE_CATALOG
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// Client model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub project_description: Option<String>,
    pub budget: Option<f64>,
    pub project_area: Option<f64>,
    pub last_contact: Option<String>, // YYYY-MM-DD
    pub next_action: Option<String>,
    pub notes: Option<String>,
    pub services: Vec<String>, // service codes, in insertion order
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Client {
    pub fn new(name: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            name,
            phone: None,
            email: None,
            address: None,
            project_description: None,
            budget: None,
            project_area: None,
            last_contact: None,
            next_action: None,
            notes: None,
            services: Vec::new(),
            created_ts: now,
            modified_ts: now,
        }
    }
}

/// Field set for creating or editing a client.
///
/// On edit, `None` leaves the stored value alone; `services: Some(..)`
/// replaces the whole list.
#[derive(Debug, Clone, Default)]
pub struct ClientFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub project_description: Option<String>,
    pub budget: Option<f64>,
    pub project_area: Option<f64>,
    pub last_contact: Option<String>,
    pub next_action: Option<String>,
    pub notes: Option<String>,
    pub services: Option<Vec<String>>,
}

/// Kind of note left on a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentType {
    Note,
    Call,
    Meeting,
    Email,
}

impl CommentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentType::Note => "note",
            CommentType::Call => "call",
            CommentType::Meeting => "meeting",
            CommentType::Email => "email",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "note" => Some(CommentType::Note),
            "call" => Some(CommentType::Call),
            "meeting" => Some(CommentType::Meeting),
            "email" => Some(CommentType::Email),
            _ => None,
        }
    }
}

/// Comment attached to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientComment {
    pub id: Option<i64>,
    pub client_id: i64,
    pub content: String,
    pub comment_type: CommentType,
    pub author_name: String,
    pub created_ts: i64,
}
