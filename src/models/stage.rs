use serde::{Deserialize, Serialize};

/// Canonical pipeline stages, seeded for every new client in this order.
pub const DEFAULT_STAGES: [&str; 9] = [
    "Первый звонок",
    "Назначен замер",
    "Готовим смету",
    "Выставили КП",
    "Вносятся правки",
    "Вышли на договор",
    "Договор подписан",
    "Объект в работе",
    "Завершен",
];

/// One step of a client's pipeline (a row in `client_stages`).
///
/// `order` is 1-based and never changes after seeding. `completed_at` is set
/// exactly while `completed` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: Option<i64>,
    pub client_id: i64,
    pub name: String,
    pub order: i64,
    pub completed: bool,
    pub completed_at: Option<i64>,
}

impl Stage {
    pub fn new(client_id: i64, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: None,
            client_id,
            name: name.into(),
            order,
            completed: false,
            completed_at: None,
        }
    }

    /// Set the completion flag, keeping `completed_at` in step with it.
    /// Re-applying the current value leaves the timestamp untouched.
    pub fn set_completed(&mut self, completed: bool, now: i64) {
        if self.completed == completed {
            return;
        }
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
    }
}

/// The 9 default stages for a client, orders 1..=9, none completed.
pub fn default_stages(client_id: i64) -> Vec<Stage> {
    DEFAULT_STAGES
        .iter()
        .enumerate()
        .map(|(i, name)| Stage::new(client_id, *name, i as i64 + 1))
        .collect()
}
