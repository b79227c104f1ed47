use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Task, TaskBoard, TaskCategory, TaskFields, TaskPriority, TaskStatus};
use crate::repo::ClientRepo;
use anyhow::{Context, Result};

/// Task repository for database operations
pub struct TaskRepo;

const TASK_SELECT: &str =
    "SELECT t.id, t.title, t.description, t.client_id, c.name, t.category, t.priority,
            t.status, t.due_date, t.created_ts, t.modified_ts
     FROM tasks t LEFT JOIN clients c ON c.id = t.client_id";

// Undated tasks sink to the bottom; ties broken by priority rank
const BOARD_ORDER: &str =
    "ORDER BY t.due_date IS NULL, t.due_date,
              CASE t.priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END,
              t.id";

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let category: String = row.get(5)?;
    let priority: String = row.get(6)?;
    let status: String = row.get(7)?;
    Ok(Task {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        client_id: row.get(3)?,
        client_name: row.get(4)?,
        category: TaskCategory::from_str(&category).unwrap_or(TaskCategory::Other),
        priority: TaskPriority::from_str(&priority).unwrap_or(TaskPriority::Medium),
        status: TaskStatus::from_str(&status).unwrap_or(TaskStatus::Pending),
        due_date: row.get(8)?,
        created_ts: row.get(9)?,
        modified_ts: row.get(10)?,
    })
}

fn check_client(conn: &Connection, client_id: Option<i64>) -> Result<()> {
    if let Some(client_id) = client_id {
        if !ClientRepo::exists(conn, client_id)? {
            anyhow::bail!("Client {} not found", client_id);
        }
    }
    Ok(())
}

impl TaskRepo {
    /// Create a task. Unset category/priority/status take their defaults.
    pub fn create(conn: &Connection, fields: &TaskFields) -> Result<Task> {
        let title = match fields.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => anyhow::bail!("Task title cannot be empty"),
        };
        check_client(conn, fields.client_id)?;

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO tasks (title, description, client_id, category, priority, status,
                    due_date, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                title,
                fields.description,
                fields.client_id,
                fields.category.unwrap_or(TaskCategory::Other).as_str(),
                fields.priority.unwrap_or(TaskPriority::Medium).as_str(),
                fields.status.unwrap_or(TaskStatus::Pending).as_str(),
                fields.due_date,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create task: {}", title))?;

        let id = conn.last_insert_rowid();
        log::debug!("Created task {} ('{}')", id, title);
        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Task {} not found", id))
    }

    /// Get task by ID, with the linked client's name
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Task>> {
        let mut stmt = conn.prepare(&format!("{} WHERE t.id = ?1", TASK_SELECT))?;
        let task = stmt.query_row([id], row_to_task).optional()?;
        Ok(task)
    }

    /// Apply the given fields; `None` leaves a field unchanged
    pub fn update(conn: &Connection, id: i64, fields: &TaskFields) -> Result<Task> {
        let current = Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Task {} not found", id))?;

        let title = match fields.title.as_deref().map(str::trim) {
            Some(title) if title.is_empty() => anyhow::bail!("Task title cannot be empty"),
            Some(title) => title.to_string(),
            None => current.title,
        };
        check_client(conn, fields.client_id)?;

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, client_id = ?3, category = ?4,
                    priority = ?5, status = ?6, due_date = ?7, modified_ts = ?8
             WHERE id = ?9",
            rusqlite::params![
                title,
                fields.description.clone().or(current.description),
                fields.client_id.or(current.client_id),
                fields.category.unwrap_or(current.category).as_str(),
                fields.priority.unwrap_or(current.priority).as_str(),
                fields.status.unwrap_or(current.status).as_str(),
                fields.due_date.clone().or(current.due_date),
                now,
                id
            ],
        )
        .with_context(|| format!("Failed to update task {}", id))?;

        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Task {} not found", id))
    }

    /// Move a task to another board column
    pub fn set_status(conn: &Connection, id: i64, status: TaskStatus) -> Result<Task> {
        Self::update(conn, id, &TaskFields {
            status: Some(status),
            ..Default::default()
        })
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete task {}", id))?;
        if deleted == 0 {
            anyhow::bail!("Task {} not found", id);
        }
        log::debug!("Deleted task {}", id);
        Ok(())
    }

    /// All tasks in board order: by due date (undated last), then priority
    pub fn list(conn: &Connection) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(&format!("{} {}", TASK_SELECT, BOARD_ORDER))?;
        let rows = stmt.query_map([], row_to_task)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Tasks grouped into the pending / in progress / completed columns
    pub fn board(conn: &Connection) -> Result<TaskBoard> {
        Ok(TaskBoard::from_tasks(Self::list(conn)?))
    }

    /// Pending tasks due on `date`, most urgent first
    pub fn due_on(conn: &Connection, date: &str, limit: usize) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE t.status = 'pending' AND t.due_date = ?1
             ORDER BY CASE t.priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END, t.id
             LIMIT ?2",
            TASK_SELECT
        ))?;
        let rows = stmt.query_map(rusqlite::params![date, limit as i64], row_to_task)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::ClientFields;

    fn task(title: &str, priority: TaskPriority, due: Option<&str>) -> TaskFields {
        TaskFields {
            title: Some(title.to_string()),
            priority: Some(priority),
            due_date: due.map(|d| d.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_defaults_and_client_name() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let client = ClientRepo::create(&conn, &ClientFields {
            name: Some("Иванов".into()),
            ..Default::default()
        }).unwrap();

        let created = TaskRepo::create(&conn, &TaskFields {
            title: Some("Позвонить".into()),
            client_id: client.id,
            ..Default::default()
        }).unwrap();
        assert_eq!(created.status, TaskStatus::Pending);
        assert_eq!(created.priority, TaskPriority::Medium);
        assert_eq!(created.category, TaskCategory::Other);
        assert_eq!(created.client_name.as_deref(), Some("Иванов"));

        assert!(TaskRepo::create(&conn, &TaskFields::default()).is_err());
        assert!(TaskRepo::create(&conn, &TaskFields {
            title: Some("x".into()),
            client_id: Some(999),
            ..Default::default()
        }).is_err());
    }

    #[test]
    fn test_board_order() {
        let conn = DbConnection::connect_in_memory().unwrap();
        TaskRepo::create(&conn, &task("undated", TaskPriority::High, None)).unwrap();
        TaskRepo::create(&conn, &task("later", TaskPriority::High, Some("2026-06-02"))).unwrap();
        TaskRepo::create(&conn, &task("low", TaskPriority::Low, Some("2026-06-01"))).unwrap();
        TaskRepo::create(&conn, &task("high", TaskPriority::High, Some("2026-06-01"))).unwrap();

        let board = TaskRepo::board(&conn).unwrap();
        let titles: Vec<&str> = board.pending.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "low", "later", "undated"]);
    }

    #[test]
    fn test_status_moves_between_columns() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let id = TaskRepo::create(&conn, &task("t", TaskPriority::Medium, None)).unwrap().id.unwrap();

        TaskRepo::set_status(&conn, id, TaskStatus::InProgress).unwrap();
        let board = TaskRepo::board(&conn).unwrap();
        assert!(board.pending.is_empty());
        assert_eq!(board.in_progress.len(), 1);

        TaskRepo::set_status(&conn, id, TaskStatus::Cancelled).unwrap();
        assert!(TaskRepo::board(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_due_on_pending_only() {
        let conn = DbConnection::connect_in_memory().unwrap();
        TaskRepo::create(&conn, &task("medium", TaskPriority::Medium, Some("2026-06-01"))).unwrap();
        TaskRepo::create(&conn, &task("high", TaskPriority::High, Some("2026-06-01"))).unwrap();
        let done = TaskRepo::create(&conn, &task("done", TaskPriority::High, Some("2026-06-01"))).unwrap();
        TaskRepo::create(&conn, &task("other day", TaskPriority::High, Some("2026-06-02"))).unwrap();
        TaskRepo::set_status(&conn, done.id.unwrap(), TaskStatus::Completed).unwrap();

        let due = TaskRepo::due_on(&conn, "2026-06-01", 3).unwrap();
        let titles: Vec<&str> = due.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "medium"]);
        assert_eq!(TaskRepo::due_on(&conn, "2026-06-01", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_delete() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let id = TaskRepo::create(&conn, &task("t", TaskPriority::Low, None)).unwrap().id.unwrap();
        TaskRepo::delete(&conn, id).unwrap();
        assert!(TaskRepo::get_by_id(&conn, id).unwrap().is_none());
        assert!(TaskRepo::delete(&conn, id).is_err());
    }
}
