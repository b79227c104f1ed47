use rusqlite::Connection;
use serde::Serialize;
use crate::models::Task;
use crate::repo::{ClientOverview, ClientRepo, TaskRepo};
use anyhow::{Context, Result};

const RECENT_CLIENTS: usize = 4;
const TODAY_TASKS: usize = 3;

/// Home screen figures
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_clients: i64,
    pub open_estimates: i64,
    /// Estimates sent to the client and awaiting a decision
    pub proposals_sent: i64,
    pub approved_estimates: i64,
    pub approved_total: f64,
    pub recent_clients: Vec<ClientOverview>,
    pub today_tasks: Vec<Task>,
}

pub struct DashboardRepo;

impl DashboardRepo {
    /// Load the dashboard; `today` is the storage-form date used for due tasks
    pub fn load(conn: &Connection, today: &str) -> Result<Dashboard> {
        let total_clients: i64 = conn
            .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))
            .context("Failed to count clients")?;
        let open_estimates: i64 = conn.query_row(
            "SELECT COUNT(*) FROM estimates WHERE status IN ('draft', 'sent')",
            [],
            |row| row.get(0),
        )?;
        let proposals_sent: i64 = conn.query_row(
            "SELECT COUNT(*) FROM estimates WHERE status = 'sent'",
            [],
            |row| row.get(0),
        )?;
        let (approved_estimates, approved_total): (i64, f64) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM((SELECT COALESCE(SUM(i.quantity * i.price), 0)
                                  FROM estimate_items i WHERE i.estimate_id = e.id)), 0)
             FROM estimates e WHERE e.status = 'approved'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(Dashboard {
            total_clients,
            open_estimates,
            proposals_sent,
            approved_estimates,
            approved_total,
            recent_clients: ClientRepo::recent(conn, RECENT_CLIENTS)?,
            today_tasks: TaskRepo::due_on(conn, today, TODAY_TASKS)?,
        })
    }
}
