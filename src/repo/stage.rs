use std::collections::HashMap;
use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{default_stages, Stage};
use crate::repo::placeholders;
use crate::pipeline::{derive_status, PipelineSummary};
use anyhow::{Context, Result};

/// Pipeline stage repository.
///
/// Owns the persistence side of the pipeline: seeding the default stages for
/// a new client and flipping completion flags. Status derivation itself is
/// delegated to [`crate::pipeline::derive_status`].
pub struct StageRepo;

const STAGE_COLUMNS: &str =
    "id, client_id, stage_name, stage_order, completed, completed_ts";

fn row_to_stage(row: &Row) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: Some(row.get(0)?),
        client_id: row.get(1)?,
        name: row.get(2)?,
        order: row.get(3)?,
        completed: row.get::<_, i64>(4)? != 0,
        completed_at: row.get(5)?,
    })
}

impl StageRepo {
    /// Insert the 9 default stages for a client.
    /// Runs on the caller's connection so it can share the client's transaction.
    pub fn seed_defaults(conn: &Connection, client_id: i64) -> Result<Vec<Stage>> {
        let now = chrono::Utc::now().timestamp();
        let mut seeded = Vec::new();
        for mut stage in default_stages(client_id) {
            conn.execute(
                "INSERT INTO client_stages (client_id, stage_name, stage_order, completed, modified_ts)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                rusqlite::params![client_id, stage.name, stage.order, now],
            )
            .with_context(|| format!("Failed to seed stage '{}' for client {}", stage.name, client_id))?;
            stage.id = Some(conn.last_insert_rowid());
            seeded.push(stage);
        }
        log::debug!("Seeded {} stages for client {}", seeded.len(), client_id);
        Ok(seeded)
    }

    /// All stages of a client, ordered by position
    pub fn list_for_client(conn: &Connection, client_id: i64) -> Result<Vec<Stage>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM client_stages WHERE client_id = ?1 ORDER BY stage_order",
            STAGE_COLUMNS
        ))?;
        let rows = stmt.query_map([client_id], row_to_stage)?;

        let mut stages = Vec::new();
        for row in rows {
            stages.push(row?);
        }
        Ok(stages)
    }

    /// Stages of several clients in one query, grouped by client
    pub fn list_for_clients(conn: &Connection, client_ids: &[i64]) -> Result<HashMap<i64, Vec<Stage>>> {
        let mut grouped: HashMap<i64, Vec<Stage>> = HashMap::new();
        if client_ids.is_empty() {
            return Ok(grouped);
        }
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM client_stages WHERE client_id IN ({}) ORDER BY client_id, stage_order",
            STAGE_COLUMNS,
            placeholders(client_ids.len())
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(client_ids), row_to_stage)?;
        for row in rows {
            let stage = row?;
            grouped.entry(stage.client_id).or_default().push(stage);
        }
        Ok(grouped)
    }

    /// Get one stage by its position in the client's pipeline
    pub fn get(conn: &Connection, client_id: i64, order: i64) -> Result<Option<Stage>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM client_stages WHERE client_id = ?1 AND stage_order = ?2",
            STAGE_COLUMNS
        ))?;
        let stage = stmt
            .query_row(rusqlite::params![client_id, order], row_to_stage)
            .optional()?;
        Ok(stage)
    }

    /// Flip a stage's completion flag
    pub fn toggle(conn: &Connection, client_id: i64, order: i64) -> Result<Stage> {
        Self::apply(conn, client_id, order, |stage| !stage.completed)
    }

    /// Set a stage's completion flag. Setting the current value is a no-op.
    pub fn set_completed(conn: &Connection, client_id: i64, order: i64, completed: bool) -> Result<Stage> {
        Self::apply(conn, client_id, order, |_| completed)
    }

    /// Load the client's stages and derive the pipeline summary
    pub fn summary(conn: &Connection, client_id: i64) -> Result<PipelineSummary> {
        let stages = Self::list_for_client(conn, client_id)?;
        let summary = derive_status(&stages)
            .with_context(|| format!("Failed to derive pipeline status for client {}", client_id))?;
        Ok(summary)
    }

    // Read-modify-write inside one transaction
    fn apply<F>(conn: &Connection, client_id: i64, order: i64, next: F) -> Result<Stage>
    where
        F: FnOnce(&Stage) -> bool,
    {
        let tx = conn.unchecked_transaction()?;

        let mut stage = match Self::get(&tx, client_id, order)? {
            Some(stage) => stage,
            None => anyhow::bail!("Stage {} not found for client {}", order, client_id),
        };

        let completed = next(&stage);
        if completed == stage.completed {
            return Ok(stage);
        }

        let now = chrono::Utc::now().timestamp();
        stage.set_completed(completed, now);
        tx.execute(
            "UPDATE client_stages SET completed = ?1, completed_ts = ?2, modified_ts = ?3
             WHERE client_id = ?4 AND stage_order = ?5",
            rusqlite::params![
                if stage.completed { 1 } else { 0 },
                stage.completed_at,
                now,
                client_id,
                order
            ],
        )
        .with_context(|| format!("Failed to update stage {} for client {}", order, client_id))?;
        tx.commit()?;

        log::debug!(
            "Stage {} ('{}') of client {} is now {}",
            order, stage.name, client_id,
            if stage.completed { "completed" } else { "open" }
        );
        Ok(stage)
    }
}
