use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Estimate, EstimateItem, EstimateStatus};
use crate::repo::ClientRepo;
use crate::utils::matches_search;
use anyhow::{Context, Result};

/// Estimate repository. Items are always written and read as a whole list.
pub struct EstimateRepo;

/// Input for editing an estimate. `None` leaves a field unchanged;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct EstimateFields {
    pub title: Option<String>,
    pub client_id: Option<Option<i64>>,
    pub status: Option<EstimateStatus>,
    pub valid_until: Option<Option<String>>,
    pub items: Option<Vec<EstimateItem>>,
}

const ESTIMATE_SELECT: &str =
    "SELECT e.id, e.title, e.client_id, c.name, e.status, e.valid_until, e.created_ts, e.modified_ts
     FROM estimates e LEFT JOIN clients c ON e.client_id = c.id";

fn row_to_estimate(row: &Row) -> rusqlite::Result<Estimate> {
    let status: String = row.get(4)?;
    Ok(Estimate {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        client_id: row.get(2)?,
        client_name: row.get(3)?,
        status: EstimateStatus::from_str(&status).unwrap_or(EstimateStatus::Draft),
        valid_until: row.get(5)?,
        items: Vec::new(),
        created_ts: row.get(6)?,
        modified_ts: row.get(7)?,
    })
}

impl EstimateRepo {
    /// Create a draft estimate with its items
    pub fn create(
        conn: &Connection,
        title: &str,
        client_id: Option<i64>,
        valid_until: Option<&str>,
        items: &[EstimateItem],
    ) -> Result<Estimate> {
        let title = title.trim();
        if title.is_empty() {
            anyhow::bail!("Estimate title cannot be empty");
        }
        if let Some(client_id) = client_id {
            if !ClientRepo::exists(conn, client_id)? {
                anyhow::bail!("Client {} not found", client_id);
            }
        }

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO estimates (title, client_id, status, valid_until, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![title, client_id, EstimateStatus::Draft.as_str(), valid_until, now, now],
        )
        .with_context(|| format!("Failed to create estimate: {}", title))?;
        let id = tx.last_insert_rowid();
        Self::replace_items(&tx, id, items)?;
        tx.commit()?;

        log::debug!("Created estimate {} with {} items", id, items.len());
        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Estimate {} not found", id))
    }

    /// Get estimate by ID, with client name and items
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Estimate>> {
        let mut stmt = conn.prepare(&format!("{} WHERE e.id = ?1", ESTIMATE_SELECT))?;
        let estimate = stmt.query_row([id], row_to_estimate).optional()?;

        match estimate {
            Some(mut estimate) => {
                estimate.items = Self::get_items(conn, id)?;
                Ok(Some(estimate))
            }
            None => Ok(None),
        }
    }

    /// Items of an estimate by position
    pub fn get_items(conn: &Connection, estimate_id: i64) -> Result<Vec<EstimateItem>> {
        let mut stmt = conn.prepare(
            "SELECT id, position, name, quantity, unit, price
             FROM estimate_items WHERE estimate_id = ?1 ORDER BY position"
        )?;
        let rows = stmt.query_map([estimate_id], |row| {
            Ok(EstimateItem {
                id: Some(row.get(0)?),
                position: row.get(1)?,
                name: row.get(2)?,
                quantity: row.get(3)?,
                unit: row.get(4)?,
                price: row.get(5)?,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// List estimates, newest first.
    /// Search matches client name, title or the estimate number.
    pub fn list(conn: &Connection, search: Option<&str>) -> Result<Vec<Estimate>> {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY e.created_ts DESC, e.id DESC",
            ESTIMATE_SELECT
        ))?;
        let rows = stmt.query_map([], row_to_estimate)?;

        let mut estimates = Vec::new();
        for row in rows {
            let mut estimate = row?;
            let id = estimate.id.unwrap_or_default();
            let keep = match search {
                Some(needle) => {
                    let number = id.to_string();
                    matches_search(
                        [
                            estimate.client_name.as_deref().unwrap_or(""),
                            estimate.title.as_str(),
                            number.as_str(),
                        ],
                        needle,
                    )
                }
                None => true,
            };
            if keep {
                estimate.items = Self::get_items(conn, id)?;
                estimates.push(estimate);
            }
        }
        Ok(estimates)
    }

    /// Update an estimate; items, when given, replace the existing list
    pub fn update(conn: &Connection, id: i64, fields: &EstimateFields) -> Result<Estimate> {
        let mut estimate = Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Estimate {} not found", id))?;

        if let Some(title) = &fields.title {
            let title = title.trim();
            if title.is_empty() {
                anyhow::bail!("Estimate title cannot be empty");
            }
            estimate.title = title.to_string();
        }
        if let Some(client_id) = fields.client_id {
            if let Some(cid) = client_id {
                if !ClientRepo::exists(conn, cid)? {
                    anyhow::bail!("Client {} not found", cid);
                }
            }
            estimate.client_id = client_id;
        }
        if let Some(status) = fields.status {
            estimate.status = status;
        }
        if let Some(valid_until) = &fields.valid_until {
            estimate.valid_until = valid_until.clone();
        }

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE estimates SET title = ?1, client_id = ?2, status = ?3, valid_until = ?4,
                    modified_ts = ?5
             WHERE id = ?6",
            rusqlite::params![
                estimate.title,
                estimate.client_id,
                estimate.status.as_str(),
                estimate.valid_until,
                now,
                id
            ],
        )
        .with_context(|| format!("Failed to update estimate {}", id))?;
        if let Some(items) = &fields.items {
            Self::replace_items(&tx, id, items)?;
        }
        tx.commit()?;

        log::debug!("Updated estimate {}", id);
        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Estimate {} not found", id))
    }

    /// Copy an estimate into a new draft with the same client, validity and items
    pub fn copy(conn: &Connection, id: i64) -> Result<Estimate> {
        let source = Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Estimate {} not found", id))?;
        let title = format!("Копия - {}", source.title);
        let copy = Self::create(
            conn,
            &title,
            source.client_id,
            source.valid_until.as_deref(),
            &source.items,
        )?;
        log::debug!("Copied estimate {} to {}", id, copy.id.unwrap_or_default());
        Ok(copy)
    }

    /// Delete an estimate and its items
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM estimate_items WHERE estimate_id = ?1", [id])?;
        let deleted = tx.execute("DELETE FROM estimates WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete estimate {}", id))?;
        if deleted == 0 {
            anyhow::bail!("Estimate {} not found", id);
        }
        tx.commit()?;
        log::debug!("Deleted estimate {}", id);
        Ok(())
    }

    // Positions are reassigned 1..n from input order
    fn replace_items(conn: &Connection, estimate_id: i64, items: &[EstimateItem]) -> Result<()> {
        conn.execute("DELETE FROM estimate_items WHERE estimate_id = ?1", [estimate_id])?;
        for (i, item) in items.iter().enumerate() {
            conn.execute(
                "INSERT INTO estimate_items (estimate_id, position, name, quantity, unit, price)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    estimate_id,
                    i as i64 + 1,
                    item.name,
                    item.quantity,
                    item.unit,
                    item.price
                ],
            )
            .with_context(|| format!("Failed to add item '{}' to estimate {}", item.name, estimate_id))?;
        }
        Ok(())
    }
}
