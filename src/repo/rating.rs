use rusqlite::Connection;
use crate::models::Rating;
use anyhow::{Context, Result};

/// Which rating table a review belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTarget {
    Supplier,
    Contractor,
}

impl RatingTarget {
    // (table, subject column, reference column, subject table, reference table)
    fn schema(&self) -> (&'static str, &'static str, &'static str, &'static str, &'static str) {
        match self {
            RatingTarget::Supplier => (
                "supplier_ratings", "supplier_id", "order_id", "suppliers", "orders",
            ),
            RatingTarget::Contractor => (
                "contractor_ratings", "contractor_id", "project_id", "contractors", "contractor_projects",
            ),
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            RatingTarget::Supplier => "Supplier",
            RatingTarget::Contractor => "Contractor",
        }
    }

    fn reference_noun(&self) -> &'static str {
        match self {
            RatingTarget::Supplier => "Order",
            RatingTarget::Contractor => "Project",
        }
    }
}

/// Shared storage for supplier and contractor reviews
pub struct RatingRepo;

impl RatingRepo {
    /// Record a 1..5 review. A reference (order/project) must belong to the subject.
    pub fn add(
        conn: &Connection,
        target: RatingTarget,
        subject_id: i64,
        reference_id: Option<i64>,
        rating: i64,
        comment: Option<&str>,
        author_name: &str,
    ) -> Result<Rating> {
        if !(1..=5).contains(&rating) {
            anyhow::bail!("Rating must be between 1 and 5, got {}", rating);
        }
        let (table, subject_col, reference_col, subject_table, reference_table) = target.schema();

        let exists: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", subject_table),
            [subject_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            anyhow::bail!("{} {} not found", target.noun(), subject_id);
        }
        if let Some(reference_id) = reference_id {
            let owned: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE id = ?1 AND {} = ?2", reference_table, subject_col),
                rusqlite::params![reference_id, subject_id],
                |row| row.get(0),
            )?;
            if owned == 0 {
                anyhow::bail!(
                    "{} {} not found for {} {}",
                    target.reference_noun(), reference_id, target.noun().to_lowercase(), subject_id
                );
            }
        }

        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, rating, comment, author_name, created_ts)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                table, subject_col, reference_col
            ),
            rusqlite::params![subject_id, reference_id, rating, comment, author_name, now],
        )
        .with_context(|| format!("Failed to rate {} {}", target.noun().to_lowercase(), subject_id))?;

        log::debug!("Rated {} {} with {}", target.noun().to_lowercase(), subject_id, rating);
        Ok(Rating {
            id: Some(conn.last_insert_rowid()),
            subject_id,
            reference_id,
            rating,
            comment: comment.map(|c| c.to_string()),
            author_name: author_name.to_string(),
            created_ts: now,
        })
    }

    /// Reviews of a subject, newest first
    pub fn list(conn: &Connection, target: RatingTarget, subject_id: i64) -> Result<Vec<Rating>> {
        let (table, subject_col, reference_col, _, _) = target.schema();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, {}, {}, rating, comment, author_name, created_ts
             FROM {} WHERE {} = ?1 ORDER BY created_ts DESC, id DESC",
            subject_col, reference_col, table, subject_col
        ))?;
        let rows = stmt.query_map([subject_id], |row| {
            Ok(Rating {
                id: Some(row.get(0)?),
                subject_id: row.get(1)?,
                reference_id: row.get(2)?,
                rating: row.get(3)?,
                comment: row.get(4)?,
                author_name: row.get(5)?,
                created_ts: row.get(6)?,
            })
        })?;

        let mut ratings = Vec::new();
        for row in rows {
            ratings.push(row?);
        }
        Ok(ratings)
    }

    /// Average rating rounded to one decimal, or None without reviews
    pub fn average(conn: &Connection, target: RatingTarget, subject_id: i64) -> Result<Option<f64>> {
        let (table, subject_col, _, _, _) = target.schema();
        let avg: Option<f64> = conn.query_row(
            &format!(
                "SELECT ROUND(AVG(CAST(rating AS REAL)), 1) FROM {} WHERE {} = ?1",
                table, subject_col
            ),
            [subject_id],
            |row| row.get(0),
        )?;
        Ok(avg)
    }
}
