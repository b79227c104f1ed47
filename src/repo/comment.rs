use std::collections::HashMap;
use rusqlite::{Connection, Row};
use crate::models::{ClientComment, CommentType};
use crate::repo::{placeholders, ClientRepo};
use anyhow::{Context, Result};

/// Client comment repository
pub struct CommentRepo;

fn row_to_comment(row: &Row) -> rusqlite::Result<ClientComment> {
    let comment_type: String = row.get(3)?;
    Ok(ClientComment {
        id: Some(row.get(0)?),
        client_id: row.get(1)?,
        content: row.get(2)?,
        comment_type: CommentType::from_str(&comment_type).unwrap_or(CommentType::Note),
        author_name: row.get(4)?,
        created_ts: row.get(5)?,
    })
}

impl CommentRepo {
    /// Add a comment to a client
    pub fn add(
        conn: &Connection,
        client_id: i64,
        content: &str,
        comment_type: CommentType,
        author_name: &str,
    ) -> Result<ClientComment> {
        let content = content.trim();
        if content.is_empty() {
            anyhow::bail!("Comment cannot be empty");
        }
        if !ClientRepo::exists(conn, client_id)? {
            anyhow::bail!("Client {} not found", client_id);
        }

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO client_comments (client_id, content, comment_type, author_name, created_ts)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![client_id, content, comment_type.as_str(), author_name, now],
        )
        .with_context(|| format!("Failed to add comment to client {}", client_id))?;

        let id = conn.last_insert_rowid();
        log::debug!("Added {} comment {} to client {}", comment_type.as_str(), id, client_id);
        Ok(ClientComment {
            id: Some(id),
            client_id,
            content: content.to_string(),
            comment_type,
            author_name: author_name.to_string(),
            created_ts: now,
        })
    }

    /// Comments of a client, newest first
    pub fn list_for_client(conn: &Connection, client_id: i64) -> Result<Vec<ClientComment>> {
        let mut stmt = conn.prepare(
            "SELECT id, client_id, content, comment_type, author_name, created_ts
             FROM client_comments WHERE client_id = ?1
             ORDER BY created_ts DESC, id DESC"
        )?;
        let rows = stmt.query_map([client_id], row_to_comment)?;

        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    /// Most recent comment of each of several clients, in one query
    pub fn latest_for_clients(conn: &Connection, client_ids: &[i64]) -> Result<HashMap<i64, ClientComment>> {
        let mut latest = HashMap::new();
        if client_ids.is_empty() {
            return Ok(latest);
        }
        let mut stmt = conn.prepare(&format!(
            "SELECT id, client_id, content, comment_type, author_name, created_ts
             FROM client_comments WHERE client_id IN ({})
             ORDER BY client_id, created_ts DESC, id DESC",
            placeholders(client_ids.len())
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(client_ids), row_to_comment)?;
        for row in rows {
            let comment = row?;
            latest.entry(comment.client_id).or_insert(comment);
        }
        Ok(latest)
    }
}
