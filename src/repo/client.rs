use std::collections::HashMap;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use crate::models::{service_label, Client, ClientComment, ClientFields, Stage};
use crate::pipeline::{derive_status, PipelineStatus, PipelineSummary};
use crate::repo::{placeholders, CommentRepo, StageRepo};
use crate::utils::matches_search;
use anyhow::{Context, Result};

/// Client repository for database operations
///
/// Creating a client also seeds its pipeline stages in the same transaction,
/// so a client never exists without its stage set.
///
/// # Example
///
/// ```no_run
/// use parkcrm::db::DbConnection;
/// use parkcrm::models::ClientFields;
/// use parkcrm::repo::ClientRepo;
///
/// let conn = DbConnection::connect_in_memory().unwrap();
/// let fields = ClientFields { name: Some("Иванов".into()), ..Default::default() };
/// let client = ClientRepo::create(&conn, &fields).unwrap();
/// ```
pub struct ClientRepo;

/// A client row enriched for list views
#[derive(Debug, Clone, Serialize)]
pub struct ClientOverview {
    pub client: Client,
    pub pipeline: PipelineSummary,
    pub last_comment: Option<ClientComment>,
}

/// Everything shown on a client's detail page
#[derive(Debug, Clone, Serialize)]
pub struct ClientDetail {
    pub client: Client,
    pub stages: Vec<Stage>,
    pub comments: Vec<ClientComment>,
    pub pipeline: PipelineSummary,
}

const CLIENT_COLUMNS: &str = "id, name, phone, email, address, project_description, budget,
    project_area, last_contact, next_action, notes, created_ts, modified_ts";

fn row_to_client(row: &Row) -> rusqlite::Result<Client> {
    Ok(Client {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        address: row.get(4)?,
        project_description: row.get(5)?,
        budget: row.get(6)?,
        project_area: row.get(7)?,
        last_contact: row.get(8)?,
        next_action: row.get(9)?,
        notes: row.get(10)?,
        services: Vec::new(),
        created_ts: row.get(11)?,
        modified_ts: row.get(12)?,
    })
}

/// Reject service codes that are not in the catalog
pub fn validate_services(services: &[String]) -> Result<()> {
    for code in services {
        if service_label(code).is_none() {
            anyhow::bail!(
                "Unknown service '{}'. Valid services: landscape-design, auto-irrigation, lawn, planting, hardscape, maintenance",
                code
            );
        }
    }
    Ok(())
}

impl ClientRepo {
    /// Create a client with its services and default pipeline stages
    pub fn create(conn: &Connection, fields: &ClientFields) -> Result<Client> {
        let name = match fields.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => anyhow::bail!("Client name cannot be empty"),
        };
        let services = fields.services.clone().unwrap_or_default();
        validate_services(&services)?;

        let mut client = Client::new(name);
        client.phone = fields.phone.clone();
        client.email = fields.email.clone();
        client.address = fields.address.clone();
        client.project_description = fields.project_description.clone();
        client.budget = fields.budget;
        client.project_area = fields.project_area;
        client.last_contact = fields.last_contact.clone();
        client.next_action = fields.next_action.clone();
        client.notes = fields.notes.clone();

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO clients (name, phone, email, address, project_description, budget,
                    project_area, last_contact, next_action, notes, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                client.name,
                client.phone,
                client.email,
                client.address,
                client.project_description,
                client.budget,
                client.project_area,
                client.last_contact,
                client.next_action,
                client.notes,
                client.created_ts,
                client.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create client: {}", client.name))?;
        let id = tx.last_insert_rowid();

        Self::replace_services(&tx, id, &services)?;
        StageRepo::seed_defaults(&tx, id)?;
        tx.commit()?;

        log::debug!("Created client {} ('{}')", id, client.name);
        Ok(Client {
            id: Some(id),
            services,
            ..client
        })
    }

    /// Get client by ID, with services loaded
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Client>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clients WHERE id = ?1",
            CLIENT_COLUMNS
        ))?;
        let client = stmt.query_row([id], row_to_client).optional()?;

        match client {
            Some(mut client) => {
                client.services = Self::get_services(conn, id)?;
                Ok(Some(client))
            }
            None => Ok(None),
        }
    }

    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row("SELECT id FROM clients WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// Service codes of a client, in the order they were given
    pub fn get_services(conn: &Connection, client_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT service_code FROM client_services WHERE client_id = ?1 ORDER BY position"
        )?;
        let rows = stmt.query_map([client_id], |row| row.get::<_, String>(0))?;

        let mut services = Vec::new();
        for row in rows {
            services.push(row?);
        }
        Ok(services)
    }

    /// Services of several clients in one query, grouped by client
    fn services_for_clients(conn: &Connection, client_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>> {
        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        if client_ids.is_empty() {
            return Ok(grouped);
        }
        let mut stmt = conn.prepare(&format!(
            "SELECT client_id, service_code FROM client_services
             WHERE client_id IN ({}) ORDER BY client_id, position",
            placeholders(client_ids.len())
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(client_ids), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (client_id, code) = row?;
            grouped.entry(client_id).or_default().push(code);
        }
        Ok(grouped)
    }

    /// List clients, newest first, optionally filtered by name/phone/email
    pub fn list(conn: &Connection, search: Option<&str>) -> Result<Vec<Client>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clients ORDER BY created_ts DESC, id DESC",
            CLIENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_client)?;

        let mut clients = Vec::new();
        for row in rows {
            let client = row?;
            let keep = match search {
                Some(needle) => matches_search(
                    [
                        client.name.as_str(),
                        client.phone.as_deref().unwrap_or(""),
                        client.email.as_deref().unwrap_or(""),
                    ],
                    needle,
                ),
                None => true,
            };
            if keep {
                clients.push(client);
            }
        }

        let ids: Vec<i64> = clients.iter().filter_map(|c| c.id).collect();
        let mut services = Self::services_for_clients(conn, &ids)?;
        for client in &mut clients {
            if let Some(codes) = client.id.and_then(|id| services.remove(&id)) {
                client.services = codes;
            }
        }
        Ok(clients)
    }

    /// List clients with their derived pipeline status.
    /// The status filter applies to the derived status, not a stored column.
    pub fn list_overviews(
        conn: &Connection,
        search: Option<&str>,
        status: Option<PipelineStatus>,
    ) -> Result<Vec<ClientOverview>> {
        let overviews = Self::overviews(conn, Self::list(conn, search)?)?;
        Ok(overviews
            .into_iter()
            .filter(|overview| status.map_or(true, |s| overview.pipeline.status == s))
            .collect())
    }

    /// The `limit` most recently created clients with their pipeline status
    pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<ClientOverview>> {
        let mut clients = Self::list(conn, None)?;
        clients.truncate(limit);
        Self::overviews(conn, clients)
    }

    /// Full detail view: stages, comments and pipeline summary
    pub fn detail(conn: &Connection, id: i64) -> Result<Option<ClientDetail>> {
        let client = match Self::get_by_id(conn, id)? {
            Some(client) => client,
            None => return Ok(None),
        };
        let stages = StageRepo::list_for_client(conn, id)?;
        let pipeline = derive_status(&stages)
            .with_context(|| format!("Failed to derive pipeline status for client {}", id))?;
        let comments = CommentRepo::list_for_client(conn, id)?;

        Ok(Some(ClientDetail {
            client,
            stages,
            comments,
            pipeline,
        }))
    }

    /// Update the given fields; services, when given, replace the whole list
    pub fn update(conn: &Connection, id: i64, fields: &ClientFields) -> Result<Client> {
        if !Self::exists(conn, id)? {
            anyhow::bail!("Client {} not found", id);
        }
        if let Some(services) = &fields.services {
            validate_services(services)?;
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(name) = &fields.name {
            if name.trim().is_empty() {
                anyhow::bail!("Client name cannot be empty");
            }
            sets.push("name");
            params.push(Box::new(name.trim().to_string()));
        }
        macro_rules! optional_field {
            ($field:ident) => {
                if let Some(value) = &fields.$field {
                    sets.push(stringify!($field));
                    params.push(Box::new(value.clone()));
                }
            };
        }
        optional_field!(phone);
        optional_field!(email);
        optional_field!(address);
        optional_field!(project_description);
        optional_field!(budget);
        optional_field!(project_area);
        optional_field!(last_contact);
        optional_field!(next_action);
        optional_field!(notes);

        let now = chrono::Utc::now().timestamp();
        sets.push("modified_ts");
        params.push(Box::new(now));

        // Number the parameters
        let numbered: Vec<String> = sets
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE clients SET {} WHERE id = ?{}",
            numbered.join(", "),
            params.len() + 1
        );
        params.push(Box::new(id));

        let tx = conn.unchecked_transaction()?;
        let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        tx.execute(&sql, param_refs.as_slice())
            .with_context(|| format!("Failed to update client {}", id))?;
        if let Some(services) = &fields.services {
            Self::replace_services(&tx, id, services)?;
        }
        tx.commit()?;

        log::debug!("Updated client {}", id);
        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Client {} not found", id))
    }

    // Stages and latest comments are loaded for all clients at once
    fn overviews(conn: &Connection, clients: Vec<Client>) -> Result<Vec<ClientOverview>> {
        let ids: Vec<i64> = clients.iter().filter_map(|c| c.id).collect();
        let mut stages = StageRepo::list_for_clients(conn, &ids)?;
        let mut comments = CommentRepo::latest_for_clients(conn, &ids)?;

        clients
            .into_iter()
            .map(|client| -> Result<ClientOverview> {
                let id = client.id.unwrap_or_default();
                let client_stages = stages.remove(&id).unwrap_or_default();
                let pipeline = derive_status(&client_stages)
                    .with_context(|| format!("Failed to derive pipeline status for client {}", id))?;
                Ok(ClientOverview {
                    client,
                    pipeline,
                    last_comment: comments.remove(&id),
                })
            })
            .collect()
    }

    fn replace_services(conn: &Connection, client_id: i64, services: &[String]) -> Result<()> {
        conn.execute("DELETE FROM client_services WHERE client_id = ?1", [client_id])?;
        let mut seen = std::collections::HashSet::new();
        for (position, code) in services.iter().enumerate() {
            if !seen.insert(code.as_str()) {
                continue;
            }
            conn.execute(
                "INSERT INTO client_services (client_id, service_code, position) VALUES (?1, ?2, ?3)",
                rusqlite::params![client_id, code, position as i64 + 1],
            )
            .with_context(|| format!("Failed to add service '{}' to client {}", code, client_id))?;
        }
        Ok(())
    }
}
