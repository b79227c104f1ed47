use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Contractor, ContractorFields, ContractorProject, ProjectStatus};
use crate::utils::matches_search;
use anyhow::{Context, Result};

/// Subcontractor repository
pub struct ContractorRepo;

const CONTRACTOR_SELECT: &str =
    "SELECT c.id, c.company_name, c.phone, c.description, c.verified, c.experience_years,
            c.created_ts, c.modified_ts,
            (SELECT COUNT(*) FROM contractor_projects p
             WHERE p.contractor_id = c.id AND p.status = 'completed'),
            (SELECT ROUND(AVG(CAST(r.rating AS REAL)), 1) FROM contractor_ratings r
             WHERE r.contractor_id = c.id)
     FROM contractors c";

fn row_to_contractor(row: &Row) -> rusqlite::Result<Contractor> {
    Ok(Contractor {
        id: Some(row.get(0)?),
        company_name: row.get(1)?,
        phone: row.get(2)?,
        description: row.get(3)?,
        verified: row.get::<_, i64>(4)? != 0,
        experience_years: row.get(5)?,
        specializations: Vec::new(),
        created_ts: row.get(6)?,
        modified_ts: row.get(7)?,
        completed_projects: row.get(8)?,
        rating: row.get(9)?,
    })
}

fn row_to_project(row: &Row) -> rusqlite::Result<ContractorProject> {
    let status: String = row.get(4)?;
    Ok(ContractorProject {
        id: Some(row.get(0)?),
        contractor_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: ProjectStatus::from_str(&status).unwrap_or(ProjectStatus::InProgress),
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        created_ts: row.get(7)?,
    })
}

impl ContractorRepo {
    /// Create an unverified contractor
    pub fn create(conn: &Connection, fields: &ContractorFields) -> Result<Contractor> {
        let company_name = match fields.company_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => anyhow::bail!("Company name cannot be empty"),
        };
        if let Some(years) = fields.experience_years {
            if years < 0 {
                anyhow::bail!("Experience must be a non-negative number of years");
            }
        }

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO contractors (company_name, phone, description, verified, experience_years,
                    created_ts, modified_ts)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)",
            rusqlite::params![
                company_name,
                fields.phone,
                fields.description,
                fields.experience_years,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create contractor: {}", company_name))?;
        let id = tx.last_insert_rowid();
        if let Some(specializations) = &fields.specializations {
            Self::replace_specializations(&tx, id, specializations)?;
        }
        tx.commit()?;

        log::debug!("Created contractor {} ('{}')", id, company_name);
        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Contractor {} not found", id))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Contractor>> {
        let mut stmt = conn.prepare(&format!("{} WHERE c.id = ?1", CONTRACTOR_SELECT))?;
        let contractor = stmt.query_row([id], row_to_contractor).optional()?;
        match contractor {
            Some(mut contractor) => {
                contractor.specializations = Self::specializations(conn, id)?;
                Ok(Some(contractor))
            }
            None => Ok(None),
        }
    }

    /// List contractors, verified first then newest.
    /// Search matches company name, description or any specialization.
    pub fn list(conn: &Connection, search: Option<&str>) -> Result<Vec<Contractor>> {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY c.verified DESC, c.created_ts DESC, c.id DESC",
            CONTRACTOR_SELECT
        ))?;
        let rows = stmt.query_map([], row_to_contractor)?;

        let mut contractors = Vec::new();
        for row in rows {
            let mut contractor = row?;
            contractor.specializations = Self::specializations(conn, contractor.id.unwrap_or_default())?;
            if let Some(needle) = search {
                let mut fields = vec![
                    contractor.company_name.as_str(),
                    contractor.description.as_deref().unwrap_or(""),
                ];
                fields.extend(contractor.specializations.iter().map(String::as_str));
                if !matches_search(fields, needle) {
                    continue;
                }
            }
            contractors.push(contractor);
        }
        Ok(contractors)
    }

    pub fn update(conn: &Connection, id: i64, fields: &ContractorFields) -> Result<Contractor> {
        let current = Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Contractor {} not found", id))?;

        let company_name = match fields.company_name.as_deref().map(str::trim) {
            Some(name) if name.is_empty() => anyhow::bail!("Company name cannot be empty"),
            Some(name) => name.to_string(),
            None => current.company_name,
        };
        if matches!(fields.experience_years, Some(years) if years < 0) {
            anyhow::bail!("Experience must be a non-negative number of years");
        }

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE contractors SET company_name = ?1, phone = ?2, description = ?3,
                    experience_years = ?4, modified_ts = ?5
             WHERE id = ?6",
            rusqlite::params![
                company_name,
                fields.phone.clone().or(current.phone),
                fields.description.clone().or(current.description),
                fields.experience_years.or(current.experience_years),
                now,
                id
            ],
        )
        .with_context(|| format!("Failed to update contractor {}", id))?;
        if let Some(specializations) = &fields.specializations {
            Self::replace_specializations(&tx, id, specializations)?;
        }
        tx.commit()?;

        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Contractor {} not found", id))
    }

    pub fn set_verified(conn: &Connection, id: i64, verified: bool) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE contractors SET verified = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![if verified { 1 } else { 0 }, now, id],
        )?;
        if updated == 0 {
            anyhow::bail!("Contractor {} not found", id);
        }
        log::debug!("Contractor {} verified={}", id, verified);
        Ok(())
    }

    /// Record a project done by the contractor
    pub fn add_project(
        conn: &Connection,
        contractor_id: i64,
        title: &str,
        description: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ContractorProject> {
        let title = title.trim();
        if title.is_empty() {
            anyhow::bail!("Project title cannot be empty");
        }
        if let (Some(start), Some(end)) = (start_date, end_date) {
            // ISO dates compare lexicographically
            if end < start {
                anyhow::bail!("Project end date {} is before start date {}", end, start);
            }
        }
        if Self::get_by_id(conn, contractor_id)?.is_none() {
            anyhow::bail!("Contractor {} not found", contractor_id);
        }

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO contractor_projects (contractor_id, title, description, status,
                    start_date, end_date, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                contractor_id,
                title,
                description,
                ProjectStatus::InProgress.as_str(),
                start_date,
                end_date,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create project for contractor {}", contractor_id))?;

        Ok(ContractorProject {
            id: Some(conn.last_insert_rowid()),
            contractor_id,
            title: title.to_string(),
            description: description.map(|d| d.to_string()),
            status: ProjectStatus::InProgress,
            start_date: start_date.map(|d| d.to_string()),
            end_date: end_date.map(|d| d.to_string()),
            created_ts: now,
        })
    }

    pub fn set_project_status(conn: &Connection, project_id: i64, status: ProjectStatus) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE contractor_projects SET status = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![status.as_str(), now, project_id],
        )?;
        if updated == 0 {
            anyhow::bail!("Project {} not found", project_id);
        }
        Ok(())
    }

    /// Projects of a contractor, newest first
    pub fn list_projects(conn: &Connection, contractor_id: i64) -> Result<Vec<ContractorProject>> {
        let mut stmt = conn.prepare(
            "SELECT id, contractor_id, title, description, status, start_date, end_date, created_ts
             FROM contractor_projects WHERE contractor_id = ?1
             ORDER BY created_ts DESC, id DESC"
        )?;
        let rows = stmt.query_map([contractor_id], row_to_project)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }

    fn specializations(conn: &Connection, contractor_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT specialization FROM contractor_specializations
             WHERE contractor_id = ?1 ORDER BY position"
        )?;
        let rows = stmt.query_map([contractor_id], |row| row.get::<_, String>(0))?;
        let mut values = Vec::new();
        for row in rows {
            values.push(row?);
        }
        Ok(values)
    }

    fn replace_specializations(conn: &Connection, contractor_id: i64, values: &[String]) -> Result<()> {
        conn.execute(
            "DELETE FROM contractor_specializations WHERE contractor_id = ?1",
            [contractor_id],
        )?;
        let values = values.iter().map(|v| v.trim()).filter(|v| !v.is_empty());
        for (position, value) in values.enumerate() {
            conn.execute(
                "INSERT INTO contractor_specializations (contractor_id, specialization, position)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![contractor_id, value, position as i64 + 1],
            )?;
        }
        Ok(())
    }
}
