use rusqlite::{Connection, Result, Transaction};

use crate::models::SERVICE_CATALOG;

/// Migrations in version order; index 0 is version 1.
const MIGRATIONS: &[fn(&Transaction) -> Result<()>] = &[
    migration_v1,
    migration_v2,
    migration_v3,
    migration_v4,
];

/// Current database schema version
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all pending migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn)?;
        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migration = MIGRATIONS
            .get(version as usize - 1)
            .ok_or_else(|| rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))?;

        let tx = conn.unchecked_transaction()?;
        migration(&tx)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
        tx.commit()?;

        log::info!("Applied schema migration v{}", version);
        Ok(())
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

/// Migration v1: users, sessions, service catalog, clients and their pipeline
fn migration_v1(tx: &Transaction) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name TEXT NOT NULL,
            created_ts INTEGER NOT NULL
        );

        CREATE TABLE auth_sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_ts INTEGER NOT NULL
        );

        CREATE TABLE services (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE clients (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT NULL,
            email TEXT NULL,
            address TEXT NULL,
            project_description TEXT NULL,
            budget REAL NULL,
            project_area REAL NULL,
            last_contact TEXT NULL,
            next_action TEXT NULL,
            notes TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        );

        CREATE TABLE client_services (
            id INTEGER PRIMARY KEY,
            client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            service_code TEXT NOT NULL REFERENCES services(code),
            position INTEGER NOT NULL,
            UNIQUE(client_id, service_code)
        );

        CREATE TABLE client_stages (
            id INTEGER PRIMARY KEY,
            client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            stage_name TEXT NOT NULL,
            stage_order INTEGER NOT NULL CHECK(stage_order >= 1),
            completed INTEGER NOT NULL DEFAULT 0,
            completed_ts INTEGER NULL,
            modified_ts INTEGER NOT NULL,
            UNIQUE(client_id, stage_order)
        );
        CREATE INDEX idx_client_stages_client_id ON client_stages(client_id);

        CREATE TABLE client_comments (
            id INTEGER PRIMARY KEY,
            client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            comment_type TEXT NOT NULL DEFAULT 'note'
                CHECK(comment_type IN ('note','call','meeting','email')),
            author_name TEXT NOT NULL,
            created_ts INTEGER NOT NULL
        );
        CREATE INDEX idx_client_comments_client_id ON client_comments(client_id);",
    )?;

    for (code, name) in SERVICE_CATALOG {
        tx.execute(
            "INSERT INTO services (code, name) VALUES (?1, ?2)",
            rusqlite::params![code, name],
        )?;
    }

    Ok(())
}

/// Migration v2: suppliers with categories, tags, phones, orders and ratings
fn migration_v2(tx: &Transaction) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE suppliers (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            location TEXT NULL,
            email TEXT NULL,
            contact_person TEXT NULL,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK(status IN ('active','on-hold','inactive')),
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        );

        CREATE TABLE supplier_categories (
            id INTEGER PRIMARY KEY,
            supplier_id INTEGER NOT NULL REFERENCES suppliers(id) ON DELETE CASCADE,
            category TEXT NOT NULL,
            position INTEGER NOT NULL
        );

        CREATE TABLE supplier_tags (
            id INTEGER PRIMARY KEY,
            supplier_id INTEGER NOT NULL REFERENCES suppliers(id) ON DELETE CASCADE,
            tag_name TEXT NOT NULL,
            position INTEGER NOT NULL
        );

        CREATE TABLE supplier_phones (
            id INTEGER PRIMARY KEY,
            supplier_id INTEGER NOT NULL REFERENCES suppliers(id) ON DELETE CASCADE,
            number TEXT NOT NULL,
            phone_type TEXT NOT NULL DEFAULT 'mobile'
                CHECK(phone_type IN ('mobile','landline')),
            messenger TEXT NOT NULL DEFAULT 'none'
                CHECK(messenger IN ('whatsapp','telegram','viber','none')),
            position INTEGER NOT NULL
        );

        CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            supplier_id INTEGER NOT NULL REFERENCES suppliers(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK(status IN ('pending','in_progress','completed','cancelled')),
            amount REAL NOT NULL DEFAULT 0,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        );

        CREATE TABLE supplier_ratings (
            id INTEGER PRIMARY KEY,
            supplier_id INTEGER NOT NULL REFERENCES suppliers(id) ON DELETE CASCADE,
            order_id INTEGER NULL REFERENCES orders(id) ON DELETE SET NULL,
            rating INTEGER NOT NULL CHECK(rating BETWEEN 1 AND 5),
            comment TEXT NULL,
            author_name TEXT NOT NULL,
            created_ts INTEGER NOT NULL
        );",
    )
}

/// Migration v3: contractors with specializations, projects and ratings
fn migration_v3(tx: &Transaction) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE contractors (
            id INTEGER PRIMARY KEY,
            company_name TEXT NOT NULL,
            phone TEXT NULL,
            description TEXT NULL,
            verified INTEGER NOT NULL DEFAULT 0,
            experience_years INTEGER NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        );

        CREATE TABLE contractor_specializations (
            id INTEGER PRIMARY KEY,
            contractor_id INTEGER NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
            specialization TEXT NOT NULL,
            position INTEGER NOT NULL
        );

        CREATE TABLE contractor_projects (
            id INTEGER PRIMARY KEY,
            contractor_id INTEGER NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT NULL,
            status TEXT NOT NULL DEFAULT 'in_progress'
                CHECK(status IN ('in_progress','completed','cancelled')),
            start_date TEXT NULL,
            end_date TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        );

        CREATE TABLE contractor_ratings (
            id INTEGER PRIMARY KEY,
            contractor_id INTEGER NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
            project_id INTEGER NULL REFERENCES contractor_projects(id) ON DELETE SET NULL,
            rating INTEGER NOT NULL CHECK(rating BETWEEN 1 AND 5),
            comment TEXT NULL,
            author_name TEXT NOT NULL,
            created_ts INTEGER NOT NULL
        );",
    )
}

/// Migration v4: estimates with line items, and the task board
fn migration_v4(tx: &Transaction) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE estimates (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            client_id INTEGER NULL REFERENCES clients(id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'draft'
                CHECK(status IN ('draft','sent','approved','rejected')),
            valid_until TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        );

        CREATE TABLE estimate_items (
            id INTEGER PRIMARY KEY,
            estimate_id INTEGER NOT NULL REFERENCES estimates(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            quantity REAL NOT NULL DEFAULT 1,
            unit TEXT NOT NULL DEFAULT 'шт',
            price REAL NOT NULL DEFAULT 0
        );
        CREATE INDEX idx_estimate_items_estimate_id ON estimate_items(estimate_id);

        CREATE TABLE tasks (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NULL,
            client_id INTEGER NULL REFERENCES clients(id) ON DELETE SET NULL,
            category TEXT NOT NULL DEFAULT 'other'
                CHECK(category IN ('call','estimate','proposal','other')),
            priority TEXT NOT NULL DEFAULT 'medium'
                CHECK(priority IN ('high','medium','low')),
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK(status IN ('pending','in_progress','completed','cancelled')),
            due_date TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        );
        CREATE INDEX idx_tasks_status ON tasks(status);",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        MigrationManager::initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn test_initialize_applies_all_migrations() {
        let conn = fresh();
        assert_eq!(MigrationManager::get_version(&conn).unwrap(), CURRENT_VERSION);
        assert_eq!(CURRENT_VERSION, 4);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = fresh();
        MigrationManager::initialize(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, CURRENT_VERSION as i64);
    }

    #[test]
    fn test_service_catalog_seeded() {
        let conn = fresh();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn test_stage_order_unique_per_client() {
        let conn = fresh();
        conn.execute(
            "INSERT INTO clients (name, created_ts, modified_ts) VALUES ('A', 1, 1)",
            [],
        ).unwrap();
        conn.execute(
            "INSERT INTO client_stages (client_id, stage_name, stage_order, modified_ts)
             VALUES (1, 'x', 1, 1)",
            [],
        ).unwrap();
        let dup = conn.execute(
            "INSERT INTO client_stages (client_id, stage_name, stage_order, modified_ts)
             VALUES (1, 'y', 1, 1)",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_rating_range_enforced() {
        let conn = fresh();
        conn.execute(
            "INSERT INTO suppliers (name, entity_type, created_ts, modified_ts)
             VALUES ('S', 'ООО', 1, 1)",
            [],
        ).unwrap();
        let bad = conn.execute(
            "INSERT INTO supplier_ratings (supplier_id, rating, author_name, created_ts)
             VALUES (1, 6, 'a', 1)",
            [],
        );
        assert!(bad.is_err());
    }
}
