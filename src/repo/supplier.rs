use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{
    Messenger, OrderStatus, PhoneType, Supplier, SupplierFields, SupplierOrder, SupplierPhone,
    SupplierStatus, SupplierTag,
};
use crate::repo::{RatingRepo, RatingTarget};
use crate::utils::matches_search;
use anyhow::{Context, Result};

/// Supplier repository
///
/// Categories, tags and phones are one-to-many rows kept in input order;
/// they are always loaded as lists, never as concatenated strings.
pub struct SupplierRepo;

const SUPPLIER_SELECT: &str =
    "SELECT s.id, s.name, s.entity_type, s.location, s.email, s.contact_person, s.status,
            s.created_ts, s.modified_ts,
            (SELECT COUNT(*) FROM orders o WHERE o.supplier_id = s.id AND o.status = 'completed'),
            (SELECT ROUND(AVG(CAST(r.rating AS REAL)), 1) FROM supplier_ratings r WHERE r.supplier_id = s.id)
     FROM suppliers s";

fn row_to_supplier(row: &Row) -> rusqlite::Result<Supplier> {
    let status: String = row.get(6)?;
    Ok(Supplier {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        entity_type: row.get(2)?,
        location: row.get(3)?,
        email: row.get(4)?,
        contact_person: row.get(5)?,
        status: SupplierStatus::from_str(&status).unwrap_or(SupplierStatus::Active),
        categories: Vec::new(),
        tags: Vec::new(),
        phones: Vec::new(),
        created_ts: row.get(7)?,
        modified_ts: row.get(8)?,
        orders_count: row.get(9)?,
        rating: row.get(10)?,
    })
}

fn row_to_order(row: &Row) -> rusqlite::Result<SupplierOrder> {
    let status: String = row.get(4)?;
    Ok(SupplierOrder {
        id: Some(row.get(0)?),
        supplier_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: OrderStatus::from_str(&status).unwrap_or(OrderStatus::Pending),
        amount: row.get(5)?,
        created_ts: row.get(6)?,
    })
}

fn required(value: &Option<String>, what: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => anyhow::bail!("{} cannot be empty", what),
    }
}

impl SupplierRepo {
    /// Create an active supplier with its relations
    pub fn create(conn: &Connection, fields: &SupplierFields) -> Result<Supplier> {
        let name = required(&fields.name, "Supplier name")?;
        let entity_type = required(&fields.entity_type, "Entity type")?;

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO suppliers (name, entity_type, location, email, contact_person, status,
                    created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                name,
                entity_type,
                fields.location,
                fields.email,
                fields.contact_person,
                SupplierStatus::Active.as_str(),
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create supplier: {}", name))?;
        let id = tx.last_insert_rowid();

        Self::replace_relations(&tx, id, fields)?;
        tx.commit()?;

        log::debug!("Created supplier {} ('{}')", id, name);
        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Supplier {} not found", id))
    }

    /// Get supplier by ID with relations and aggregates
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Supplier>> {
        let mut stmt = conn.prepare(&format!("{} WHERE s.id = ?1", SUPPLIER_SELECT))?;
        let supplier = stmt.query_row([id], row_to_supplier).optional()?;
        match supplier {
            Some(supplier) => Ok(Some(Self::load_relations(conn, supplier)?)),
            None => Ok(None),
        }
    }

    /// List suppliers, active first then newest.
    /// Search matches name, location or any category.
    pub fn list(conn: &Connection, search: Option<&str>) -> Result<Vec<Supplier>> {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY (s.status = 'active') DESC, s.created_ts DESC, s.id DESC",
            SUPPLIER_SELECT
        ))?;
        let rows = stmt.query_map([], row_to_supplier)?;

        let mut suppliers = Vec::new();
        for row in rows {
            let supplier = Self::load_relations(conn, row?)?;
            let keep = match search {
                Some(needle) => {
                    let mut fields = vec![
                        supplier.name.as_str(),
                        supplier.location.as_deref().unwrap_or(""),
                    ];
                    fields.extend(supplier.categories.iter().map(String::as_str));
                    matches_search(fields, needle)
                }
                None => true,
            };
            if keep {
                suppliers.push(supplier);
            }
        }
        Ok(suppliers)
    }

    /// Update scalar fields; each given relation list replaces the stored one
    pub fn update(conn: &Connection, id: i64, fields: &SupplierFields) -> Result<Supplier> {
        let current = Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Supplier {} not found", id))?;

        let name = match &fields.name {
            Some(_) => required(&fields.name, "Supplier name")?,
            None => current.name,
        };
        let entity_type = match &fields.entity_type {
            Some(_) => required(&fields.entity_type, "Entity type")?,
            None => current.entity_type,
        };
        let location = fields.location.clone().or(current.location);
        let email = fields.email.clone().or(current.email);
        let contact_person = fields.contact_person.clone().or(current.contact_person);

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE suppliers SET name = ?1, entity_type = ?2, location = ?3, email = ?4,
                    contact_person = ?5, modified_ts = ?6
             WHERE id = ?7",
            rusqlite::params![name, entity_type, location, email, contact_person, now, id],
        )
        .with_context(|| format!("Failed to update supplier {}", id))?;
        Self::replace_relations(&tx, id, fields)?;
        tx.commit()?;

        log::debug!("Updated supplier {}", id);
        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Supplier {} not found", id))
    }

    pub fn set_status(conn: &Connection, id: i64, status: SupplierStatus) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE suppliers SET status = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![status.as_str(), now, id],
        )
        .with_context(|| format!("Failed to update status of supplier {}", id))?;
        if updated == 0 {
            anyhow::bail!("Supplier {} not found", id);
        }
        log::debug!("Supplier {} is now {}", id, status.as_str());
        Ok(())
    }

    /// Place an order with a supplier
    pub fn add_order(
        conn: &Connection,
        supplier_id: i64,
        title: &str,
        description: Option<&str>,
        amount: f64,
    ) -> Result<SupplierOrder> {
        let title = title.trim();
        if title.is_empty() {
            anyhow::bail!("Order title cannot be empty");
        }
        if amount < 0.0 || !amount.is_finite() {
            anyhow::bail!("Order amount must be a non-negative number");
        }
        if Self::get_by_id(conn, supplier_id)?.is_none() {
            anyhow::bail!("Supplier {} not found", supplier_id);
        }

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO orders (supplier_id, title, description, status, amount, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                supplier_id,
                title,
                description,
                OrderStatus::Pending.as_str(),
                amount,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create order for supplier {}", supplier_id))?;

        let id = conn.last_insert_rowid();
        log::debug!("Created order {} for supplier {}", id, supplier_id);
        Ok(SupplierOrder {
            id: Some(id),
            supplier_id,
            title: title.to_string(),
            description: description.map(|d| d.to_string()),
            status: OrderStatus::Pending,
            amount,
            created_ts: now,
        })
    }

    pub fn set_order_status(conn: &Connection, order_id: i64, status: OrderStatus) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE orders SET status = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![status.as_str(), now, order_id],
        )
        .with_context(|| format!("Failed to update order {}", order_id))?;
        if updated == 0 {
            anyhow::bail!("Order {} not found", order_id);
        }
        Ok(())
    }

    /// Orders of a supplier, newest first
    pub fn list_orders(conn: &Connection, supplier_id: i64) -> Result<Vec<SupplierOrder>> {
        let mut stmt = conn.prepare(
            "SELECT id, supplier_id, title, description, status, amount, created_ts
             FROM orders WHERE supplier_id = ?1 ORDER BY created_ts DESC, id DESC"
        )?;
        let rows = stmt.query_map([supplier_id], row_to_order)?;

        let mut orders = Vec::new();
        for row in rows {
            orders.push(row?);
        }
        Ok(orders)
    }

    /// Current average rating (convenience wrapper)
    pub fn average_rating(conn: &Connection, supplier_id: i64) -> Result<Option<f64>> {
        RatingRepo::average(conn, RatingTarget::Supplier, supplier_id)
    }

    fn load_relations(conn: &Connection, mut supplier: Supplier) -> Result<Supplier> {
        let id = supplier.id.unwrap_or_default();
        supplier.categories = Self::string_list(conn, "supplier_categories", "category", id)?;
        supplier.tags = Self::string_list(conn, "supplier_tags", "tag_name", id)?
            .into_iter()
            .map(SupplierTag::new)
            .collect();

        let mut stmt = conn.prepare(
            "SELECT number, phone_type, messenger FROM supplier_phones
             WHERE supplier_id = ?1 ORDER BY position"
        )?;
        let rows = stmt.query_map([id], |row| {
            let phone_type: String = row.get(1)?;
            let messenger: String = row.get(2)?;
            Ok(SupplierPhone {
                number: row.get(0)?,
                phone_type: PhoneType::from_str(&phone_type).unwrap_or(PhoneType::Mobile),
                messenger: Messenger::from_str(&messenger).unwrap_or(Messenger::None),
            })
        })?;
        let mut phones = Vec::new();
        for row in rows {
            phones.push(row?);
        }
        supplier.phones = phones;

        Ok(supplier)
    }

    // Table and column names are fixed identifiers, never user input
    fn string_list(conn: &Connection, table: &str, column: &str, supplier_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE supplier_id = ?1 ORDER BY position",
            column, table
        ))?;
        let rows = stmt.query_map([supplier_id], |row| row.get::<_, String>(0))?;
        let mut values = Vec::new();
        for row in rows {
            values.push(row?);
        }
        Ok(values)
    }

    fn replace_string_list(
        conn: &Connection,
        table: &str,
        column: &str,
        supplier_id: i64,
        values: &[String],
    ) -> Result<()> {
        conn.execute(&format!("DELETE FROM {} WHERE supplier_id = ?1", table), [supplier_id])?;
        let values = values.iter().map(|v| v.trim()).filter(|v| !v.is_empty());
        for (position, value) in values.enumerate() {
            conn.execute(
                &format!(
                    "INSERT INTO {} (supplier_id, {}, position) VALUES (?1, ?2, ?3)",
                    table, column
                ),
                rusqlite::params![supplier_id, value, position as i64 + 1],
            )
            .with_context(|| format!("Failed to store '{}' for supplier {}", value, supplier_id))?;
        }
        Ok(())
    }

    fn replace_relations(conn: &Connection, supplier_id: i64, fields: &SupplierFields) -> Result<()> {
        if let Some(categories) = &fields.categories {
            Self::replace_string_list(conn, "supplier_categories", "category", supplier_id, categories)?;
        }
        if let Some(tags) = &fields.tags {
            Self::replace_string_list(conn, "supplier_tags", "tag_name", supplier_id, tags)?;
        }
        if let Some(phones) = &fields.phones {
            conn.execute("DELETE FROM supplier_phones WHERE supplier_id = ?1", [supplier_id])?;
            for (position, phone) in phones.iter().enumerate() {
                conn.execute(
                    "INSERT INTO supplier_phones (supplier_id, number, phone_type, messenger, position)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        supplier_id,
                        phone.number,
                        phone.phone_type.as_str(),
                        phone.messenger.as_str(),
                        position as i64 + 1
                    ],
                )
                .with_context(|| format!("Failed to store phone for supplier {}", supplier_id))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    fn fields(name: &str) -> SupplierFields {
        SupplierFields {
            name: Some(name.to_string()),
            entity_type: Some("ООО".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_with_relations() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let supplier = SupplierRepo::create(&conn, &SupplierFields {
            location: Some("Москва".into()),
            categories: Some(vec!["Растения".into(), "Грунт, торф".into()]),
            tags: Some(vec!["Быстрая доставка".into(), "Своя логистика".into()]),
            phones: Some(vec![SupplierPhone::parse_spec("+79001234567:mobile:telegram").unwrap()]),
            ..fields("Питомник")
        }).unwrap();

        assert_eq!(supplier.status, SupplierStatus::Active);
        // A comma inside a value survives intact
        assert_eq!(supplier.categories, vec!["Растения", "Грунт, торф"]);
        assert_eq!(supplier.tags[0].color, "bg-red-500");
        assert_eq!(supplier.tags[1].color, "bg-gray-500");
        assert_eq!(supplier.phones[0].messenger, Messenger::Telegram);
        assert_eq!(supplier.orders_count, 0);
        assert!(supplier.rating.is_none());
    }

    #[test]
    fn test_create_requires_name_and_entity_type() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert!(SupplierRepo::create(&conn, &SupplierFields {
            name: Some("X".into()),
            ..Default::default()
        }).is_err());
        assert!(SupplierRepo::create(&conn, &SupplierFields {
            entity_type: Some("ИП".into()),
            ..Default::default()
        }).is_err());
    }

    #[test]
    fn test_orders_count_only_completed() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let id = SupplierRepo::create(&conn, &fields("S")).unwrap().id.unwrap();
        let first = SupplierRepo::add_order(&conn, id, "Газон 500 м2", None, 150000.0).unwrap();
        SupplierRepo::add_order(&conn, id, "Щебень", Some("20 т"), 40000.0).unwrap();
        SupplierRepo::set_order_status(&conn, first.id.unwrap(), OrderStatus::Completed).unwrap();

        let supplier = SupplierRepo::get_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(supplier.orders_count, 1);
        assert_eq!(SupplierRepo::list_orders(&conn, id).unwrap().len(), 2);
        assert!(SupplierRepo::set_order_status(&conn, 999, OrderStatus::Completed).is_err());
        assert!(SupplierRepo::add_order(&conn, id + 1, "x", None, 1.0).is_err());
    }

    #[test]
    fn test_list_active_first_and_search_categories() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let a = SupplierRepo::create(&conn, &SupplierFields {
            categories: Some(vec!["Камень".into()]),
            ..fields("Альфа")
        }).unwrap().id.unwrap();
        SupplierRepo::create(&conn, &fields("Бета")).unwrap();
        SupplierRepo::set_status(&conn, a, SupplierStatus::Inactive).unwrap();

        let all = SupplierRepo::list(&conn, None).unwrap();
        assert_eq!(all[0].name, "Бета");
        assert_eq!(all[1].status, SupplierStatus::Inactive);

        let found = SupplierRepo::list(&conn, Some("камень")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Альфа");
    }

    #[test]
    fn test_update_replaces_given_relations_only() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let id = SupplierRepo::create(&conn, &SupplierFields {
            categories: Some(vec!["Растения".into()]),
            tags: Some(vec!["Есть отсрочка".into()]),
            ..fields("S")
        }).unwrap().id.unwrap();

        let updated = SupplierRepo::update(&conn, id, &SupplierFields {
            email: Some("sales@s.ru".into()),
            categories: Some(vec!["Удобрения".into()]),
            ..Default::default()
        }).unwrap();
        assert_eq!(updated.name, "S");
        assert_eq!(updated.email.as_deref(), Some("sales@s.ru"));
        assert_eq!(updated.categories, vec!["Удобрения"]);
        assert_eq!(updated.tags.len(), 1);
    }

    #[test]
    fn test_rating_aggregate() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let id = SupplierRepo::create(&conn, &fields("S")).unwrap().id.unwrap();
        RatingRepo::add(&conn, RatingTarget::Supplier, id, None, 3, None, "a").unwrap();
        RatingRepo::add(&conn, RatingTarget::Supplier, id, None, 4, None, "a").unwrap();
        assert_eq!(SupplierRepo::average_rating(&conn, id).unwrap(), Some(3.5));
        assert_eq!(SupplierRepo::get_by_id(&conn, id).unwrap().unwrap().rating, Some(3.5));
    }
}
