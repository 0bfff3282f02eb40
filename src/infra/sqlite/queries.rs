use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, types::Value, Connection, OptionalExtension};

use crate::domain::entities::control::{Control, ControlDetail, ControlWithDetails, NewControl};
use crate::domain::entities::customer::{Customer, CustomerFilter};
use crate::domain::entities::edit::ChangeBatch;
use crate::domain::entities::row::{RecordId, Stored};
use crate::infra::sqlite::schema::open_connection;

const CUSTOMER_COLUMNS: &str = "id, code, name, address, phone_number, email_address";

pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

fn customer_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Stored<Customer>> {
    Ok(Stored {
        id: RecordId(row.get(0)?),
        record: Customer {
            code: row.get(1)?,
            name: row.get(2)?,
            address: row.get(3)?,
            phone_number: row.get(4)?,
            email_address: row.get(5)?,
        },
    })
}

fn detail_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Stored<ControlDetail>> {
    Ok(Stored {
        id: RecordId(row.get(0)?),
        record: ControlDetail {
            code: row.get(1)?,
            name: row.get(2)?,
        },
    })
}

fn control_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Control> {
    Ok(Control {
        id: RecordId(row.get(0)?),
        code: row.get(1)?,
        name: row.get(2)?,
    })
}

fn like_term(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            let escaped = v
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
}

/// Newest customers first; `name` and `code` are substring matches.
pub fn find_customers(db_path: &Path, filter: &CustomerFilter) -> Result<Vec<Stored<Customer>>> {
    let conn = open_connection(db_path)?;

    let mut filter_clauses = Vec::new();
    let mut filter_params = Vec::<Value>::new();
    if let Some(term) = like_term(filter.name.as_deref()) {
        filter_clauses.push("name LIKE ? ESCAPE '\\'");
        filter_params.push(Value::Text(term));
    }
    if let Some(term) = like_term(filter.code.as_deref()) {
        filter_clauses.push("code LIKE ? ESCAPE '\\'");
        filter_params.push(Value::Text(term));
    }
    let where_sql = if filter_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", filter_clauses.join(" AND "))
    };

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS}
             FROM customer
             {where_sql}
             ORDER BY created_at DESC, id DESC"
        ))
        .context("failed to prepare customers query")?;
    let customers = stmt
        .query_map(rusqlite::params_from_iter(filter_params), customer_from_row)
        .context("failed to query customers")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect customers")?;

    Ok(customers)
}

fn load_customer(conn: &Connection, id: RecordId) -> Result<Option<Stored<Customer>>> {
    conn.query_row(
        &format!("SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = ?1"),
        [id.0],
        customer_from_row,
    )
    .optional()
    .with_context(|| format!("failed to load customer {id}"))
}

/// Applies every create, update and delete in one transaction. Any failure,
/// including a missing id, rolls the whole batch back.
pub fn bulk_upsert_customers(
    db_path: &Path,
    batch: &ChangeBatch<Customer>,
) -> Result<Vec<Stored<Customer>>> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start customer bulk transaction")?;
    let now = now_timestamp();
    let mut results = Vec::with_capacity(batch.len());

    for customer in &batch.creates {
        tx.execute(
            "INSERT INTO customer(code, name, address, phone_number, email_address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                customer.code,
                customer.name,
                customer.address,
                customer.phone_number,
                customer.email_address,
                now
            ],
        )
        .context("failed to insert customer")?;
        results.push(Stored {
            id: RecordId(tx.last_insert_rowid()),
            record: customer.clone(),
        });
    }

    for stored in &batch.updates {
        let customer = &stored.record;
        let changed = tx
            .execute(
                "UPDATE customer
                 SET code = ?1, name = ?2, address = ?3, phone_number = ?4,
                     email_address = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    customer.code,
                    customer.name,
                    customer.address,
                    customer.phone_number,
                    customer.email_address,
                    now,
                    stored.id.0
                ],
            )
            .with_context(|| format!("failed to update customer {}", stored.id))?;
        if changed == 0 {
            anyhow::bail!("customer {} does not exist", stored.id);
        }
        results.push(stored.clone());
    }

    for id in &batch.deletes {
        let Some(existing) = load_customer(&tx, *id)? else {
            anyhow::bail!("customer {id} does not exist");
        };
        tx.execute("DELETE FROM customer WHERE id = ?1", [id.0])
            .with_context(|| format!("failed to delete customer {id}"))?;
        results.push(existing);
    }

    tx.commit()
        .context("failed to commit customer bulk transaction")?;
    Ok(results)
}

fn load_details(conn: &Connection, control_id: RecordId) -> Result<Vec<Stored<ControlDetail>>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, code, name
             FROM control_detail
             WHERE control_id = ?1
             ORDER BY created_at ASC, id ASC",
        )
        .context("failed to prepare control details query")?;
    let details = stmt
        .query_map([control_id.0], detail_from_row)
        .with_context(|| format!("failed to query details of control {control_id}"))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect control details")?;
    Ok(details)
}

/// Oldest controls first, each with its details.
pub fn find_controls(db_path: &Path) -> Result<Vec<ControlWithDetails>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, code, name
             FROM control
             ORDER BY created_at ASC, id ASC",
        )
        .context("failed to prepare controls query")?;
    let controls = stmt
        .query_map([], control_from_row)
        .context("failed to query controls")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect controls")?;
    drop(stmt);

    let mut result = Vec::with_capacity(controls.len());
    for control in controls {
        let details = load_details(&conn, control.id)?;
        result.push(ControlWithDetails { control, details });
    }
    Ok(result)
}

pub fn find_control_by_code(db_path: &Path, code: &str) -> Result<Option<ControlWithDetails>> {
    let conn = open_connection(db_path)?;
    let control = conn
        .query_row(
            "SELECT id, code, name FROM control WHERE code = ?1",
            [code],
            control_from_row,
        )
        .optional()
        .with_context(|| format!("failed to query control by code: {code}"))?;

    match control {
        Some(control) => {
            let details = load_details(&conn, control.id)?;
            Ok(Some(ControlWithDetails { control, details }))
        }
        None => Ok(None),
    }
}

pub fn create_control(db_path: &Path, control: &NewControl) -> Result<Control> {
    let conn = open_connection(db_path)?;
    let now = now_timestamp();
    conn.execute(
        "INSERT INTO control(code, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![control.code, control.name, now],
    )
    .with_context(|| format!("failed to insert control: {}", control.code))?;

    Ok(Control {
        id: RecordId(conn.last_insert_rowid()),
        code: control.code.clone(),
        name: control.name.clone(),
    })
}

/// Same contract as [`bulk_upsert_customers`], scoped to one parent control:
/// updates and deletes only match details of `control_id`.
pub fn bulk_upsert_details(
    db_path: &Path,
    control_id: RecordId,
    batch: &ChangeBatch<ControlDetail>,
) -> Result<Vec<Stored<ControlDetail>>> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start control detail bulk transaction")?;

    let parent_exists = tx
        .query_row("SELECT 1 FROM control WHERE id = ?1", [control_id.0], |_| Ok(()))
        .optional()
        .with_context(|| format!("failed to look up control {control_id}"))?
        .is_some();
    if !parent_exists {
        anyhow::bail!("control {control_id} does not exist");
    }

    let now = now_timestamp();
    let mut results = Vec::with_capacity(batch.len());

    for detail in &batch.creates {
        tx.execute(
            "INSERT INTO control_detail(control_id, code, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![control_id.0, detail.code, detail.name, now],
        )
        .context("failed to insert control detail")?;
        results.push(Stored {
            id: RecordId(tx.last_insert_rowid()),
            record: detail.clone(),
        });
    }

    for stored in &batch.updates {
        let changed = tx
            .execute(
                "UPDATE control_detail
                 SET code = ?1, name = ?2, updated_at = ?3
                 WHERE id = ?4 AND control_id = ?5",
                params![
                    stored.record.code,
                    stored.record.name,
                    now,
                    stored.id.0,
                    control_id.0
                ],
            )
            .with_context(|| format!("failed to update control detail {}", stored.id))?;
        if changed == 0 {
            anyhow::bail!(
                "control detail {} does not exist under control {control_id}",
                stored.id
            );
        }
        results.push(stored.clone());
    }

    for id in &batch.deletes {
        let existing = tx
            .query_row(
                "SELECT id, code, name FROM control_detail WHERE id = ?1 AND control_id = ?2",
                [id.0, control_id.0],
                detail_from_row,
            )
            .optional()
            .with_context(|| format!("failed to load control detail {id}"))?;
        let Some(existing) = existing else {
            anyhow::bail!("control detail {id} does not exist under control {control_id}");
        };
        tx.execute("DELETE FROM control_detail WHERE id = ?1", [id.0])
            .with_context(|| format!("failed to delete control detail {id}"))?;
        results.push(existing);
    }

    tx.commit()
        .context("failed to commit control detail bulk transaction")?;
    Ok(results)
}
