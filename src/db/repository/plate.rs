use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{sample_plates, Plate};

const PLATE_COLUMNS: &str = "id, number, image, created_at";

fn plate_from_row(row: &Row<'_>) -> rusqlite::Result<Plate> {
    let raw_id = row.get::<_, String>(0)?;
    let id = Uuid::parse_str(&raw_id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Plate {
        id,
        number: row.get(1)?,
        image: row.get(2)?,
        created_at: row.get::<_, NaiveDateTime>(3)?,
    })
}

fn not_found(id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "plate".into(),
        id: id.to_string(),
    }
}

pub fn insert_plate(conn: &Connection, plate: &Plate) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO plates (id, number, image, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            plate.id.to_string(),
            plate.number,
            plate.image,
            plate.created_at,
        ],
    )?;
    Ok(())
}

/// Replace number and image of an existing plate. Creation time is kept.
pub fn update_plate(
    conn: &Connection,
    id: &Uuid,
    number: &str,
    image: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE plates SET number = ?2, image = ?3 WHERE id = ?1",
        params![id.to_string(), number, image],
    )?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub fn delete_plate(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM plates WHERE id = ?1", [id.to_string()])?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub fn get_plate(conn: &Connection, id: &Uuid) -> Result<Option<Plate>, DatabaseError> {
    let sql = format!("SELECT {PLATE_COLUMNS} FROM plates WHERE id = ?1");
    conn.query_row(&sql, [id.to_string()], plate_from_row)
        .optional()
        .map_err(DatabaseError::from)
}

/// All saved plates, most recently added first.
pub fn list_plates(conn: &Connection) -> Result<Vec<Plate>, DatabaseError> {
    let sql = format!(
        "SELECT {PLATE_COLUMNS} FROM plates ORDER BY created_at DESC, rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], plate_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Saved plate numbers only, in the same order as [`list_plates`].
pub fn known_plate_numbers(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT number FROM plates ORDER BY created_at DESC, rowid DESC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_plates(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM plates", [], |row| row.get(0))?;
    Ok(count)
}

/// Insert the demo plates when the store is empty. Returns how many were added.
pub fn seed_sample_plates_if_empty(conn: &Connection) -> Result<usize, DatabaseError> {
    if count_plates(conn)? > 0 {
        return Ok(0);
    }
    let samples = sample_plates();
    for plate in &samples {
        insert_plate(conn, plate)?;
    }
    tracing::info!(count = samples.len(), "Seeded sample plates");
    Ok(samples.len())
}
