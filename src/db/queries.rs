use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::BookingRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn save_booking(conn: &Connection, record: &BookingRecord) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, vendor_id, vendor_name, status, channel, scheduled_start, confirmation_number, vendor_json, problem_json, result_json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id,
            record.vendor.id,
            record.vendor.name,
            record.result.status.as_str(),
            record.result.channel.as_str(),
            record
                .result
                .scheduled_start
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
            record.result.confirmation_number,
            serde_json::to_string(&record.vendor)?,
            serde_json::to_string(&record.problem)?,
            serde_json::to_string(&record.result)?,
            record.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<BookingRecord>> {
    let row = conn
        .query_row(
            "SELECT id, vendor_json, problem_json, result_json, created_at FROM bookings WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((id, vendor_json, problem_json, result_json, created_at)) = row else {
        return Ok(None);
    };

    Ok(Some(BookingRecord {
        id,
        vendor: serde_json::from_str(&vendor_json)?,
        problem: serde_json::from_str(&problem_json)?,
        result: serde_json::from_str(&result_json)?,
        created_at: NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)?,
    }))
}

pub fn count_bookings_by_status(conn: &Connection, status: &str) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE status = ?1",
        params![status],
        |row| row.get(0),
    )?;
    Ok(count)
}
