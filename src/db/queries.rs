use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::models::Appointment;

pub fn insert_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (name, email, phone, date) VALUES (?1, ?2, ?3, ?4)",
        params![
            appointment.name,
            appointment.email,
            appointment.phone,
            appointment.date.format("%Y-%m-%d").to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt =
        conn.prepare("SELECT name, email, phone, date FROM appointments ORDER BY id ASC")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        let (name, email, phone, date_str) = row?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            anyhow::anyhow!("corrupt appointment date {date_str:?}: {e}")
        })?;
        appointments.push(Appointment {
            name,
            email,
            phone,
            date,
        });
    }
    Ok(appointments)
}
