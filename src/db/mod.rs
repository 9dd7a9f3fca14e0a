pub mod migrations;
pub mod queries;

use std::sync::Mutex;

use anyhow::Context;
use rusqlite::Connection;

use crate::models::Appointment;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Append-only record of confirmed appointments, in booking order.
pub trait AppointmentStore: Send + Sync {
    fn append(&self, appointment: &Appointment) -> anyhow::Result<()>;
    fn list(&self) -> anyhow::Result<Vec<Appointment>>;
}

pub struct SqliteAppointmentStore {
    conn: Mutex<Connection>,
}

impl SqliteAppointmentStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self::new(init_db(path)?))
    }
}

impl AppointmentStore for SqliteAppointmentStore {
    fn append(&self, appointment: &Appointment) -> anyhow::Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("appointment store lock poisoned"))?;
        queries::insert_appointment(&conn, appointment)
    }

    fn list(&self) -> anyhow::Result<Vec<Appointment>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("appointment store lock poisoned"))?;
        queries::list_appointments(&conn)
    }
}
