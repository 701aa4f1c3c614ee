use chrono::NaiveDate;
use fitdesk_core::types::{Member, WorkoutSession};
use fitdesk_core::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// SQLite-backed store for members and their workout sessions.
///
/// The handle is cheap to clone and internally synchronized; it is owned by
/// the HTTP layer and passed into each request handler, never kept as a
/// process global. Every operation is a single auto-committed statement.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<Mutex<Connection>>,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl RecordStore {
    /// Open (or create) the records database at the given path.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create db directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| Error::Storage(format!("Failed to open records db: {}", e)))?;

        // WAL for better concurrent read behavior. Foreign keys stay at the
        // engine default (off): the member-to-session reference is declared in
        // the DDL but deleting a member leaves its sessions behind.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=OFF;")
            .ok();

        let store = Self {
            inner: Arc::new(Mutex::new(conn)),
            db_path: db_path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.inner
            .lock()
            .map_err(|e| Error::Storage(format!("Lock error: {}", e)))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS Members (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                age INTEGER
            );

            CREATE TABLE IF NOT EXISTS WorkoutSessions (
                session_id INTEGER PRIMARY KEY,
                member_id INTEGER NOT NULL REFERENCES Members(id),
                session_date TEXT,
                session_time TEXT,
                activity TEXT
            );
            ",
        )
        .map_err(|e| Error::Storage(format!("Failed to init records schema: {}", e)))?;

        debug!("Record store schema initialized");
        Ok(())
    }

    /// All members, full set, no pagination.
    pub fn list_members(&self) -> Result<Vec<Member>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, age FROM Members")
            .map_err(|e| Error::Storage(format!("Prepare error: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Member {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    age: row.get("age")?,
                })
            })
            .map_err(|e| Error::Storage(format!("Query error: {}", e)))?;

        let mut members = Vec::new();
        for row in rows {
            members.push(row.map_err(|e| Error::Storage(format!("Row error: {}", e)))?);
        }
        Ok(members)
    }

    /// Insert a member with its caller-supplied primary key. A duplicate id
    /// is a constraint violation and surfaces as a storage error, not a
    /// validation error.
    pub fn create_member(&self, member: &Member) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO Members (id, name, age) VALUES (?1, ?2, ?3)",
            params![member.id, member.name, member.age],
        )
        .map_err(|e| Error::Storage(format!("Insert error: {}", e)))?;

        debug!(id = member.id, "Member inserted");
        Ok(())
    }

    /// Overwrite `name` and `age` in place, leaving `id` unchanged.
    pub fn update_member(&self, id: i64, name: &str, age: Option<i64>) -> Result<()> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "UPDATE Members SET name = ?1, age = ?2 WHERE id = ?3",
                params![name, age, id],
            )
            .map_err(|e| Error::Storage(format!("Update error: {}", e)))?;

        if affected == 0 {
            return Err(Error::NotFound(format!("member {} not found", id)));
        }
        debug!(id, "Member updated");
        Ok(())
    }

    /// Remove a member row. Referencing sessions are left in place: no
    /// cascade is defined and the engine does not enforce the declared
    /// foreign key.
    pub fn delete_member(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let affected = conn
            .execute("DELETE FROM Members WHERE id = ?1", params![id])
            .map_err(|e| Error::Storage(format!("Delete error: {}", e)))?;

        if affected == 0 {
            return Err(Error::NotFound(format!("member {} not found", id)));
        }
        debug!(id, "Member deleted");
        Ok(())
    }

    /// All workout sessions, full set.
    pub fn list_sessions(&self) -> Result<Vec<WorkoutSession>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT session_id, member_id, session_date, session_time, activity
                 FROM WorkoutSessions",
            )
            .map_err(|e| Error::Storage(format!("Prepare error: {}", e)))?;

        let rows = stmt
            .query_map([], session_from_row)
            .map_err(|e| Error::Storage(format!("Query error: {}", e)))?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row.map_err(|e| Error::Storage(format!("Row error: {}", e)))?);
        }
        Ok(sessions)
    }

    /// Insert a session with its caller-supplied primary key. The member
    /// reference is not checked here; with foreign keys unenforced an
    /// unknown `member_id` is accepted.
    pub fn create_session(&self, session: &WorkoutSession) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO WorkoutSessions (session_id, member_id, session_date, session_time, activity)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.session_id,
                session.member_id,
                session.session_date,
                session.session_time,
                session.activity
            ],
        )
        .map_err(|e| Error::Storage(format!("Insert error: {}", e)))?;

        debug!(session_id = session.session_id, "Workout session inserted");
        Ok(())
    }

    /// Overwrite the four mutable fields in place, leaving `session_id`
    /// unchanged.
    pub fn update_session(
        &self,
        session_id: i64,
        member_id: i64,
        session_date: Option<NaiveDate>,
        session_time: Option<&str>,
        activity: Option<&str>,
    ) -> Result<()> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "UPDATE WorkoutSessions
                 SET member_id = ?1, session_date = ?2, session_time = ?3, activity = ?4
                 WHERE session_id = ?5",
                params![member_id, session_date, session_time, activity, session_id],
            )
            .map_err(|e| Error::Storage(format!("Update error: {}", e)))?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "workout session {} not found",
                session_id
            )));
        }
        debug!(session_id, "Workout session updated");
        Ok(())
    }

    /// Sessions of the first member whose `name` equals the argument (order
    /// undefined when names collide). Not-found when no member matches.
    pub fn sessions_by_member_name(&self, name: &str) -> Result<Vec<WorkoutSession>> {
        let conn = self.lock()?;
        let member_id: Option<i64> = conn
            .query_row(
                "SELECT id FROM Members WHERE name = ?1 LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Storage(format!("Query error: {}", e)))?;

        let member_id = member_id
            .ok_or_else(|| Error::NotFound(format!("member named '{}' not found", name)))?;

        let mut stmt = conn
            .prepare(
                "SELECT session_id, member_id, session_date, session_time, activity
                 FROM WorkoutSessions WHERE member_id = ?1",
            )
            .map_err(|e| Error::Storage(format!("Prepare error: {}", e)))?;

        let rows = stmt
            .query_map(params![member_id], session_from_row)
            .map_err(|e| Error::Storage(format!("Query error: {}", e)))?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row.map_err(|e| Error::Storage(format!("Row error: {}", e)))?);
        }
        Ok(sessions)
    }

    /// Row counts per table, for the status report.
    pub fn stats(&self) -> Result<serde_json::Value> {
        let conn = self.lock()?;

        let members: i64 = conn
            .query_row("SELECT COUNT(*) FROM Members", [], |row| row.get(0))
            .unwrap_or(0);

        let sessions: i64 = conn
            .query_row("SELECT COUNT(*) FROM WorkoutSessions", [], |row| row.get(0))
            .unwrap_or(0);

        Ok(serde_json::json!({
            "members": members,
            "workout_sessions": sessions,
        }))
    }
}

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkoutSession> {
    Ok(WorkoutSession {
        session_id: row.get("session_id")?,
        member_id: row.get("member_id")?,
        session_date: row.get("session_date")?,
        session_time: row.get("session_time")?,
        activity: row.get("activity")?,
    })
}
