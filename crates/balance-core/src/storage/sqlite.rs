//! SQLite-backed durable store.
//!
//! Provides persistent storage for:
//! - Fitness and mental health records (tracked flags, values, streaks)
//! - The custom goal container and its goals

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use uuid::Uuid;

use super::{data_dir, migrations, DurableStore, EntityGraph};
use crate::error::{DatabaseError, Result};
use crate::goals::{CategoryRecord, CustomGoal, CustomGoalsRecord, FitnessRecord, MentalHealthRecord, Metric, Streak};

const CONTAINER_ID: i64 = 1;

#[derive(Debug, Clone)]
enum Staged {
    Insert(CustomGoal),
    Delete(Uuid),
}

/// SQLite database holding every Balance entity.
pub struct SqliteStore {
    conn: Connection,
    staged: Vec<Staged>,
}

impl SqliteStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/balance.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("balance.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(DatabaseError::from)?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn,
            staged: Vec::new(),
        })
    }

    /// Number of inserts/deletes waiting for the next save.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    fn fetch_category<M: Metric>(&self) -> Result<Option<CategoryRecord<M>>> {
        let category = M::CATEGORY.as_str();
        let updated_at: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM category_records WHERE category = ?1",
                params![category],
                |row| row.get(0),
            )
            .optional()
            .map_err(DatabaseError::from)?;
        let Some(updated_at) = updated_at else {
            return Ok(None);
        };

        let mut record = CategoryRecord::<M>::new();

        let mut stmt = self
            .conn
            .prepare("SELECT metric, tracked, value FROM metric_values WHERE category = ?1")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![category], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, u32>(2)?,
                ))
            })
            .map_err(DatabaseError::from)?;
        for row in rows {
            let (metric, tracked, value) = row.map_err(DatabaseError::from)?;
            let metric = parse_metric::<M>("metric_values", &metric)?;
            record.set_tracked(metric, tracked);
            record.set_value(metric, value);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT metric, current, longest FROM streaks WHERE category = ?1")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![category], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u32>(2)?,
                ))
            })
            .map_err(DatabaseError::from)?;
        for row in rows {
            let (metric, current, longest) = row.map_err(DatabaseError::from)?;
            let metric = parse_metric::<M>("streaks", &metric)?;
            record.restore_streak(metric, Streak::from_parts(current, longest));
        }

        record.updated_at = parse_timestamp("category_records", &updated_at)?;
        Ok(Some(record))
    }
}

impl DurableStore for SqliteStore {
    fn fetch_fitness(&self) -> Result<Option<FitnessRecord>> {
        self.fetch_category()
    }

    fn fetch_mental_health(&self) -> Result<Option<MentalHealthRecord>> {
        self.fetch_category()
    }

    fn fetch_custom_goals(&self) -> Result<Option<CustomGoalsRecord>> {
        let onboarded: Option<bool> = self
            .conn
            .query_row(
                "SELECT is_onboarding_complete FROM custom_goals_record WHERE id = ?1",
                params![CONTAINER_ID],
                |row| row.get(0),
            )
            .optional()
            .map_err(DatabaseError::from)?;
        let Some(onboarded) = onboarded else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, target, progress, is_checkable, created_at
                 FROM custom_goals
                 WHERE record_id = ?1
                 ORDER BY created_at, rowid",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![CONTAINER_ID], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut goals = Vec::new();
        for row in rows {
            let (id, name, target, progress, is_checkable, created_at) =
                row.map_err(DatabaseError::from)?;
            let id = Uuid::parse_str(&id).map_err(|e| DatabaseError::CorruptRow {
                table: "custom_goals",
                message: format!("bad id '{id}': {e}"),
            })?;
            goals.push(CustomGoal {
                id,
                name,
                target,
                progress,
                is_checkable,
                created_at: parse_timestamp("custom_goals", &created_at)?,
            });
        }

        Ok(Some(CustomGoalsRecord::with_goals(onboarded, goals)))
    }

    fn insert_custom_goal(&mut self, goal: &CustomGoal) -> Result<()> {
        self.staged.push(Staged::Insert(goal.clone()));
        Ok(())
    }

    fn delete_custom_goal(&mut self, id: Uuid) -> Result<()> {
        self.staged.push(Staged::Delete(id));
        Ok(())
    }

    fn save(&mut self, graph: &EntityGraph<'_>) -> Result<()> {
        let tx = self.conn.transaction().map_err(DatabaseError::from)?;

        if let Some(record) = graph.fitness {
            write_category(&tx, record)?;
        }
        if let Some(record) = graph.mental_health {
            write_category(&tx, record)?;
        }
        if let Some(container) = graph.custom_goals {
            write_container(&tx, container)?;
        }
        for change in &self.staged {
            match change {
                Staged::Insert(goal) => write_goal(&tx, goal)?,
                Staged::Delete(id) => {
                    tx.execute("DELETE FROM custom_goals WHERE id = ?1", params![id.to_string()])
                        .map_err(DatabaseError::from)?;
                }
            }
        }

        tx.commit()
            .map_err(|e| DatabaseError::SaveFailed(e.to_string()))?;
        self.staged.clear();
        Ok(())
    }

    fn discard_staged(&mut self) {
        if !self.staged.is_empty() {
            tracing::debug!(count = self.staged.len(), "discarding uncommitted goal changes");
        }
        self.staged.clear();
    }

    fn wipe(&mut self) -> Result<()> {
        let tx = self.conn.transaction().map_err(DatabaseError::from)?;
        tx.execute_batch(
            "DELETE FROM custom_goals_record;
             DELETE FROM category_records;",
        )
        .map_err(DatabaseError::from)?;
        tx.commit().map_err(DatabaseError::from)?;
        self.staged.clear();
        Ok(())
    }
}

fn write_category<M: Metric>(tx: &Transaction<'_>, record: &CategoryRecord<M>) -> Result<()> {
    let category = M::CATEGORY.as_str();
    tx.execute(
        "INSERT INTO category_records (category, updated_at) VALUES (?1, ?2)
         ON CONFLICT(category) DO UPDATE SET updated_at = excluded.updated_at",
        params![category, record.updated_at.to_rfc3339_opts(SecondsFormat::Nanos, true)],
    )
    .map_err(DatabaseError::from)?;

    for metric in M::ALL {
        tx.execute(
            "INSERT INTO metric_values (category, metric, tracked, value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(category, metric) DO UPDATE SET tracked = excluded.tracked, value = excluded.value",
            params![
                category,
                metric.as_str(),
                record.is_tracked(*metric),
                record.value(*metric)
            ],
        )
        .map_err(DatabaseError::from)?;
    }

    for (metric, streak) in record.streaks() {
        tx.execute(
            "INSERT INTO streaks (category, metric, current, longest) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(category, metric) DO UPDATE SET current = excluded.current, longest = excluded.longest",
            params![category, metric.as_str(), streak.current(), streak.longest()],
        )
        .map_err(DatabaseError::from)?;
    }
    Ok(())
}

fn write_container(tx: &Transaction<'_>, container: &CustomGoalsRecord) -> Result<()> {
    tx.execute(
        "INSERT INTO custom_goals_record (id, is_onboarding_complete) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET is_onboarding_complete = excluded.is_onboarding_complete",
        params![CONTAINER_ID, container.is_onboarding_complete],
    )
    .map_err(DatabaseError::from)?;

    for goal in container.goals() {
        write_goal(tx, goal)?;
    }
    Ok(())
}

fn write_goal(tx: &Transaction<'_>, goal: &CustomGoal) -> Result<()> {
    tx.execute(
        "INSERT INTO custom_goals (id, record_id, name, target, progress, is_checkable, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            target = excluded.target,
            progress = excluded.progress,
            is_checkable = excluded.is_checkable",
        params![
            goal.id.to_string(),
            CONTAINER_ID,
            goal.name,
            goal.target,
            goal.progress,
            goal.is_checkable,
            goal.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        ],
    )
    .map_err(DatabaseError::from)?;
    Ok(())
}

fn parse_metric<M: Metric>(table: &'static str, raw: &str) -> Result<M> {
    M::parse(raw).ok_or_else(|| {
        DatabaseError::CorruptRow {
            table,
            message: format!("unknown metric '{raw}'"),
        }
        .into()
    })
}

fn parse_timestamp(table: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::CorruptRow {
                table,
                message: format!("bad timestamp '{raw}': {e}"),
            }
            .into()
        })
}
