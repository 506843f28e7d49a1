//! SQLite-backed store.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{check_absence, check_write_set, RotaStore};
use crate::error::StoreError;
use crate::models::{
    AbsenceInterval, Member, PeriodId, Role, RotaPeriod, ShiftDefinition, WeeklyAssignment,
};

/// `RotaStore` over a single SQLite connection.
///
/// Foreign keys are enforced; deleting a period cascades to its assignments
/// and deleting a member cascades to their absences and assignments.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Private database that disappears when dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS shifts (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                min_members INTEGER NOT NULL,
                max_members INTEGER NOT NULL,
                is_default INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS absences (
                id INTEGER PRIMARY KEY,
                member_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rota_periods (
                period_id INTEGER PRIMARY KEY,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rota_assignments (
                period_id INTEGER NOT NULL REFERENCES rota_periods(period_id) ON DELETE CASCADE,
                week_start TEXT NOT NULL,
                member_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
                shift_id INTEGER NOT NULL REFERENCES shifts(id) ON DELETE CASCADE,
                PRIMARY KEY (period_id, week_start, member_id)
            );

            CREATE INDEX IF NOT EXISTS idx_absences_member ON absences(member_id);
            "#,
        )?;
        Ok(())
    }

    pub fn add_member(&mut self, member: &Member) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO members (id, name, role) VALUES (?1, ?2, ?3)",
            params![member.id, member.name, member.role.as_str()],
        )?;
        Ok(())
    }

    /// Remove a member together with their absences and rota rows.
    pub fn remove_member(&mut self, member_id: i64) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1", params![member_id])?;
        Ok(removed > 0)
    }

    pub fn add_shift(&mut self, shift: &ShiftDefinition) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO shifts
                (id, name, start_time, end_time, min_members, max_members, is_default)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                shift.id,
                shift.name,
                shift.start_time,
                shift.end_time,
                shift.min_members,
                shift.max_members,
                shift.is_default,
            ],
        )?;
        Ok(())
    }

    pub fn add_absence(&mut self, absence: &AbsenceInterval) -> Result<(), StoreError> {
        check_absence(absence)?;
        let known: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM members WHERE id = ?1",
                params![absence.member_id],
                |row| row.get(0),
            )
            .optional()?;
        if known.is_none() {
            return Err(StoreError::UnknownMember(absence.member_id));
        }

        self.conn.execute(
            "INSERT INTO absences (id, member_id, start_date, end_date) VALUES (?1, ?2, ?3, ?4)",
            params![
                absence.id,
                absence.member_id,
                absence.start_date,
                absence.end_date
            ],
        )?;
        Ok(())
    }
}

impl RotaStore for SqliteStore {
    fn members(&self) -> Result<Vec<Member>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, role FROM members ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut members = Vec::new();
        for row in rows {
            let (id, name, role) = row?;
            let role: Role = role.parse().map_err(StoreError::InvalidRecord)?;
            members.push(Member { id, name, role });
        }
        Ok(members)
    }

    fn shifts(&self) -> Result<Vec<ShiftDefinition>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, start_time, end_time, min_members, max_members, is_default
            FROM shifts ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ShiftDefinition {
                id: row.get(0)?,
                name: row.get(1)?,
                start_time: row.get::<_, NaiveTime>(2)?,
                end_time: row.get::<_, NaiveTime>(3)?,
                min_members: row.get(4)?,
                max_members: row.get(5)?,
                is_default: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn absences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AbsenceInterval>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, member_id, start_date, end_date FROM absences
            WHERE start_date <= ?2 AND end_date >= ?1
            ORDER BY member_id, start_date
            "#,
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok(AbsenceInterval {
                id: row.get(0)?,
                member_id: row.get(1)?,
                start_date: row.get(2)?,
                end_date: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn period_exists(&self, period_id: PeriodId) -> Result<bool, StoreError> {
        Ok(self.period(period_id)?.is_some())
    }

    fn period(&self, period_id: PeriodId) -> Result<Option<RotaPeriod>, StoreError> {
        let period = self
            .conn
            .query_row(
                "SELECT period_id, start_date, end_date FROM rota_periods WHERE period_id = ?1",
                params![period_id],
                |row| {
                    Ok(RotaPeriod {
                        period_id: row.get(0)?,
                        start_date: row.get(1)?,
                        end_date: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(period)
    }

    fn periods(&self) -> Result<Vec<RotaPeriod>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT period_id, start_date, end_date FROM rota_periods
            ORDER BY start_date DESC, period_id DESC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RotaPeriod {
                period_id: row.get(0)?,
                start_date: row.get(1)?,
                end_date: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn assignments(&self, period_id: PeriodId) -> Result<Vec<WeeklyAssignment>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT period_id, week_start, member_id, shift_id FROM rota_assignments
            WHERE period_id = ?1 ORDER BY week_start, member_id
            "#,
        )?;
        let rows = stmt.query_map(params![period_id], |row| {
            Ok(WeeklyAssignment {
                period_id: row.get(0)?,
                week_start: row.get(1)?,
                member_id: row.get(2)?,
                shift_id: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn commit_period(
        &mut self,
        period: &RotaPeriod,
        assignments: &[WeeklyAssignment],
    ) -> Result<(), StoreError> {
        if self.period_exists(period.period_id)? {
            return Err(StoreError::DuplicatePeriod(period.period_id));
        }
        check_write_set(period, assignments)?;

        // Dropping the transaction without commit rolls everything back
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO rota_periods (period_id, start_date, end_date) VALUES (?1, ?2, ?3)",
            params![period.period_id, period.start_date, period.end_date],
        )?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO rota_assignments (period_id, week_start, member_id, shift_id)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for a in assignments {
                stmt.execute(params![a.period_id, a.week_start, a.member_id, a.shift_id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_period(&mut self, period_id: PeriodId) -> Result<bool, StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM rota_periods WHERE period_id = ?1",
            params![period_id],
        )?;
        Ok(removed > 0)
    }
}
