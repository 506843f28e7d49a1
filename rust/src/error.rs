//! Error types for rota generation and storage.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::PeriodId;

/// Errors raised by a `RotaStore`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Rota period {0} already exists")]
    DuplicatePeriod(PeriodId),
    #[error("Member {member_id} assigned twice in week {week_start} of period {period_id}")]
    DuplicateAssignment {
        period_id: PeriodId,
        week_start: NaiveDate,
        member_id: i64,
    },
    #[error("Unknown member: {0}")]
    UnknownMember(i64),
    #[error("Unknown rota period: {0}")]
    UnknownPeriod(PeriodId),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Errors that abort a period generation.
///
/// Any of these leaves the store exactly as it was before the attempt.
#[derive(Error, Debug)]
pub enum RotaError {
    /// Roster, catalog or linkage misconfiguration detected before any week ran.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A special shift could not reach its minimum headcount.
    #[error(
        "Cannot fill shift '{shift}' for week starting {week_start}: \
         need {required} member(s), only {assigned} eligible"
    )]
    InfeasibleWeek {
        week_start: NaiveDate,
        shift: String,
        required: u32,
        assigned: u32,
    },
    /// Post-assignment invariant violation.
    #[error("Validation failed for shift '{shift}' in week starting {week_start}: {reason}")]
    Validation {
        week_start: NaiveDate,
        shift: String,
        reason: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RotaError {
    /// Start date of the week that failed, for week-level failures.
    pub fn week_start(&self) -> Option<NaiveDate> {
        match self {
            RotaError::InfeasibleWeek { week_start, .. }
            | RotaError::Validation { week_start, .. } => Some(*week_start),
            _ => None,
        }
    }
}
