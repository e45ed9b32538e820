//! Storage layer for match events and effective time results.
//!
//! Provides persistence using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved to another thread but not shared. Batch analysis
//! therefore loads every stream up front and only then fans out to worker
//! threads (see [`et_core::MatchAnalytics::effective_time_for_matches`]).
//!
//! # Schema
//!
//! `match_events` holds one row per observed action. Reads are ordered by
//! `(period, period_secs, rowid)`, so events sharing a timestamp keep their
//! insertion order.
//!
//! `effective_time` is append-only: every closed analysis adds one row per
//! period, stamped with `computed_at` (ISO 8601, UTC). The latest row per
//! `(match_id, period)` is the current figure.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use et_core::{
    ActionType, EventSource, MatchEvent, MatchId, Period, PeriodTotal, SinkError, TeamId,
    TotalsExporter,
};
use rusqlite::{Connection, params};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored row does not describe a valid match event.
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: String, message: String },
    /// An effective time total does not fit the results table.
    #[error("effective time for {match_id} period {period} out of range: {seconds}s")]
    SecondsOutOfRange {
        match_id: String,
        period: u8,
        seconds: u64,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A match event as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: String,
    pub match_id: String,
    pub period: u8,
    pub period_secs: u32,
    pub action: String,
    pub team: Option<String>,
    pub is_success: bool,
}

impl EventRecord {
    /// Builds a record for an event, generating an ID when none is given.
    pub fn from_event(event: &MatchEvent, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            match_id: event.match_id.to_string(),
            period: event.period.value(),
            period_secs: event.seconds,
            action: event.action.to_string(),
            team: event.team.as_ref().map(ToString::to_string),
            is_success: event.successful,
        }
    }

    /// Converts the stored row back into a typed event.
    pub fn to_event(&self) -> Result<MatchEvent, DbError> {
        let invalid = |message: String| DbError::InvalidEventData {
            event_id: self.id.clone(),
            message,
        };
        let match_id = MatchId::new(self.match_id.as_str()).map_err(|e| invalid(e.to_string()))?;
        let period = Period::new(self.period).map_err(|e| invalid(e.to_string()))?;
        let action = self
            .action
            .parse::<ActionType>()
            .map_err(|e| invalid(e.to_string()))?;
        let team = self
            .team
            .as_deref()
            .map(TeamId::new)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(MatchEvent {
            match_id,
            period,
            seconds: self.period_secs,
            action,
            team,
            successful: self.is_success,
        })
    }
}

/// An effective time row from the results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveTimeRecord {
    pub match_id: String,
    pub period: u8,
    pub seconds: i64,
    pub computed_at: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- period_secs: elapsed seconds within the period
            -- action: canonical action string (e.g., 'throw_in')
            CREATE TABLE IF NOT EXISTS match_events (
                id TEXT PRIMARY KEY,
                match_id TEXT NOT NULL,
                period INTEGER NOT NULL CHECK (period >= 1),
                period_secs INTEGER NOT NULL CHECK (period_secs >= 0),
                action TEXT NOT NULL,
                team TEXT,
                is_success INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_match_events_time
                ON match_events(match_id, period, period_secs);
            CREATE INDEX IF NOT EXISTS idx_match_events_action ON match_events(action);

            CREATE TABLE IF NOT EXISTS effective_time (
                match_id TEXT NOT NULL,
                period INTEGER NOT NULL,
                seconds INTEGER NOT NULL,
                computed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_effective_time_match
                ON effective_time(match_id, period);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of events, ignoring duplicates by ID.
    pub fn insert_events(&mut self, events: &[EventRecord]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO match_events
                (id, match_id, period, period_secs, action, team, is_success)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for event in events {
                inserted += stmt.execute(params![
                    event.id,
                    event.match_id,
                    event.period,
                    event.period_secs,
                    event.action,
                    event.team,
                    event.is_success,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, total = events.len(), "stored match events");
        Ok(inserted)
    }

    /// Lists the events of a match, optionally restricted to one period, in
    /// match time order.
    pub fn list_events(
        &self,
        match_id: &str,
        period: Option<u8>,
    ) -> Result<Vec<EventRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, match_id, period, period_secs, action, team, is_success
            FROM match_events
            WHERE match_id = ?1 AND (?2 IS NULL OR period = ?2)
            ORDER BY period ASC, period_secs ASC, rowid ASC
            ",
        )?;
        let rows = stmt.query_map(params![match_id, period], |row| {
            Ok(EventRecord {
                id: row.get(0)?,
                match_id: row.get(1)?,
                period: row.get(2)?,
                period_secs: row.get(3)?,
                action: row.get(4)?,
                team: row.get(5)?,
                is_success: row.get(6)?,
            })
        })?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Lists distinct match IDs ordered by ID.
    pub fn list_matches(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT match_id FROM match_events ORDER BY match_id ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut matches = Vec::new();
        for row in rows {
            matches.push(row?);
        }
        Ok(matches)
    }

    /// Appends one effective time row per period total.
    pub fn append_effective_times(
        &self,
        totals: &[PeriodTotal],
        computed_at: DateTime<Utc>,
    ) -> Result<usize, DbError> {
        if totals.is_empty() {
            return Ok(0);
        }
        let computed_at = format_timestamp(computed_at);
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO effective_time (match_id, period, seconds, computed_at)
                VALUES (?, ?, ?, ?)
                ",
            )?;
            for total in totals {
                let seconds =
                    i64::try_from(total.seconds).map_err(|_| DbError::SecondsOutOfRange {
                        match_id: total.match_id.to_string(),
                        period: total.period.value(),
                        seconds: total.seconds,
                    })?;
                stmt.execute(params![
                    total.match_id.as_str(),
                    total.period.value(),
                    seconds,
                    computed_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(totals.len())
    }

    /// Lists stored effective time rows for a match, oldest first.
    pub fn list_effective_times(&self, match_id: &str) -> Result<Vec<EffectiveTimeRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT match_id, period, seconds, computed_at
            FROM effective_time
            WHERE match_id = ?
            ORDER BY computed_at ASC, rowid ASC
            ",
        )?;
        let rows = stmt.query_map([match_id], |row| {
            Ok(EffectiveTimeRecord {
                match_id: row.get(0)?,
                period: row.get(1)?,
                seconds: row.get(2)?,
                computed_at: row.get(3)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Returns an exporter writing closed totals to the `effective_time` table.
    pub fn results_exporter(&self) -> ResultsExporter<'_> {
        ResultsExporter {
            db: self,
            computed_at: Utc::now(),
        }
    }

    fn typed_events(&self, match_id: &MatchId, period: Option<u8>) -> Result<Vec<MatchEvent>, DbError> {
        self.list_events(match_id.as_str(), period)?
            .iter()
            .map(EventRecord::to_event)
            .collect()
    }
}

impl EventSource for Database {
    type Error = DbError;

    fn period_events(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<Vec<MatchEvent>, Self::Error> {
        self.typed_events(match_id, Some(period.value()))
    }

    fn match_events(&self, match_id: &MatchId) -> Result<Vec<MatchEvent>, Self::Error> {
        self.typed_events(match_id, None)
    }
}

/// Appends effective time totals to the results table when a machine closes.
pub struct ResultsExporter<'a> {
    db: &'a Database,
    computed_at: DateTime<Utc>,
}

impl TotalsExporter for ResultsExporter<'_> {
    fn export(&mut self, totals: &[PeriodTotal]) -> Result<(), SinkError> {
        let written = self
            .db
            .append_effective_times(totals, self.computed_at)
            .map_err(|err| SinkError::Export(Box::new(err)))?;
        tracing::debug!(written, "appended effective time rows");
        Ok(())
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
