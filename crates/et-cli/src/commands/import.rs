//! Import command for loading match events into the local `SQLite` store.
//!
//! Input is JSON Lines, one event per line:
//!
//! ```json
//! {"match":"m1","period":1,"seconds":15,"action":"Foul","team":"home","successful":false}
//! ```
//!
//! `id`, `team` and `successful` are optional. Actions accept both the
//! canonical snake case names and supplier display names.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{Context, Result};
use serde::Deserialize;

use et_core::{ActionType, MatchEvent, MatchId, Period, TeamId};
use et_db::{Database, EventRecord};

use crate::cli::ImportArgs;

pub fn run(args: &ImportArgs, db: &mut Database) -> Result<usize> {
    let events = match &args.file {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            parse_events(BufReader::new(file))?
        }
        None => parse_events(io::stdin().lock())?,
    };

    let inserted = db.insert_events(&events)?;
    tracing::info!(
        read = events.len(),
        inserted,
        "imported match events"
    );
    Ok(inserted)
}

fn parse_events<R: BufRead>(reader: R) -> Result<Vec<EventRecord>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: ImportEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let record = parsed
            .into_record()
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        events.push(record);
    }
    Ok(events)
}

#[derive(Debug, Deserialize)]
struct ImportEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "match")]
    match_id: String,
    period: u8,
    seconds: u32,
    action: String,
    #[serde(default)]
    team: Option<String>,
    #[serde(default = "default_successful")]
    successful: bool,
}

const fn default_successful() -> bool {
    true
}

impl ImportEvent {
    fn into_record(self) -> Result<EventRecord> {
        let match_id = MatchId::new(self.match_id)?;
        let period = Period::new(self.period)?;
        let action: ActionType = self.action.parse()?;

        let mut event = MatchEvent::new(match_id, period, self.seconds, action);
        if let Some(team) = self.team.filter(|team| !team.trim().is_empty()) {
            event = event.with_team(TeamId::new(team)?);
        }
        if !self.successful {
            event = event.failed();
        }

        let id = self.id.filter(|id| !id.trim().is_empty());
        Ok(EventRecord::from_event(&event, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn test_parses_display_names_and_defaults() {
        let input = concat!(
            r#"{"id":"e1","match":"m1","period":1,"seconds":0,"action":"Start Period"}"#,
            "\n\n",
            r#"{"match":"m1","period":1,"seconds":15,"action":"foul","team":"home","successful":false}"#,
            "\n",
        );
        let events = parse_events(Cursor::new(input)).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "e1");
        assert_eq!(events[0].action, "start_period");
        assert!(events[0].is_success);
        assert_eq!(events[0].team, None);

        assert!(!events[1].id.is_empty());
        assert_eq!(events[1].team.as_deref(), Some("home"));
        assert!(!events[1].is_success);
    }

    #[test]
    fn test_rejects_unknown_action() {
        let input = r#"{"match":"m1","period":1,"seconds":3,"action":"moonwalk"}"#;
        let err = parse_events(Cursor::new(input)).unwrap_err();
        assert_eq!(err.to_string(), "invalid event on line 1");
        assert!(format!("{err:#}").contains("unknown action type: moonwalk"));
    }

    #[test]
    fn test_rejects_period_zero() {
        let input = r#"{"match":"m1","period":0,"seconds":3,"action":"pass"}"#;
        assert!(parse_events(Cursor::new(input)).is_err());
    }

    #[test]
    fn test_reports_line_of_malformed_json() {
        let input = "{\"match\":\"m1\",\"period\":1,\"seconds\":3,\"action\":\"pass\"}\nnot json\n";
        let err = parse_events(Cursor::new(input)).unwrap_err();
        assert_eq!(err.to_string(), "invalid JSON on line 2");
    }
}
