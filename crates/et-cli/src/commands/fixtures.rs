//! Shared test data: two periods of one match plus a short second match.

use et_core::{ActionType, MatchEvent, MatchId, Period};
use et_db::{Database, EventRecord};

fn event(match_id: &str, period: u8, seconds: u32, action: ActionType) -> MatchEvent {
    MatchEvent::new(
        MatchId::new(match_id).unwrap(),
        Period::new(period).unwrap(),
        seconds,
        action,
    )
}

pub fn events() -> Vec<MatchEvent> {
    vec![
        event("m1", 1, 0, ActionType::StartPeriod),
        event("m1", 1, 10, ActionType::Pass),
        event("m1", 1, 15, ActionType::Foul).failed(),
        event("m1", 1, 20, ActionType::ThrowIn),
        event("m1", 1, 50, ActionType::Foul),
        event("m1", 1, 55, ActionType::Foul).failed(),
        event("m1", 1, 55, ActionType::Card),
        event("m1", 1, 58, ActionType::FreeKick),
        event("m1", 1, 90, ActionType::EndPeriod),
        event("m1", 2, 0, ActionType::StartPeriod),
        event("m1", 2, 40, ActionType::BallOut),
        event("m1", 2, 45, ActionType::ThrowIn),
        event("m1", 2, 95, ActionType::EndPeriod),
        event("m2", 1, 0, ActionType::StartPeriod),
        event("m2", 1, 30, ActionType::EndPeriod),
    ]
}

pub fn database() -> Database {
    let mut db = Database::open_in_memory().unwrap();
    let records: Vec<EventRecord> = events()
        .iter()
        .enumerate()
        .map(|(i, event)| EventRecord::from_event(event, Some(format!("e{i}"))))
        .collect();
    db.insert_events(&records).unwrap();
    db
}
