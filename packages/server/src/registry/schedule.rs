//! Start-time derivation for events.
//!
//! An event's effective closed status is its stored `registration_closed`
//! flag OR'd with whether its scheduled start has been reached. The two can
//! disagree until the next write to the event.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::entity::event;

/// Current wall-clock time in the server's local zone.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Scheduled start; a missing time means midnight of `date`.
pub fn starts_at(date: NaiveDate, time: Option<NaiveTime>) -> NaiveDateTime {
    date.and_time(time.unwrap_or(NaiveTime::MIN))
}

/// True once `now` is at or past the scheduled start.
pub fn is_past_start(date: NaiveDate, time: Option<NaiveTime>, now: NaiveDateTime) -> bool {
    now >= starts_at(date, time)
}

pub fn has_started(event: &event::Model, now: NaiveDateTime) -> bool {
    is_past_start(event.date, event.time, now)
}

/// What API consumers see as `registrationClosed`.
pub fn effective_closed(event: &event::Model, now: NaiveDateTime) -> bool {
    event.registration_closed || has_started(event, now)
}
