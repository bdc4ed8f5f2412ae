use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{validate_required, validate_title};
use crate::entity::event;
use crate::error::AppError;
use crate::registry::schedule;

/// Request body for creating or updating an event.
///
/// Updates overwrite every editable attribute; participants, the participant
/// count and the creator are never taken from the body.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[schema(example = "Spring Hackathon")]
    pub title: String,
    #[schema(example = "24 hours of building things.")]
    pub description: Option<String>,
    #[schema(value_type = String, format = Date, example = "2026-11-20")]
    pub date: NaiveDate,
    /// Start time; midnight is assumed when omitted.
    #[schema(value_type = Option<String>, example = "09:30:00")]
    pub time: Option<NaiveTime>,
    #[schema(example = "Computer Science")]
    pub department: String,
    #[schema(example = "Main Auditorium")]
    pub location: String,
    #[schema(example = 120)]
    pub max_participants: i32,
    pub image: Option<String>,
}

pub fn validate_event_request(payload: &EventRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    validate_required(&payload.department, "Department", 100)?;
    validate_required(&payload.location, "Location", 200)?;
    if payload.max_participants < 1 {
        return Err(AppError::Validation(
            "maxParticipants must be at least 1".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Substring matched case-insensitively against title and description.
    pub q: String,
}

/// External representation of an event.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub time: Option<NaiveTime>,
    pub department: String,
    pub location: String,
    pub max_participants: i32,
    pub current_participants: i32,
    pub image: Option<String>,
    /// Stored flag OR the event has already started.
    pub registration_closed: bool,
    /// Creator's email.
    pub created_by: String,
    /// Participant emails, sorted.
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn build(
        model: event::Model,
        created_by: String,
        mut participants: Vec<String>,
        now: NaiveDateTime,
    ) -> Self {
        participants.sort();
        participants.dedup();
        let registration_closed = schedule::effective_closed(&model, now);
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            date: model.date,
            time: model.time,
            department: model.department,
            location: model.location,
            max_participants: model.max_participants,
            current_participants: model.current_participants,
            image: model.image,
            registration_closed,
            created_by,
            participants,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
