use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func, LikeExpr, LockType, Query as SeaQuery};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionSession, TransactionTrait,
};

use super::{RegistryError, schedule};
use crate::entity::{event, event_participant, user};
use crate::models::event::{EventRequest, EventResponse};
use crate::models::role::Role;
use crate::models::shared::{escape_like, non_blank};

/// The user on whose behalf a mutating operation runs.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
}

/// Event records, their participant sets, and the open/closed registration state.
///
/// Every read-check-write sequence runs in one transaction holding a row lock
/// on the event, so concurrent registrations cannot overshoot capacity.
pub struct EventRegistry<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait> EventRegistry<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create_event(
        &self,
        payload: &EventRequest,
        actor: &Actor,
    ) -> Result<EventResponse, RegistryError> {
        let now = Utc::now();
        let new_event = event::ActiveModel {
            title: Set(payload.title.trim().to_string()),
            description: Set(non_blank(payload.description.clone())),
            date: Set(payload.date),
            time: Set(payload.time),
            department: Set(payload.department.trim().to_string()),
            location: Set(payload.location.trim().to_string()),
            max_participants: Set(payload.max_participants),
            current_participants: Set(0),
            image: Set(non_blank(payload.image.clone())),
            registration_closed: Set(false),
            created_by: Set(actor.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = new_event.insert(self.conn).await?;
        tracing::info!(event_id = model.id, created_by = actor.user_id, "Event created");

        self.hydrate_one(model).await
    }

    pub async fn get_event(&self, id: i32) -> Result<EventResponse, RegistryError> {
        let model = event::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(RegistryError::EventNotFound)?;
        self.hydrate_one(model).await
    }

    /// Overwrite the editable attributes of an event. Creator only.
    pub async fn update_event(
        &self,
        id: i32,
        payload: &EventRequest,
        actor: &Actor,
    ) -> Result<EventResponse, RegistryError> {
        let txn = self.conn.begin().await?;
        let existing = find_event_for_update(&txn, id).await?;

        if existing.created_by != actor.user_id {
            return Err(RegistryError::Forbidden(
                "You are not authorized to edit this event",
            ));
        }
        if payload.max_participants < existing.current_participants {
            return Err(RegistryError::Validation(format!(
                "maxParticipants cannot be lower than the {} current participants",
                existing.current_participants
            )));
        }

        let mut active: event::ActiveModel = existing.into();
        active.title = Set(payload.title.trim().to_string());
        active.description = Set(non_blank(payload.description.clone()));
        active.date = Set(payload.date);
        active.time = Set(payload.time);
        active.department = Set(payload.department.trim().to_string());
        active.location = Set(payload.location.trim().to_string());
        active.max_participants = Set(payload.max_participants);
        active.image = Set(non_blank(payload.image.clone()));
        active.updated_at = Set(Utc::now());

        let model = active.update(&txn).await?;
        txn.commit().await?;

        self.hydrate_one(model).await
    }

    /// Hard-delete an event and its participant rows. Creator only; admins get no override here.
    pub async fn delete_event(&self, id: i32, actor: &Actor) -> Result<(), RegistryError> {
        let txn = self.conn.begin().await?;
        let existing = find_event_for_update(&txn, id).await?;

        if existing.created_by != actor.user_id {
            return Err(RegistryError::Forbidden(
                "You are not authorized to delete this event",
            ));
        }

        event_participant::Entity::delete_many()
            .filter(event_participant::Column::EventId.eq(id))
            .exec(&txn)
            .await?;
        event::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!(event_id = id, "Event deleted");
        Ok(())
    }

    /// Add `user_id` to the event's participant set.
    ///
    /// A started event is lazily marked closed in storage before the
    /// rejection is returned.
    pub async fn register_participant(
        &self,
        event_id: i32,
        user_id: i32,
    ) -> Result<EventResponse, RegistryError> {
        let txn = self.conn.begin().await?;
        let existing = find_event_for_update(&txn, event_id).await?;

        if schedule::has_started(&existing, schedule::now()) {
            if !existing.registration_closed {
                let mut active: event::ActiveModel = existing.into();
                active.registration_closed = Set(true);
                active.updated_at = Set(Utc::now());
                active.update(&txn).await?;
                txn.commit().await?;
                tracing::info!(event_id, "Registration auto-closed, event has started");
            }
            return Err(RegistryError::RegistrationClosed(
                "Registration is closed as the event has already started",
            ));
        }

        if existing.registration_closed {
            return Err(RegistryError::RegistrationClosed(
                "Registration is closed for this event",
            ));
        }

        user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(RegistryError::UserNotFound)?;

        if existing.current_participants >= existing.max_participants {
            return Err(RegistryError::EventFull);
        }

        let already = event_participant::Entity::find_by_id((event_id, user_id))
            .one(&txn)
            .await?
            .is_some();
        if already {
            return Err(RegistryError::AlreadyRegistered);
        }

        // Conditional increment: holds the capacity bound on backends without row locks.
        let bumped = event::Entity::update_many()
            .col_expr(
                event::Column::CurrentParticipants,
                Expr::col(event::Column::CurrentParticipants).add(1),
            )
            .col_expr(event::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(event::Column::Id.eq(event_id))
            .filter(
                Expr::col(event::Column::CurrentParticipants)
                    .lt(Expr::col(event::Column::MaxParticipants)),
            )
            .exec(&txn)
            .await?;
        if bumped.rows_affected == 0 {
            return Err(RegistryError::EventFull);
        }

        let link = event_participant::ActiveModel {
            event_id: Set(event_id),
            user_id: Set(user_id),
            registered_at: Set(Utc::now()),
        };
        match link.insert(&txn).await {
            Ok(_) => {}
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                // Dropping `txn` rolls back the increment.
                return Err(RegistryError::AlreadyRegistered);
            }
            Err(e) => return Err(e.into()),
        }

        txn.commit().await?;
        tracing::debug!(event_id, user_id, "Participant registered");

        self.get_event(event_id).await
    }

    /// Remove `user_id` from the participant set. Allowed even after the
    /// event has started or registration was closed.
    pub async fn unregister_participant(
        &self,
        event_id: i32,
        user_id: i32,
    ) -> Result<EventResponse, RegistryError> {
        let txn = self.conn.begin().await?;
        find_event_for_update(&txn, event_id).await?;

        user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(RegistryError::UserNotFound)?;

        let removed = event_participant::Entity::delete_many()
            .filter(event_participant::Column::EventId.eq(event_id))
            .filter(event_participant::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        if removed.rows_affected == 0 {
            return Err(RegistryError::NotRegistered);
        }

        event::Entity::update_many()
            .col_expr(
                event::Column::CurrentParticipants,
                Expr::col(event::Column::CurrentParticipants).sub(1),
            )
            .col_expr(event::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(event::Column::Id.eq(event_id))
            .filter(event::Column::CurrentParticipants.gt(0))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::debug!(event_id, user_id, "Participant unregistered");

        self.get_event(event_id).await
    }

    /// Open or close registration. Creator or admin only; a started event cannot be reopened.
    pub async fn set_registration_closed(
        &self,
        event_id: i32,
        closed: bool,
        actor: &Actor,
    ) -> Result<EventResponse, RegistryError> {
        let txn = self.conn.begin().await?;
        let existing = find_event_for_update(&txn, event_id).await?;

        let is_creator = existing.created_by == actor.user_id;
        if !is_creator && actor.role != Role::Admin {
            return Err(RegistryError::Forbidden(
                "Only the event creator or an admin can modify registration state for this event",
            ));
        }

        if !closed && schedule::has_started(&existing, schedule::now()) {
            return Err(RegistryError::InvalidState(
                "Cannot reopen registration. The event has already started",
            ));
        }

        let mut active: event::ActiveModel = existing.into();
        active.registration_closed = Set(closed);
        active.updated_at = Set(Utc::now());
        let model = active.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(event_id, closed, "Registration state changed");
        self.hydrate_one(model).await
    }

    pub async fn list_events(&self) -> Result<Vec<EventResponse>, RegistryError> {
        self.fetch(event::Entity::find()).await
    }

    pub async fn list_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<EventResponse>, RegistryError> {
        self.fetch(event::Entity::find().filter(event::Column::Department.eq(department)))
            .await
    }

    /// Events dated strictly after today.
    pub async fn list_upcoming(&self) -> Result<Vec<EventResponse>, RegistryError> {
        let today = schedule::now().date();
        self.fetch(event::Entity::find().filter(event::Column::Date.gt(today)))
            .await
    }

    /// Case-insensitive substring search over title and description.
    pub async fn search(&self, term: &str) -> Result<Vec<EventResponse>, RegistryError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(RegistryError::Validation(
                "Search query must not be empty".into(),
            ));
        }
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));

        let matches = |col: event::Column| {
            Expr::expr(Func::lower(Expr::col(col)))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };

        self.fetch(
            event::Entity::find().filter(
                Condition::any()
                    .add(matches(event::Column::Title))
                    .add(matches(event::Column::Description)),
            ),
        )
        .await
    }

    pub async fn list_by_creator(&self, user_id: i32) -> Result<Vec<EventResponse>, RegistryError> {
        self.fetch(event::Entity::find().filter(event::Column::CreatedBy.eq(user_id)))
            .await
    }

    pub async fn list_by_participant(
        &self,
        user_id: i32,
    ) -> Result<Vec<EventResponse>, RegistryError> {
        self.fetch(
            event::Entity::find().filter(
                event::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(event_participant::Column::EventId)
                        .from(event_participant::Entity)
                        .and_where(event_participant::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            ),
        )
        .await
    }

    async fn fetch(&self, select: Select<event::Entity>) -> Result<Vec<EventResponse>, RegistryError> {
        let models = select
            .order_by_asc(event::Column::Date)
            .order_by_asc(event::Column::Time)
            .order_by_asc(event::Column::Id)
            .all(self.conn)
            .await?;
        self.hydrate(models).await
    }

    async fn hydrate_one(&self, model: event::Model) -> Result<EventResponse, RegistryError> {
        self.hydrate(vec![model])
            .await?
            .pop()
            .ok_or(RegistryError::EventNotFound)
    }

    /// Resolve creator and participant emails for a batch of events.
    async fn hydrate(&self, models: Vec<event::Model>) -> Result<Vec<EventResponse>, RegistryError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let event_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut creator_ids: Vec<i32> = models.iter().map(|m| m.created_by).collect();
        creator_ids.sort_unstable();
        creator_ids.dedup();

        let creators: HashMap<i32, String> = user::Entity::find()
            .filter(user::Column::Id.is_in(creator_ids))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|u| (u.id, u.email))
            .collect();

        let rows = event_participant::Entity::find()
            .filter(event_participant::Column::EventId.is_in(event_ids))
            .find_also_related(user::Entity)
            .all(self.conn)
            .await?;

        let mut participants: HashMap<i32, Vec<String>> = HashMap::new();
        for (link, usr) in rows {
            if let Some(usr) = usr {
                participants.entry(link.event_id).or_default().push(usr.email);
            }
        }

        let now = schedule::now();
        Ok(models
            .into_iter()
            .map(|m| {
                let created_by = creators.get(&m.created_by).cloned().unwrap_or_default();
                let emails = participants.remove(&m.id).unwrap_or_default();
                EventResponse::build(m, created_by, emails, now)
            })
            .collect())
    }
}

async fn find_event_for_update<Db: ConnectionTrait>(
    txn: &Db,
    id: i32,
) -> Result<event::Model, RegistryError> {
    event::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(RegistryError::EventNotFound)
}
