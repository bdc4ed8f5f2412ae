use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(indexed)]
    pub date: Date,
    /// Start time on `date`. Treated as midnight when absent.
    pub time: Option<Time>,
    #[sea_orm(indexed)]
    pub department: String,
    pub location: String,
    pub max_participants: i32,
    /// Always equal to the number of `event_participant` rows for this event.
    pub current_participants: i32,
    pub image: Option<String>,
    /// Stored flag only; callers observe `registry::schedule::effective_closed`.
    pub registration_closed: bool,

    /// Owning user id. Membership lives in `event_participant`.
    #[sea_orm(indexed)]
    pub created_by: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
