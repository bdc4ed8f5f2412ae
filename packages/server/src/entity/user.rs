use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string, never the plain password.
    pub password: String,
    pub name: String,
    /// One of `STUDENT`, `ADMIN`, `EVENT_MANAGER`.
    #[sea_orm(indexed)]
    pub role: String,
    #[sea_orm(default_value = true)]
    pub active: bool,

    #[sea_orm(has_one)]
    pub student: HasOne<super::student::Entity>,

    #[sea_orm(has_one)]
    pub admin: HasOne<super::admin::Entity>,

    #[sea_orm(has_one)]
    pub event_manager: HasOne<super::event_manager::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
