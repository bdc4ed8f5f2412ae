use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile extension for `EVENT_MANAGER` accounts.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_manager")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub designation: Option<String>,
    pub phone_number: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
