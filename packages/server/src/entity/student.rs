use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile extension for `STUDENT` accounts, keyed by the owning user's id.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    #[sea_orm(unique)]
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub year: Option<String>,
    pub college_name: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
