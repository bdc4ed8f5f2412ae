use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::ExprTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionSession, TransactionTrait,
};

use super::DirectoryError;
use crate::entity::{admin, event, event_manager, event_participant, student, user};
use crate::models::auth::RegisterRequest;
use crate::models::profile::{
    StaffDetails, StaffDetailsRequest, StudentDetails, StudentDetailsRequest,
};
use crate::models::role::Role;
use crate::models::shared::non_blank;
use crate::models::user::{UpdateProfileRequest, UpdateUserRequest, UserDto};
use crate::utils::hash;

/// Account records and their per-role profile extensions.
pub struct UserDirectory<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait> UserDirectory<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create an account plus the profile extension its role calls for.
    /// Admin profiles are only created by seeding or an explicit details update.
    pub async fn register(&self, req: &RegisterRequest) -> Result<UserDto, DirectoryError> {
        let email = req.email.trim();
        ensure_email_free(self.conn, email, None).await?;

        let password = hash::hash_password(&req.password)
            .map_err(|e| DirectoryError::Hash(e.to_string()))?;

        let txn = self.conn.begin().await?;

        let new_user = user::ActiveModel {
            email: Set(email.to_string()),
            password: Set(password),
            name: Set(req.name.trim().to_string()),
            role: Set(req.role.as_str().to_string()),
            active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = new_user.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                tracing::debug!("Registration race condition: unique constraint caught on insert");
                DirectoryError::EmailTaken
            }
            _ => DirectoryError::from(e),
        })?;

        let mut department = None;
        match req.role {
            Role::Student => {
                department = non_blank(req.department.clone());
                student::ActiveModel {
                    user_id: Set(model.id),
                    roll_number: Set(None),
                    department: Set(department.clone()),
                    phone_number: Set(non_blank(req.phone_number.clone())),
                    year: Set(None),
                    college_name: Set(None),
                }
                .insert(&txn)
                .await?;
            }
            Role::EventManager => {
                event_manager::ActiveModel {
                    user_id: Set(model.id),
                    designation: Set(non_blank(req.designation.clone())),
                    phone_number: Set(non_blank(req.phone_number.clone())),
                }
                .insert(&txn)
                .await?;
            }
            Role::Admin => {}
        }

        txn.commit().await?;
        tracing::info!(user_id = model.id, role = %req.role, "Account registered");

        Ok(UserDto::build(model, req.role, department))
    }

    /// Check credentials and account state for login.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        expected_role: Option<Role>,
    ) -> Result<UserDto, DirectoryError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim()))
            .one(self.conn)
            .await?
            .ok_or(DirectoryError::InvalidCredentials)?;

        let valid = hash::verify_password(password, &model.password)
            .map_err(|e| DirectoryError::Hash(e.to_string()))?;
        if !valid {
            return Err(DirectoryError::InvalidCredentials);
        }
        if !model.active {
            return Err(DirectoryError::AccountDisabled);
        }

        let role = parse_role(&model.role)?;
        if expected_role.is_some_and(|r| r != role) {
            return Err(DirectoryError::RoleMismatch);
        }

        to_dto(self.conn, model).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DirectoryError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn)
            .await?)
    }

    pub async fn get_user(&self, id: i32) -> Result<UserDto, DirectoryError> {
        let model = load_user(self.conn, id).await?;
        to_dto(self.conn, model).await
    }

    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<UserDto>, DirectoryError> {
        let mut query = user::Entity::find().order_by_asc(user::Column::Id);
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role.as_str()));
        }
        let models = query.all(self.conn).await?;

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let departments: HashMap<i32, Option<String>> = student::Entity::find()
            .filter(student::Column::UserId.is_in(ids))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|s| (s.user_id, s.department))
            .collect();

        models
            .into_iter()
            .map(|m| {
                let role = parse_role(&m.role)?;
                let department = departments.get(&m.id).cloned().flatten();
                Ok(UserDto::build(m, role, department))
            })
            .collect()
    }

    /// Admin partial update; only fields present in `req` change.
    pub async fn update_user(
        &self,
        id: i32,
        req: &UpdateUserRequest,
    ) -> Result<UserDto, DirectoryError> {
        let model = load_user(self.conn, id).await?;

        let mut active: user::ActiveModel = model.into();
        if let Some(name) = &req.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = &req.email {
            let email = email.trim();
            ensure_email_free(self.conn, email, Some(id)).await?;
            active.email = Set(email.to_string());
        }
        if let Some(role) = req.role {
            active.role = Set(role.as_str().to_string());
        }
        if let Some(flag) = req.active {
            active.active = Set(flag);
        }

        let model = if active.is_changed() {
            active.update(self.conn).await.map_err(map_unique_email)?
        } else {
            load_user(self.conn, id).await?
        };
        tracing::info!(user_id = id, "User updated");
        to_dto(self.conn, model).await
    }

    /// Self-service partial update. A department is stored on the student profile.
    pub async fn update_profile(
        &self,
        id: i32,
        req: &UpdateProfileRequest,
    ) -> Result<UserDto, DirectoryError> {
        let txn = self.conn.begin().await?;
        let model = load_user(&txn, id).await?;
        let role = parse_role(&model.role)?;

        let model = apply_identity(&txn, model, req.name.as_deref(), req.email.as_deref()).await?;

        if role == Role::Student {
            if let Some(department) = &req.department {
                let department = Set(non_blank(Some(department.clone())));
                match student::Entity::find_by_id(id).one(&txn).await? {
                    Some(existing) => {
                        let mut profile: student::ActiveModel = existing.into();
                        profile.department = department;
                        profile.update(&txn).await?;
                    }
                    None => {
                        let mut profile = empty_student(id);
                        profile.department = department;
                        profile.insert(&txn).await?;
                    }
                }
            }
        }

        txn.commit().await?;
        to_dto(self.conn, model).await
    }

    /// Remove an account that owns no events, together with its
    /// registrations and profile rows.
    pub async fn delete_user(&self, id: i32) -> Result<(), DirectoryError> {
        let txn = self.conn.begin().await?;
        load_user(&txn, id).await?;

        let owned = event::Entity::find()
            .filter(event::Column::CreatedBy.eq(id))
            .count(&txn)
            .await?;
        if owned > 0 {
            return Err(DirectoryError::OwnsEvents(owned));
        }

        let registered: Vec<i32> = event_participant::Entity::find()
            .filter(event_participant::Column::UserId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|link| link.event_id)
            .collect();

        if !registered.is_empty() {
            event::Entity::update_many()
                .col_expr(
                    event::Column::CurrentParticipants,
                    Expr::col(event::Column::CurrentParticipants).sub(1),
                )
                .col_expr(event::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(event::Column::Id.is_in(registered.clone()))
                .filter(event::Column::CurrentParticipants.gt(0))
                .exec(&txn)
                .await?;
            event_participant::Entity::delete_many()
                .filter(event_participant::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
        }

        student::Entity::delete_by_id(id).exec(&txn).await?;
        admin::Entity::delete_by_id(id).exec(&txn).await?;
        event_manager::Entity::delete_by_id(id).exec(&txn).await?;
        user::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!(user_id = id, registrations = registered.len(), "User deleted");
        Ok(())
    }

    pub async fn change_password(
        &self,
        id: i32,
        current: &str,
        new_password: &str,
    ) -> Result<(), DirectoryError> {
        let model = load_user(self.conn, id).await?;

        let valid = hash::verify_password(current, &model.password)
            .map_err(|e| DirectoryError::Hash(e.to_string()))?;
        if !valid {
            return Err(DirectoryError::IncorrectPassword);
        }

        let password =
            hash::hash_password(new_password).map_err(|e| DirectoryError::Hash(e.to_string()))?;
        let mut active: user::ActiveModel = model.into();
        active.password = Set(password);
        active.update(self.conn).await?;

        tracing::info!(user_id = id, "Password changed");
        Ok(())
    }

    pub async fn student_details(&self, id: i32) -> Result<StudentDetails, DirectoryError> {
        let model = load_user(self.conn, id).await?;
        require_role(&model, Role::Student, "Only students can access student details")?;

        let profile = student::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(DirectoryError::ProfileNotFound("Student details not found"))?;

        Ok(student_details(model, profile))
    }

    /// Update (or lazily create) the caller's student profile.
    pub async fn update_student_details(
        &self,
        id: i32,
        req: &StudentDetailsRequest,
    ) -> Result<StudentDetails, DirectoryError> {
        let txn = self.conn.begin().await?;
        let model = load_user(&txn, id).await?;
        require_role(&model, Role::Student, "Only students can update student details")?;

        let model = apply_identity(&txn, model, req.name.as_deref(), req.email.as_deref()).await?;

        let existing = student::Entity::find_by_id(id).one(&txn).await?;
        let mut profile = match existing.clone() {
            Some(existing) => existing.into(),
            None => empty_student(id),
        };
        if let Some(v) = &req.roll_number {
            profile.roll_number = Set(non_blank(Some(v.clone())));
        }
        if let Some(v) = &req.department {
            profile.department = Set(non_blank(Some(v.clone())));
        }
        if let Some(v) = &req.phone_number {
            profile.phone_number = Set(non_blank(Some(v.clone())));
        }
        if let Some(v) = &req.year {
            profile.year = Set(non_blank(Some(v.clone())));
        }
        if let Some(v) = &req.college_name {
            profile.college_name = Set(non_blank(Some(v.clone())));
        }
        let profile = match existing {
            None => profile.insert(&txn).await?,
            Some(_) if profile.is_changed() => profile.update(&txn).await?,
            Some(unchanged) => unchanged,
        };

        txn.commit().await?;
        Ok(student_details(model, profile))
    }

    pub async fn event_manager_details(&self, id: i32) -> Result<StaffDetails, DirectoryError> {
        let model = load_user(self.conn, id).await?;
        require_role(
            &model,
            Role::EventManager,
            "Only event managers can access event manager details",
        )?;

        let profile = event_manager::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(DirectoryError::ProfileNotFound("Event manager details not found"))?;

        Ok(staff_details(model, profile.designation, profile.phone_number))
    }

    pub async fn update_event_manager_details(
        &self,
        id: i32,
        req: &StaffDetailsRequest,
    ) -> Result<StaffDetails, DirectoryError> {
        let txn = self.conn.begin().await?;
        let model = load_user(&txn, id).await?;
        require_role(
            &model,
            Role::EventManager,
            "Only event managers can update event manager details",
        )?;

        let existing = event_manager::Entity::find_by_id(id).one(&txn).await?;
        let mut profile: event_manager::ActiveModel = match existing.clone() {
            Some(existing) => existing.into(),
            None => event_manager::ActiveModel {
                user_id: Set(id),
                designation: Set(None),
                phone_number: Set(None),
            },
        };
        if let Some(v) = &req.designation {
            profile.designation = Set(non_blank(Some(v.clone())));
        }
        if let Some(v) = &req.phone_number {
            profile.phone_number = Set(non_blank(Some(v.clone())));
        }
        let saved = match existing {
            None => profile.insert(&txn).await?,
            Some(_) if profile.is_changed() => profile.update(&txn).await?,
            Some(unchanged) => unchanged,
        };
        txn.commit().await?;

        Ok(staff_details(model, saved.designation, saved.phone_number))
    }

    pub async fn admin_details(&self, id: i32) -> Result<StaffDetails, DirectoryError> {
        let model = load_user(self.conn, id).await?;
        require_role(&model, Role::Admin, "Only admins can access admin details")?;

        let profile = admin::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(DirectoryError::ProfileNotFound("Admin details not found"))?;

        Ok(staff_details(model, profile.designation, profile.phone_number))
    }

    pub async fn update_admin_details(
        &self,
        id: i32,
        req: &StaffDetailsRequest,
    ) -> Result<StaffDetails, DirectoryError> {
        let txn = self.conn.begin().await?;
        let model = load_user(&txn, id).await?;
        require_role(&model, Role::Admin, "Only admins can update admin details")?;

        let existing = admin::Entity::find_by_id(id).one(&txn).await?;
        let mut profile: admin::ActiveModel = match existing.clone() {
            Some(existing) => existing.into(),
            None => admin::ActiveModel {
                user_id: Set(id),
                designation: Set(None),
                phone_number: Set(None),
            },
        };
        if let Some(v) = &req.designation {
            profile.designation = Set(non_blank(Some(v.clone())));
        }
        if let Some(v) = &req.phone_number {
            profile.phone_number = Set(non_blank(Some(v.clone())));
        }
        let saved = match existing {
            None => profile.insert(&txn).await?,
            Some(_) if profile.is_changed() => profile.update(&txn).await?,
            Some(unchanged) => unchanged,
        };
        txn.commit().await?;

        Ok(staff_details(model, saved.designation, saved.phone_number))
    }
}

pub(crate) fn parse_role(stored: &str) -> Result<Role, DirectoryError> {
    stored
        .parse()
        .map_err(|_| DirectoryError::CorruptRole(stored.to_string()))
}

fn require_role(model: &user::Model, role: Role, message: &'static str) -> Result<(), DirectoryError> {
    if parse_role(&model.role)? != role {
        return Err(DirectoryError::WrongRole(message));
    }
    Ok(())
}

async fn load_user<Db: ConnectionTrait>(db: &Db, id: i32) -> Result<user::Model, DirectoryError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DirectoryError::UserNotFound)
}

async fn ensure_email_free<Db: ConnectionTrait>(
    db: &Db,
    email: &str,
    except: Option<i32>,
) -> Result<(), DirectoryError> {
    let mut query = user::Entity::find().filter(user::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(user::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(DirectoryError::EmailTaken);
    }
    Ok(())
}

fn map_unique_email(e: sea_orm::DbErr) -> DirectoryError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DirectoryError::EmailTaken,
        _ => DirectoryError::from(e),
    }
}

/// Apply optional name/email changes to an account.
async fn apply_identity<Db: ConnectionTrait>(
    db: &Db,
    model: user::Model,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<user::Model, DirectoryError> {
    if name.is_none() && email.is_none() {
        return Ok(model);
    }
    let id = model.id;
    let mut active: user::ActiveModel = model.into();
    if let Some(name) = name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = email {
        let email = email.trim();
        ensure_email_free(db, email, Some(id)).await?;
        active.email = Set(email.to_string());
    }
    active.update(db).await.map_err(map_unique_email)
}

async fn to_dto<Db: ConnectionTrait>(db: &Db, model: user::Model) -> Result<UserDto, DirectoryError> {
    let role = parse_role(&model.role)?;
    let department = if role == Role::Student {
        student::Entity::find_by_id(model.id)
            .one(db)
            .await?
            .and_then(|s| s.department)
    } else {
        None
    };
    Ok(UserDto::build(model, role, department))
}

fn empty_student(user_id: i32) -> student::ActiveModel {
    student::ActiveModel {
        user_id: Set(user_id),
        roll_number: Set(None),
        department: Set(None),
        phone_number: Set(None),
        year: Set(None),
        college_name: Set(None),
    }
}

fn student_details(model: user::Model, profile: student::Model) -> StudentDetails {
    StudentDetails {
        id: model.id,
        email: model.email,
        name: model.name,
        roll_number: profile.roll_number,
        department: profile.department,
        phone_number: profile.phone_number,
        year: profile.year,
        college_name: profile.college_name,
    }
}

fn staff_details(
    model: user::Model,
    designation: Option<String>,
    phone_number: Option<String>,
) -> StaffDetails {
    StaffDetails {
        id: model.id,
        email: model.email,
        name: model.name,
        designation,
        phone_number,
    }
}
