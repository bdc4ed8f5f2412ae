use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::entity::{admin, event_manager, student, user};
use crate::models::role::Role;
use crate::utils::hash;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_STUDENT_EMAIL: &str = "student@example.com";
pub const DEFAULT_EVENT_MANAGER_EMAIL: &str = "eventmanager@example.com";

/// Create the default admin, student and event-manager accounts if missing.
///
/// An existing `admin@example.com` holding another role is restored to
/// `ADMIN` with the default password. Running it again changes nothing.
pub async fn seed_default_accounts(
    db: &DatabaseConnection,
    default_password: &str,
) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    let mut created = 0u32;

    match find_by_email(&txn, DEFAULT_ADMIN_EMAIL).await? {
        None => {
            let admin_user =
                insert_user(&txn, DEFAULT_ADMIN_EMAIL, "Admin", Role::Admin, default_password)
                    .await?;
            ensure_admin_profile(&txn, admin_user.id).await?;
            created += 1;
        }
        Some(existing) if existing.role != Role::Admin.as_str() => {
            let id = existing.id;
            let mut active: user::ActiveModel = existing.into();
            active.role = Set(Role::Admin.as_str().to_string());
            active.password = Set(hash_default(default_password)?);
            active.active = Set(true);
            active.update(&txn).await?;
            ensure_admin_profile(&txn, id).await?;
            info!(user_id = id, "Restored ADMIN role on default admin account");
        }
        Some(_) => {}
    }

    if find_by_email(&txn, DEFAULT_STUDENT_EMAIL).await?.is_none() {
        let model = insert_user(
            &txn,
            DEFAULT_STUDENT_EMAIL,
            "Default Student",
            Role::Student,
            default_password,
        )
        .await?;
        student::ActiveModel {
            user_id: Set(model.id),
            roll_number: Set(None),
            department: Set(Some("Computer Science".to_string())),
            phone_number: Set(None),
            year: Set(None),
            college_name: Set(None),
        }
        .insert(&txn)
        .await?;
        created += 1;
    }

    if find_by_email(&txn, DEFAULT_EVENT_MANAGER_EMAIL)
        .await?
        .is_none()
    {
        let model = insert_user(
            &txn,
            DEFAULT_EVENT_MANAGER_EMAIL,
            "Default Event Manager",
            Role::EventManager,
            default_password,
        )
        .await?;
        event_manager::ActiveModel {
            user_id: Set(model.id),
            designation: Set(Some("Senior Event Coordinator".to_string())),
            phone_number: Set(Some("+1234567890".to_string())),
        }
        .insert(&txn)
        .await?;
        created += 1;
    }

    txn.commit().await?;

    if created > 0 {
        info!("Seeded {} default accounts", created);
    }
    Ok(())
}

async fn find_by_email(txn: &DatabaseTransaction, email: &str) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(txn)
        .await
}

async fn insert_user(
    txn: &DatabaseTransaction,
    email: &str,
    name: &str,
    role: Role,
    password: &str,
) -> Result<user::Model, DbErr> {
    user::ActiveModel {
        email: Set(email.to_string()),
        password: Set(hash_default(password)?),
        name: Set(name.to_string()),
        role: Set(role.as_str().to_string()),
        active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await
}

async fn ensure_admin_profile(txn: &DatabaseTransaction, user_id: i32) -> Result<(), DbErr> {
    if admin::Entity::find_by_id(user_id).one(txn).await?.is_some() {
        return Ok(());
    }
    admin::ActiveModel {
        user_id: Set(user_id),
        designation: Set(Some("System Administrator".to_string())),
        phone_number: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn hash_default(password: &str) -> Result<String, DbErr> {
    hash::hash_password(password).map_err(|e| DbErr::Custom(format!("Password hash error: {}", e)))
}
