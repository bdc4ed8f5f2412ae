use sea_orm::EntityTrait;
use serde_json::json;

use campus_events::entity::{event, student};

use crate::common::{TestApp, days_from_today, routes};

mod listing {
    use super::*;

    #[tokio::test]
    async fn admin_lists_all_accounts_and_filters_by_role() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_student("ada@campus.edu").await;

        let res = app.get_with_token(routes::USERS, &admin.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body.as_array().unwrap().len(), 4);

        let res = app
            .get_with_token(&format!("{}?role=STUDENT", routes::USERS), &admin.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let emails: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["email"].as_str().unwrap())
            .collect();
        assert_eq!(emails, vec!["student@example.com", "ada@campus.edu"]);
    }

    #[tokio::test]
    async fn non_admins_cannot_manage_users() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;

        let res = app.get_with_token(routes::USERS, &manager.token).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let res = app.get_with_token(&routes::user(1), &manager.token).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn any_user_can_read_their_own_account() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;

        let res = app
            .get_with_token(routes::USER_PROFILE, &manager.token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["email"], "eventmanager@example.com");
        assert_eq!(res.body["role"], "EVENT_MANAGER");
        assert!(res.body.get("department").is_none());
    }
}

mod updating {
    use super::*;

    #[tokio::test]
    async fn admin_update_only_touches_supplied_fields() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let ada = app.create_student("ada@campus.edu").await;

        let res = app
            .put_with_token(&routes::user(ada.id), &json!({"name": "Ada Byron"}), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Ada Byron");
        assert_eq!(res.body["email"], "ada@campus.edu");
        assert_eq!(res.body["role"], "STUDENT");
        assert_eq!(res.body["active"], true);
    }

    #[tokio::test]
    async fn role_change_takes_effect_on_existing_tokens() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let ada = app.create_student("ada@campus.edu").await;

        let res = app
            .put_with_token(&routes::user(ada.id), &json!({"role": "ADMIN"}), &admin.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_with_token(routes::USERS, &ada.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app.get_with_token(&routes::user(999), &admin.token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_a_participant_releases_their_seats() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let manager = app.event_manager().await;
        let ada = app.create_student("ada@campus.edu").await;
        let id = app
            .create_event(&manager.token, "Seats", days_from_today(3), 5)
            .await;
        let res = app
            .post_with_token(&routes::event_register(id), &json!({}), &ada.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.delete_with_token(&routes::user(ada.id), &admin.token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let stored = event::Entity::find_by_id(id).one(&app.db).await.unwrap().unwrap();
        assert_eq!(stored.current_participants, 0);
        assert!(
            student::Entity::find_by_id(ada.id)
                .one(&app.db)
                .await
                .unwrap()
                .is_none()
        );

        let res = app.get_with_token(routes::PROFILE, &ada.token).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn account_that_owns_events_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let manager = app.event_manager().await;
        app.create_event(&manager.token, "Owned", days_from_today(3), 5)
            .await;

        let res = app
            .delete_with_token(&routes::user(manager.id), &admin.token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}
