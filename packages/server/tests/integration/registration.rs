use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use campus_events::entity::{event, event_participant};
use campus_events::registry::{EventRegistry, RegistryError};

use crate::common::{TestApp, TestResponse, TestUser, days_from_today, routes};

/// Stored count must equal the number of join rows and stay within capacity.
async fn assert_count_consistent(app: &TestApp, event_id: i32) -> i32 {
    let model = event::Entity::find_by_id(event_id)
        .one(&app.db)
        .await
        .unwrap()
        .expect("event should exist");
    let links = event_participant::Entity::find()
        .filter(event_participant::Column::EventId.eq(event_id))
        .count(&app.db)
        .await
        .unwrap();

    assert_eq!(model.current_participants as u64, links);
    assert!(model.current_participants <= model.max_participants);
    model.current_participants
}

async fn register(app: &TestApp, event_id: i32, user: &TestUser) -> TestResponse {
    app.post_with_token(&routes::event_register(event_id), &json!({}), &user.token)
        .await
}

async fn unregister(app: &TestApp, event_id: i32, user: &TestUser) -> TestResponse {
    app.post_with_token(&routes::event_unregister(event_id), &json!({}), &user.token)
        .await
}

mod joining_and_leaving {
    use super::*;

    #[tokio::test]
    async fn capacity_scenario_with_withdrawal() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let id = app
            .create_event(&manager.token, "Workshop", days_from_today(1), 2)
            .await;
        let a = app.create_student("a@campus.edu").await;
        let b = app.create_student("b@campus.edu").await;
        let c = app.create_student("c@campus.edu").await;

        let res = register(&app, id, &a).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["currentParticipants"], 1);

        let res = register(&app, id, &b).await;
        assert_eq!(res.body["currentParticipants"], 2);

        let res = register(&app, id, &c).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EVENT_FULL");

        let res = unregister(&app, id, &a).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["currentParticipants"], 1);

        let res = register(&app, id, &c).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["currentParticipants"], 2);
        assert_eq!(res.body["participants"], json!(["b@campus.edu", "c@campus.edu"]));

        assert_eq!(assert_count_consistent(&app, id).await, 2);
    }

    #[tokio::test]
    async fn registering_twice_is_rejected_and_count_unchanged() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let student = app.login_as("student@example.com").await;
        let id = app
            .create_event(&manager.token, "Seminar", days_from_today(3), 10)
            .await;

        assert_eq!(register(&app, id, &student).await.status, 200);
        let res = register(&app, id, &student).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "ALREADY_REGISTERED");
        assert_eq!(assert_count_consistent(&app, id).await, 1);
    }

    #[tokio::test]
    async fn unregistering_a_non_participant_is_rejected() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let student = app.login_as("student@example.com").await;
        let id = app
            .create_event(&manager.token, "Seminar", days_from_today(3), 10)
            .await;

        let res = unregister(&app, id, &student).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "NOT_REGISTERED");
        assert_eq!(assert_count_consistent(&app, id).await, 0);
    }

    #[tokio::test]
    async fn registering_for_a_missing_event_is_not_found() {
        let app = TestApp::spawn().await;
        let student = app.login_as("student@example.com").await;

        let res = register(&app, 4242, &student).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn registered_listing_shows_joined_events() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let student = app.login_as("student@example.com").await;
        let joined = app
            .create_event(&manager.token, "Joined", days_from_today(3), 10)
            .await;
        app.create_event(&manager.token, "Ignored", days_from_today(3), 10)
            .await;
        register(&app, joined, &student).await;

        let res = app.get_with_token(routes::REGISTERED, &student.token).await;

        assert_eq!(res.status, 200);
        let events = res.body.as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["id"], joined);
        assert_eq!(events[0]["participants"], json!(["student@example.com"]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_never_overshoot_capacity() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let id = app
            .create_event(&manager.token, "Limited", days_from_today(2), 3)
            .await;

        let mut students = Vec::new();
        for i in 0..8 {
            students.push(app.create_student(&format!("s{i}@campus.edu")).await);
        }

        let mut handles = Vec::new();
        for student in &students {
            let client = app.client.clone();
            let url = format!("http://{}{}", app.addr, routes::event_register(id));
            let token = student.token.clone();
            handles.push(tokio::spawn(async move {
                let res = client
                    .post(url)
                    .header("Authorization", format!("Bearer {token}"))
                    .json(&json!({}))
                    .send()
                    .await
                    .expect("Failed to send POST request");
                TestResponse::from_response(res).await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        let ok = results.iter().filter(|r| r.status == 200).count();
        let full = results
            .iter()
            .filter(|r| r.body["code"] == "EVENT_FULL")
            .count();
        assert_eq!(ok, 3);
        assert_eq!(full, 5);
        assert_eq!(assert_count_consistent(&app, id).await, 3);
    }
}

mod closing {
    use super::*;

    #[tokio::test]
    async fn registering_for_a_started_event_closes_it() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let student = app.login_as("student@example.com").await;
        let id = app
            .create_event(&manager.token, "Yesterday", days_from_today(-1), 10)
            .await;

        let stored = event::Entity::find_by_id(id).one(&app.db).await.unwrap().unwrap();
        assert!(!stored.registration_closed);

        let res = register(&app, id, &student).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "REGISTRATION_CLOSED");

        let stored = event::Entity::find_by_id(id).one(&app.db).await.unwrap().unwrap();
        assert!(stored.registration_closed);
        assert_eq!(assert_count_consistent(&app, id).await, 0);
    }

    #[tokio::test]
    async fn started_event_reads_as_closed_before_any_write() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let id = app
            .create_event(&manager.token, "Yesterday", days_from_today(-1), 10)
            .await;

        let res = app.get_without_token(&routes::event(id)).await;

        assert_eq!(res.body["registrationClosed"], true);
        let stored = event::Entity::find_by_id(id).one(&app.db).await.unwrap().unwrap();
        assert!(!stored.registration_closed);
    }

    #[tokio::test]
    async fn creator_can_close_and_reopen_a_future_event() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let student = app.login_as("student@example.com").await;
        let id = app
            .create_event(&manager.token, "Toggle", days_from_today(4), 10)
            .await;

        let res = app
            .post_with_token(&routes::close_registration(id), &json!({}), &manager.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["registrationClosed"], true);

        let res = register(&app, id, &student).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "REGISTRATION_CLOSED");

        let res = app
            .post_with_token(&routes::open_registration(id), &json!({}), &manager.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["registrationClosed"], false);

        let res = app.get_without_token(&routes::event(id)).await;
        assert_eq!(res.body["registrationClosed"], false);
        assert_eq!(register(&app, id, &student).await.status, 200);
    }

    #[tokio::test]
    async fn admin_may_toggle_registration_on_any_event() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let admin = app.admin().await;
        let id = app
            .create_event(&manager.token, "Admin Managed", days_from_today(4), 10)
            .await;

        let res = app
            .post_with_token(&routes::close_registration(id), &json!({}), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["registrationClosed"], true);
    }

    #[tokio::test]
    async fn other_users_cannot_toggle_registration() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let student = app.login_as("student@example.com").await;
        let id = app
            .create_event(&manager.token, "Not Yours", days_from_today(4), 10)
            .await;

        let res = app
            .post_with_token(&routes::close_registration(id), &json!({}), &student.token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn started_event_cannot_be_reopened() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let id = app
            .create_event(&manager.token, "Over", days_from_today(-2), 10)
            .await;

        let res = app
            .post_with_token(&routes::open_registration(id), &json!({}), &manager.token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn participants_may_leave_after_registration_closes() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let student = app.login_as("student@example.com").await;
        let id = app
            .create_event(&manager.token, "Leaving", days_from_today(4), 10)
            .await;
        assert_eq!(register(&app, id, &student).await.status, 200);
        app.post_with_token(&routes::close_registration(id), &json!({}), &manager.token)
            .await;

        let res = unregister(&app, id, &student).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["currentParticipants"], 0);
        assert_eq!(assert_count_consistent(&app, id).await, 0);
    }
}

mod registry {
    use super::*;

    #[tokio::test]
    async fn full_open_event_rejects_with_event_full() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let a = app.create_student("a@campus.edu").await;
        let b = app.create_student("b@campus.edu").await;
        let id = app
            .create_event(&manager.token, "Single Seat", days_from_today(2), 1)
            .await;
        let registry = EventRegistry::new(&app.db);

        let dto = registry.register_participant(id, a.id).await.unwrap();
        assert_eq!(dto.current_participants, 1);
        assert_eq!(dto.participants, vec!["a@campus.edu".to_string()]);

        let err = registry.register_participant(id, b.id).await.unwrap_err();
        assert!(matches!(err, RegistryError::EventFull), "{err:?}");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let id = app
            .create_event(&manager.token, "Ghosts", days_from_today(2), 5)
            .await;
        let registry = EventRegistry::new(&app.db);

        let err = registry.register_participant(id, 777).await.unwrap_err();
        assert!(matches!(err, RegistryError::UserNotFound), "{err:?}");

        let err = registry.unregister_participant(id, 777).await.unwrap_err();
        assert!(matches!(err, RegistryError::UserNotFound), "{err:?}");
    }

    #[tokio::test]
    async fn started_event_is_closed_by_a_registration_attempt() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;
        let student = app.login_as("student@example.com").await;
        let id = app
            .create_event(&manager.token, "Past", days_from_today(-3), 5)
            .await;
        let registry = EventRegistry::new(&app.db);

        let err = registry
            .register_participant(id, student.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::RegistrationClosed(_)), "{err:?}");

        let stored = event::Entity::find_by_id(id).one(&app.db).await.unwrap().unwrap();
        assert!(stored.registration_closed);

        // A second attempt sees the stored flag and fails the same way.
        let err = registry
            .register_participant(id, student.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::RegistrationClosed(_)), "{err:?}");
    }
}
