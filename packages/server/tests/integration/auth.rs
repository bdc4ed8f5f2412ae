use serde_json::json;

use crate::common::{DEFAULT_PASSWORD, TestApp, TestResponse, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn student_can_register_and_receives_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "email": "ada@campus.edu",
                    "password": "secret123",
                    "name": "Ada",
                    "role": "STUDENT",
                    "department": "Mathematics",
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["user"]["email"], "ada@campus.edu");
        assert_eq!(res.body["user"]["role"], "STUDENT");
        assert_eq!(res.body["user"]["department"], "Mathematics");
        assert_eq!(res.body["user"]["active"], true);
    }

    #[tokio::test]
    async fn event_manager_registration_creates_a_profile() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "email": "em@campus.edu",
                    "password": "secret123",
                    "name": "Em",
                    "role": "EVENT_MANAGER",
                    "designation": "Coordinator",
                    "phoneNumber": "+100",
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let token = res.body["token"].as_str().unwrap().to_string();

        let details = app
            .get_with_token(routes::EVENT_MANAGER_DETAILS, &token)
            .await;
        assert_eq!(details.status, 200, "{}", details.text);
        assert_eq!(details.body["designation"], "Coordinator");
        assert_eq!(details.body["phoneNumber"], "+100");
    }

    #[tokio::test]
    async fn cannot_register_with_an_email_that_is_already_taken() {
        let app = TestApp::spawn().await;
        app.create_student("ada@campus.edu").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "email": "ada@campus.edu",
                    "password": "secret123",
                    "name": "Another Ada",
                    "role": "STUDENT",
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn cannot_register_with_a_password_that_is_too_short() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "a@campus.edu", "password": "abc", "name": "A", "role": "STUDENT"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_an_unknown_role() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "a@campus.edu", "password": "secret123", "name": "A", "role": "DEAN"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn seeded_accounts_can_log_in() {
        let app = TestApp::spawn().await;

        for (email, role) in [
            ("admin@example.com", "ADMIN"),
            ("student@example.com", "STUDENT"),
            ("eventmanager@example.com", "EVENT_MANAGER"),
        ] {
            let res = app.login(email, DEFAULT_PASSWORD).await;
            assert_eq!(res.status, 200, "{email}: {}", res.text);
            assert_eq!(res.body["user"]["role"], role);
            assert!(res.body["token"].is_string());
        }
    }

    #[tokio::test]
    async fn cannot_login_with_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app.login("student@example.com", "wrong-password").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn cannot_login_with_unknown_email() {
        let app = TestApp::spawn().await;

        let res = app.login("nobody@example.com", DEFAULT_PASSWORD).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn login_with_a_role_the_account_does_not_hold_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({
                    "email": "student@example.com",
                    "password": DEFAULT_PASSWORD,
                    "role": "ADMIN",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Invalid role for this user");
    }

    #[tokio::test]
    async fn deactivated_account_cannot_log_in() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let student = app.create_student("ada@campus.edu").await;

        let res = app
            .put_with_token(&routes::user(student.id), &json!({"active": false}), &admin.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.login("ada@campus.edu", "secret123").await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "ACCOUNT_DISABLED");

        // Previously issued tokens stop working as well.
        let res = app.get_with_token(routes::PROFILE, &student.token).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "ACCOUNT_DISABLED");
    }
}

mod request_validation {
    use super::*;

    #[tokio::test]
    async fn malformed_json_body_returns_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::REGISTER))
            .header("Content-Type", "application/json")
            .body("not valid json")
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_required_fields_returns_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &json!({"email": "a@campus.edu"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod authenticated_access {
    use super::*;

    #[tokio::test]
    async fn authenticated_user_can_retrieve_their_profile() {
        let app = TestApp::spawn().await;
        let student = app.login_as("student@example.com").await;

        let res = app.get_with_token(routes::PROFILE, &student.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["email"], "student@example.com");
        assert_eq!(res.body["role"], "STUDENT");
        assert_eq!(res.body["department"], "Computer Science");
    }

    #[tokio::test]
    async fn request_without_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::PROFILE).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn request_with_malformed_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::PROFILE, "not-a-valid-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn request_with_non_bearer_auth_scheme_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::PROFILE))
            .header("Authorization", "Basic abc123")
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let app = TestApp::spawn().await;
        let student = app.login_as("student@example.com").await;

        let forged = campus_events::utils::jwt::sign(
            &campus_events::utils::jwt::TokenSubject {
                user_id: student.id,
                email: &student.email,
                name: "Default Student",
                role: campus_events::models::role::Role::Admin,
            },
            "some-other-secret",
            3600,
        )
        .unwrap();

        let res = app.get_with_token(routes::PROFILE, &forged).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod profile {
    use super::*;

    #[tokio::test]
    async fn user_can_update_name_and_department() {
        let app = TestApp::spawn().await;
        let student = app.create_student("ada@campus.edu").await;

        let res = app
            .put_with_token(
                routes::PROFILE,
                &json!({"name": "Ada L.", "department": "Physics"}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Ada L.");
        assert_eq!(res.body["email"], "ada@campus.edu");
        assert_eq!(res.body["department"], "Physics");
    }

    #[tokio::test]
    async fn cannot_take_another_accounts_email() {
        let app = TestApp::spawn().await;
        let student = app.create_student("ada@campus.edu").await;

        let res = app
            .put_with_token(
                routes::PROFILE,
                &json!({"email": "admin@example.com"}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn password_change_requires_the_current_password() {
        let app = TestApp::spawn().await;
        let student = app.create_student("ada@campus.edu").await;

        let res = app
            .post_with_token(
                routes::CHANGE_PASSWORD,
                &json!({"currentPassword": "wrong", "newPassword": "brand-new-pass"}),
                &student.token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .post_with_token(
                routes::CHANGE_PASSWORD,
                &json!({"currentPassword": "secret123", "newPassword": "brand-new-pass"}),
                &student.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        assert_eq!(app.login("ada@campus.edu", "secret123").await.status, 401);
        assert_eq!(app.login("ada@campus.edu", "brand-new-pass").await.status, 200);
    }
}

mod role_details {
    use super::*;

    #[tokio::test]
    async fn student_details_update_creates_missing_profile_fields() {
        let app = TestApp::spawn().await;
        let student = app.create_student("ada@campus.edu").await;

        let res = app
            .put_with_token(
                routes::STUDENT_DETAILS,
                &json!({"rollNumber": "CS-042", "year": "3", "collegeName": "North College"}),
                &student.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .get_with_token(routes::STUDENT_DETAILS, &student.token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["rollNumber"], "CS-042");
        assert_eq!(res.body["year"], "3");
        assert_eq!(res.body["collegeName"], "North College");
        assert_eq!(res.body["email"], "ada@campus.edu");
    }

    #[tokio::test]
    async fn details_of_another_role_are_forbidden() {
        let app = TestApp::spawn().await;
        let student = app.login_as("student@example.com").await;

        let res = app
            .get_with_token(routes::ADMIN_DETAILS, &student.token)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let res = app
            .put_with_token(
                routes::EVENT_MANAGER_DETAILS,
                &json!({"designation": "Imposter"}),
                &student.token,
            )
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admin_registered_via_api_has_no_profile_until_updated() {
        let app = TestApp::spawn().await;
        let admin = app.create_user("second-admin@campus.edu", "ADMIN").await;

        let res = app.get_with_token(routes::ADMIN_DETAILS, &admin.token).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let res = app
            .put_with_token(
                routes::ADMIN_DETAILS,
                &json!({"designation": "Registrar", "phoneNumber": "+200"}),
                &admin.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["designation"], "Registrar");

        let res = app.get_with_token(routes::ADMIN_DETAILS, &admin.token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["phoneNumber"], "+200");
    }

    #[tokio::test]
    async fn seeded_admin_details_update_keeps_omitted_fields() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .put_with_token(
                routes::ADMIN_DETAILS,
                &json!({"phoneNumber": "+300"}),
                &admin.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["designation"], "System Administrator");
        assert_eq!(res.body["phoneNumber"], "+300");

        let res = app.get_with_token(routes::ADMIN_DETAILS, &admin.token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["designation"], "System Administrator");
        assert_eq!(res.body["phoneNumber"], "+300");

        let res = app
            .put_with_token(routes::ADMIN_DETAILS, &json!({}), &admin.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["phoneNumber"], "+300");
    }

    #[tokio::test]
    async fn seeded_event_manager_has_default_details() {
        let app = TestApp::spawn().await;
        let manager = app.event_manager().await;

        let res = app
            .get_with_token(routes::EVENT_MANAGER_DETAILS, &manager.token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["designation"], "Senior Event Coordinator");
        assert_eq!(res.body["phoneNumber"], "+1234567890");
    }
}

mod public {
    use super::*;

    #[tokio::test]
    async fn health_and_info_need_no_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::HEALTH).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "Application is running!");

        let res = app.get_without_token(routes::INFO).await;
        assert_eq!(res.status, 200);
        assert!(res.text.contains("College Event Manager API"));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token("/api-docs/openapi.json").await;

        assert_eq!(res.status, 200);
        assert!(res.body["paths"].is_object());
    }
}
