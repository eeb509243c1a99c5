//! HTTP-level tests for login and role-gated operations.

mod common;

use axum::http::StatusCode;
use common::{bearer, body_json, post_json};
use fleetlog_api::auth::password::hash_password;
use fleetlog_db::models::user::CreateUser;
use fleetlog_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

async fn create_test_user(pool: &PgPool, email: &str, role: &str) -> String {
    let password = "depot-gate-42";
    let input = CreateUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: hash_password(password).unwrap(),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap();
    password.to_string()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let password = create_test_user(&pool, "asha@example.com", "manager").await;
    let app = common::build_test_app(pool);

    let body = json!({ "email": "asha@example.com", "password": password });
    let response = post_json(app, "/api/v1/auth/login", body, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert_eq!(json["data"]["user"]["email"], "asha@example.com");
    assert_eq!(json["data"]["user"]["role"], "manager");
    assert!(json["data"]["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password_and_unknown_email(pool: PgPool) {
    create_test_user(&pool, "asha@example.com", "user").await;
    let app = common::build_test_app(pool);

    let wrong = json!({ "email": "asha@example.com", "password": "not-it" });
    let response = post_json(app.clone(), "/api/v1/auth/login", wrong, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let unknown = json!({ "email": "nobody@example.com", "password": "depot-gate-42" });
    let response = post_json(app, "/api/v1/auth/login", unknown, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_rejects_malformed_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "email": "not-an-email", "password": "x" });
    let response = post_json(app, "/api/v1/auth/login", body, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_created_user_can_log_in(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = bearer("admin");

    let account = json!({
        "name": "Kiran",
        "email": "kiran@example.com",
        "password": "depot-gate-42",
        "role": "user",
    });
    let response = post_json(app.clone(), "/api/v1/entities/add_user", account, Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let login = json!({ "email": "kiran@example.com", "password": "depot-gate-42" });
    let response = post_json(app, "/api/v1/auth/login", login, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_plain_user_cannot_create_accounts_or_delete(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = bearer("user");

    let account = json!({
        "name": "Mallory",
        "email": "mallory@example.com",
        "password": "depot-gate-42",
        "role": "admin",
    });
    let response = post_json(app.clone(), "/api/v1/entities/user", account, Some(&user)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let delete = json!({ "table": "vehicle", "ids": [1] });
    let response = post_json(app, "/api/v1/delete", delete, Some(&user)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
