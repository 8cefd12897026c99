mod common;

use chrono::Duration;
use customer_service::configuration::JwtSettings;
use customer_service::helpers::TokenCodec;
use customer_service::models::{Identity, Role};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn customer_five() -> Identity {
    Identity {
        subject_id: "5".to_string(),
        email: "c5@b.com".to_string(),
        role: Role::Customer,
    }
}

async fn get_with_token(app: &common::TestApp, path: &str, token: &str) -> reqwest::Response {
    app.client
        .get(format!("{}{}", app.address, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn protected_route_requires_a_token() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(format!("{}/customers/1", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(StatusCode::UNAUTHORIZED, response.status());
    let body: Value = response.json().await.unwrap();
    assert_eq!("Unauthorized", body["error"]);
    assert_eq!("/customers/1", body["path"]);
}

#[tokio::test]
async fn other_schemes_count_as_no_token() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(format!("{}/customers/1", app.address))
        .header("Authorization", "Basic dXNlcjpwdw==")
        .send()
        .await
        .unwrap();

    assert_eq!(StatusCode::UNAUTHORIZED, response.status());
}

#[tokio::test]
async fn rejected_tokens_share_one_message() {
    let app = common::spawn_app().await;

    let (expired, _) = app
        .codec
        .issue_with_ttl(&customer_five(), Duration::seconds(-60))
        .unwrap();
    let foreign = TokenCodec::new(&JwtSettings {
        secret: "x".repeat(40),
        issuer: common::TEST_ISSUER.to_string(),
        ttl_seconds: 3600,
    })
    .unwrap();
    let (forged, _) = foreign.issue(&customer_five()).unwrap();
    let other_issuer = TokenCodec::new(&JwtSettings {
        secret: common::TEST_SECRET.to_string(),
        issuer: "someone-else".to_string(),
        ttl_seconds: 3600,
    })
    .unwrap();
    let (misissued, _) = other_issuer.issue(&customer_five()).unwrap();

    let mut messages = vec![];
    for token in [
        expired.as_str(),
        forged.as_str(),
        misissued.as_str(),
        "not.a.token",
    ] {
        let response = get_with_token(&app, "/customers/5", token).await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());
        let body: Value = response.json().await.unwrap();
        messages.push(body["message"].clone());
    }

    assert!(messages.iter().all(|m| *m == messages[0]), "{messages:?}");
    assert_eq!("Invalid or expired token", messages[0]);
}

#[tokio::test]
async fn bad_token_is_rejected_even_on_public_route() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .post(format!("{}/customers", app.address))
        .bearer_auth("not.a.token")
        .json(&json!({"email": "a@b.com", "password": "pw123456"}))
        .send()
        .await
        .unwrap();

    assert_eq!(StatusCode::UNAUTHORIZED, response.status());
}

#[tokio::test]
async fn customer_is_forbidden_on_admin_routes() {
    let app = common::spawn_app().await;
    let token = app.token_for("5", "c5@b.com", Role::Customer);

    let list = get_with_token(&app, "/customers", &token).await;
    assert_eq!(StatusCode::FORBIDDEN, list.status());

    let delete = app
        .client
        .delete(format!("{}/customers/5", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::FORBIDDEN, delete.status());

    let role = app
        .client
        .put(format!("{}/customers/5/role", app.address))
        .bearer_auth(&token)
        .json(&json!({"role": "ADMIN"}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::FORBIDDEN, role.status());
}

#[tokio::test]
async fn login_issues_a_usable_token() {
    let app = common::spawn_app().await;
    app.register("a@b.com").await;

    let response = app
        .client
        .post(format!("{}/customers/auth/login", app.address))
        .json(&json!({"email": "a@b.com", "password": "pw123456"}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());

    let body: Value = response.json().await.unwrap();
    assert_eq!("1", body["id"]);
    assert_eq!("CUSTOMER", body["role"]);
    assert_eq!("Bearer", body["tokenType"]);
    let token = body["accessToken"].as_str().unwrap();

    let claims = app.codec.validate(token).unwrap();
    assert_eq!("1", claims.user_id);
    assert_eq!(common::TEST_ISSUER, claims.issuer);

    let own = get_with_token(&app, "/customers/1", token).await;
    assert_eq!(StatusCode::OK, own.status());
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_part_was_wrong() {
    let app = common::spawn_app().await;
    app.register("a@b.com").await;

    let mut messages = vec![];
    for payload in [
        json!({"email": "a@b.com", "password": "wrong-password"}),
        json!({"email": "nobody@b.com", "password": "pw123456"}),
    ] {
        let response = app
            .client
            .post(format!("{}/customers/auth/login", app.address))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());
        let body: Value = response.json().await.unwrap();
        messages.push(body["message"].clone());
    }
    assert_eq!(messages[0], messages[1]);

    let blank = app
        .client
        .post(format!("{}/customers/auth/login", app.address))
        .json(&json!({"email": "a@b.com", "password": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, blank.status());
}
