#![allow(dead_code)]

use customer_service::configuration::{DatabaseSettings, JwtSettings, Settings};
use customer_service::db::{InMemoryCustomerRepository, InMemoryIdAllocator};
use customer_service::helpers::TokenCodec;
use customer_service::models::{Identity, Role};
use serde_json::{json, Value};
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_ISSUER: &str = "customer-service";

pub struct TestApp {
    pub address: String,
    pub codec: TokenCodec,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn token_for(&self, id: &str, email: &str, role: Role) -> String {
        let identity = Identity {
            subject_id: id.to_string(),
            email: email.to_string(),
            role,
        };
        self.codec.issue(&identity).expect("Failed to issue token").0
    }

    pub fn admin_token(&self) -> String {
        self.token_for("admin", "admin@example.com", Role::Admin)
    }

    /// Registers a customer and returns the response body.
    pub async fn register(&self, email: &str) -> Value {
        let response = self
            .client
            .post(format!("{}/customers", self.address))
            .json(&json!({
                "email": email,
                "password": "pw123456",
                "firstName": "A",
                "lastName": "B",
                "phone": "555-0001"
            }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());

        response.json().await.expect("Response should be valid JSON")
    }
}

pub fn test_settings() -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database_name: "customer_service".to_string(),
            max_connections: 1,
        },
        app_port: 0,
        app_host: "127.0.0.1".to_string(),
        debug_stacktrace: false,
        redis: None,
        jwt: JwtSettings {
            secret: TEST_SECRET.to_string(),
            issuer: TEST_ISSUER.to_string(),
            ttl_seconds: 3600,
        },
    }
}

pub async fn spawn_app_with_configuration(configuration: Settings) -> TestApp {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let codec = TokenCodec::new(&configuration.jwt).expect("Test secret should be accepted");
    let server = customer_service::startup::run(
        listener,
        Arc::new(InMemoryCustomerRepository::new()),
        Arc::new(InMemoryIdAllocator::new()),
        configuration,
    )
    .await
    .expect("Failed to bind address.");

    let _ = tokio::spawn(server);

    TestApp {
        address,
        codec,
        client: reqwest::Client::new(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_configuration(test_settings()).await
}
