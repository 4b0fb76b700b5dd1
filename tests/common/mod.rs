use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use doorman::config::{AuthPolicy, Config, SiteConfig};
use doorman::email::Mailer;
use doorman::models::Role;

/// Captured outbound email, recorded instead of sent.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub kind: &'static str,
    pub url: String,
}

/// Test double for the notification dispatcher. Records every hook
/// invocation so tests can fish the token out of the action URL.
#[derive(Default)]
pub struct MemoryMailer {
    pub sent: Mutex<Vec<SentEmail>>,
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_verification(&self, to: &str, _user_name: &str, url: &str) -> Result<(), String> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            kind: "verification",
            url: url.to_string(),
        });
        Ok(())
    }

    async fn send_password_reset(&self, to: &str, url: &str) -> Result<(), String> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            kind: "reset",
            url: url.to_string(),
        });
        Ok(())
    }
}

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub mailer: Arc<MemoryMailer>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of emails the capture mailer has recorded.
    pub fn emails_sent(&self) -> usize {
        self.mailer.sent.lock().unwrap().len()
    }

    /// Most recent token of the given kind mailed to `email`.
    pub fn latest_token(&self, email: &str, kind: &str) -> Option<String> {
        let sent = self.mailer.sent.lock().unwrap();
        sent.iter()
            .rev()
            .find(|e| e.to == email && e.kind == kind)
            .and_then(|e| e.url.split("token=").nth(1))
            .map(|t| t.to_string())
    }

    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/register"))
            .json(&json!({
                "first_name": first_name,
                "last_name": last_name,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("register request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn verify_email(&self, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/verify-email"))
            .json(&json!({ "token": token }))
            .send()
            .await
            .expect("verify request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Register an account and consume its verification token.
    pub async fn register_verified(&self, first: &str, last: &str, email: &str, password: &str) {
        let (body, status) = self.register(first, last, email, password).await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        let token = self
            .latest_token(email, "verification")
            .expect("no verification email captured");
        let (body, status) = self.verify_email(&token).await;
        assert_eq!(status, StatusCode::OK, "verify failed: {body}");
    }

    /// Register, verify, and log in the bootstrap admin. Returns the access token.
    pub async fn bootstrap_admin(&self) -> String {
        self.register_verified("Admin", "User", "admin@test.com", "password123")
            .await;
        let (body, status) = self.login("admin@test.com", "password123").await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// Spawn a test app with a fresh temporary database and a capture mailer.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("doorman_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to a random port
        base_url: "http://localhost:0".to_string(),
        log_level: "warn".to_string(),
        site: SiteConfig {
            name: "Acme Inc".to_string(),
            contact_address: "123 Main St, San Francisco, CA 94105".to_string(),
        },
        auth: AuthPolicy {
            require_email_verification: true,
            send_on_sign_up: true,
            auto_sign_in_after_verification: true,
            default_role: Role::User,
        },
        smtp: None,
    };

    let mailer = Arc::new(MemoryMailer::default());
    let app = doorman::build_app(
        pool.clone(),
        config,
        Some(mailer.clone() as Arc<dyn Mailer>),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        mailer,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
