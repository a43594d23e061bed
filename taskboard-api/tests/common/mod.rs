/// Common test utilities for integration tests
///
/// Builds the full router over a real database, creates users with access
/// tokens and sends JSON requests through the router in-process.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims, TokenType};
use taskboard_shared::db::migrations::run_migrations;
use taskboard_shared::models::user::{CreateUser, User};
use taskboard_shared::realtime::{hub::TopicHub, Fanout};
use tower::ServiceExt;
use uuid::Uuid;

/// A registered user plus a bearer token for it
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    users: Vec<Uuid>,
}

impl TestContext {
    /// Connects using `DATABASE_URL`/`JWT_SECRET` and runs migrations
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let fanout = Fanout::local(Arc::new(TopicHub::new(16)));
        let app = build_router(AppState::new(db.clone(), config.clone(), fanout));

        Ok(TestContext {
            db,
            app,
            config,
            users: Vec::new(),
        })
    }

    /// Creates a user directly in the database and signs an access token
    pub async fn user(&mut self, name: &str) -> anyhow::Result<TestUser> {
        let tag = Uuid::new_v4().simple().to_string();

        let user = User::create(
            &self.db,
            CreateUser {
                username: format!("{name}-{tag}"),
                email: format!("{name}-{tag}@example.com"),
                password_hash: "test_hash".to_string(),
            },
        )
        .await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, &self.config.jwt.secret)?;

        self.users.push(user.id);
        Ok(TestUser { user, token })
    }

    /// Registers a user created through the API for cleanup
    pub fn track(&mut self, user_id: Uuid) {
        self.users.push(user_id);
    }

    /// Sends a request and returns the status with the parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        as_user: Option<&TestUser>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(user) = as_user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", user.token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, as_user: &TestUser) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(as_user), None).await
    }

    pub async fn post(&self, uri: &str, as_user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(as_user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, as_user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(as_user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, as_user: &TestUser) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(as_user), None).await
    }

    /// Deletes the users this context created; their projects, tasks,
    /// comments and notifications cascade with them
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        for id in &self.users {
            User::delete(&self.db, *id).await?;
        }
        Ok(())
    }
}

/// Extracts `field` of a JSON object as a UUID
pub fn id_of(value: &Value, field: &str) -> Uuid {
    value[field]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("missing uuid field {field} in {value}"))
}
