/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::realtime::{hub::TopicHub, Fanout};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let fanout = Fanout::local(Arc::new(TopicHub::new(config.realtime.channel_capacity)));
/// let state = AppState::new(pool, config, fanout);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{error::ApiError, middleware::security::SecurityHeadersLayer};
use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::{
    auth::middleware::{authenticate_bearer, AuthError},
    models::user::User,
    realtime::Fanout,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; all members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,

    /// Realtime topic hub plus optional cross-instance relay
    pub fanout: Fanout,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, fanout: Fanout) -> Self {
        Self {
            db,
            config: Arc::new(config),
            fanout,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health                         (public)
/// ├── GET  /ws                             (public, realtime)
/// ├── /auth
/// │   ├── POST /register, /login, /refresh (public)
/// │   └── GET  /me
/// ├── /projects        GET, POST, /:id GET|PUT|DELETE, /:id/members ...
/// ├── /boards          POST, /:id GET|PUT|DELETE, /project/:id GET
/// ├── /tasks           POST, /:id GET|PUT|DELETE, /project/:id, /board/:id
/// ├── /comments        POST, /:id PUT|DELETE, /task/:id GET
/// └── /notifications   GET, /:id/read PUT, /read-all PUT
/// ```
///
/// Everything except `/health`, `/ws` and the public auth routes sits behind
/// [`jwt_auth_layer`].
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/ws", get(routes::realtime::ws_handler))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/:id/members", post(routes::projects::add_member))
        .route(
            "/:id/members/:user_id",
            delete(routes::projects::remove_member),
        );

    let board_routes = Router::new()
        .route("/", post(routes::boards::create_board))
        .route("/project/:project_id", get(routes::boards::list_project_boards))
        .route(
            "/:id",
            get(routes::boards::get_board)
                .put(routes::boards::update_board)
                .delete(routes::boards::delete_board),
        );

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/project/:project_id", get(routes::tasks::list_project_tasks))
        .route("/board/:board_id", get(routes::tasks::list_board_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let comment_routes = Router::new()
        .route("/", post(routes::comments::create_comment))
        .route("/task/:task_id", get(routes::comments::list_task_comments))
        .route(
            "/:id",
            put(routes::comments::update_comment).delete(routes::comments::delete_comment),
        );

    let notification_routes = Router::new()
        .route("/", get(routes::notifications::list_notifications))
        .route("/read-all", put(routes::notifications::mark_all_read))
        .route("/:id/read", put(routes::notifications::mark_read));

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .nest("/projects", project_routes)
        .nest("/boards", board_routes)
        .nest("/tasks", task_routes)
        .nest("/comments", comment_routes)
        .nest("/notifications", notification_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer authentication for protected routes
///
/// Validates the access token, then checks that its subject still exists
/// before inserting the caller's `AuthContext` into the request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate_bearer(req.headers(), state.jwt_secret())?;

    let exists = User::exists(&state.db, auth.user_id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
    if !exists {
        return Err(AuthError::UnknownUser.into());
    }

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{body::Body, http::StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use std::collections::HashMap;
    use taskboard_shared::realtime::hub::TopicHub;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    /// A router whose pool never connects; only requests rejected before any
    /// query can be exercised with it.
    fn test_app() -> Router {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgresql://localhost:1/taskboard"),
            ("JWT_SECRET", SECRET),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let fanout = Fanout::local(Arc::new(TopicHub::new(8)));

        build_router(AppState::new(pool, config, fanout))
    }

    async fn status_of(req: Request<Body>) -> StatusCode {
        test_app().oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for (method, uri) in [
            ("GET", "/projects"),
            ("POST", "/tasks"),
            ("PUT", "/notifications/read-all"),
            ("GET", "/auth/me"),
        ] {
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();

            assert_eq!(status_of(req).await, StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let req = Request::builder()
            .uri("/projects")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();

        assert_eq!(status_of(req).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_token_not_accepted_as_access() {
        let pair =
            taskboard_shared::auth::jwt::issue_token_pair(uuid::Uuid::new_v4(), SECRET).unwrap();

        let req = Request::builder()
            .uri("/projects")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", pair.refresh_token),
            )
            .body(Body::empty())
            .unwrap();

        assert_eq!(status_of(req).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_security_headers_on_rejections() {
        let response = test_app()
            .oneshot(Request::builder().uri("/projects").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
    }
}
