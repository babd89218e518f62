/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskfold_api::{app::AppState, config::Config};
/// use taskfold_shared::store::PgStore;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = taskfold_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskfold_shared::{
    auth::middleware::{bearer_token, resolve_principal},
    service::{FolderService, TaskService},
    store::EntityStore,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference counted, so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    /// Entity store shared by the services
    pub store: Arc<dyn EntityStore>,

    /// Task operations
    pub tasks: TaskService,

    /// Folder and membership operations
    pub folders: FolderService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state over a store
    pub fn new(store: Arc<dyn EntityStore>, config: Config) -> Self {
        Self {
            tasks: TaskService::new(store.clone()),
            folders: FolderService::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                              # Health check (public)
/// └── /v1/
///     ├── /auth/                           # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /users/me                        # GET
///     ├── /tasks                           # GET (search), POST
///     │   └── /:task_id                    # GET, PUT, DELETE
///     └── /folders                         # GET, POST
///         └── /:folder_id                  # GET, PATCH, DELETE
///             ├── /tasks                   # GET (search), POST
///             └── /members                 # GET, POST
///                 └── /:user_id            # PUT, DELETE
/// ```
///
/// Everything under `/v1` except `/auth` requires a bearer access token.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Everything else requires a resolved principal
    let protected_routes = Router::new()
        .route("/users/me", get(routes::users::me))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:task_id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/folders",
            get(routes::folders::list_folders).post(routes::folders::create_folder),
        )
        .route(
            "/folders/:folder_id",
            get(routes::folders::get_folder)
                .patch(routes::folders::rename_folder)
                .delete(routes::folders::delete_folder),
        )
        .route(
            "/folders/:folder_id/tasks",
            get(routes::tasks::list_folder_tasks).post(routes::tasks::create_folder_task),
        )
        .route(
            "/folders/:folder_id/members",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/folders/:folder_id/members/:user_id",
            put(routes::members::change_role).delete(routes::members::remove_member),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.cors_permissive() {
        // Development mode: permissive CORS
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer authentication layer
///
/// Resolves the access token to a principal through the entity store and
/// injects it into request extensions for the `Principal` extractor.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Owned copy: the request body is not Sync, so no borrow of it may cross an await
    let token = bearer_token(req.headers())?.to_owned();
    let principal = resolve_principal(state.store.as_ref(), &token, state.jwt_secret()).await?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
