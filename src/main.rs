// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // If configuration fails the application must not start.
    let app_state = AppState::new()
        .await
        .expect("failed to initialize application state");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("failed to run database migrations");
    tracing::info!("database migrations applied");

    // A fresh database gets its first admin from the environment.
    if let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        app_state
            .auth_service
            .seed_admin(&email, &password)
            .await
            .expect("failed to seed admin account");
    }

    // Public routes
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Protected auth routes
    let account_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let lead_routes = Router::new()
        .route(
            "/",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route("/bulk-import", post(handlers::leads::bulk_import))
        .route("/bulk-delete", post(handlers::leads::bulk_delete))
        .route(
            "/{id}",
            put(handlers::leads::update_lead).delete(handlers::leads::delete_lead),
        )
        .route("/{id}/status", put(handlers::leads::update_lead_status))
        .route("/{id}/assign", put(handlers::leads::assign_lead))
        .route("/{id}/reassign", put(handlers::leads::reassign_lead))
        .route(
            "/{id}/communications",
            post(handlers::leads::add_communication),
        )
        .route(
            "/{id}/comments",
            post(handlers::leads::add_comment).get(handlers::leads::list_comments),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let followup_routes = Router::new()
        .route(
            "/",
            get(handlers::followups::list_followups).post(handlers::followups::create_followup),
        )
        .route("/stats", get(handlers::followups::followup_stats))
        .route("/counts", get(handlers::followups::followup_counts))
        .route(
            "/{id}",
            put(handlers::followups::update_followup)
                .delete(handlers::followups::delete_followup),
        )
        .route(
            "/{id}/status",
            put(handlers::followups::update_followup_status),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let task_routes = Router::new()
        .route(
            "/",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route("/{id}", axum::routing::delete(handlers::tasks::delete_task))
        .route("/{id}/status", put(handlers::tasks::update_task_status))
        .route("/{id}/comments", post(handlers::tasks::add_task_comment))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(account_routes))
        .nest("/api/leads", lead_routes)
        .nest("/api/followups", followup_routes)
        .nest("/api/tasks", task_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind TCP listener");
    tracing::info!("server listening on {}", addr);
    axum::serve(listener, app).await.expect("axum server error");
}
