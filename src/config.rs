// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        ActivityRepository, FollowUpRepository, LeadRepository, TaskRepository, UserRepository,
    },
    services::{
        AuthService, FollowUpService, LeadService, Notifier, TaskService,
        notifier::NotifierConfig,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub followup_service: FollowUpService,
    pub task_service: TaskService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("database connection established");

        // Dispatch is opt-in: without full provider config the notifier
        // degrades to a logging no-op and nothing touches the network.
        let notifier = match notifier_config_from_env() {
            Some(config) => Notifier::spawn(config),
            None => {
                tracing::info!("outbound notifications disabled");
                Notifier::disabled()
            }
        };

        // Wire the dependency graph.
        let user_repo = UserRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let followup_repo = FollowUpRepository::new(db_pool.clone());
        let task_repo = TaskRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone());
        let lead_service = LeadService::new(
            lead_repo.clone(),
            user_repo.clone(),
            activity_repo.clone(),
            notifier.clone(),
        );
        let followup_service = FollowUpService::new(
            followup_repo,
            lead_repo,
            user_repo.clone(),
            notifier.clone(),
        );
        let task_service = TaskService::new(task_repo, user_repo, activity_repo, notifier);

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            lead_service,
            followup_service,
            task_service,
        })
    }
}

fn notifier_config_from_env() -> Option<NotifierConfig> {
    let enabled = env::var("NOTIFY_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    if !enabled {
        return None;
    }

    let api_url = env::var("WHATSAPP_API_URL").ok()?;
    let auth_key = env::var("WHATSAPP_AUTH_KEY").ok()?;
    let sender_number = env::var("WHATSAPP_SENDER_NUMBER").ok()?;
    Some(NotifierConfig { api_url, auth_key, sender_number })
}
