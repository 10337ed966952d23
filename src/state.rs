use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

use crate::auth::repo::PgStore;
use crate::auth::service::AuthService;
use crate::background::TaskGroup;
use crate::config::AppConfig;
use crate::mailer::LogMailer;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub background: TaskGroup,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let background = TaskGroup::new();
        let store = Arc::new(PgStore::new(db.clone()));
        let mailer = Arc::new(LogMailer::new(config.smtp.clone()));
        let auth = AuthService::new(store, mailer, background.clone());

        Ok(Self {
            db,
            config,
            auth,
            background,
        })
    }
}
