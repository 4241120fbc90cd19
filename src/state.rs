use crate::config::AppConfig;
use crate::db;
use crate::mailer::{Mailer, SmtpMailer};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = db::connect(&config.database_url).await?;
        db::ensure_schema(&db).await?;

        let mailer = Arc::new(SmtpMailer) as Arc<dyn Mailer>;

        Ok(Self { db, config, mailer })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, mailer: Arc<dyn Mailer>) -> Self {
        Self { db, config, mailer }
    }

    pub fn fake() -> Self {
        use crate::mailer::MailError;
        use axum::async_trait;

        struct NoopMailer;
        #[async_trait]
        impl Mailer for NoopMailer {
            async fn send(
                &self,
                _sender: &str,
                _recipient: &str,
                _app_password: &str,
                _subject: &str,
                _body: &str,
            ) -> Result<(), MailError> {
                Ok(())
            }
        }

        let db = sqlx::sqlite::SqlitePoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .expect("lazy pool ok");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            secret: "test".into(),
            session_ttl_minutes: 5,
            pbkdf2_rounds: 1_000,
            mail: crate::config::MailConfig {
                sender: None,
                recipient: None,
                app_password: None,
            },
        });

        let mailer = Arc::new(NoopMailer) as Arc<dyn Mailer>;
        Self { db, config, mailer }
    }
}
