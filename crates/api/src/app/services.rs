use std::sync::Arc;

use anyhow::Context;

use notekeeper_auth::{AuthError, AuthService, CredentialHasher, TokenIssuer, UserStore};
use notekeeper_infra::{
    config::AppConfig,
    db::{self, InMemoryNoteStore, InMemoryUserStore, PgNoteStore, PgUserStore},
    external::YandexSpeller,
};
use notekeeper_notes::{AcceptAll, NoteService, NoteStore, SpellChecker};

/// Services shared by every handler.
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub notes: Arc<NoteService>,
}

impl AppServices {
    /// Wire services over already-built stores and speller.
    pub fn new(
        users: Arc<dyn UserStore>,
        notes: Arc<dyn NoteStore>,
        speller: Arc<dyn SpellChecker>,
        cfg: &AppConfig,
    ) -> Result<Self, AuthError> {
        let hasher = CredentialHasher::new(cfg.hasher.params())?;
        let tokens = TokenIssuer::new(cfg.jwt.secret.as_bytes());
        let auth = AuthService::new(users, hasher, tokens, cfg.jwt.token_ttl())?;

        Ok(Self {
            auth: Arc::new(auth),
            notes: Arc::new(NoteService::new(notes, speller)),
        })
    }
}

/// Build services from configuration: Postgres when a DSN is configured,
/// in-memory stores otherwise.
pub async fn build_services(cfg: &AppConfig) -> anyhow::Result<AppServices> {
    let (users, notes): (Arc<dyn UserStore>, Arc<dyn NoteStore>) = if cfg.postgres.dsn.is_empty() {
        tracing::warn!("postgres.dsn is not set, data will not survive a restart");
        (
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryNoteStore::new()),
        )
    } else {
        let pool = db::connect(&cfg.postgres)
            .await
            .context("connect to postgres")?;
        db::ensure_schema(&pool)
            .await
            .context("create database schema")?;
        tracing::info!(max_connections = cfg.postgres.max_connections, "connected to postgres");
        (
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgNoteStore::new(pool)),
        )
    };

    let speller: Arc<dyn SpellChecker> = if cfg.speller.enabled {
        Arc::new(YandexSpeller::new(cfg.speller.url.as_str(), cfg.speller.timeout())?)
    } else {
        tracing::info!("spell checking disabled");
        Arc::new(AcceptAll)
    };

    AppServices::new(users, notes, speller, cfg).context("initialize services")
}
