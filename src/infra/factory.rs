use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{error, info};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::domain::ports::{
    GroupRepository, ManufacturerRepository, PlasticTypeRepository, ProjectRepository,
    RoleRepository, SpoolRepository, UsageRepository, UserRepository,
};
use crate::domain::services::{
    auth_service::AuthService,
    bootstrap::{ensure_bootstrap_admin, ensure_default_roles},
    qr_codec::QrCodec,
    token_service::TokenService,
};
use crate::infra::repositories::{
    postgres_catalog_repo::{PostgresManufacturerRepo, PostgresPlasticTypeRepo},
    postgres_group_repo::PostgresGroupRepo, postgres_project_repo::PostgresProjectRepo,
    postgres_role_repo::PostgresRoleRepo, postgres_spool_repo::PostgresSpoolRepo,
    postgres_usage_repo::PostgresUsageRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_catalog_repo::{SqliteManufacturerRepo, SqlitePlasticTypeRepo},
    sqlite_group_repo::SqliteGroupRepo, sqlite_project_repo::SqliteProjectRepo,
    sqlite_role_repo::SqliteRoleRepo, sqlite_spool_repo::SqliteSpoolRepo,
    sqlite_usage_repo::SqliteUsageRepo, sqlite_user_repo::SqliteUserRepo,
};

struct Repositories {
    role_repo: Arc<dyn RoleRepository>,
    group_repo: Arc<dyn GroupRepository>,
    user_repo: Arc<dyn UserRepository>,
    spool_repo: Arc<dyn SpoolRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    usage_repo: Arc<dyn UsageRepository>,
    plastic_type_repo: Arc<dyn PlasticTypeRepository>,
    manufacturer_repo: Arc<dyn ManufacturerRepository>,
}

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let database_url = &config.database_url;

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse()?;
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;

        Repositories {
            role_repo: Arc::new(PostgresRoleRepo::new(pool.clone())),
            group_repo: Arc::new(PostgresGroupRepo::new(pool.clone())),
            user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
            spool_repo: Arc::new(PostgresSpoolRepo::new(pool.clone())),
            project_repo: Arc::new(PostgresProjectRepo::new(pool.clone())),
            usage_repo: Arc::new(PostgresUsageRepo::new(pool.clone())),
            plastic_type_repo: Arc::new(PostgresPlasticTypeRepo::new(pool.clone())),
            manufacturer_repo: Arc::new(PostgresManufacturerRepo::new(pool)),
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;

        Repositories {
            role_repo: Arc::new(SqliteRoleRepo::new(pool.clone())),
            group_repo: Arc::new(SqliteGroupRepo::new(pool.clone())),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            spool_repo: Arc::new(SqliteSpoolRepo::new(pool.clone())),
            project_repo: Arc::new(SqliteProjectRepo::new(pool.clone())),
            usage_repo: Arc::new(SqliteUsageRepo::new(pool.clone())),
            plastic_type_repo: Arc::new(SqlitePlasticTypeRepo::new(pool.clone())),
            manufacturer_repo: Arc::new(SqliteManufacturerRepo::new(pool)),
        }
    };

    ensure_default_roles(repos.role_repo.as_ref()).await?;
    ensure_bootstrap_admin(repos.user_repo.as_ref(), config).await?;

    let token_service = Arc::new(TokenService::new(config)?);
    let auth_service = Arc::new(AuthService::new(
        repos.user_repo.clone(),
        repos.group_repo.clone(),
        token_service.clone(),
    ));
    let qr_codec = Arc::new(QrCodec::new(config)?);

    Ok(AppState {
        config: config.clone(),
        role_repo: repos.role_repo,
        group_repo: repos.group_repo,
        user_repo: repos.user_repo,
        spool_repo: repos.spool_repo,
        project_repo: repos.project_repo,
        usage_repo: repos.usage_repo,
        plastic_type_repo: repos.plastic_type_repo,
        manufacturer_repo: repos.manufacturer_repo,
        token_service,
        auth_service,
        qr_codec,
    })
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .map_err(|e| {
            error!("Postgres migrations failed: {}", e);
            AppError::Database(e.into())
        })
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| {
            error!("SQLite migrations failed: {}", e);
            AppError::Database(e.into())
        })
}
