use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;

use polaris_finance_server::adapter::handler::{router, AppState};
use polaris_finance_server::adapter::repository::ForecastPostgresRepository;
use polaris_finance_server::infrastructure::database::DatabaseConfig;
use polaris_finance_server::infrastructure::supabase_client::{
    SupabaseAuthClient, SupabaseConfig,
};
use polaris_finance_server::infrastructure::token_verifier::{JwtTokenVerifier, VerifierConfig};
use polaris_finance_server::infrastructure::{telemetry, AuthProvider, TokenVerifier};

/// Application configuration.
#[derive(Debug, serde::Deserialize)]
struct Config {
    app: AppConfig,
    server: ServerConfig,
    auth: AuthConfig,
    supabase: SupabaseConfig,
    #[serde(default)]
    database: Option<DatabaseConfig>,
    #[serde(default)]
    log: LogConfig,
}

#[derive(Debug, serde::Deserialize)]
struct AppConfig {
    name: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default = "default_environment")]
    environment: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

#[derive(Debug, serde::Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, serde::Deserialize)]
struct AuthConfig {
    #[serde(default = "default_audience")]
    audience: String,
    jwks: JwksConfig,
    #[serde(default)]
    hs256_secret: Option<SecretString>,
    /// HS256 シークレット未設定時に署名検証なしのデコードを許可する。
    /// テスト環境専用。本番構成で有効化してはならない。
    #[serde(default)]
    insecure_allow_unverified: bool,
}

fn default_audience() -> String {
    "authenticated".to_string()
}

#[derive(Debug, serde::Deserialize)]
struct JwksConfig {
    url: String,
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    fetch_timeout_secs: u64,
}

/// キーセットキャッシュの TTL デフォルト（6 時間）。
fn default_cache_ttl_secs() -> u64 {
    21600
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

#[derive(Debug, serde::Deserialize)]
struct LogConfig {
    #[serde(default = "default_log_format")]
    format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

fn default_log_format() -> String {
    "json".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/config.yaml".to_string());
    let config_content = std::fs::read_to_string(&config_path)?;
    let cfg: Config = serde_yaml::from_str(&config_content)?;

    telemetry::init_logger(&cfg.app.environment, &cfg.log.format);

    info!(
        app_name = %cfg.app.name,
        version = %cfg.app.version,
        environment = %cfg.app.environment,
        "starting polaris finance server"
    );

    if cfg.auth.insecure_allow_unverified {
        tracing::warn!(
            "auth.insecure_allow_unverified is enabled; HS256 tokens will be decoded \
             without signature verification when no secret is configured (test-only mode)"
        );
    }

    // Token verifier
    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(VerifierConfig {
        jwks_url: cfg.auth.jwks.url.clone(),
        audience: cfg.auth.audience.clone(),
        cache_ttl: std::time::Duration::from_secs(cfg.auth.jwks.cache_ttl_secs),
        fetch_timeout: std::time::Duration::from_secs(cfg.auth.jwks.fetch_timeout_secs),
        hs256_secret: cfg.auth.hs256_secret,
        insecure_allow_unverified: cfg.auth.insecure_allow_unverified,
    }));

    // Identity provider client
    let provider_health_url = format!("{}/auth/v1/health", cfg.supabase.base_url);
    let provider: Arc<dyn AuthProvider> = Arc::new(SupabaseAuthClient::new(cfg.supabase));

    // Database pool
    let database_url = match (std::env::var("DATABASE_URL").ok(), &cfg.database) {
        (Some(url), _) => url,
        (None, Some(db_config)) => db_config.connection_url(),
        (None, None) => anyhow::bail!(
            "database configuration is required (set DATABASE_URL or the database section)"
        ),
    };
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(
            cfg.database
                .as_ref()
                .map(|db| db.max_open_conns)
                .unwrap_or(25),
        )
        .connect(&database_url)
        .await?;
    info!("database connection pool established");

    let forecast_repo = Arc::new(ForecastPostgresRepository::new(db_pool.clone()));

    // AppState / Router
    let state = AppState::new(
        verifier,
        provider,
        forecast_repo,
        Some(db_pool),
        Some(provider_health_url),
    );
    let app = router(state);

    // REST server
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!("REST server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
