use anyhow::Context;
use serde::Deserialize;

/// Where signing keys come from and which tokens are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub issuer_url: String,
    pub audience: String,
    pub jwks_requests_per_minute: u32,
    pub jwks_timeout_secs: u64,
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    pub fn jwks_url(&self) -> String {
        format!(
            "{}/auth/v1/.well-known/jwks.json",
            self.issuer_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub auth: AuthConfig,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("missing {key} environment variable"))
        };

        let database_url = required("DATABASE_URL")?;
        let auth = AuthConfig {
            issuer_url: required("SUPABASE_URL")?,
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "authenticated".into()),
            jwks_requests_per_minute: parse_or(&lookup, "JWKS_REQUESTS_PER_MINUTE", 5)?,
            jwks_timeout_secs: parse_or(&lookup, "JWKS_TIMEOUT_SECS", 30)?,
            jwks_cache_ttl_secs: parse_or(&lookup, "JWKS_CACHE_TTL_SECS", 600)?,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]);

        // APP_PORT takes precedence over PORT.
        let port_key = if lookup("APP_PORT").is_some() {
            "APP_PORT"
        } else {
            "PORT"
        };

        Ok(Self {
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", false)?,
            auth,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, port_key, 3001)?,
            cors_origins,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
