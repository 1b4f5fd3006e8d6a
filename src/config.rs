use std::env;
use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 20)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_or("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or_default(),

            jwt_secret: required("JWT_SECRET")?,
            jwt_access_ttl_secs: parsed_or("JWT_ACCESS_TTL_SECS", 900)?,
            jwt_refresh_ttl_secs: parsed_or("JWT_REFRESH_TTL_SECS", 604_800)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// All origins the CORS layer should accept: the front end plus any extras.
    pub fn allowed_origins(&self) -> Vec<String> {
        std::iter::once(self.frontend_url.clone())
            .chain(self.cors_extra_origins.iter().cloned())
            .collect()
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/wellness_test".into(),
        db_max_connections: 1,
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3000".into(),
        cors_extra_origins: vec![],
        jwt_secret: "test-secret-do-not-use".into(),
        jwt_access_ttl_secs: 900,
        jwt_refresh_ttl_secs: 604_800,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins_skips_blanks() {
        let origins = split_origins(" http://a.local , ,http://b.local,");
        assert_eq!(origins, vec!["http://a.local", "http://b.local"]);
    }

    #[test]
    fn test_allowed_origins_leads_with_frontend() {
        let mut config = test_config();
        config.cors_extra_origins = vec!["http://192.168.1.5:3000".into()];
        assert_eq!(
            config.allowed_origins(),
            vec!["http://localhost:3000", "http://192.168.1.5:3000"]
        );
    }

    #[test]
    fn test_listen_addr() {
        let mut config = test_config();
        config.port = 8080;
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }
}
