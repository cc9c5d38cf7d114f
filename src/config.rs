use anyhow::Context;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS_ENV: &str = "CAMPAIGN_REPORT_MAX_CONNECTIONS";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup(DATABASE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .with_context(|| format!("{DATABASE_URL_ENV} must be set to a Postgres instance"))?;

        let max_connections = match lookup(MAX_CONNECTIONS_ENV) {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|count| *count > 0)
                .with_context(|| format!("{MAX_CONNECTIONS_ENV} must be a positive integer"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}
