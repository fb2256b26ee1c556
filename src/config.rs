use std::env;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set in .env file")]
    Missing(&'static str),
    #[error("SUPABASE_URL is not a valid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub default_user_email: String,
    pub storage_bucket: String,
}

impl AppConfig {
    /// Loads `.env.{RUST_ENV}` first, then falls back to `.env`, then reads
    /// the variables. Values are cleaned of stray whitespace and quotes —
    /// hosted-dashboard copy/paste tends to carry both.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let env_file = format!(".env.{}", environment);
        if dotenvy::from_filename(&env_file).is_err() {
            dotenvy::dotenv().ok();
        }

        let supabase_url = required("SUPABASE_URL")?;
        Url::parse(&supabase_url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            supabase_url,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            default_user_email: required("DEFAULT_USER_EMAIL")?,
            storage_bucket: env::var("STORAGE_BUCKET")
                .map(|value| clean(&value))
                .unwrap_or_else(|_| "media".to_string()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    let value = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    let value = clean(&value);
    if value.is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(value)
}

fn clean(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}
