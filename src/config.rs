use chrono_tz::Tz;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// One year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub public_url: Option<String>,
    pub timezone: Option<String>,
    pub max_body_bytes: Option<usize>,
    pub session_ttl_hours: Option<i64>,
    pub static_dir: Option<String>,

    // Object storage (S3 compatible)
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    pub s3_access_key_id: String,
    pub s3_secret_access_key: String,

    // Card payments
    pub stripe_secret_key: String,
    pub stripe_publishable_key: String,
    pub stripe_api_base: Option<String>,

    // Social login
    pub facebook_app_id: String,
    pub facebook_app_secret: String,
    pub facebook_callback_url: String,
    pub facebook_graph_base: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .add_source(config::Environment::default())
            .build()?;

        let mut config: Config = cfg.try_deserialize()?;

        if config.timezone.is_none() {
            config.timezone = Some("UTC".to_string());
        }

        config.validate()?;

        Ok(config)
    }

    /// Timezone used when rendering dates in pages.
    pub fn get_timezone(&self) -> Result<Tz, chrono_tz::ParseError> {
        let tz_str = self.timezone.as_deref().unwrap_or("UTC");
        tz_str.parse::<Tz>()
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !self
            .host
            .chars()
            .all(|c| c.is_alphanumeric() || ".:-_".contains(c))
        {
            return Err(config::ConfigError::Message(
                "Invalid host format".to_string(),
            ));
        }

        if self.port < 1024 {
            return Err(config::ConfigError::Message(
                "Port must be 1024 or higher for security reasons".to_string(),
            ));
        }

        if let Some(tz_str) = &self.timezone {
            if tz_str.parse::<Tz>().is_err() {
                return Err(config::ConfigError::Message(format!(
                    "Invalid timezone: {}",
                    tz_str
                )));
            }
        }

        // 1MB..500MB
        if let Some(limit) = self.max_body_bytes {
            let min = 1024 * 1024;
            let max = 500 * 1024 * 1024;
            if limit < min || limit > max {
                return Err(config::ConfigError::Message(format!(
                    "max_body_bytes must be between {} and {} bytes",
                    min, max
                )));
            }
        }

        if let Some(ttl) = self.session_ttl_hours {
            if ttl <= 0 || ttl > MAX_SESSION_TTL_HOURS {
                return Err(config::ConfigError::Message(format!(
                    "session_ttl_hours must be between 1 and {}",
                    MAX_SESSION_TTL_HOURS
                )));
            }
        }

        if self.s3_bucket.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "s3_bucket must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    pub fn effective_max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(10 * 1024 * 1024)
    }

    pub fn effective_session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.unwrap_or(24 * 7))
    }

    pub fn effective_static_dir(&self) -> &str {
        self.static_dir.as_deref().unwrap_or("public")
    }

    pub fn effective_stripe_api_base(&self) -> String {
        self.stripe_api_base
            .clone()
            .unwrap_or_else(|| "https://api.stripe.com".to_string())
    }

    pub fn effective_facebook_graph_base(&self) -> String {
        self.facebook_graph_base
            .clone()
            .unwrap_or_else(|| "https://graph.facebook.com/v19.0".to_string())
    }

    /// Public base URL of uploaded objects, without a trailing slash.
    pub fn bucket_public_url(&self) -> String {
        match &self.s3_endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.s3_bucket),
            None => format!("https://{}.s3.amazonaws.com", self.s3_bucket),
        }
    }

    /// Only secure cookies when we are served over https.
    pub fn secure_cookies(&self) -> bool {
        self.public_url
            .as_deref()
            .map(|url| url.starts_with("https://"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub sql_log: Option<bool>,
}

impl DatabaseSettings {
    pub fn default_from_url(url: String) -> Self {
        Self {
            url,
            max_connections: parse_env_var("DATABASE_MAX_CONNECTIONS"),
            min_connections: parse_env_var("DATABASE_MIN_CONNECTIONS"),
            connect_timeout_secs: parse_env_var("DATABASE_CONNECT_TIMEOUT_SECS"),
            acquire_timeout_secs: parse_env_var("DATABASE_ACQUIRE_TIMEOUT_SECS"),
            idle_timeout_secs: parse_env_var("DATABASE_IDLE_TIMEOUT_SECS"),
            sql_log: parse_env_var("DATABASE_SQL_LOG"),
        }
    }
}

fn parse_env_var<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok().and_then(|value| value.parse::<T>().ok())
}

#[cfg(test)]
impl Config {
    pub(crate) fn sample() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_url: None,
            timezone: Some("UTC".to_string()),
            max_body_bytes: None,
            session_ttl_hours: None,
            static_dir: None,
            s3_bucket: "online-dating-app-bucket".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            s3_access_key_id: "AKID".to_string(),
            s3_secret_access_key: "secret".to_string(),
            stripe_secret_key: "sk_test".to_string(),
            stripe_publishable_key: "pk_test".to_string(),
            stripe_api_base: None,
            facebook_app_id: "app".to_string(),
            facebook_app_secret: "secret".to_string(),
            facebook_callback_url: "http://localhost:3000/auth/facebook/callback".to_string(),
            facebook_graph_base: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sane_defaults() {
        assert!(Config::sample().validate().is_ok());
    }

    #[test]
    fn rejects_privileged_port() {
        let mut config = Config::sample();
        config.port = 80;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut config = Config::sample();
        config.timezone = Some("Mars/Olympus".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_body_limit_out_of_range() {
        let mut config = Config::sample();
        config.max_body_bytes = Some(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn session_ttl_must_fit_a_year() {
        let mut config = Config::sample();
        config.session_ttl_hours = Some(0);
        assert!(config.validate().is_err());

        config.session_ttl_hours = Some(i64::MAX / 2);
        assert!(config.validate().is_err());

        config.session_ttl_hours = Some(MAX_SESSION_TTL_HOURS);
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_session_ttl().num_hours(), MAX_SESSION_TTL_HOURS);
    }

    #[test]
    fn bucket_url_uses_virtual_host_style_without_endpoint() {
        let config = Config::sample();
        assert_eq!(
            config.bucket_public_url(),
            "https://online-dating-app-bucket.s3.amazonaws.com"
        );
    }

    #[test]
    fn bucket_url_uses_path_style_with_endpoint() {
        let mut config = Config::sample();
        config.s3_endpoint = Some("http://localhost:9000/".to_string());
        assert_eq!(
            config.bucket_public_url(),
            "http://localhost:9000/online-dating-app-bucket"
        );
    }
}
