use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RobotsConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// Upper bound on a full collection scan, cursor drain included.
    pub query_timeout: Duration,
    /// Must cover `query_timeout`: a scan orphaned by a departed client keeps
    /// its cursor open until it finishes, and closing the client waits for it.
    pub shutdown_timeout: Duration,
}

impl RobotsConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Builds the service config from `lookup`, which maps variable names to
    /// values. `load` passes the process environment.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let query_timeout = parse_secs(
            "MONGO_QUERY_TIMEOUT_SECS",
            &get("MONGO_QUERY_TIMEOUT_SECS", Some("30"))?,
        )?;
        // Defaults to the query bound so an orphaned scan can always finish
        let shutdown_timeout = parse_secs(
            "MONGO_SHUTDOWN_TIMEOUT_SECS",
            &get(
                "MONGO_SHUTDOWN_TIMEOUT_SECS",
                Some(query_timeout.as_secs().to_string().as_str()),
            )?,
        )?;
        if shutdown_timeout < query_timeout {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "MONGO_SHUTDOWN_TIMEOUT_SECS ({}s) must be at least MONGO_QUERY_TIMEOUT_SECS ({}s)",
                shutdown_timeout.as_secs(),
                query_timeout.as_secs()
            )));
        }

        Ok(RobotsConfig {
            common,
            service_name: get("SERVICE_NAME", Some("robots-service"))?,
            log_level: get("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.is_empty()),
            mongodb: MongoConfig {
                uri: get("MONGO_URI", None)?,
                database: get("MONGO_DATABASE", Some("robots"))?,
                collection: get("MONGO_COLLECTION", Some("robots"))?,
                query_timeout,
                shutdown_timeout,
            },
        })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.is_empty()) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, AppError> {
    let secs: u64 = value.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Invalid value for {}: {} ({})", key, value, e))
    })?;
    if secs == 0 {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be greater than zero",
            key
        )));
    }
    Ok(Duration::from_secs(secs))
}
