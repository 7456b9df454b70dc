use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Work factors accepted by bcrypt.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub bcrypt_cost: u32,
    /// Empty means any origin is accepted.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout: Duration,
    pub max_idle_time: Duration,
    pub stable_api: bool,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to mutate
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let uri = get("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?;

        let max_pool_size = parse_or(&get, "MONGODB_MAX_POOL_SIZE", 20u32)?;
        let min_pool_size = parse_or(&get, "MONGODB_MIN_POOL_SIZE", 5u32)?;
        if min_pool_size > max_pool_size {
            return Err(ConfigError::Invalid {
                key: "MONGODB_MIN_POOL_SIZE",
                value: format!("{} exceeds MONGODB_MAX_POOL_SIZE {}", min_pool_size, max_pool_size),
            });
        }

        let bcrypt_cost = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let cors_allowed_origins: Vec<String> = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 3000u16)?,
            database: DatabaseConfig {
                uri,
                name: get("MONGODB_DATABASE").unwrap_or_else(|| "JBox".to_string()),
                max_pool_size,
                min_pool_size,
                connect_timeout: Duration::from_secs(parse_or(&get, "MONGODB_CONNECT_TIMEOUT_SECS", 5u64)?),
                max_idle_time: Duration::from_secs(300),
                stable_api: parse_or(&get, "MONGODB_STABLE_API", true)?,
            },
            bcrypt_cost,
            cors_allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => {
            let parsed = raw.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::Invalid { key, value: raw })
        }
        None => Ok(default),
    }
}
