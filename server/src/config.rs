use serde::Deserialize;
use std::time::Duration;

use crate::query::DEFAULT_LIMIT;

const ENV_PREFIX: &str = "IKLIM_";

#[derive(Clone, Debug)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub pool_size: u32,
    pub connect_timeout: Duration,
}

impl DbConfig {
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.dbname)
            .connect_timeout(self.connect_timeout);
        if !self.password.is_empty() {
            pg.password(&self.password);
        }
        pg
    }
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub capacity: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub db: DbConfig,
    pub cache: CacheConfig,
    pub default_limit: i64,
}

// Flat on purpose: envy cannot parse numbers through #[serde(flatten)].
#[derive(Debug, Deserialize)]
struct EnvVars {
    #[serde(default = "default_host")]
    db_host: String,
    #[serde(default = "default_port")]
    db_port: u16,
    #[serde(default = "default_user")]
    db_user: String,
    #[serde(default)]
    db_password: String,
    #[serde(default = "default_dbname")]
    db_name: String,
    #[serde(default = "default_pool_size")]
    db_pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    db_connect_timeout_secs: u64,
    #[serde(default = "default_cache_ttl")]
    cache_ttl_secs: u64,
    #[serde(default)]
    cache_capacity: Option<usize>,
    #[serde(default = "default_limit")]
    default_limit: i64,
}

impl From<EnvVars> for Config {
    fn from(vars: EnvVars) -> Self {
        Config {
            db: DbConfig {
                host: vars.db_host,
                port: vars.db_port,
                user: vars.db_user,
                password: vars.db_password,
                dbname: vars.db_name,
                pool_size: vars.db_pool_size.max(1),
                connect_timeout: Duration::from_secs(vars.db_connect_timeout_secs),
            },
            cache: CacheConfig {
                ttl: Duration::from_secs(vars.cache_ttl_secs),
                capacity: vars.cache_capacity,
            },
            default_limit: vars.default_limit,
        }
    }
}

impl Config {
    /// Reads `IKLIM_*` variables. Every setting has a default, so an empty
    /// environment yields a local development configuration.
    pub fn from_env() -> Result<Self, envy::Error> {
        Self::from_iter(std::env::vars())
    }

    pub fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, EnvVars>(vars)
            .map(Config::from)
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_dbname() -> String {
    "iklim_indonesia".to_string()
}

fn default_pool_size() -> u32 {
    8
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}
