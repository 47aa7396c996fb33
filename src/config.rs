use std::env;
use std::fmt;
use std::str::FromStr;

use log::LevelFilter;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    port: u16,
    static_dir: String,
    thread_pool_size: usize,
    enable_logging: bool,
    enable_monitoring: bool,
    log_level: LevelFilter,
}

mod server_env {
    pub const PORT: &str = "HTTP_SERVER_PORT";
    pub const STATIC_DIR: &str = "HTTP_SERVER_STATIC_DIR";
    pub const THREAD_POOL_SIZE: &str = "HTTP_SERVER_THREAD_POOL_SIZE";
    pub const ENABLE_LOGGING: &str = "HTTP_SERVER_ENABLE_LOGGING";
    pub const ENABLE_MONITORING: &str = "HTTP_SERVER_ENABLE_MONITORING";
    pub const LOG_LEVEL: &str = "HTTP_SERVER_LOG_LEVEL";
}

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_THREAD_POOL_SIZE: usize = 100;

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            thread_pool_size: DEFAULT_THREAD_POOL_SIZE,
            enable_logging: true,
            enable_monitoring: true,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Defaults with the given port.
    pub fn new(port: u16) -> Self {
        Config {
            port,
            ..Config::default()
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn static_dir(&self) -> &str {
        &self.static_dir
    }

    pub fn thread_pool_size(&self) -> usize {
        self.thread_pool_size
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.enable_monitoring
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_static_dir(mut self, static_dir: impl Into<String>) -> Self {
        self.static_dir = static_dir.into();
        self
    }

    pub fn with_thread_pool_size(mut self, thread_pool_size: usize) -> Self {
        self.thread_pool_size = thread_pool_size;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.enable_monitoring = enabled;
        self
    }

    /// Reads the `HTTP_SERVER_*` variables. Unset variables keep their
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigParsingError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigParsingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let thread_pool_size = parse_param(&lookup, server_env::THREAD_POOL_SIZE, "usize")?
            .unwrap_or(defaults.thread_pool_size);
        if thread_pool_size == 0 {
            return Err(ConfigParsingError::InvalidValue {
                param_name: server_env::THREAD_POOL_SIZE.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let static_dir = lookup(server_env::STATIC_DIR).unwrap_or(defaults.static_dir);
        if static_dir.trim().is_empty() {
            return Err(ConfigParsingError::InvalidValue {
                param_name: server_env::STATIC_DIR.to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Config {
            port: parse_param(&lookup, server_env::PORT, "u16")?.unwrap_or(defaults.port),
            static_dir,
            thread_pool_size,
            enable_logging: parse_param(&lookup, server_env::ENABLE_LOGGING, "bool")?
                .unwrap_or(defaults.enable_logging),
            enable_monitoring: parse_param(&lookup, server_env::ENABLE_MONITORING, "bool")?
                .unwrap_or(defaults.enable_monitoring),
            log_level: parse_param(&lookup, server_env::LOG_LEVEL, "log level")?
                .unwrap_or(defaults.log_level),
        })
    }
}

fn parse_param<T, F>(
    lookup: &F,
    param_name: &str,
    expected: &str,
) -> Result<Option<T>, ConfigParsingError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(param_name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ConfigParsingError::InvalidParameterType {
                param_name: param_name.to_string(),
                expected: expected.to_string(),
            }
        }),
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HTTP Server Configuration")?;
        writeln!(f, "========================")?;
        writeln!(f, "Port: {}", self.port)?;
        writeln!(f, "Static Directory: {}", self.static_dir)?;
        writeln!(f, "Thread Pool Size: {}", self.thread_pool_size)?;
        writeln!(f, "Logging Enabled: {}", self.enable_logging)?;
        writeln!(f, "Monitoring Enabled: {}", self.enable_monitoring)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigParsingError {
    #[error("invalid type of parameter {param_name:?}, expected {expected:?}")]
    InvalidParameterType {
        param_name: String,
        expected: String,
    },

    #[error("invalid value of parameter {param_name:?}: {reason}")]
    InvalidValue { param_name: String, reason: String },
}
