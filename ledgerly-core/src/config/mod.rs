use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Settings every ledgerly binary shares: the listen port and the runtime
/// environment, which decides whether missing env vars may fall back to dev
/// defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(skip)]
    pub is_prod: bool,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut common: Config = config.try_deserialize()?;
        common.is_prod = env::var("ENVIRONMENT").map(|v| v == "prod").unwrap_or(false);

        Ok(common)
    }
}

/// Read an env var, falling back to a dev default when one is given. In
/// production the fallback is refused so a missing setting fails at startup
/// instead of running with a placeholder value.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::Configuration(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::Configuration(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_env_prefers_the_environment() {
        env::set_var("LEDGERLY_TEST_SETTING_SET", "from-env");
        let value = get_env("LEDGERLY_TEST_SETTING_SET", Some("default"), false).unwrap();
        assert_eq!(value, "from-env");
    }

    #[test]
    fn get_env_falls_back_to_default_in_dev() {
        let value = get_env("LEDGERLY_TEST_SETTING_UNSET", Some("default"), false).unwrap();
        assert_eq!(value, "default");
    }

    #[test]
    fn get_env_refuses_defaults_in_prod() {
        assert!(get_env("LEDGERLY_TEST_SETTING_PROD", Some("default"), true).is_err());
    }

    #[test]
    fn get_env_without_default_is_an_error() {
        assert!(get_env("LEDGERLY_TEST_SETTING_NO_DEFAULT", None, false).is_err());
    }
}
