use crate::datasource::fpl::DEFAULT_BASE_URL;
use crate::engine::BonusPolicy;
use crate::orchestration::ReconcilerSettings;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub fpl_api_url: String,
    pub provisional_bonus: BonusPolicy,
    pub verify_official_totals: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let fpl_api_url = env_map
            .get("FPL_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let provisional_bonus = match env_map
            .get("PROVISIONAL_BONUS")
            .map(|s| s.as_str())
            .unwrap_or("live")
        {
            "live" => BonusPolicy::Live,
            "finished" => BonusPolicy::FinishedOnly,
            other => {
                return Err(ConfigError::InvalidValue(
                    "PROVISIONAL_BONUS".to_string(),
                    format!("must be live or finished, got {}", other),
                ))
            }
        };

        let verify_official_totals = match env_map
            .get("VERIFY_OFFICIAL_TOTALS")
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "VERIFY_OFFICIAL_TOTALS".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            database_path,
            fpl_api_url,
            provisional_bonus,
            verify_official_totals,
        })
    }

    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            bonus_policy: self.provisional_bonus,
            verify_official_totals: self.verify_official_totals,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/rounds.db".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.fpl_api_url, "https://fantasy.premierleague.com/api");
        assert_eq!(config.provisional_bonus, BonusPolicy::Live);
        assert!(config.verify_official_totals);
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_finished_bonus_policy() {
        let mut env_map = setup_required_env();
        env_map.insert("PROVISIONAL_BONUS".to_string(), "finished".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.provisional_bonus, BonusPolicy::FinishedOnly);
        assert_eq!(
            config.reconciler_settings().bonus_policy,
            BonusPolicy::FinishedOnly
        );
    }

    #[test]
    fn test_invalid_bonus_policy() {
        let mut env_map = setup_required_env();
        env_map.insert("PROVISIONAL_BONUS".to_string(), "always".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PROVISIONAL_BONUS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_verify_official_totals_flag() {
        let mut env_map = setup_required_env();
        env_map.insert("VERIFY_OFFICIAL_TOTALS".to_string(), "FALSE".to_string());
        let config = Config::from_env_map(env_map.clone()).unwrap();
        assert!(!config.reconciler_settings().verify_official_totals);

        env_map.insert("VERIFY_OFFICIAL_TOTALS".to_string(), "maybe".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "VERIFY_OFFICIAL_TOTALS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_custom_api_url() {
        let mut env_map = setup_required_env();
        env_map.insert("FPL_API_URL".to_string(), "http://localhost:9000".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.fpl_api_url, "http://localhost:9000");
    }
}
