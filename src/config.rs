use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::scoring::RuleSet;

/// Default HTTP port for `vericheck serve`.
pub const DEFAULT_PORT: u16 = 5000;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// JSON rule file. When unset, the built-in rule table is used.
    pub rules_path: Option<PathBuf>,
    pub bind: String,
    pub port: u16,
    /// Bearer token for POST /api/rules/reload (VERICHECK_ADMIN_TOKEN env var)
    pub admin_token: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; nothing is required for scoring alone.
    pub fn load() -> Result<Self> {
        let port = match env::var("VERICHECK_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                anyhow::anyhow!("VERICHECK_PORT must be a port number, got {raw:?}")
            })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            db_path: env::var("VERICHECK_DB_PATH").unwrap_or_else(|_| "./vericheck.db".to_string()),
            rules_path: env::var("VERICHECK_RULES_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            bind: env::var("VERICHECK_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            admin_token: env::var("VERICHECK_ADMIN_TOKEN").unwrap_or_default(),
        })
    }

    /// Build the rule table this process should start with.
    pub fn load_rules(&self) -> Result<RuleSet> {
        match self.rules_path {
            Some(ref path) => RuleSet::from_json_file(path),
            None => Ok(RuleSet::default()),
        }
    }

    /// Check that a rule file is configured.
    /// Call this before reloading rules; the built-in table has nothing to reload.
    pub fn require_rules_path(&self) -> Result<&PathBuf> {
        match self.rules_path {
            Some(ref path) => Ok(path),
            None => anyhow::bail!(
                "VERICHECK_RULES_PATH not set. Point it at a JSON rule file to enable reloading.\n\
                 See .env.example for the expected format."
            ),
        }
    }

    /// Check that the admin token is configured.
    pub fn require_admin_token(&self) -> Result<()> {
        if self.admin_token.is_empty() {
            anyhow::bail!(
                "VERICHECK_ADMIN_TOKEN not set. Add it to your .env file to enable rule reloads."
            );
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./vericheck.db".to_string(),
            rules_path: None,
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            admin_token: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_builtin_rules() {
        let config = Config::default();
        assert_eq!(config.load_rules().unwrap(), RuleSet::default());
        assert!(config.require_rules_path().is_err());
        assert!(config.require_admin_token().is_err());
    }

    #[test]
    fn test_missing_rule_file_is_an_error() {
        let config = Config {
            rules_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..Config::default()
        };
        let err = config.load_rules().unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }
}
