//! Server configuration loaded from environment variables.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Expose panic messages in 500 responses.
    #[serde(default, deserialize_with = "flag")]
    pub debug: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Accepts `true`/`1`/`yes` in any case; everything else is off.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    ))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Load `HOST`, `PORT` and `DEBUG`, reading a `.env` file first.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, envy::Error> {
        envy::from_iter(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn debug_flag_is_case_insensitive() {
        assert!(load(&[("DEBUG", "True")]).unwrap().debug);
        assert!(load(&[("DEBUG", "1")]).unwrap().debug);
        assert!(!load(&[("DEBUG", "False")]).unwrap().debug);
        assert!(!load(&[("DEBUG", "")]).unwrap().debug);
    }

    #[test]
    fn port_must_be_numeric() {
        assert!(load(&[("PORT", "http")]).is_err());
        assert_eq!(load(&[("PORT", "8080")]).unwrap().port, 8080);
    }
}
