use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Path prefix of the sources-api version the simulator talks to.
const SOURCES_API_PATH: &str = "api/sources/v3.1";

/// Port the HTTP trigger listens on when PORT is unset.
const DEFAULT_PORT: u16 = 10000;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server address, from QUEUE_HOST and QUEUE_PORT.
    pub queue_url: String,
    /// Versioned sources-api base URL, from SOURCES_API_HOST (scheme
    /// included) and SOURCES_API_PORT.
    pub sources_api_url: String,
    /// Health path of the same sources-api instance.
    pub sources_api_health_url: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let queue_host = required("QUEUE_HOST")?;
        let queue_port = required("QUEUE_PORT")?;
        let sources_api_host = required("SOURCES_API_HOST")?;
        let sources_api_port = required("SOURCES_API_PORT")?;

        let port = match env::var("PORT") {
            Ok(port) if !port.is_empty() && port != "0" => {
                port.parse().context("PORT must be a valid port number")?
            }
            _ => DEFAULT_PORT,
        };

        Ok(Self {
            queue_url: format!("nats://{queue_host}:{queue_port}"),
            sources_api_url: format!("{sources_api_host}:{sources_api_port}/{SOURCES_API_PATH}"),
            sources_api_health_url: format!("{sources_api_host}:{sources_api_port}/health"),
            port,
        })
    }
}

/// Read a variable that must carry a usable value. Unset, empty, and the
/// literal "0" all count as missing.
fn required(name: &str) -> Result<String> {
    let value = env::var(name).unwrap_or_default();
    if value.is_empty() || value == "0" {
        bail!("configuration missing: {name} must be set");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so every scenario shares one test.
    #[test]
    fn from_env_builds_urls_and_applies_defaults() {
        env::set_var("QUEUE_HOST", "localhost");
        env::set_var("QUEUE_PORT", "4222");
        env::set_var("SOURCES_API_HOST", "http://sources-api.svc");
        env::set_var("SOURCES_API_PORT", "8000");
        env::remove_var("PORT");

        let config = Config::from_env().unwrap();
        assert_eq!(config.queue_url, "nats://localhost:4222");
        assert_eq!(
            config.sources_api_url,
            "http://sources-api.svc:8000/api/sources/v3.1"
        );
        assert_eq!(
            config.sources_api_health_url,
            "http://sources-api.svc:8000/health"
        );
        assert_eq!(config.port, 10000);

        // "0" and empty mean "use the default port".
        env::set_var("PORT", "0");
        assert_eq!(Config::from_env().unwrap().port, 10000);
        env::set_var("PORT", "");
        assert_eq!(Config::from_env().unwrap().port, 10000);

        env::set_var("PORT", "3000");
        assert_eq!(Config::from_env().unwrap().port, 3000);

        env::set_var("PORT", "not-a-port");
        assert!(Config::from_env().is_err());
        env::set_var("PORT", "3000");

        // A "0" queue port is as fatal as a missing one.
        env::set_var("QUEUE_PORT", "0");
        assert!(Config::from_env().is_err());
        env::set_var("QUEUE_PORT", "4222");

        env::remove_var("SOURCES_API_HOST");
        assert!(Config::from_env().is_err());
        env::set_var("SOURCES_API_HOST", "http://sources-api.svc");
    }
}
