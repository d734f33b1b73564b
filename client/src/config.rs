use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

const SESSION_DIR: &str = ".fitness-tracker";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    #[arg(
        long,
        help = "Base URL of the fitness tracker API",
        env = "FITNESS_API_URL",
        default_value = DEFAULT_API_URL
    )]
    pub api_url: Url,

    #[arg(
        long,
        help = "Request timeout in seconds",
        env = "FITNESS_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    pub request_timeout_secs: u64,

    #[arg(
        long,
        help = "Where the session token is kept, defaults to ~/.fitness-tracker/session.json",
        env = "FITNESS_SESSION_FILE"
    )]
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_file: None,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_file_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }
        let mut path = home::home_dir().ok_or_else(|| {
            Error::Storage(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "home directory not found",
            ))
        })?;
        path.push(SESSION_DIR);
        path.push(SESSION_FILE);
        Ok(path)
    }

    /// Resolves `path` below the base URL, keeping the base path
    /// (`http://host/api` + `workouts` gives `http://host/api/workouts`).
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.api_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = ClientConfig::default();
        assert_eq!(
            config.endpoint("workouts").unwrap().as_str(),
            "http://127.0.0.1:5000/api/workouts"
        );

        let config = ClientConfig {
            api_url: Url::parse("https://fit.example.com/api/").unwrap(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.endpoint("/goals/3").unwrap().as_str(),
            "https://fit.example.com/api/goals/3"
        );
    }

    #[test]
    fn test_explicit_session_file_wins() {
        let config = ClientConfig {
            session_file: Some(PathBuf::from("/tmp/session.json")),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.session_file_path().unwrap(),
            PathBuf::from("/tmp/session.json")
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
