//! Runtime environment configuration

use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};

/// Environment variable selecting the runtime environment
pub const ENV_VAR: &str = "INSIGHTIFY_ENV";

/// Process-level configuration shared by the binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, etc.)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "insightify".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Build from `INSIGHTIFY_ENV`, falling back to the defaults
    pub fn from_env() -> Self {
        Self::default().with_environment(std::env::var(ENV_VAR).ok())
    }

    fn with_environment(mut self, environment: Option<String>) -> Self {
        if let Some(env) = environment.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty()) {
            self.environment = env;
        }
        self
    }

    /// Whether this process runs in production
    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }

    /// Production ships structured logs, everything else gets readable ones
    pub fn log_format(&self) -> LogFormat {
        if self.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}
