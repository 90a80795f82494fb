use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub session: SessionConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Reserved cross-tenant superuser login code, compared case-insensitively.
    /// Empty string disables the superuser path entirely.
    pub superuser_code: String,
    /// Upper bound on one resolve/resume pipeline run, probes plus tenant fetch.
    pub resolve_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// When true, `SessionBootstrapper::from_config` serves the fixture tenant
    /// set instead of a live directory. The rest of the application cannot tell
    /// the difference.
    pub offline: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("MADARIS_SUPERUSER_CODE") {
            self.session.superuser_code = v;
        }
        if let Ok(v) = env::var("MADARIS_RESOLVE_TIMEOUT_SECS") {
            self.session.resolve_timeout_secs = v.parse().unwrap_or(self.session.resolve_timeout_secs);
        }
        if let Ok(v) = env::var("MADARIS_OFFLINE") {
            self.backend.offline = v.parse().unwrap_or(self.backend.offline);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            session: SessionConfig {
                superuser_code: "SUPER-0000".to_string(),
                resolve_timeout_secs: 30,
            },
            backend: BackendConfig { offline: true },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            session: SessionConfig {
                superuser_code: "SUPER-0000".to_string(),
                resolve_timeout_secs: 15,
            },
            backend: BackendConfig { offline: false },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            session: SessionConfig {
                // Must be provisioned via MADARIS_SUPERUSER_CODE; empty disables.
                superuser_code: String::new(),
                resolve_timeout_secs: 10,
            },
            backend: BackendConfig { offline: false },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
