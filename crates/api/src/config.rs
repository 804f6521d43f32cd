//! Process configuration, read from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const BIND_ADDR_VAR: &str = "INKWELL_BIND_ADDR";
pub const ENV_VAR: &str = "INKWELL_ENV";
pub const ADMIN_USERNAME_VAR: &str = "INKWELL_ADMIN_USERNAME";
pub const ADMIN_PASSWORD_VAR: &str = "INKWELL_ADMIN_PASSWORD";
pub const ADMIN_EMAIL_VAR: &str = "INKWELL_ADMIN_EMAIL";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set to a non-empty value")]
    MissingSecret,

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Administrator account ensured at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub signing_secret: String,
    pub environment: Environment,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("signing_secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl ApiConfig {
    /// Development config with the given secret and no bootstrap admin.
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            signing_secret: signing_secret.into(),
            environment: Environment::Development,
            bootstrap_admin: None,
        }
    }

    pub fn with_bootstrap_admin(mut self, admin: BootstrapAdmin) -> Self {
        self.bootstrap_admin = Some(admin);
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Cookies are marked `Secure` only in production.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let signing_secret = lookup(SECRET_KEY_VAR)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let bind_addr = lookup(BIND_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: BIND_ADDR_VAR,
                reason: e.to_string(),
            })?;

        let environment = match lookup(ENV_VAR).as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: ENV_VAR,
                    reason: format!("unknown environment '{other}'"),
                });
            }
        };

        let bootstrap_admin = match (lookup(ADMIN_USERNAME_VAR), lookup(ADMIN_PASSWORD_VAR)) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                let email = lookup(ADMIN_EMAIL_VAR).unwrap_or_else(|| format!("{username}@localhost"));
                Some(BootstrapAdmin { username, password, email })
            }
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    var: ADMIN_USERNAME_VAR,
                    reason: format!("{ADMIN_USERNAME_VAR} and {ADMIN_PASSWORD_VAR} must be set together"),
                });
            }
        };

        Ok(Self {
            bind_addr,
            signing_secret,
            environment,
            bootstrap_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_or_empty_secret_is_fatal() {
        assert_eq!(ApiConfig::from_lookup(lookup(&[])).unwrap_err(), ConfigError::MissingSecret);
        assert_eq!(
            ApiConfig::from_lookup(lookup(&[(SECRET_KEY_VAR, "")])).unwrap_err(),
            ConfigError::MissingSecret
        );
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[(SECRET_KEY_VAR, "s")])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.secure_cookies());
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn production_enables_secure_cookies() {
        let config =
            ApiConfig::from_lookup(lookup(&[(SECRET_KEY_VAR, "s"), (ENV_VAR, "Production")])).unwrap();
        assert!(config.secure_cookies());
    }

    #[test]
    fn half_configured_admin_is_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[(SECRET_KEY_VAR, "s"), (ADMIN_USERNAME_VAR, "root")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ADMIN_USERNAME_VAR, .. }));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = ApiConfig::new("super-secret").with_bootstrap_admin(BootstrapAdmin {
            username: "root".into(),
            password: "hunter22".into(),
            email: "root@localhost".into(),
        });
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hunter22"));
    }
}
