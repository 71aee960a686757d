//! # Service Configuration
//!
//! Environment-driven configuration assembled once at startup into an
//! owned [`AppConfig`]. Nothing reads the environment after boot; handlers
//! and middleware see only this struct through [`crate::state::AppState`].
//!
//! | Variable                       | Default            |
//! |--------------------------------|--------------------|
//! | `ANP_AGENT_DOMAIN`             | `agent-connect.ai` |
//! | `ANP_HOST`                     | `0.0.0.0`          |
//! | `ANP_PORT`                     | `8000`             |
//! | `ANP_JWT_PRIVATE_KEY_PATH`     | unset (ephemeral)  |
//! | `ANP_JWT_PUBLIC_KEY_PATH`      | unset (ephemeral)  |
//! | `ANP_TOKEN_EXPIRE_MINUTES`     | `60`               |
//! | `ANP_NONCE_EXPIRY_MINUTES`     | `5`                |
//! | `ANP_TIMESTAMP_EXPIRY_MINUTES` | `5`                |
//! | `ANP_INTERFACE_DIR`            | `interfaces`       |
//! | `ANP_EXEMPT_PATHS`             | built-in table     |
//! | `ANP_METRICS_ENABLED`          | `true`             |

use std::path::PathBuf;

use crate::exempt::ExemptPaths;

/// Service configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Domain the agent is served under. DID-WBA challenges must be
    /// signed for this value.
    pub agent_domain: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// PEM file with the RS256 private key. When absent (together with
    /// the public key) tokens use an ephemeral HS256 secret.
    pub jwt_private_key_path: Option<PathBuf>,
    /// PEM file with the RS256 public key.
    pub jwt_public_key_path: Option<PathBuf>,
    /// Access token lifetime in minutes.
    pub token_expire_minutes: i64,
    /// How long consumed nonces stay unusable, in minutes.
    pub nonce_expiry_minutes: i64,
    /// Maximum challenge timestamp skew, in minutes.
    pub timestamp_expiry_minutes: i64,
    /// Directory holding the OpenRPC/YAML interface definition files.
    pub interface_dir: PathBuf,
    /// Paths served without authentication.
    pub exempt_paths: ExemptPaths,
    /// Whether the Prometheus middleware and `/metrics` endpoint are active.
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent_domain: "agent-connect.ai".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            jwt_private_key_path: None,
            jwt_public_key_path: None,
            token_expire_minutes: 60,
            nonce_expiry_minutes: 5,
            timestamp_expiry_minutes: 5,
            interface_dir: PathBuf::from("interfaces"),
            exempt_paths: ExemptPaths::default_table(),
            metrics_enabled: true,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_var(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let exempt_paths = match env_var("ANP_EXEMPT_PATHS") {
            Some(csv) => ExemptPaths::new(
                csv.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            ),
            None => defaults.exempt_paths.clone(),
        };

        Self {
            agent_domain: env_var("ANP_AGENT_DOMAIN").unwrap_or(defaults.agent_domain),
            host: env_var("ANP_HOST").unwrap_or(defaults.host),
            port: env_parse("ANP_PORT", defaults.port),
            jwt_private_key_path: env_var("ANP_JWT_PRIVATE_KEY_PATH").map(PathBuf::from),
            jwt_public_key_path: env_var("ANP_JWT_PUBLIC_KEY_PATH").map(PathBuf::from),
            token_expire_minutes: env_parse(
                "ANP_TOKEN_EXPIRE_MINUTES",
                defaults.token_expire_minutes,
            ),
            nonce_expiry_minutes: env_parse(
                "ANP_NONCE_EXPIRY_MINUTES",
                defaults.nonce_expiry_minutes,
            ),
            timestamp_expiry_minutes: env_parse(
                "ANP_TIMESTAMP_EXPIRY_MINUTES",
                defaults.timestamp_expiry_minutes,
            ),
            interface_dir: env_var("ANP_INTERFACE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.interface_dir),
            exempt_paths,
            metrics_enabled: env_var("ANP_METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
        }
    }

    /// Sanity-check the configuration, returning human-readable findings.
    ///
    /// An empty vector means the configuration is usable. Findings are
    /// warnings for the operator, not hard failures — the service still
    /// starts (with ephemeral keys, for instance).
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();

        if self.agent_domain.is_empty() {
            findings.push("agent domain is empty".to_string());
        }
        if self.token_expire_minutes <= 0 {
            findings.push(format!(
                "token lifetime must be positive, got {}",
                self.token_expire_minutes
            ));
        }
        if self.nonce_expiry_minutes <= 0 {
            findings.push(format!(
                "nonce expiry must be positive, got {}",
                self.nonce_expiry_minutes
            ));
        }
        if self.timestamp_expiry_minutes <= 0 {
            findings.push(format!(
                "timestamp window must be positive, got {}",
                self.timestamp_expiry_minutes
            ));
        }
        match (&self.jwt_private_key_path, &self.jwt_public_key_path) {
            (Some(_), None) | (None, Some(_)) => findings.push(
                "JWT key paths must be configured together; falling back to ephemeral keys"
                    .to_string(),
            ),
            (Some(private), Some(public)) => {
                if !private.is_file() {
                    findings.push(format!("JWT private key not found: {}", private.display()));
                }
                if !public.is_file() {
                    findings.push(format!("JWT public key not found: {}", public.display()));
                }
            }
            (None, None) => {}
        }
        if !self.interface_dir.is_dir() {
            findings.push(format!(
                "interface directory not found: {}",
                self.interface_dir.display()
            ));
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = AppConfig::default();
        assert_eq!(config.agent_domain, "agent-connect.ai");
        assert_eq!(config.port, 8000);
        assert_eq!(config.token_expire_minutes, 60);
        assert_eq!(config.nonce_expiry_minutes, 5);
        assert_eq!(config.timestamp_expiry_minutes, 5);
        assert!(config.jwt_private_key_path.is_none());
        assert!(config.metrics_enabled);
    }

    #[test]
    fn default_exemptions_protect_agent_description() {
        let config = AppConfig::default();
        assert!(config.exempt_paths.is_exempt("/health"));
        assert!(!config.exempt_paths.is_exempt("/agents/test/ad.json"));
    }

    #[test]
    fn validate_flags_nonpositive_windows() {
        let config = AppConfig {
            token_expire_minutes: 0,
            nonce_expiry_minutes: -1,
            ..AppConfig::default()
        };
        let findings = config.validate();
        assert!(findings.iter().any(|f| f.contains("token lifetime")));
        assert!(findings.iter().any(|f| f.contains("nonce expiry")));
    }

    #[test]
    fn validate_flags_half_configured_keys() {
        let config = AppConfig {
            jwt_private_key_path: Some(PathBuf::from("/tmp/private.pem")),
            ..AppConfig::default()
        };
        let findings = config.validate();
        assert!(findings.iter().any(|f| f.contains("configured together")));
    }

    #[test]
    fn validate_flags_missing_key_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            jwt_private_key_path: Some(dir.path().join("missing-private.pem")),
            jwt_public_key_path: Some(dir.path().join("missing-public.pem")),
            interface_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let findings = config.validate();
        assert!(findings.iter().any(|f| f.contains("private key not found")));
        assert!(findings.iter().any(|f| f.contains("public key not found")));
    }

    #[test]
    fn validate_accepts_usable_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            interface_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_empty());
    }
}
