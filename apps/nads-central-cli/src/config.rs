use crate::error::{CliError, CliResult};
use nads_central_chain::{ChainTarget, ReadConfig};
use nads_central_gate::{GateConfig, DEFAULT_SETTLE_DELAY};
use nads_central_sdk::SessionConfig;
use nads_central_store::BackendTarget;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration file structure
///
/// Every section is optional; a missing file means all defaults (Monad
/// testnet membership contract, local SQLite database).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chain holding the membership token
    pub chain: ChainTarget,

    /// Where profiles and stats are stored
    pub backend: BackendTarget,

    pub gate: GateSection,

    pub read: ReadSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSection {
    /// Delay before the first navigation after a wallet connects
    pub settle_delay_ms: u64,
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
        }
    }
}

/// Balance read retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadSection {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Total time budget for retries; 0 disables the limit
    pub max_elapsed_ms: u64,
    pub attempt_timeout_ms: u64,
}

impl Default for ReadSection {
    fn default() -> Self {
        let defaults = ReadConfig::default();
        Self {
            max_retries: defaults.max_retries,
            initial_backoff_ms: defaults.retry_backoff.initial_interval.as_millis() as u64,
            max_backoff_ms: defaults.retry_backoff.max_interval.as_millis() as u64,
            max_elapsed_ms: defaults
                .retry_backoff
                .max_elapsed_time
                .map(|elapsed| elapsed.as_millis() as u64)
                .unwrap_or_default(),
            attempt_timeout_ms: defaults.attempt_timeout.as_millis() as u64,
        }
    }
}

impl ReadSection {
    pub fn to_read_config(&self) -> ReadConfig {
        let mut config = ReadConfig {
            max_retries: self.max_retries,
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
            ..Default::default()
        };
        config.retry_backoff.initial_interval = Duration::from_millis(self.initial_backoff_ms);
        config.retry_backoff.current_interval = Duration::from_millis(self.initial_backoff_ms);
        config.retry_backoff.max_interval = Duration::from_millis(self.max_backoff_ms);
        config.retry_backoff.max_elapsed_time =
            (self.max_elapsed_ms > 0).then(|| Duration::from_millis(self.max_elapsed_ms));
        config
    }
}

/// Values supplied on the command line or through `NADS_*` variables
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub backend_key: Option<String>,
    pub rpc_url: Option<String>,
    pub client_id: Option<String>,
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Read the YAML file at `path`, or start from defaults when no path is given
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                let raw = std::fs::read_to_string(path)?;
                Self::from_yaml(&raw)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(raw: &str) -> CliResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) -> CliResult<()> {
        match (&overrides.backend_url, &overrides.backend_key) {
            (Some(url), Some(api_key)) => {
                self.backend = BackendTarget::Rest {
                    url: url.clone(),
                    api_key: api_key.clone(),
                };
            }
            (None, None) => {
                if let Some(database_url) = &overrides.database_url {
                    self.backend = BackendTarget::Sqlite {
                        url: database_url.clone(),
                    };
                }
            }
            (url_override, key_override) => match &mut self.backend {
                BackendTarget::Rest { url, api_key } => {
                    if let Some(value) = url_override {
                        *url = value.clone();
                    }
                    if let Some(value) = key_override {
                        *api_key = value.clone();
                    }
                }
                _ => {
                    return Err(CliError::InvalidConfig(
                        "the hosted backend needs both a URL and a public key".to_string(),
                    ))
                }
            },
        }

        if let Some(value) = &overrides.rpc_url {
            match &mut self.chain {
                ChainTarget::Evm { rpc_url, .. } | ChainTarget::Solana { rpc_url, .. } => {
                    *rpc_url = value.clone();
                }
            }
        }

        if let Some(value) = &overrides.client_id {
            match &mut self.chain {
                ChainTarget::Evm { client_id, .. } => *client_id = Some(value.clone()),
                ChainTarget::Solana { .. } => {
                    warn!("Ignoring client id: the Solana reader does not use one");
                }
            }
        }

        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            gate: GateConfig {
                settle_delay: Duration::from_millis(self.gate.settle_delay_ms),
            },
            read: self.read.to_read_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.chain, ChainTarget::default());
        assert_eq!(config.backend, BackendTarget::default());

        let session = config.session_config();
        assert_eq!(session.gate.settle_delay, Duration::from_millis(1500));
        assert_eq!(session.read.max_retries, 2);
        assert_eq!(session.read.attempt_timeout, Duration::from_secs(15));
        assert_eq!(
            session.read.retry_backoff.max_elapsed_time,
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_partial_yaml() {
        let config = AppConfig::from_yaml(
            r#"
backend:
  kind: memory
gate:
  settle_delay_ms: 0
read:
  max_retries: 5
  max_elapsed_ms: 0
"#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendTarget::Memory);
        assert_eq!(config.chain, ChainTarget::default());

        let session = config.session_config();
        assert_eq!(session.gate.settle_delay, Duration::ZERO);
        assert_eq!(session.read.max_retries, 5);
        assert_eq!(session.read.retry_backoff.max_elapsed_time, None);
        assert_eq!(
            session.read.retry_backoff.initial_interval,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(AppConfig::from_yaml("\n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nads-central.yaml");
        std::fs::write(
            &path,
            "chain:\n  kind: evm\n  rpc_url: http://localhost:8545\n  contract: \"0x922dA3512e2BEBBe32bccE59adf7E6759fB8CEA2\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(
            config.chain,
            ChainTarget::Evm {
                rpc_url: "http://localhost:8545".to_string(),
                contract: "0x922dA3512e2BEBBe32bccE59adf7E6759fB8CEA2".to_string(),
                client_id: None,
            }
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.yaml")));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(&Overrides {
                backend_url: Some("https://abc.supabase.co".to_string()),
                backend_key: Some("anon".to_string()),
                client_id: Some("client-123".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            config.backend,
            BackendTarget::Rest {
                url: "https://abc.supabase.co".to_string(),
                api_key: "anon".to_string(),
            }
        );
        assert_eq!(
            config.chain.endpoint().unwrap().as_str(),
            "https://10143.rpc.thirdweb.com/client-123"
        );
    }

    #[test]
    fn test_database_url_override() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(&Overrides {
                database_url: Some("sqlite:///tmp/members.db?mode=rwc".to_string()),
                rpc_url: Some("http://localhost:8545".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            config.backend,
            BackendTarget::Sqlite {
                url: "sqlite:///tmp/members.db?mode=rwc".to_string(),
            }
        );
        assert_eq!(
            config.chain.endpoint().unwrap().as_str(),
            "http://localhost:8545/"
        );
    }

    #[test]
    fn test_backend_key_alone_needs_rest_backend() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(&Overrides {
            backend_key: Some("anon".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(CliError::InvalidConfig(_))));

        let mut config = AppConfig {
            backend: BackendTarget::Rest {
                url: "https://abc.supabase.co".to_string(),
                api_key: "old".to_string(),
            },
            ..Default::default()
        };
        config
            .apply_overrides(&Overrides {
                backend_key: Some("new".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            config.backend,
            BackendTarget::Rest {
                url: "https://abc.supabase.co".to_string(),
                api_key: "new".to_string(),
            }
        );
    }
}
