/*
* ESX Host Selector Configuration
* -------------------------------
*
* Layers (lowest to highest priority):
* 1. Hardcoded defaults (only the VI/JSON release lives here)
* 2. An optional TOML file passed with --config
* 3. TF_VAR_* environment variables, the same ones Terraform already reads,
*    so the selector can run inside the same shell as `terraform apply`
*
* Keys:
*   vsphere_server       vCenter address (host or host:port)
*   vsphere_user         login name, e.g. svc_terraform@vsphere.local
*   vsphere_password     password (keep it in the env, not in the file pls)
*   vsphere_api_release  VI/JSON release segment, defaults to 8.0.1.0
*
* Credentials are optional at load time and validated by `credentials()`,
* which runs before any socket gets opened.
*/

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::errors::SelectorError;

pub const DEFAULT_API_RELEASE: &str = "8.0.1.0";
pub const ENV_PREFIX: &str = "TF_VAR";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub vsphere_server: Option<String>,
    pub vsphere_user: Option<String>,
    pub vsphere_password: Option<String>,
    pub vsphere_api_release: String,
}

/// Validated login material for one vCenter session.
#[derive(Clone)]
pub struct Credentials {
    pub server: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Settings {
    /// Loads settings from the optional file and the process environment.
    pub fn new(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load(config_file, None)
    }

    /// Same as `new`, but `env` replaces the process environment when given.
    pub fn load(
        config_file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("vsphere_api_release", DEFAULT_API_RELEASE)?;

        if let Some(path) = config_file {
            debug!("Loading configuration from file: {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .source(env),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Returns the login triple, or fails if any piece is absent or blank.
    pub fn credentials(&self) -> Result<Credentials, SelectorError> {
        match (
            non_empty(&self.vsphere_server),
            non_empty(&self.vsphere_user),
            non_empty(&self.vsphere_password),
        ) {
            (Some(server), Some(user), Some(password)) => Ok(Credentials {
                server: server.to_string(),
                user: user.to_string(),
                password: password.to_string(),
            }),
            _ => Err(SelectorError::MissingCredentials),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
