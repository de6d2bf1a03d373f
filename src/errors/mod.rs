use thiserror::Error;

/// Fatal errors. Any of these ends the run with a non-zero exit code.
#[derive(Error, Debug)]
pub enum SelectorError {
    #[error(
        "Missing required environment variables: \
         TF_VAR_vsphere_server, TF_VAR_vsphere_user, TF_VAR_vsphere_password"
    )]
    MissingCredentials,

    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to connect to vSphere: {message}")]
    Connection { message: String },

    #[error("vSphere API error on {path}: {message}")]
    Api { path: String, message: String },

    #[error("Datacenter '{datacenter}' not found (looking for cluster '{cluster}')")]
    DatacenterNotFound { datacenter: String, cluster: String },

    #[error("Cluster '{cluster}' not found in datacenter '{datacenter}'")]
    ClusterNotFound { datacenter: String, cluster: String },

    #[error("No suitable hosts found in cluster '{cluster}'")]
    NoEligibleHosts { cluster: String },

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl SelectorError {
    pub fn api(path: impl Into<String>, message: impl ToString) -> Self {
        SelectorError::Api {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn connection(message: impl ToString) -> Self {
        SelectorError::Connection {
            message: message.to_string(),
        }
    }
}

/// Per-host failures. The host gets skipped, the run goes on.
#[derive(Error, Debug)]
pub enum SamplingError {
    #[error("counter '{0}' is not available")]
    MissingCounter(&'static str),

    #[error("total {resource} capacity is zero")]
    ZeroCapacity { resource: ResourceType },

    #[error(transparent)]
    Api(#[from] SelectorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Cpu,
    Memory,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Cpu => write!(f, "CPU"),
            ResourceType::Memory => write!(f, "memory"),
        }
    }
}

// Result type alias for convenience
pub type SelectorResult<T> = Result<T, SelectorError>;
