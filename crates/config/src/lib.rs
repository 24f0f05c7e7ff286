//! Configuration model for Nomad cross-chain deployments
//!
//! A deployment is described by one composite document. Loading it runs a
//! fixed pipeline:
//! - parse into one of the supported schema versions ([`VersionedDocument`])
//! - migrate to the current shape ([`Normalizer`])
//! - check cross-references between tables ([`ConfigValidator`])
//! - index for read-only lookups ([`Resolver`])
//!
//! Agents and tooling only ever see the document through [`Resolver`], so
//! they observe post-normalization, post-validation data. Hot reloads build a
//! new resolver and swap it into a [`ConfigHandle`].

pub mod agent;
pub mod bridge;
pub mod builtin;
pub mod contracts;
pub mod document;
pub mod gas;
pub mod handle;
pub mod loader;
pub mod network;
pub mod normalizer;
pub mod resolver;
pub mod schema;
pub mod secrets;
pub mod settings;
pub mod validator;

pub use agent::{
    AgentConfig, AgentRole, BaseAgentConfig, ChatGenConfig, KathyConfig, LogConfig, LogLevel,
    LogStyle, ProcessorConfig, RpcStyle, S3Config,
};
pub use bridge::{
    AppConfig, BridgeDeploymentInfo, DeployedCustomToken, EthereumBridgeDeploymentInfo,
    SubstrateBridgeDeploymentInfo,
};
pub use contracts::{
    ChainFamily, CoreDeploymentInfo, EthereumCoreDeploymentInfo, SubstrateCoreDeploymentInfo,
};
pub use document::NomadConfig;
pub use gas::{
    BridgeGasConfig, BridgeRouterGasLimits, ConnectionManagerGasLimits, CoreGasConfig,
    EthHelperGasLimits, HomeGasLimits, HomeUpdateGasLimit, NomadGasConfig, NomadGasConfigs,
    ReplicaGasLimits,
};
pub use handle::{global, init_global, ConfigHandle};
pub use loader::{ConfigLoader, LoadedConfig};
pub use network::{
    BridgeConfiguration, ContractConfig, CustomTokenSpecifier, Domain, Governance, NetworkInfo,
    NetworkSpecs,
};
pub use normalizer::{normalize, Normalizer};
pub use resolver::{Participant, Resolver};
pub use schema::{SchemaVersion, VersionedDocument};
pub use secrets::{AgentSecrets, ChainConf, Connection, GelatoConf, SignerConf, TxSubmitterConf};
pub use settings::{load_settings, RuntimeEnvironment, Settings};
pub use validator::{
    ConfigValidator, GovernorReason, ReplicaDirection, Severity, ValidationReport, Violation,
    ViolationKind,
};

pub use nomad_types::{NameOrDomain, NomadIdentifier, NomadLocator, Proxy};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u64),

    #[error("No gas defaults supplied and domain '{domain}' has no flat gas fields to migrate")]
    MissingGasDefaults { domain: String },

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("Configuration rejected: {summary}")]
    Rejected { summary: String },

    #[error("Invalid secrets for {scope}: {reason}")]
    InvalidSecrets { scope: String, reason: String },
}

impl ConfigError {
    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        ConfigError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// True for lookup misses, which callers usually treat as "not enrolled"
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
