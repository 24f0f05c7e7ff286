//! Operational parameters for the off-chain agents
//!
//! Only public data lives here. Signers and RPC credentials are kept in
//! [`AgentSecrets`](crate::secrets::AgentSecrets).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use nomad_types::{deser_nomad_u64, NomadIdentifier};

/// RPC dialect spoken by the domain's nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcStyle {
    #[default]
    Ethereum,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogStyle {
    Pretty,
    Json,
    Compact,
    #[default]
    #[serde(other)]
    Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Debug,
    Trace,
    #[default]
    #[serde(other)]
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    pub fmt: LogStyle,
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            fmt: LogStyle::Pretty,
            level: LogLevel::Trace,
        }
    }
}

/// The off-chain agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Updater,
    Relayer,
    Processor,
    Watcher,
    Kathy,
}

impl AgentRole {
    pub const ALL: [AgentRole; 5] = [
        AgentRole::Updater,
        AgentRole::Relayer,
        AgentRole::Processor,
        AgentRole::Watcher,
        AgentRole::Kathy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Updater => "updater",
            AgentRole::Relayer => "relayer",
            AgentRole::Processor => "processor",
            AgentRole::Watcher => "watcher",
            AgentRole::Kathy => "kathy",
        }
    }

    /// Updaters sign updates and watchers sign fraud attestations
    pub fn needs_attestation_signer(&self) -> bool {
        matches!(self, AgentRole::Updater | AgentRole::Watcher)
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings shared by the updater, relayer and watcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BaseAgentConfig {
    /// Polling interval in seconds
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub interval: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
}

/// Processor settings
///
/// The remote lists hold domain names; the validator checks that each one
/// names a participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorConfig {
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub interval: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denied: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsidized_remotes: Option<BTreeSet<String>>,
    /// Proof upload target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,
}

impl ProcessorConfig {
    /// Every remote list paired with its field name
    pub fn remote_lists(&self) -> [(&'static str, Option<&BTreeSet<String>>); 3] {
        [
            ("processor.allowed", self.allowed.as_ref()),
            ("processor.denied", self.denied.as_ref()),
            ("processor.subsidizedRemotes", self.subsidized_remotes.as_ref()),
        ]
    }

    pub(crate) fn retain_remotes(&mut self, keep: impl Fn(&str) -> bool) {
        for list in [
            &mut self.allowed,
            &mut self.denied,
            &mut self.subsidized_remotes,
        ]
        .into_iter()
        .flatten()
        {
            list.retain(|name| keep(name));
        }
    }
}

/// Message generator for kathy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChatGenConfig {
    Static {
        recipient: NomadIdentifier,
        message: String,
    },
    OrderedList {
        messages: Vec<String>,
    },
    Random {
        length: usize,
    },
    #[default]
    #[serde(other)]
    Default,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KathyConfig {
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub interval: u64,
    #[serde(default)]
    pub chat: ChatGenConfig,
}

/// Full agent configuration of one domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default)]
    pub rpc_style: RpcStyle,
    /// Path to the agent database
    pub db: PathBuf,
    /// Metrics port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<u16>,
    #[serde(default)]
    pub logging: LogConfig,
    pub updater: BaseAgentConfig,
    pub relayer: BaseAgentConfig,
    pub processor: ProcessorConfig,
    pub watcher: BaseAgentConfig,
    pub kathy: KathyConfig,
}

impl AgentConfig {
    /// Polling interval of one agent, in seconds
    pub fn interval(&self, role: AgentRole) -> u64 {
        match role {
            AgentRole::Updater => self.updater.interval,
            AgentRole::Relayer => self.relayer.interval,
            AgentRole::Processor => self.processor.interval,
            AgentRole::Watcher => self.watcher.interval,
            AgentRole::Kathy => self.kathy.interval,
        }
    }
}
