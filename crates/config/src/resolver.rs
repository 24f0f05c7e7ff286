//! Read-only query surface over a validated document
//!
//! Agents and tooling navigate the configuration through [`Resolver`] only.
//! The name/id index is built once at construction; every method afterwards
//! is a pure read, so a resolver can be shared freely across threads.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use nomad_types::{NameOrDomain, NomadIdentifier, NomadLocator, Proxy};

use crate::{
    agent::AgentConfig,
    bridge::{AppConfig, BridgeDeploymentInfo},
    contracts::CoreDeploymentInfo,
    document::NomadConfig,
    gas::NomadGasConfig,
    network::Domain,
    validator::{ConfigValidator, GovernorReason, Severity, ViolationKind},
    ConfigError,
};

/// Every table entry of one domain, joined
#[derive(Debug, Clone, Copy)]
pub struct Participant<'a> {
    pub domain: &'a Domain,
    pub core: &'a CoreDeploymentInfo,
    pub bridge: &'a BridgeDeploymentInfo,
    pub agent: &'a AgentConfig,
    pub gas: &'a NomadGasConfig,
    /// Bridge front-end entry, if the domain is shown in the GUI
    pub gui: Option<&'a AppConfig>,
    /// RPC endpoints, if any were configured
    pub rpcs: Option<&'a BTreeSet<String>>,
}

impl Participant<'_> {
    pub fn name(&self) -> &str {
        &self.domain.name
    }

    pub fn id(&self) -> u32 {
        self.domain.domain
    }
}

#[derive(Debug, Clone)]
pub struct Resolver {
    config: Arc<NomadConfig>,
    ids_by_name: HashMap<String, u32>,
    names_by_id: HashMap<u32, String>,
}

impl Resolver {
    /// Index a normalized, validated document
    pub fn new(config: NomadConfig) -> Self {
        Self::from_arc(Arc::new(config))
    }

    pub fn from_arc(config: Arc<NomadConfig>) -> Self {
        let mut ids_by_name = HashMap::with_capacity(config.protocol.networks.len());
        let mut names_by_id = HashMap::with_capacity(config.protocol.networks.len());

        for (name, domain) in &config.protocol.networks {
            ids_by_name.insert(name.clone(), domain.domain);
            // Ids are unique in a validated document; keep the first otherwise
            names_by_id
                .entry(domain.domain)
                .or_insert_with(|| name.clone());
        }

        tracing::debug!(
            environment = %config.environment,
            domains = ids_by_name.len(),
            "Built resolver index"
        );

        Self {
            config,
            ids_by_name,
            names_by_id,
        }
    }

    /// The underlying document
    pub fn document(&self) -> &NomadConfig {
        &self.config
    }

    pub fn document_arc(&self) -> Arc<NomadConfig> {
        Arc::clone(&self.config)
    }

    pub fn environment(&self) -> &str {
        &self.config.environment
    }

    /// Participating domain names in document order
    pub fn networks(&self) -> &[String] {
        &self.config.networks
    }

    pub fn domain_by_name(&self, name: &str) -> Result<&Domain, ConfigError> {
        self.config
            .protocol
            .networks
            .get(name)
            .ok_or_else(|| ConfigError::not_found("domain", name))
    }

    pub fn domain_by_id(&self, id: u32) -> Result<&Domain, ConfigError> {
        let name = self
            .names_by_id
            .get(&id)
            .ok_or_else(|| ConfigError::not_found("domain id", id.to_string()))?;
        self.domain_by_name(name)
    }

    /// Canonical name of a domain given by name or numeric id
    pub fn resolve_domain(&self, domain: impl Into<NameOrDomain>) -> Result<&str, ConfigError> {
        match domain.into() {
            NameOrDomain::Name(name) => self
                .ids_by_name
                .get_key_value(name.as_str())
                .map(|(name, _)| name.as_str())
                .ok_or_else(|| ConfigError::not_found("domain", name)),
            NameOrDomain::Domain(id) => self
                .names_by_id
                .get(&id)
                .map(String::as_str)
                .ok_or_else(|| ConfigError::not_found("domain id", id.to_string())),
        }
    }

    pub fn core_of(&self, name: &str) -> Result<&CoreDeploymentInfo, ConfigError> {
        self.config
            .core
            .get(name)
            .ok_or_else(|| ConfigError::not_found("core deployment", name))
    }

    pub fn bridge_of(&self, name: &str) -> Result<&BridgeDeploymentInfo, ConfigError> {
        self.config
            .bridge
            .get(name)
            .ok_or_else(|| ConfigError::not_found("bridge deployment", name))
    }

    pub fn agent_of(&self, name: &str) -> Result<&AgentConfig, ConfigError> {
        self.config
            .agent
            .get(name)
            .ok_or_else(|| ConfigError::not_found("agent config", name))
    }

    pub fn gas_of(&self, name: &str) -> Result<&NomadGasConfig, ConfigError> {
        self.config
            .gas
            .get(name)
            .ok_or_else(|| ConfigError::not_found("gas config", name))
    }

    /// The replica of `remote` enrolled on `local`
    pub fn replica_of(&self, local: &str, remote: &str) -> Result<&Proxy, ConfigError> {
        self.core_of(local)?
            .replica_of(remote)
            .ok_or_else(|| ConfigError::not_found("replica", format!("{} on {}", remote, local)))
    }

    /// Address of the replica of `home` deployed on `target`
    pub fn locate_replica_of(
        &self,
        home: impl Into<NameOrDomain>,
        target: impl Into<NameOrDomain>,
    ) -> Result<NomadIdentifier, ConfigError> {
        let home = self.resolve_domain(home)?;
        let target = self.resolve_domain(target)?;
        self.replica_of(target, home).map(|replica| replica.proxy)
    }

    /// The deployment's single governor, if one is configured
    ///
    /// The domain-level declaration wins; the protocol-level one is the
    /// fallback for documents that only carry that.
    pub fn governor(&self) -> Option<NomadLocator> {
        self.config
            .protocol
            .networks
            .values()
            .find_map(Domain::governor)
            .or(self.config.protocol.governor)
    }

    /// All table entries of one domain
    pub fn participant(&self, name: &str) -> Result<Participant<'_>, ConfigError> {
        Ok(Participant {
            domain: self.domain_by_name(name)?,
            core: self.core_of(name)?,
            bridge: self.bridge_of(name)?,
            agent: self.agent_of(name)?,
            gas: self.gas_of(name)?,
            gui: self.config.bridge_gui.get(name),
            rpcs: self.config.rpcs.get(name),
        })
    }

    pub fn participants(&self) -> impl Iterator<Item = Result<Participant<'_>, ConfigError>> {
        self.config.networks.iter().map(|name| self.participant(name))
    }

    /// A document holding only `network` and the domains it connects to
    ///
    /// Used at agent boot-up. Every table is cut down to the kept domains and
    /// the result is validated again. Governor and custom token locators may
    /// legitimately point outside the kept set and are not held against it.
    pub fn trim_to_network(&self, network: &str) -> Result<NomadConfig, ConfigError> {
        let focal = self.domain_by_name(network)?;

        let mut keep: BTreeSet<String> = focal.connections.clone();
        keep.insert(focal.name.clone());
        let kept = |name: &str| keep.contains(name);

        let mut trimmed = NomadConfig::clone(&self.config);
        trimmed.networks.retain(|name| kept(name));
        trimmed.rpcs.retain(|name, _| kept(name));
        trimmed.protocol.networks.retain(|name, _| kept(name));
        for domain in trimmed.protocol.networks.values_mut() {
            domain.connections.retain(|name| kept(name));
        }
        trimmed.core.retain(|name, _| kept(name));
        for core in trimmed.core.values_mut() {
            core.retain_replicas(kept);
        }
        trimmed.bridge.retain(|name, _| kept(name));
        trimmed.agent.retain(|name, _| kept(name));
        for agent in trimmed.agent.values_mut() {
            agent.processor.retain_remotes(kept);
        }
        trimmed.gas.retain(|name, _| kept(name));
        trimmed.bridge_gui.retain(|name, _| kept(name));
        for gui in trimmed.bridge_gui.values_mut() {
            gui.connections.retain(|name| kept(name));
        }

        let report = ConfigValidator::new().validate(&trimmed);
        let blocking: Vec<String> = report
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .filter(|v| !points_outside(&v.kind))
            .map(ToString::to_string)
            .collect();
        if !blocking.is_empty() {
            return Err(ConfigError::Rejected {
                summary: blocking.join("; "),
            });
        }

        tracing::debug!(
            network,
            kept = trimmed.networks.len(),
            "Trimmed configuration to network"
        );
        Ok(trimmed)
    }
}

fn points_outside(kind: &ViolationKind) -> bool {
    matches!(
        kind,
        ViolationKind::DanglingTokenLocator { .. }
            | ViolationKind::GovernorInvalid {
                reason: GovernorReason::NotFound,
                ..
            }
    )
}
