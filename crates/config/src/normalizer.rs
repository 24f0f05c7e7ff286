//! Migration of any supported schema version to the canonical shape
//!
//! Each step moves a document exactly one version forward; the driver loops
//! until the document is current. Failures abort the whole migration.

use std::collections::BTreeMap;

use crate::{
    agent::{AgentConfig, BaseAgentConfig, KathyConfig, ProcessorConfig},
    bridge::EthereumBridgeDeploymentInfo,
    document::NomadConfig,
    gas::NomadGasConfig,
    network::{BridgeConfiguration, ContractConfig, Domain, NetworkInfo},
    schema::{
        v1::{AgentConfigV1, DomainV1, EvmBridgeContractsV1, NomadConfigV1},
        v2::{BridgeContracts, CoreContracts, NomadConfigV2},
        SchemaVersion, VersionedDocument,
    },
    ConfigError,
};

/// Schema normalizer
///
/// Gas defaults are only consulted when migrating version 1 documents whose
/// flat gas fields are incomplete.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    gas_defaults: Option<NomadGasConfig>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gas_defaults(mut self, defaults: NomadGasConfig) -> Self {
        self.gas_defaults = Some(defaults);
        self
    }

    pub fn gas_defaults(&self) -> Option<&NomadGasConfig> {
        self.gas_defaults.as_ref()
    }

    /// Migrate `doc` to the current schema version
    pub fn normalize(&self, doc: VersionedDocument) -> Result<NomadConfig, ConfigError> {
        let source = doc.version();
        let mut doc = doc;

        loop {
            doc = match doc {
                VersionedDocument::V1(v1) => {
                    tracing::debug!(
                        from = %SchemaVersion::V1,
                        to = %SchemaVersion::V2,
                        environment = %v1.environment,
                        "Migrating configuration document"
                    );
                    VersionedDocument::V2(Box::new(self.v1_to_v2(*v1)?))
                }
                VersionedDocument::V2(v2) => {
                    tracing::debug!(
                        from = %SchemaVersion::V2,
                        to = %SchemaVersion::V3,
                        environment = %v2.environment,
                        "Migrating configuration document"
                    );
                    VersionedDocument::V3(Box::new(v2_to_v3(*v2)))
                }
                VersionedDocument::V3(v3) => {
                    let mut config = *v3;
                    config.version = SchemaVersion::CURRENT.as_u64();
                    tracing::debug!(
                        source_version = %source,
                        networks = config.networks.len(),
                        "Configuration document normalized"
                    );
                    return Ok(config);
                }
            };
        }
    }

    fn v1_to_v2(&self, doc: NomadConfigV1) -> Result<NomadConfigV2, ConfigError> {
        let mut gas = BTreeMap::new();
        for name in &doc.networks {
            let domain = doc.protocol.networks.get(name);
            gas.insert(name.clone(), self.synthesize_gas(name, domain)?);
        }

        let networks = doc
            .protocol
            .networks
            .into_iter()
            .map(|(name, domain)| (name, migrate_domain(domain)))
            .collect();

        let agent = doc
            .agent
            .into_iter()
            .map(|(name, agent)| {
                let migrated = migrate_agent(&name, agent);
                (name, migrated)
            })
            .collect();

        Ok(NomadConfigV2 {
            version: SchemaVersion::V2.as_u64(),
            environment: doc.environment,
            networks: doc.networks,
            rpcs: doc.rpcs.unwrap_or_default(),
            protocol: NetworkInfo {
                governor: doc.protocol.governor,
                networks,
            },
            core: doc
                .core
                .into_iter()
                .map(|(name, core)| (name, CoreContracts::Evm(core)))
                .collect(),
            bridge: doc
                .bridge
                .into_iter()
                .map(|(name, bridge)| (name, BridgeContracts::Evm(migrate_bridge(bridge))))
                .collect(),
            agent,
            gas,
            bridge_gui: doc.bridge_gui.unwrap_or_default(),
            s3: None,
        })
    }

    /// Build the gas table of one domain from its flat version 1 fields
    ///
    /// `replica.process` takes process plus reserve gas, `replica.proveAndProcess`
    /// takes the maximum, and `bridgeRouter.send` takes mint plus deploy gas.
    fn synthesize_gas(
        &self,
        name: &str,
        domain: Option<&DomainV1>,
    ) -> Result<NomadGasConfig, ConfigError> {
        let (process, reserve, maximum) = domain
            .map(|d| {
                let c = &d.configuration;
                (c.process_gas, c.reserve_gas, c.maximum_gas)
            })
            .unwrap_or_default();
        let (mint, deploy) = domain
            .map(|d| {
                let b = &d.bridge_configuration;
                (b.mint_gas, b.deploy_gas)
            })
            .unwrap_or_default();

        let complete = [process, reserve, maximum, mint, deploy]
            .iter()
            .all(Option::is_some);
        if !complete && self.gas_defaults.is_none() {
            return Err(ConfigError::MissingGasDefaults {
                domain: name.to_string(),
            });
        }

        let mut gas = self.gas_defaults.unwrap_or_else(NomadGasConfig::evm_default);
        if let (Some(process), Some(reserve)) = (process, reserve) {
            gas.core.replica.process = process.saturating_add(reserve);
        }
        if let Some(maximum) = maximum {
            gas.core.replica.prove_and_process = maximum;
        }
        if let (Some(mint), Some(deploy)) = (mint, deploy) {
            gas.bridge.bridge_router.send = mint.saturating_add(deploy);
        }

        tracing::debug!(
            domain = name,
            from_flat_fields = complete,
            "Synthesized gas table"
        );
        Ok(gas)
    }
}

/// Free-function form of [`Normalizer::normalize`]
pub fn normalize(
    doc: VersionedDocument,
    defaults: Option<&NomadGasConfig>,
) -> Result<NomadConfig, ConfigError> {
    let normalizer = match defaults {
        Some(defaults) => Normalizer::new().with_gas_defaults(*defaults),
        None => Normalizer::new(),
    };
    normalizer.normalize(doc)
}

fn migrate_domain(domain: DomainV1) -> Domain {
    let configuration = domain.configuration;
    let bridge_configuration = domain.bridge_configuration;

    Domain {
        name: domain.name,
        domain: domain.domain,
        connections: domain.connections,
        configuration: ContractConfig {
            optimistic_seconds: configuration.optimistic_seconds,
            updater: configuration.updater,
            watchers: configuration.watchers,
            governance: configuration.governance,
        },
        specs: domain.specs,
        bridge_configuration: BridgeConfiguration {
            weth: bridge_configuration.weth,
            customs: bridge_configuration.customs,
        },
    }
}

fn migrate_bridge(bridge: EvmBridgeContractsV1) -> EthereumBridgeDeploymentInfo {
    EthereumBridgeDeploymentInfo {
        deploy_height: bridge.deploy_height,
        bridge_router: bridge.bridge_router,
        token_registry: bridge.token_registry,
        bridge_token: bridge.bridge_token,
        accountant: None,
        eth_helper: bridge.eth_helper,
        customs: bridge.customs,
    }
}

fn migrate_agent(name: &str, agent: AgentConfigV1) -> AgentConfig {
    let enabled_flags = [
        agent.updater.enabled,
        agent.relayer.enabled,
        agent.processor.enabled,
        agent.watcher.enabled,
        agent.kathy.enabled,
    ];
    if agent.timelag.is_some() || enabled_flags.iter().any(|e| *e) {
        tracing::debug!(
            domain = name,
            timelag = ?agent.timelag,
            "Dropping agent timelag and enabled flags"
        );
    }

    AgentConfig {
        rpc_style: agent.rpc_style,
        db: agent.db,
        metrics: agent.metrics,
        logging: agent.logging,
        updater: BaseAgentConfig {
            interval: agent.updater.interval,
        },
        relayer: BaseAgentConfig {
            interval: agent.relayer.interval,
        },
        processor: ProcessorConfig {
            interval: agent.processor.interval,
            ..Default::default()
        },
        watcher: BaseAgentConfig {
            interval: agent.watcher.interval,
        },
        kathy: KathyConfig {
            interval: agent.kathy.interval,
            ..Default::default()
        },
    }
}

fn v2_to_v3(doc: NomadConfigV2) -> NomadConfig {
    NomadConfig {
        version: SchemaVersion::V3.as_u64(),
        environment: doc.environment,
        networks: doc.networks,
        rpcs: doc.rpcs,
        protocol: doc.protocol,
        core: doc
            .core
            .into_iter()
            .map(|(name, core)| (name, core.into()))
            .collect(),
        bridge: doc
            .bridge
            .into_iter()
            .map(|(name, bridge)| (name, bridge.into()))
            .collect(),
        agent: doc.agent,
        gas: doc.gas,
        bridge_gui: doc.bridge_gui,
        s3: doc.s3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::CoreDeploymentInfo;
    use crate::schema::v1::{BaseAgentConfigV1, BridgeConfigurationV1, ContractConfigV1};

    fn v1_domain(name: &str, id: u32, flat: bool) -> DomainV1 {
        DomainV1 {
            name: name.to_string(),
            domain: id,
            configuration: ContractConfigV1 {
                optimistic_seconds: 10,
                process_gas: flat.then_some(850_000),
                reserve_gas: flat.then_some(15_000),
                maximum_gas: flat.then_some(1_000_000),
                ..Default::default()
            },
            bridge_configuration: BridgeConfigurationV1 {
                mint_gas: flat.then_some(200_000),
                deploy_gas: flat.then_some(850_000),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn v1_agent() -> AgentConfigV1 {
        let base = BaseAgentConfigV1 {
            enabled: true,
            interval: 5,
        };
        AgentConfigV1 {
            timelag: Some(3),
            updater: base,
            relayer: base,
            processor: base,
            watcher: base,
            kathy: base,
            ..Default::default()
        }
    }

    fn v1_doc(flat: bool) -> NomadConfigV1 {
        let mut doc = NomadConfigV1 {
            version: 1,
            environment: "test".to_string(),
            networks: vec!["ethereum".to_string()],
            rpcs: None,
            protocol: Default::default(),
            core: BTreeMap::new(),
            bridge: BTreeMap::new(),
            agent: BTreeMap::new(),
            bridge_gui: None,
        };
        doc.protocol
            .networks
            .insert("ethereum".to_string(), v1_domain("ethereum", 1, flat));
        doc.core.insert("ethereum".to_string(), Default::default());
        doc.bridge.insert("ethereum".to_string(), Default::default());
        doc.agent.insert("ethereum".to_string(), v1_agent());
        doc
    }

    #[test]
    fn test_v1_flat_gas_migrated() {
        let config = Normalizer::new().normalize(v1_doc(true).into()).unwrap();
        let gas = &config.gas["ethereum"];

        assert_eq!(config.version, 3);
        assert_eq!(gas.core.replica.process, 865_000);
        assert_eq!(gas.core.replica.prove_and_process, 1_000_000);
        assert_eq!(gas.bridge.bridge_router.send, 1_050_000);
        assert_eq!(gas.core.home, NomadGasConfig::evm_default().core.home);
        assert!(config.bridge_gui.is_empty());
        assert!(config.rpcs.is_empty());
    }

    #[test]
    fn test_v1_without_flat_gas_needs_defaults() {
        let err = Normalizer::new().normalize(v1_doc(false).into()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingGasDefaults { ref domain } if domain == "ethereum"));

        let mut defaults = NomadGasConfig::evm_default();
        defaults.core.replica.process = 42;
        let config = normalize(v1_doc(false).into(), Some(&defaults)).unwrap();
        assert_eq!(config.gas["ethereum"], defaults);
    }

    #[test]
    fn test_v1_contracts_become_ethereum() {
        let config = Normalizer::new().normalize(v1_doc(true).into()).unwrap();
        assert!(matches!(config.core["ethereum"], CoreDeploymentInfo::Ethereum(_)));
        match &config.bridge["ethereum"] {
            crate::BridgeDeploymentInfo::Ethereum(info) => assert!(info.accountant.is_none()),
            other => panic!("unexpected bridge record {:?}", other),
        }
    }

    #[test]
    fn test_v1_agent_flags_dropped() {
        let config = Normalizer::new().normalize(v1_doc(true).into()).unwrap();
        let agent = &config.agent["ethereum"];
        assert_eq!(agent.updater.interval, 5);
        assert!(agent.processor.allowed.is_none());
        assert!(agent.processor.s3.is_none());
    }

    #[test]
    fn test_v3_is_identity() {
        let config = Normalizer::new().normalize(v1_doc(true).into()).unwrap();
        let again = Normalizer::new().normalize(config.clone().into()).unwrap();
        assert_eq!(again, config);
    }
}
