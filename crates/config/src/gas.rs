//! Per-domain gas limit tables
//!
//! Pure data: each domain carries a static table of gas limits for the core
//! and bridge contract calls its agents make. No cross-references beyond the
//! domain key the table is stored under.

use serde::{Deserialize, Serialize};

/// Gas configuration for core and bridge contract methods
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NomadGasConfig {
    /// Core gas limits
    pub core: CoreGasConfig,
    /// Bridge gas limits
    pub bridge: BridgeGasConfig,
}

impl NomadGasConfig {
    /// Standard EVM gas values
    pub const fn evm_default() -> Self {
        Self {
            core: CoreGasConfig {
                home: HomeGasLimits {
                    update: HomeUpdateGasLimit {
                        per_message: 2_000,
                        base: 100_000,
                    },
                    improper_update: HomeUpdateGasLimit {
                        per_message: 10_000,
                        base: 100_000,
                    },
                    double_update: 200_000,
                },
                replica: ReplicaGasLimits {
                    update: 140_000,
                    prove: 200_000,
                    process: 1_700_000,
                    prove_and_process: 1_900_000,
                    double_update: 200_000,
                },
                connection_manager: ConnectionManagerGasLimits {
                    owner_unenroll_replica: 120_000,
                    unenroll_replica: 120_000,
                },
            },
            bridge: BridgeGasConfig {
                bridge_router: BridgeRouterGasLimits { send: 500_000 },
                eth_helper: EthHelperGasLimits {
                    send: 800_000,
                    send_to_evm_like: 800_000,
                },
            },
        }
    }
}

impl Default for NomadGasConfig {
    fn default() -> Self {
        Self::evm_default()
    }
}

/// Gas table selector used by loader settings
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum NomadGasConfigs {
    /// Fully specified table
    Custom(NomadGasConfig),
    /// [`NomadGasConfig::evm_default`]
    EvmDefault,
}

impl NomadGasConfigs {
    pub fn resolve(&self) -> NomadGasConfig {
        match self {
            NomadGasConfigs::Custom(config) => *config,
            NomadGasConfigs::EvmDefault => NomadGasConfig::evm_default(),
        }
    }
}

/// Gas configuration for core contract methods
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreGasConfig {
    /// Home gas limits
    pub home: HomeGasLimits,
    /// Replica gas limits
    pub replica: ReplicaGasLimits,
    /// Connection manager gas limits
    pub connection_manager: ConnectionManagerGasLimits,
}

/// Gas limits specifically for a home update call
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeUpdateGasLimit {
    /// Per message additional gas cost
    pub per_message: u64,
    /// Base gas limit
    pub base: u64,
}

impl HomeUpdateGasLimit {
    /// Limit for an update covering `messages` messages
    pub fn for_messages(&self, messages: u64) -> u64 {
        self.base.saturating_add(self.per_message.saturating_mul(messages))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeGasLimits {
    pub update: HomeUpdateGasLimit,
    pub improper_update: HomeUpdateGasLimit,
    pub double_update: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaGasLimits {
    pub update: u64,
    pub prove: u64,
    pub process: u64,
    pub prove_and_process: u64,
    pub double_update: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionManagerGasLimits {
    pub owner_unenroll_replica: u64,
    pub unenroll_replica: u64,
}

/// Gas configuration for bridge contract methods
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeGasConfig {
    /// BridgeRouter gas limits
    pub bridge_router: BridgeRouterGasLimits,
    /// EthHelper gas limits
    pub eth_helper: EthHelperGasLimits,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRouterGasLimits {
    pub send: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthHelperGasLimits {
    pub send: u64,
    pub send_to_evm_like: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_selector_deserialization() {
        let evm: NomadGasConfigs = serde_json::from_str(r#"{"type":"evmDefault"}"#).unwrap();
        assert_eq!(evm.resolve(), NomadGasConfig::evm_default());

        let mut custom = NomadGasConfig::evm_default();
        custom.core.replica.process = 2_500_000;
        let json = serde_json::to_string(&NomadGasConfigs::Custom(custom)).unwrap();
        assert!(json.contains("\"type\":\"custom\""));

        let parsed: NomadGasConfigs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.resolve().core.replica.process, 2_500_000);
    }

    #[test]
    fn test_update_limit_scales_with_messages() {
        let limits = NomadGasConfig::evm_default().core.home.update;
        assert_eq!(limits.for_messages(0), 100_000);
        assert_eq!(limits.for_messages(10), 120_000);
        assert_eq!(limits.for_messages(u64::MAX), u64::MAX);
    }
}
