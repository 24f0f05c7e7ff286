//! Agent secrets: RPC connections, transaction submitters and signers
//!
//! Never part of a public document. Agents read them from a file or from
//! the environment and check they cover every network before starting.
//!
//! Environment layout, with `<NETWORK>` upper-cased and `DEFAULT_` used
//! where no network-specific variable is set:
//! - `<NETWORK>_CONNECTION_URL`, `<NETWORK>_RPCSTYLE`
//! - `<NETWORK>_SUBMITTER_TYPE` (`local` or `gelato`)
//! - `<NETWORK>_TXSIGNER_{TYPE,KEY,ID,REGION}` for local submitters
//! - `<NETWORK>_GELATO_SPONSOR_{TYPE,KEY,ID,REGION}`, `<NETWORK>_GELATO_FEETOKEN`
//! - `ATTESTATION_SIGNER_{TYPE,KEY,ID,REGION}`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::{
    agent::AgentRole,
    contracts::ChainFamily,
    document::NomadConfig,
    loader::{is_yaml, read_text},
    ConfigError,
};

/// Connection to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Connection {
    Http { url: String },
    Ws { url: String },
}

impl Connection {
    /// `ws://` and `wss://` urls are websockets, anything else is http
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        if url.starts_with("ws://") || url.starts_with("wss://") {
            Connection::Ws { url }
        } else {
            Connection::Http { url }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Connection::Http { url } | Connection::Ws { url } => url,
        }
    }
}

/// RPC connection tagged with the dialect the node speaks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rpcStyle", content = "connection", rename_all = "camelCase")]
pub enum ChainConf {
    Ethereum(Connection),
    Substrate(Connection),
}

impl ChainConf {
    pub fn family(&self) -> ChainFamily {
        match self {
            ChainConf::Ethereum(_) => ChainFamily::Ethereum,
            ChainConf::Substrate(_) => ChainFamily::Substrate,
        }
    }

    pub fn connection(&self) -> &Connection {
        match self {
            ChainConf::Ethereum(conn) | ChainConf::Substrate(conn) => conn,
        }
    }
}

/// How transactions or attestations get signed
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SignerConf {
    /// 32-byte private key, hex encoded with or without `0x`
    HexKey { key: String },
    /// AWS KMS key. AWS credentials come from the usual AWS environment.
    Aws { id: String, region: String },
    /// The node signs on RPC calls
    #[default]
    #[serde(other)]
    Node,
}

impl SignerConf {
    fn check(&self, scope: &str) -> Result<(), ConfigError> {
        match self {
            SignerConf::HexKey { key } => {
                let digits = key.strip_prefix("0x").unwrap_or(key);
                match hex::decode(digits) {
                    Ok(bytes) if bytes.len() == 32 => Ok(()),
                    Ok(bytes) => Err(invalid(
                        scope,
                        format!("hex signer key is {} bytes, expected 32", bytes.len()),
                    )),
                    Err(e) => Err(invalid(scope, format!("hex signer key: {}", e))),
                }
            }
            SignerConf::Aws { id, region } => {
                if id.is_empty() {
                    return Err(invalid(scope, "aws signer id is empty"));
                }
                if region.is_empty() {
                    return Err(invalid(scope, "aws signer region is empty"));
                }
                Ok(())
            }
            SignerConf::Node => Ok(()),
        }
    }
}

// Keys stay out of logs
impl fmt::Debug for SignerConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerConf::HexKey { .. } => f
                .debug_struct("HexKey")
                .field("key", &"<redacted>")
                .finish(),
            SignerConf::Aws { id, region } => f
                .debug_struct("Aws")
                .field("id", id)
                .field("region", region)
                .finish(),
            SignerConf::Node => f.write_str("Node"),
        }
    }
}

/// Submission through the Gelato relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GelatoConf {
    pub sponsor: SignerConf,
    /// Address of the token relay fees are paid in
    pub fee_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "submitterType", content = "submitter", rename_all = "camelCase")]
pub enum TxSubmitterConf {
    Local(SignerConf),
    /// EVM chains only
    Gelato(GelatoConf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSecrets {
    /// Keyed by network name
    #[serde(default)]
    pub rpcs: BTreeMap<String, ChainConf>,
    /// Keyed by network name
    #[serde(default)]
    pub tx_submitters: BTreeMap<String, TxSubmitterConf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation_signer: Option<SignerConf>,
}

impl AgentSecrets {
    /// Read a JSON or YAML secrets file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let parsed = if is_yaml(path) {
            serde_yaml::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Build secrets for `networks` from the process environment
    pub fn from_env<'a>(networks: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        Self::from_lookup(networks, |key| std::env::var(key).ok())
    }

    /// Build secrets for `networks` from any key/value source
    pub fn from_lookup<'a, F>(
        networks: impl IntoIterator<Item = &'a str>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource { lookup };
        let mut secrets = AgentSecrets::default();

        for network in networks {
            let prefix = network.to_uppercase();
            secrets.rpcs.insert(network.to_string(), env.chain_conf(&prefix)?);
            secrets
                .tx_submitters
                .insert(network.to_string(), env.submitter(&prefix)?);
        }
        secrets.attestation_signer = env.signer("ATTESTATION_SIGNER")?;

        tracing::debug!(
            networks = secrets.rpcs.len(),
            attestation_signer = secrets.attestation_signer.is_some(),
            "Built agent secrets from environment"
        );
        Ok(secrets)
    }

    /// Check an agent of `role` has everything it needs for `networks`
    pub fn validate(&self, role: AgentRole, networks: &[String]) -> Result<(), ConfigError> {
        if role.needs_attestation_signer() {
            self.attestation_signer
                .as_ref()
                .ok_or_else(|| invalid(role.as_str(), "attestation signer required"))?
                .check(role.as_str())?;
        }

        for network in networks {
            let chain = self
                .rpcs
                .get(network)
                .ok_or_else(|| invalid(network, "no rpc connection"))?;
            if chain.connection().url().is_empty() {
                return Err(invalid(network, "rpc url is empty"));
            }

            let submitter = self
                .tx_submitters
                .get(network)
                .ok_or_else(|| invalid(network, "no transaction submitter"))?;
            match submitter {
                TxSubmitterConf::Local(signer) => signer.check(network)?,
                TxSubmitterConf::Gelato(gelato) => {
                    if chain.family() != ChainFamily::Ethereum {
                        return Err(invalid(
                            network,
                            format!("gelato relay is unavailable on {} chains", chain.family()),
                        ));
                    }
                    if gelato.fee_token.is_empty() {
                        return Err(invalid(network, "gelato fee token is empty"));
                    }
                    gelato.sponsor.check(network)?;
                }
            }
        }

        tracing::debug!(role = %role, networks = networks.len(), "Validated agent secrets");
        Ok(())
    }

    /// [`validate`](Self::validate) over every network of `config`, also
    /// requiring each rpc style to match the domain's core deployment
    pub fn validate_for(&self, role: AgentRole, config: &NomadConfig) -> Result<(), ConfigError> {
        self.validate(role, &config.networks)?;

        for network in &config.networks {
            if let (Some(chain), Some(core)) = (self.rpcs.get(network), config.core.get(network)) {
                if chain.family() != core.family() {
                    return Err(invalid(
                        network,
                        format!(
                            "rpc style is {} but core is deployed on {}",
                            chain.family(),
                            core.family()
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn invalid(scope: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSecrets {
        scope: scope.to_string(),
        reason: reason.into(),
    }
}

struct EnvSource<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvSource<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingField(key.to_string()))
    }

    /// `<NETWORK>_<VAR>`, else `DEFAULT_<VAR>`
    fn network_or_default(&self, prefix: &str, var: &str) -> Option<String> {
        self.get(&format!("{}_{}", prefix, var))
            .or_else(|| self.get(&format!("DEFAULT_{}", var)))
    }

    fn chain_conf(&self, prefix: &str) -> Result<ChainConf, ConfigError> {
        let url_key = format!("{}_CONNECTION_URL", prefix);
        let connection = Connection::from_url(self.require(&url_key)?);

        let style = self
            .network_or_default(prefix, "RPCSTYLE")
            .unwrap_or_else(|| "ethereum".to_string());
        match style.to_lowercase().as_str() {
            "ethereum" => Ok(ChainConf::Ethereum(connection)),
            "substrate" => Ok(ChainConf::Substrate(connection)),
            other => Err(ConfigError::InvalidValue {
                field: format!("{}_RPCSTYLE", prefix),
                message: format!("unknown rpc style '{}'", other),
            }),
        }
    }

    fn submitter(&self, prefix: &str) -> Result<TxSubmitterConf, ConfigError> {
        let submitter_type = self
            .network_or_default(prefix, "SUBMITTER_TYPE")
            .ok_or_else(|| ConfigError::MissingField(format!("{}_SUBMITTER_TYPE", prefix)))?;

        match submitter_type.to_lowercase().as_str() {
            "local" => {
                let signer = self
                    .network_signer(prefix, "TXSIGNER")?
                    .ok_or_else(|| ConfigError::MissingField(format!("{}_TXSIGNER_TYPE", prefix)))?;
                Ok(TxSubmitterConf::Local(signer))
            }
            "gelato" => {
                let sponsor = self
                    .network_signer(prefix, "GELATO_SPONSOR")?
                    .ok_or_else(|| {
                        ConfigError::MissingField(format!("{}_GELATO_SPONSOR_TYPE", prefix))
                    })?;
                let fee_token = self
                    .network_or_default(prefix, "GELATO_FEETOKEN")
                    .ok_or_else(|| {
                        ConfigError::MissingField(format!("{}_GELATO_FEETOKEN", prefix))
                    })?;
                Ok(TxSubmitterConf::Gelato(GelatoConf { sponsor, fee_token }))
            }
            other => Err(ConfigError::InvalidValue {
                field: format!("{}_SUBMITTER_TYPE", prefix),
                message: format!("unknown submitter type '{}'", other),
            }),
        }
    }

    /// Signer under `<NETWORK>_<NAME>_*`, else `DEFAULT_<NAME>_*`
    fn network_signer(&self, prefix: &str, name: &str) -> Result<Option<SignerConf>, ConfigError> {
        match self.signer(&format!("{}_{}", prefix, name))? {
            Some(signer) => Ok(Some(signer)),
            None => self.signer(&format!("DEFAULT_{}", name)),
        }
    }

    /// Signer under `<PREFIX>_TYPE` and friends, `None` when no type is set
    fn signer(&self, prefix: &str) -> Result<Option<SignerConf>, ConfigError> {
        let signer_type = match self.get(&format!("{}_TYPE", prefix)) {
            Some(signer_type) => signer_type,
            None => return Ok(None),
        };

        let signer = match signer_type.as_str() {
            "hexKey" => SignerConf::HexKey {
                key: self.require(&format!("{}_KEY", prefix))?,
            },
            "aws" => SignerConf::Aws {
                id: self.require(&format!("{}_ID", prefix))?,
                region: self.require(&format!("{}_REGION", prefix))?,
            },
            "node" => SignerConf::Node,
            other => {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}_TYPE", prefix),
                    message: format!("unknown signer type '{}'", other),
                })
            }
        };
        Ok(Some(signer))
    }
}
