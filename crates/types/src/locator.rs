//! Cross-domain addressing types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{deser_nomad_u32, NomadIdentifier};

/// Domain/identifier pair
///
/// Unambiguously addresses an account, token or contract on a specific domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NomadLocator {
    /// The domain
    #[serde(deserialize_with = "deser_nomad_u32")]
    pub domain: u32,
    /// The identifier on that domain
    pub id: NomadIdentifier,
}

impl fmt::Display for NomadLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.id)
    }
}

/// Upgradeable contract triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    /// Implementation contract
    pub implementation: NomadIdentifier,
    /// Proxy contract (the address callers use)
    pub proxy: NomadIdentifier,
    /// Upgrade beacon
    pub beacon: NomadIdentifier,
}

/// A domain referenced either by its name or by its numeric id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameOrDomain {
    /// Domain name
    Name(String),
    /// Domain number
    Domain(u32),
}

impl From<String> for NameOrDomain {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

impl From<&str> for NameOrDomain {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

impl From<u32> for NameOrDomain {
    fn from(d: u32) -> Self {
        Self::Domain(d)
    }
}

impl fmt::Display for NameOrDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Domain(id) => write!(f, "domain {}", id),
        }
    }
}
