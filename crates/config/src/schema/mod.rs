//! Schema versions of the configuration document
//!
//! The three supported shapes are a revision history, not alternatives. Each
//! is parsed into its own exact type so that field presence per version is
//! enforced by deserialization (every shape denies unknown fields).
//!
//! | version | delta                                                          |
//! |---------|----------------------------------------------------------------|
//! | 1       | flat gas fields, agent `timelag`/`enabled`, EVM-only contracts |
//! | 2       | root `gas` table, processor remote lists, Substrate variant    |
//! | 3       | type renames only                                              |

pub mod v1;
pub mod v2;

use serde::de::DeserializeOwned;
use std::fmt;

use crate::{document::NomadConfig, ConfigError};

pub use v1::NomadConfigV1;
pub use v2::NomadConfigV2;

/// Known `version` discriminants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    V1 = 1,
    V2 = 2,
    V3 = 3,
}

impl SchemaVersion {
    /// The canonical in-memory shape
    pub const CURRENT: SchemaVersion = SchemaVersion::V3;

    pub const ALL: [SchemaVersion; 3] = [SchemaVersion::V1, SchemaVersion::V2, SchemaVersion::V3];

    pub fn as_u64(self) -> u64 {
        self as u64
    }

    /// The version one migration step ahead, `None` when already current
    pub fn next(self) -> Option<SchemaVersion> {
        match self {
            SchemaVersion::V1 => Some(SchemaVersion::V2),
            SchemaVersion::V2 => Some(SchemaVersion::V3),
            SchemaVersion::V3 => None,
        }
    }
}

impl TryFrom<u64> for SchemaVersion {
    type Error = ConfigError;

    fn try_from(version: u64) -> Result<Self, Self::Error> {
        match version {
            1 => Ok(SchemaVersion::V1),
            2 => Ok(SchemaVersion::V2),
            3 => Ok(SchemaVersion::V3),
            other => Err(ConfigError::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u64())
    }
}

/// A parsed document tagged with the schema version it was written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedDocument {
    V1(Box<NomadConfigV1>),
    V2(Box<NomadConfigV2>),
    V3(Box<NomadConfig>),
}

impl VersionedDocument {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Self::from_value(value)
    }

    /// Read the `version` discriminant, then deserialize exactly that shape
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let version = read_version(&value)?;
        let version = SchemaVersion::try_from(version)?;

        Ok(match version {
            SchemaVersion::V1 => VersionedDocument::V1(Box::new(parse_shape(value, version)?)),
            SchemaVersion::V2 => VersionedDocument::V2(Box::new(parse_shape(value, version)?)),
            SchemaVersion::V3 => VersionedDocument::V3(Box::new(parse_shape(value, version)?)),
        })
    }

    pub fn version(&self) -> SchemaVersion {
        match self {
            VersionedDocument::V1(_) => SchemaVersion::V1,
            VersionedDocument::V2(_) => SchemaVersion::V2,
            VersionedDocument::V3(_) => SchemaVersion::V3,
        }
    }

    pub fn environment(&self) -> &str {
        match self {
            VersionedDocument::V1(doc) => &doc.environment,
            VersionedDocument::V2(doc) => &doc.environment,
            VersionedDocument::V3(doc) => &doc.environment,
        }
    }
}

impl From<NomadConfig> for VersionedDocument {
    fn from(doc: NomadConfig) -> Self {
        VersionedDocument::V3(Box::new(doc))
    }
}

impl From<NomadConfigV2> for VersionedDocument {
    fn from(doc: NomadConfigV2) -> Self {
        VersionedDocument::V2(Box::new(doc))
    }
}

impl From<NomadConfigV1> for VersionedDocument {
    fn from(doc: NomadConfigV1) -> Self {
        VersionedDocument::V1(Box::new(doc))
    }
}

fn read_version(value: &serde_json::Value) -> Result<u64, ConfigError> {
    let raw = value
        .get("version")
        .ok_or_else(|| ConfigError::MissingField("version".to_string()))?;

    nomad_types::deser_nomad_u64(raw.clone()).map_err(|e| ConfigError::InvalidValue {
        field: "version".to_string(),
        message: e.to_string(),
    })
}

fn parse_shape<T: DeserializeOwned>(
    value: serde_json::Value,
    version: SchemaVersion,
) -> Result<T, ConfigError> {
    serde_json::from_value(value)
        .map_err(|e| ConfigError::ParseError(format!("{} document: {}", version, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_conversion() {
        assert_eq!(SchemaVersion::try_from(2).unwrap(), SchemaVersion::V2);
        assert!(matches!(
            SchemaVersion::try_from(99),
            Err(ConfigError::UnsupportedVersion(99))
        ));
        assert_eq!(SchemaVersion::CURRENT.as_u64(), 3);
        assert_eq!(SchemaVersion::V1.next(), Some(SchemaVersion::V2));
        assert_eq!(SchemaVersion::CURRENT.next(), None);
    }

    #[test]
    fn test_missing_version() {
        let err = VersionedDocument::from_value(json!({ "environment": "x" })).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "version"));
    }

    #[test]
    fn test_unsupported_version_before_shape() {
        // Shape errors must not mask the version error
        let err = VersionedDocument::from_value(json!({ "version": 99 })).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion(99)));
    }

    #[test]
    fn test_string_version_accepted() {
        let err = VersionedDocument::from_value(json!({ "version": "0x63" })).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion(99)));
    }

    #[test]
    fn test_string_version_parses_whole_document() {
        let builtin = crate::builtin::get_builtin("test").unwrap();
        for version in ["3", "0x3"] {
            let mut value = serde_json::to_value(builtin).unwrap();
            value["version"] = json!(version);

            let doc = VersionedDocument::from_value(value).unwrap();
            assert_eq!(doc.version(), SchemaVersion::V3);
            let normalized = crate::normalizer::normalize(doc, None).unwrap();
            assert_eq!(&normalized, builtin);
        }

        let legacy: serde_json::Value =
            serde_json::from_str(include_str!("../../configs/legacy_v1.json")).unwrap();
        let mut value = legacy;
        value["version"] = json!("1");
        let doc = VersionedDocument::from_value(value).unwrap();
        assert_eq!(doc.version(), SchemaVersion::V1);
    }

    #[test]
    fn test_garbage_version() {
        let err = VersionedDocument::from_value(json!({ "version": [] })).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
