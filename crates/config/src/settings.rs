//! Loader settings

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{gas::NomadGasConfigs, ConfigError};

/// Runtime environment of the consuming process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Violations are logged, only warnings policy applies
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Strict environments refuse documents with Error-severity violations
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Where to find the document and how to treat it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// JSON or YAML document, chosen by extension
    #[serde(default = "default_document_path")]
    pub document_path: PathBuf,

    /// Name of a bundled document to use instead of `document_path`
    #[serde(default)]
    pub builtin: Option<String>,

    /// Gas table for migrating version 1 documents without flat gas fields
    #[serde(default)]
    pub gas_defaults: Option<NomadGasConfigs>,

    /// Refuse documents with warnings too
    #[serde(default)]
    pub fail_on_warnings: bool,
}

fn default_document_path() -> PathBuf {
    PathBuf::from("config/nomad.json")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            document_path: default_document_path(),
            builtin: None,
            gas_defaults: None,
            fail_on_warnings: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.builtin.is_none() && self.document_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "document_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if let Some(name) = &self.builtin {
            if !crate::builtin::names().contains(&name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "builtin".to_string(),
                    message: format!(
                        "unknown document '{}', expected one of {:?}",
                        name,
                        crate::builtin::names()
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Load settings from `config/default`, `config/{env}` and `NOMAD_CONFIG__*`
/// environment variables, later sources winning
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        if env_name.is_empty() || env_name.contains(['/', '\\', '.']) {
            return Err(ConfigError::Environment(format!(
                "invalid environment name '{}'",
                env_name
            )));
        }
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("NOMAD_CONFIG")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        document = %settings.document_path.display(),
        builtin = ?settings.builtin,
        "Loaded settings"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.environment, RuntimeEnvironment::Development);
        assert_eq!(settings.document_path, PathBuf::from("config/nomad.json"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_strictness() {
        assert!(!RuntimeEnvironment::Development.is_strict());
        assert!(RuntimeEnvironment::Staging.is_strict());
        assert!(RuntimeEnvironment::Production.is_production());
    }

    #[test]
    fn test_empty_path_rejected() {
        let settings = Settings {
            document_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let builtin = Settings {
            document_path: PathBuf::new(),
            builtin: Some("test".to_string()),
            ..Default::default()
        };
        assert!(builtin.validate().is_ok());
    }

    #[test]
    fn test_bad_environment_name() {
        assert!(matches!(
            load_settings(Some("../secrets")),
            Err(ConfigError::Environment(_))
        ));
    }

    #[test]
    fn test_unknown_builtin_rejected() {
        let settings = Settings {
            builtin: Some("mainnet-2019".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "builtin"
        ));
    }

    #[test]
    fn test_settings_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nomad.yaml");
        std::fs::write(
            &path,
            "environment: staging\n\
             document_path: /etc/nomad/production.json\n\
             fail_on_warnings: true\n",
        )
        .unwrap();

        let settings: Settings = Config::builder()
            .add_source(File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.environment, RuntimeEnvironment::Staging);
        assert!(settings.fail_on_warnings);
        assert!(settings.gas_defaults.is_none());
        assert!(settings.builtin.is_none());
    }
}
