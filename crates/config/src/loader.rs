//! End-to-end load pipeline
//!
//! read → parse → normalize → validate → policy → index. Schema failures
//! abort immediately; validation findings are returned as data and only
//! abort when the settings' policy says so.

use std::path::Path;

use crate::{
    builtin,
    normalizer::Normalizer,
    resolver::Resolver,
    schema::{SchemaVersion, VersionedDocument},
    settings::{load_settings, Settings},
    validator::{ConfigValidator, ValidationReport},
    ConfigError,
};

/// A document that made it through the pipeline
#[derive(Debug)]
pub struct LoadedConfig {
    pub resolver: Resolver,
    /// Every finding, including those the policy let through
    pub report: ValidationReport,
    /// Schema version the document was written in
    pub source_version: SchemaVersion,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    settings: Settings,
}

impl ConfigLoader {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Loader configured from [`load_settings`]
    pub fn from_env(env: Option<&str>) -> Result<Self, ConfigError> {
        load_settings(env).map(Self::new)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load the document named by the settings
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        self.settings.validate()?;

        match &self.settings.builtin {
            Some(name) => {
                let doc = builtin::get_builtin(name)?;
                self.load_document(doc.clone().into())
            }
            None => self.load_path(&self.settings.document_path),
        }
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedConfig, ConfigError> {
        let path = path.as_ref();
        let doc = read_document(path)?;
        tracing::info!(
            path = %path.display(),
            version = %doc.version(),
            "Read configuration document"
        );
        self.load_document(doc)
    }

    /// Run an already-parsed document through the pipeline
    pub fn load_document(&self, doc: VersionedDocument) -> Result<LoadedConfig, ConfigError> {
        let source_version = doc.version();

        let mut normalizer = Normalizer::new();
        if let Some(defaults) = &self.settings.gas_defaults {
            normalizer = normalizer.with_gas_defaults(defaults.resolve());
        }
        let config = normalizer.normalize(doc)?;

        let report = ConfigValidator::new().validate(&config);
        self.apply_policy(&report)?;

        tracing::info!(
            environment = %config.environment,
            source_version = %source_version,
            domains = config.networks.len(),
            errors = report.errors().len(),
            warnings = report.warnings().len(),
            "Configuration loaded"
        );

        Ok(LoadedConfig {
            resolver: Resolver::new(config),
            report,
            source_version,
        })
    }

    fn apply_policy(&self, report: &ValidationReport) -> Result<(), ConfigError> {
        let errors = report.errors();
        if !errors.is_empty() {
            if self.settings.environment.is_strict() {
                return Err(ConfigError::Rejected {
                    summary: report.summary(),
                });
            }
            for error in errors {
                tracing::warn!(code = error.code(), "Accepting document despite: {}", error.kind);
            }
        }

        if self.settings.fail_on_warnings && !report.warnings().is_empty() {
            return Err(ConfigError::Rejected {
                summary: report.summary(),
            });
        }

        Ok(())
    }
}

/// Parse a JSON or YAML file into its versioned shape
pub fn read_document(path: &Path) -> Result<VersionedDocument, ConfigError> {
    let text = read_text(path)?;
    if is_yaml(path) {
        VersionedDocument::from_yaml_str(&text)
    } else {
        VersionedDocument::from_json_str(&text)
    }
}

pub(crate) fn read_text(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
        _ => ConfigError::ParseError(format!("{}: {}", path.display(), e)),
    })
}

/// `.yaml` and `.yml` files are YAML, anything else is JSON
pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RuntimeEnvironment;

    #[test]
    fn test_load_builtin() {
        let loader = ConfigLoader::new(Settings {
            builtin: Some("test".to_string()),
            environment: RuntimeEnvironment::Production,
            ..Default::default()
        });
        let loaded = loader.load().unwrap();
        assert!(loaded.report.is_empty());
        assert_eq!(loaded.source_version, SchemaVersion::V3);
        assert_eq!(loaded.resolver.networks().len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let loader = ConfigLoader::new(Settings {
            document_path: "/nonexistent/nomad.json".into(),
            ..Default::default()
        });
        assert!(matches!(loader.load(), Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_fail_on_warnings() {
        // legacy document carries no rpcs, which is a warning
        let lenient = ConfigLoader::new(Settings {
            builtin: Some("legacy".to_string()),
            ..Default::default()
        });
        let loaded = lenient.load().unwrap();
        assert!(loaded.report.is_ok());
        assert!(!loaded.report.warnings().is_empty());

        let strict = ConfigLoader::new(Settings {
            builtin: Some("legacy".to_string()),
            fail_on_warnings: true,
            ..Default::default()
        });
        assert!(matches!(strict.load(), Err(ConfigError::Rejected { .. })));
    }
}
