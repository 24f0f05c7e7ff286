//! Documents bundled at compile time

use once_cell::sync::OnceCell;

use crate::{document::NomadConfig, normalizer::Normalizer, schema::VersionedDocument, ConfigError};

const TEST_JSON: &str = include_str!("../configs/test.json");
const LEGACY_JSON: &str = include_str!("../configs/legacy_v1.json");
const PRODUCTION_TEMPLATE_JSON: &str = include_str!("../configs/production_template.json");

static TEST: OnceCell<NomadConfig> = OnceCell::new();
static LEGACY: OnceCell<NomadConfig> = OnceCell::new();
static PRODUCTION_TEMPLATE: OnceCell<NomadConfig> = OnceCell::new();

/// Names accepted by [`get_builtin`]
pub fn names() -> &'static [&'static str] {
    &["test", "legacy", "production-template"]
}

/// A bundled document, parsed and normalized on first use
pub fn get_builtin(name: &str) -> Result<&'static NomadConfig, ConfigError> {
    let (cell, text) = match name {
        "test" => (&TEST, TEST_JSON),
        "legacy" => (&LEGACY, LEGACY_JSON),
        "production-template" => (&PRODUCTION_TEMPLATE, PRODUCTION_TEMPLATE_JSON),
        other => return Err(ConfigError::not_found("builtin document", other)),
    };

    cell.get_or_try_init(|| {
        let doc = VersionedDocument::from_json_str(text)?;
        Normalizer::new().normalize(doc)
    })
}
