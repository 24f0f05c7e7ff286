//! Integration tests for the load pipeline (parse -> normalize -> validate -> resolve)

use proptest::prelude::*;
use serde_json::{json, Value};
use std::io::Write;

use nomad_config::{
    normalize, AgentRole, AgentSecrets, ConfigError, ConfigLoader, ConfigValidator,
    NomadGasConfig, Normalizer, ReplicaDirection, Resolver, RuntimeEnvironment, SchemaVersion,
    Settings, VersionedDocument, ViolationKind,
};

fn addr(n: u32) -> String {
    format!("0x{:040x}", n)
}

fn proxy(n: u32) -> Value {
    json!({ "implementation": addr(n), "proxy": addr(n + 1), "beacon": addr(n + 2) })
}

fn specs(chain_id: u32) -> Value {
    json!({
        "chainId": chain_id,
        "blockTime": 12,
        "finalizationBlocks": 20,
        "confirmations": 3,
        "blockExplorer": "https://explorer.example.org",
        "indexPageSize": 2000
    })
}

fn gas() -> Value {
    serde_json::to_value(NomadGasConfig::evm_default()).unwrap()
}

/// A fully connected mesh of `domains` in the requested schema version
fn mesh(domains: &[(String, u32)], version: u64) -> Value {
    let names: Vec<&str> = domains.iter().map(|(n, _)| n.as_str()).collect();
    let mut protocol = serde_json::Map::new();
    let mut core = serde_json::Map::new();
    let mut bridge = serde_json::Map::new();
    let mut agent = serde_json::Map::new();
    let mut gas_table = serde_json::Map::new();
    let mut rpcs = serde_json::Map::new();

    for (i, (name, id)) in domains.iter().enumerate() {
        let base = (i as u32 + 1) * 0x1000;
        let others: Vec<&str> = names.iter().copied().filter(|n| n != name).collect();

        let mut configuration = json!({
            "optimisticSeconds": 1800,
            "updater": addr(base + 1),
            "watchers": [addr(base + 2)],
            "governance": { "recoveryManager": addr(base + 3), "recoveryTimelock": 86400 }
        });
        if i == 0 {
            configuration["governance"]["governor"] = json!({ "domain": id, "id": addr(0x99) });
        }

        let mut domain = json!({
            "name": name,
            "domain": id,
            "connections": others,
            "configuration": configuration,
            "specs": specs(*id),
            "bridgeConfiguration": {}
        });

        let replicas: serde_json::Map<String, Value> = others
            .iter()
            .enumerate()
            .map(|(j, remote)| (remote.to_string(), proxy(base + 0x100 + j as u32 * 0x10)))
            .collect();
        core.insert(
            name.clone(),
            json!({
                "deployHeight": 100,
                "upgradeBeaconController": addr(base + 4),
                "xAppConnectionManager": addr(base + 5),
                "updaterManager": addr(base + 6),
                "governanceRouter": proxy(base + 0x10),
                "home": proxy(base + 0x20),
                "replicas": replicas
            }),
        );
        bridge.insert(
            name.clone(),
            json!({
                "deployHeight": 100,
                "bridgeRouter": proxy(base + 0x30),
                "tokenRegistry": proxy(base + 0x40),
                "bridgeToken": proxy(base + 0x50)
            }),
        );
        rpcs.insert(name.clone(), json!([format!("https://{}.example.org", name)]));

        if version == 1 {
            domain["configuration"]["processGas"] = json!(850_000);
            domain["configuration"]["reserveGas"] = json!(15_000);
            domain["configuration"]["maximumGas"] = json!(1_000_000);
            domain["bridgeConfiguration"] = json!({ "mintGas": 200_000, "deployGas": 850_000 });
            agent.insert(
                name.clone(),
                json!({
                    "timelag": 5,
                    "db": "/usr/share/nomad",
                    "updater": { "enabled": true, "interval": 5 },
                    "relayer": { "enabled": true, "interval": 10 },
                    "processor": { "enabled": true, "interval": 5 },
                    "watcher": { "enabled": true, "interval": 5 },
                    "kathy": { "enabled": false, "interval": 500 }
                }),
            );
        } else {
            agent.insert(
                name.clone(),
                json!({
                    "db": "/usr/share/nomad",
                    "updater": { "interval": 5 },
                    "relayer": { "interval": 10 },
                    "processor": { "interval": 5 },
                    "watcher": { "interval": 5 },
                    "kathy": { "interval": 500 }
                }),
            );
            gas_table.insert(name.clone(), gas());
        }
        protocol.insert(name.clone(), domain);
    }

    let mut doc = json!({
        "version": version,
        "environment": "integration",
        "networks": names,
        "rpcs": rpcs,
        "protocol": { "networks": protocol },
        "core": core,
        "bridge": bridge,
        "agent": agent
    });
    if version != 1 {
        doc["gas"] = Value::Object(gas_table);
    }
    doc
}

fn two_domains() -> Vec<(String, u32)> {
    vec![("ethereum".to_string(), 1), ("moonbeam".to_string(), 2)]
}

fn load(doc: Value) -> Result<Resolver, ConfigError> {
    let config = Normalizer::new().normalize(VersionedDocument::from_value(doc)?)?;
    let report = ConfigValidator::new().validate(&config);
    assert!(report.is_ok(), "{}", report.summary());
    Ok(Resolver::new(config))
}

/// Two mutually connected domains with complete tables validate cleanly
#[test]
fn test_two_domain_end_to_end() {
    let doc = mesh(&two_domains(), 3);
    let config = normalize(VersionedDocument::from_value(doc).unwrap(), None).unwrap();

    let report = ConfigValidator::new().validate(&config);
    assert!(report.is_empty(), "{}", report.summary());

    let resolver = Resolver::new(config);
    let replica = resolver.replica_of("ethereum", "moonbeam").unwrap();
    assert_eq!(
        *replica,
        resolver.core_of("ethereum").unwrap().replica_of("moonbeam").copied().unwrap()
    );

    let err = resolver.replica_of("moonbeam", "polkadot").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(resolver.governor().unwrap().domain, 1);
}

/// An unknown version is refused before anything is built from it
#[test]
fn test_unknown_version_rejected() {
    let mut doc = mesh(&two_domains(), 3);
    doc["version"] = json!(99);

    let err = VersionedDocument::from_value(doc.clone()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedVersion(99)));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nomad.json");
    std::fs::write(&path, doc.to_string()).unwrap();
    let loader = ConfigLoader::new(Settings::default());
    assert!(matches!(
        loader.load_path(&path),
        Err(ConfigError::UnsupportedVersion(99))
    ));
}

/// A missing replica is reported exactly once, from the side that lacks it
#[test]
fn test_symmetry_detection() {
    let mut doc = mesh(&two_domains(), 3);
    doc["core"]["ethereum"]["replicas"] = json!({});

    let config = normalize(VersionedDocument::from_value(doc).unwrap(), None).unwrap();
    let report = ConfigValidator::new().validate(&config);

    let mismatches = report.of_code("ReplicaMismatch");
    assert_eq!(mismatches.len(), 1);
    assert_eq!(
        mismatches[0].kind,
        ViolationKind::ReplicaMismatch {
            domain: "ethereum".to_string(),
            remote: "moonbeam".to_string(),
            direction: ReplicaDirection::OutboundMissing,
        }
    );
}

/// Two governors yield one violation, not two
#[test]
fn test_governor_uniqueness() {
    let mut doc = mesh(&two_domains(), 3);
    doc["protocol"]["networks"]["moonbeam"]["configuration"]["governance"]["governor"] =
        json!({ "domain": 2, "id": addr(0x98) });

    let config = normalize(VersionedDocument::from_value(doc).unwrap(), None).unwrap();
    let report = ConfigValidator::new().validate(&config);

    let governors = report.of_code("GovernorInvalid");
    assert_eq!(governors.len(), 1);
    assert!(governors[0].to_string().contains("duplicate governor"));
}

/// Normalizing a current document changes nothing
#[test]
fn test_v3_normalization_is_identity() {
    let doc = mesh(&two_domains(), 3);
    let parsed = VersionedDocument::from_value(doc).unwrap();
    let VersionedDocument::V3(original) = parsed.clone() else {
        panic!("expected a v3 document");
    };

    let normalized = Normalizer::new().normalize(parsed).unwrap();
    assert_eq!(normalized, *original);
    assert_eq!(normalized.to_json().unwrap(), original.to_json().unwrap());
}

#[test]
fn test_v2_document_migrates() {
    let mut doc = mesh(&two_domains(), 2);
    doc["core"]["moonbeam"] = json!({ "deployHeight": 7 });
    doc["bridge"]["moonbeam"] = json!({ "deployHeight": 7 });

    let parsed = VersionedDocument::from_value(doc).unwrap();
    assert_eq!(parsed.version(), SchemaVersion::V2);

    let config = Normalizer::new().normalize(parsed).unwrap();
    assert_eq!(config.version, 3);
    assert_eq!(config.core["moonbeam"].deploy_height(), 7);

    let report = ConfigValidator::new().validate(&config);
    assert!(report.is_empty(), "{}", report.summary());
}

#[test]
fn test_v1_shape_is_exact() {
    // v1 documents have no root gas table
    let mut doc = mesh(&two_domains(), 1);
    doc["gas"] = json!({});
    assert!(matches!(
        VersionedDocument::from_value(doc),
        Err(ConfigError::ParseError(_))
    ));

    // and current documents have no flat gas fields
    let mut doc = mesh(&two_domains(), 3);
    doc["protocol"]["networks"]["ethereum"]["configuration"]["processGas"] = json!(1);
    assert!(VersionedDocument::from_value(doc).is_err());
}

#[test]
fn test_loader_reads_yaml_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let doc = mesh(&two_domains(), 1);

    let json_path = dir.path().join("legacy.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let yaml_path = dir.path().join("legacy.yaml");
    let mut file = std::fs::File::create(&yaml_path).unwrap();
    file.write_all(serde_yaml::to_string(&doc).unwrap().as_bytes())
        .unwrap();

    let loader = ConfigLoader::new(Settings {
        environment: RuntimeEnvironment::Production,
        ..Default::default()
    });
    let from_json = loader.load_path(&json_path).unwrap();
    let from_yaml = loader.load_path(&yaml_path).unwrap();

    assert_eq!(from_json.source_version, SchemaVersion::V1);
    assert_eq!(from_json.resolver.document(), from_yaml.resolver.document());
    assert_eq!(
        from_json.resolver.gas_of("moonbeam").unwrap().core.replica.process,
        865_000
    );
}

#[test]
fn test_strict_environment_rejects_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = mesh(&two_domains(), 3);
    doc["core"]["ethereum"]["replicas"] = json!({});
    let path = dir.path().join("broken.json");
    std::fs::write(&path, doc.to_string()).unwrap();

    let strict = ConfigLoader::new(Settings {
        environment: RuntimeEnvironment::Production,
        ..Default::default()
    });
    assert!(matches!(
        strict.load_path(&path),
        Err(ConfigError::Rejected { .. })
    ));

    let lenient = ConfigLoader::new(Settings::default());
    let loaded = lenient.load_path(&path).unwrap();
    assert!(!loaded.report.is_ok());
    assert!(loaded.resolver.replica_of("ethereum", "moonbeam").is_err());
}

#[test]
fn test_resolver_by_id_and_name() {
    let resolver = load(mesh(&two_domains(), 3)).unwrap();
    let located = resolver.locate_replica_of("ethereum", 2u32).unwrap();
    assert_eq!(
        located,
        resolver.replica_of("moonbeam", "ethereum").unwrap().proxy
    );
    assert_eq!(resolver.networks(), ["ethereum", "moonbeam"]);
}

/// Agent boot: trim to the home network, then check the secrets cover it
#[test]
fn test_agent_boot_with_secrets() {
    let loader = ConfigLoader::new(Settings {
        builtin: Some("test".to_string()),
        ..Default::default()
    });
    let loaded = loader.load().unwrap();
    let trimmed = loaded.resolver.trim_to_network("moonbeam").unwrap();
    assert_eq!(trimmed.networks, ["ethereum", "moonbeam"]);

    let secrets = AgentSecrets::from_file(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/configs/test_secrets.json"
    ))
    .unwrap();
    secrets.validate_for(AgentRole::Updater, &trimmed).unwrap();

    let mut partial = secrets.clone();
    partial.rpcs.remove("ethereum");
    assert!(matches!(
        partial.validate_for(AgentRole::Relayer, &trimmed),
        Err(ConfigError::InvalidSecrets { ref scope, .. }) if scope == "ethereum"
    ));
}

/// A v2 string-versioned document goes through the loader like any other
#[test]
fn test_string_version_through_loader() {
    let mut doc = mesh(&two_domains(), 2);
    doc["version"] = json!("2");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nomad.json");
    std::fs::write(&path, doc.to_string()).unwrap();

    let loaded = ConfigLoader::default().load_path(&path).unwrap();
    assert_eq!(loaded.source_version, SchemaVersion::V2);
    assert_eq!(loaded.resolver.document().version, 3);
}

fn domain_set() -> impl Strategy<Value = Vec<(String, u32)>> {
    proptest::collection::btree_set(1u32..100_000, 1..6).prop_map(|ids| {
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| (format!("domain{}", i), id))
            .collect()
    })
}

fn flat_gas() -> impl Strategy<Value = [Option<u64>; 5]> {
    proptest::array::uniform5(proptest::option::of(0u64..5_000_000))
}

proptest! {
    /// v1 inputs with defaults always produce complete tables
    #[test]
    fn prop_migration_never_mismatches_tables(
        domains in domain_set(),
        flat in flat_gas(),
        with_rpcs in any::<bool>(),
    ) {
        let mut doc = mesh(&domains, 1);
        if !with_rpcs {
            if let Some(map) = doc.as_object_mut() {
                map.remove("rpcs");
            }
        }
        let fields = [
            ("configuration", "processGas"),
            ("configuration", "reserveGas"),
            ("configuration", "maximumGas"),
            ("bridgeConfiguration", "mintGas"),
            ("bridgeConfiguration", "deployGas"),
        ];
        for (name, _) in &domains {
            let domain = &mut doc["protocol"]["networks"][name.as_str()];
            for ((section, field), value) in fields.iter().zip(flat.iter()) {
                match value {
                    Some(v) => domain[*section][*field] = json!(v),
                    None => {
                        if let Some(map) = domain[*section].as_object_mut() {
                            map.remove(*field);
                        }
                    }
                }
            }
        }

        let parsed = VersionedDocument::from_value(doc).unwrap();
        let config = normalize(parsed, Some(&NomadGasConfig::evm_default())).unwrap();
        let report = ConfigValidator::new().validate(&config);

        prop_assert!(report.of_code("TableKeyMismatch").is_empty(), "{}", report.summary());
        prop_assert_eq!(config.gas.len(), domains.len());
        let expected_missing = if with_rpcs { 0 } else { domains.len() };
        prop_assert_eq!(report.of_code("MissingRpc").len(), expected_missing);
    }

    /// Name and id lookups agree for every participant
    #[test]
    fn prop_resolver_name_id_round_trip(domains in domain_set()) {
        let resolver = load(mesh(&domains, 3)).unwrap();
        for (name, _) in &domains {
            let id = resolver.domain_by_name(name).unwrap().domain;
            prop_assert_eq!(&resolver.domain_by_id(id).unwrap().name, name);
        }
    }
}
