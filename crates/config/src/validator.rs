//! Cross-reference validation of a normalized document
//!
//! The document is a set of parallel tables keyed by domain name plus a web of
//! name and id references between them. The validator checks that web and
//! collects every violation it finds rather than stopping at the first, so a
//! deployment operator gets the full report in one pass.
//!
//! Checks, all of which always run:
//! - table key sets against `networks`
//! - map keys against `Domain.name`
//! - numeric domain id uniqueness
//! - connection and replica enrollment symmetry
//! - governor uniqueness and self-reference
//! - core/bridge chain family agreement
//! - processor remote lists and bridge GUI connections
//! - custom token locators
//!
//! Connection asymmetry and missing RPC entries are warnings, everything else
//! is an error. Whether errors block use of the document is the caller's call.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use nomad_types::NomadLocator;

use crate::{contracts::ChainFamily, document::NomadConfig};

/// Severity of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Suspicious but usable
    Warning,
    /// The document cannot be trusted as-is
    Error,
}

/// Which side of a connection/replica pair is inconsistent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicaDirection {
    /// `domain` connects to `remote` but has no replica of it enrolled
    OutboundMissing,
    /// `domain` has a replica of `remote` enrolled without a connection
    NotConnected,
    /// `domain` connects to `remote` but `remote` does not connect back
    Asymmetric,
}

impl fmt::Display for ReplicaDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicaDirection::OutboundMissing => f.write_str("outbound-missing"),
            ReplicaDirection::NotConnected => f.write_str("not-connected"),
            ReplicaDirection::Asymmetric => f.write_str("asymmetric"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GovernorReason {
    /// The governor locator names a domain id that is not a participant
    NotFound,
    /// Another domain already declares a governor
    DuplicateGovernor,
    /// The protocol-level governor disagrees with the domain-level one
    ProtocolMismatch,
}

impl fmt::Display for GovernorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GovernorReason::NotFound => f.write_str("governor domain not found"),
            GovernorReason::DuplicateGovernor => f.write_str("duplicate governor"),
            GovernorReason::ProtocolMismatch => {
                f.write_str("protocol governor does not match domain governor")
            }
        }
    }
}

/// Machine-readable violation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    TableKeyMismatch {
        table: String,
        missing: Vec<String>,
        extra: Vec<String>,
    },
    ReplicaMismatch {
        domain: String,
        remote: String,
        direction: ReplicaDirection,
    },
    GovernorInvalid {
        domain: String,
        reason: GovernorReason,
    },
    DuplicateDomainId {
        id: u32,
        names: Vec<String>,
    },
    UnknownDomainReference {
        domain: String,
        field: String,
        referenced: String,
    },
    DanglingTokenLocator {
        domain: String,
        token: NomadLocator,
        field: String,
    },
    NameMismatch {
        key: String,
        name: String,
    },
    ChainFamilyMismatch {
        domain: String,
        core: ChainFamily,
        bridge: ChainFamily,
    },
    /// A network with no RPC endpoint configured
    MissingRpc {
        domain: String,
    },
}

impl ViolationKind {
    /// Stable tag for report consumers
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::TableKeyMismatch { .. } => "TableKeyMismatch",
            ViolationKind::ReplicaMismatch { .. } => "ReplicaMismatch",
            ViolationKind::GovernorInvalid { .. } => "GovernorInvalid",
            ViolationKind::DuplicateDomainId { .. } => "DuplicateDomainId",
            ViolationKind::UnknownDomainReference { .. } => "UnknownDomainReference",
            ViolationKind::DanglingTokenLocator { .. } => "DanglingTokenLocator",
            ViolationKind::NameMismatch { .. } => "NameMismatch",
            ViolationKind::ChainFamilyMismatch { .. } => "ChainFamilyMismatch",
            ViolationKind::MissingRpc { .. } => "MissingRpc",
        }
    }

    /// The offending domain, when the violation is about a single one
    pub fn domain(&self) -> Option<&str> {
        match self {
            ViolationKind::ReplicaMismatch { domain, .. }
            | ViolationKind::GovernorInvalid { domain, .. }
            | ViolationKind::UnknownDomainReference { domain, .. }
            | ViolationKind::DanglingTokenLocator { domain, .. }
            | ViolationKind::ChainFamilyMismatch { domain, .. }
            | ViolationKind::MissingRpc { domain } => Some(domain.as_str()),
            ViolationKind::NameMismatch { key, .. } => Some(key.as_str()),
            ViolationKind::TableKeyMismatch { .. } | ViolationKind::DuplicateDomainId { .. } => {
                None
            }
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::TableKeyMismatch {
                table,
                missing,
                extra,
            } => write!(
                f,
                "table '{}' does not match networks: missing {:?}, extra {:?}",
                table, missing, extra
            ),
            ViolationKind::ReplicaMismatch {
                domain,
                remote,
                direction,
            } => write!(f, "{} -> {}: {}", domain, remote, direction),
            ViolationKind::GovernorInvalid { domain, reason } => {
                write!(f, "{}: {}", domain, reason)
            }
            ViolationKind::DuplicateDomainId { id, names } => {
                write!(f, "domain id {} shared by {}", id, names.join(", "))
            }
            ViolationKind::UnknownDomainReference {
                domain,
                field,
                referenced,
            } => write!(f, "{}/{}: unknown domain '{}'", domain, field, referenced),
            ViolationKind::DanglingTokenLocator {
                domain,
                token,
                field,
            } => write!(
                f,
                "{}/{}: token {} points at unknown domain id {}",
                domain, field, token, token.domain
            ),
            ViolationKind::NameMismatch { key, name } => {
                write!(f, "network keyed '{}' is named '{}'", key, name)
            }
            ViolationKind::ChainFamilyMismatch {
                domain,
                core,
                bridge,
            } => write!(
                f,
                "{}: core is {} but bridge is {}",
                domain, core, bridge
            ),
            ViolationKind::MissingRpc { domain } => {
                write!(f, "{}: no rpc endpoint configured", domain)
            }
        }
    }
}

/// One finding of the validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub severity: Severity,
    pub kind: ViolationKind,
}

impl Violation {
    fn error(kind: ViolationKind) -> Self {
        Self {
            severity: Severity::Error,
            kind,
        }
    }

    fn warning(kind: ViolationKind) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.code(), self.kind)
    }
}

/// All violations found in one document, in check order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// True when nothing of Error severity was found
    pub fn is_ok(&self) -> bool {
        !self.violations.iter().any(Violation::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn errors(&self) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&Violation> {
        self.violations.iter().filter(|v| !v.is_error()).collect()
    }

    /// Violations with the given code
    pub fn of_code(&self, code: &str) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.code() == code).collect()
    }

    pub fn summary(&self) -> String {
        if self.violations.is_empty() {
            return "All validations passed".to_string();
        }
        let errors = self.errors();
        let mut summary = format!(
            "{} errors, {} warnings",
            errors.len(),
            self.violations.len() - errors.len()
        );
        if let Some(first) = errors.first() {
            summary.push_str(&format!("; first: {}", first));
        }
        summary
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

impl IntoIterator for ValidationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

/// Cross-reference validator
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    include_warnings: bool,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self {
            include_warnings: true,
        }
    }

    /// Set whether Warning-severity violations are reported
    pub fn with_warnings(mut self, include: bool) -> Self {
        self.include_warnings = include;
        self
    }

    /// Validate a normalized document
    pub fn validate(&self, config: &NomadConfig) -> ValidationReport {
        let mut report = ValidationReport::default();
        let index = DocumentIndex::new(config);

        // 1. Table key sets
        self.validate_key_sets(config, &mut report);

        // 2. Network names and ids
        self.validate_names(config, &mut report);
        self.validate_domain_ids(config, &mut report);

        // 3. Connections and replicas
        self.validate_connections(config, &mut report);

        // 4. Governor
        self.validate_governor(config, &index, &mut report);

        // 5. Chain families
        self.validate_chain_families(config, &mut report);

        // 6. Name references outside the protocol table
        self.validate_agent_references(config, &index, &mut report);
        self.validate_gui_references(config, &index, &mut report);

        // 7. Token locators
        self.validate_token_locators(config, &index, &mut report);

        if !self.include_warnings {
            report.violations.retain(Violation::is_error);
        }

        for warning in report.warnings() {
            tracing::warn!(code = warning.code(), "{}", warning.kind);
        }
        tracing::debug!(
            environment = %config.environment,
            violations = report.len(),
            ok = report.is_ok(),
            "Validated configuration document"
        );

        report
    }

    fn validate_key_sets(&self, config: &NomadConfig, report: &mut ValidationReport) {
        let networks: BTreeSet<&str> = config.networks.iter().map(String::as_str).collect();

        let exact: [(&str, BTreeSet<&str>); 5] = [
            ("protocol.networks", keys(&config.protocol.networks)),
            ("core", keys(&config.core)),
            ("bridge", keys(&config.bridge)),
            ("agent", keys(&config.agent)),
            ("gas", keys(&config.gas)),
        ];
        for (table, table_keys) in exact {
            let missing = difference(&networks, &table_keys);
            let extra = difference(&table_keys, &networks);
            if !missing.is_empty() || !extra.is_empty() {
                report.push(Violation::error(ViolationKind::TableKeyMismatch {
                    table: table.to_string(),
                    missing,
                    extra,
                }));
            }
        }

        // Subset tables: a stray key is an error
        let subsets: [(&str, BTreeSet<&str>); 2] = [
            ("bridgeGui", keys(&config.bridge_gui)),
            ("rpcs", keys(&config.rpcs)),
        ];
        for (table, table_keys) in subsets {
            let extra = difference(&table_keys, &networks);
            if !extra.is_empty() {
                report.push(Violation::error(ViolationKind::TableKeyMismatch {
                    table: table.to_string(),
                    missing: Vec::new(),
                    extra,
                }));
            }
        }

        // Agents need an RPC endpoint for every network, but documents
        // consumed only by tooling routinely omit them
        let rpcs = keys(&config.rpcs);
        for domain in difference(&networks, &rpcs) {
            report.push(Violation::warning(ViolationKind::MissingRpc { domain }));
        }
    }

    fn validate_names(&self, config: &NomadConfig, report: &mut ValidationReport) {
        for (key, domain) in &config.protocol.networks {
            if *key != domain.name {
                report.push(Violation::error(ViolationKind::NameMismatch {
                    key: key.clone(),
                    name: domain.name.clone(),
                }));
            }
        }
    }

    fn validate_domain_ids(&self, config: &NomadConfig, report: &mut ValidationReport) {
        let mut by_id: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for (name, domain) in &config.protocol.networks {
            by_id.entry(domain.domain).or_default().push(name.clone());
        }

        for (id, names) in by_id {
            if names.len() > 1 {
                report.push(Violation::error(ViolationKind::DuplicateDomainId { id, names }));
            }
        }
    }

    fn validate_connections(&self, config: &NomadConfig, report: &mut ValidationReport) {
        for (name, domain) in &config.protocol.networks {
            let core = config.core.get(name);

            for remote in &domain.connections {
                let Some(remote_domain) = config.protocol.networks.get(remote) else {
                    report.push(Violation::error(ViolationKind::UnknownDomainReference {
                        domain: name.clone(),
                        field: "connections".to_string(),
                        referenced: remote.clone(),
                    }));
                    continue;
                };

                // Substrate records have no replica table to check
                if let Some(core) = core {
                    if core.family() == ChainFamily::Ethereum && !core.has_replica(remote) {
                        report.push(Violation::error(ViolationKind::ReplicaMismatch {
                            domain: name.clone(),
                            remote: remote.clone(),
                            direction: ReplicaDirection::OutboundMissing,
                        }));
                    }
                }

                if !remote_domain.is_connected_to(name) {
                    report.push(Violation::warning(ViolationKind::ReplicaMismatch {
                        domain: name.clone(),
                        remote: remote.clone(),
                        direction: ReplicaDirection::Asymmetric,
                    }));
                }
            }

            if let Some(core) = core {
                for (remote, _) in core.replicas() {
                    if !domain.is_connected_to(remote) {
                        report.push(Violation::error(ViolationKind::ReplicaMismatch {
                            domain: name.clone(),
                            remote: remote.clone(),
                            direction: ReplicaDirection::NotConnected,
                        }));
                    }
                }
            }
        }
    }

    fn validate_governor(
        &self,
        config: &NomadConfig,
        index: &DocumentIndex<'_>,
        report: &mut ValidationReport,
    ) {
        let mut primary: Option<(&str, NomadLocator)> = None;

        for (name, domain) in &config.protocol.networks {
            let Some(governor) = domain.governor() else {
                continue;
            };

            if !index.has_id(governor.domain) {
                report.push(Violation::error(ViolationKind::GovernorInvalid {
                    domain: name.clone(),
                    reason: GovernorReason::NotFound,
                }));
            }

            if primary.is_some() {
                report.push(Violation::error(ViolationKind::GovernorInvalid {
                    domain: name.clone(),
                    reason: GovernorReason::DuplicateGovernor,
                }));
            } else {
                primary = Some((name.as_str(), governor));
            }
        }

        if let Some(protocol_governor) = config.protocol.governor {
            if !index.has_id(protocol_governor.domain) {
                report.push(Violation::error(ViolationKind::GovernorInvalid {
                    domain: "protocol".to_string(),
                    reason: GovernorReason::NotFound,
                }));
            }
            if let Some((name, governor)) = primary {
                if governor != protocol_governor {
                    report.push(Violation::error(ViolationKind::GovernorInvalid {
                        domain: name.to_string(),
                        reason: GovernorReason::ProtocolMismatch,
                    }));
                }
            }
        }
    }

    fn validate_chain_families(&self, config: &NomadConfig, report: &mut ValidationReport) {
        for (name, core) in &config.core {
            let Some(bridge) = config.bridge.get(name) else {
                continue;
            };
            if core.family() != bridge.family() {
                report.push(Violation::error(ViolationKind::ChainFamilyMismatch {
                    domain: name.clone(),
                    core: core.family(),
                    bridge: bridge.family(),
                }));
            }
        }
    }

    fn validate_agent_references(
        &self,
        config: &NomadConfig,
        index: &DocumentIndex<'_>,
        report: &mut ValidationReport,
    ) {
        for (name, agent) in &config.agent {
            for (field, list) in agent.processor.remote_lists() {
                for referenced in list.into_iter().flatten() {
                    if !index.has_name(referenced) {
                        report.push(Violation::error(ViolationKind::UnknownDomainReference {
                            domain: name.clone(),
                            field: field.to_string(),
                            referenced: referenced.clone(),
                        }));
                    }
                }
            }
        }
    }

    fn validate_gui_references(
        &self,
        config: &NomadConfig,
        index: &DocumentIndex<'_>,
        report: &mut ValidationReport,
    ) {
        for (name, gui) in &config.bridge_gui {
            for referenced in &gui.connections {
                if !index.has_name(referenced) {
                    report.push(Violation::error(ViolationKind::UnknownDomainReference {
                        domain: name.clone(),
                        field: "bridgeGui.connections".to_string(),
                        referenced: referenced.clone(),
                    }));
                }
            }
        }
    }

    fn validate_token_locators(
        &self,
        config: &NomadConfig,
        index: &DocumentIndex<'_>,
        report: &mut ValidationReport,
    ) {
        for (name, bridge) in &config.bridge {
            for custom in bridge.customs() {
                if !index.has_id(custom.token.domain) {
                    report.push(Violation::error(ViolationKind::DanglingTokenLocator {
                        domain: name.clone(),
                        token: custom.token,
                        field: "bridge.customs".to_string(),
                    }));
                }
            }
        }

        for (name, domain) in &config.protocol.networks {
            let customs = domain.bridge_configuration.customs.iter().flatten();
            for custom in customs {
                if !index.has_id(custom.token.domain) {
                    report.push(Violation::error(ViolationKind::DanglingTokenLocator {
                        domain: name.clone(),
                        token: custom.token,
                        field: "bridgeConfiguration.customs".to_string(),
                    }));
                }
            }
        }
    }
}

/// Participant names and ids, built once per validation run
struct DocumentIndex<'a> {
    names: BTreeSet<&'a str>,
    ids: BTreeSet<u32>,
}

impl<'a> DocumentIndex<'a> {
    fn new(config: &'a NomadConfig) -> Self {
        Self {
            names: config.protocol.networks.keys().map(String::as_str).collect(),
            ids: config.protocol.networks.values().map(|d| d.domain).collect(),
        }
    }

    fn has_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn has_id(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }
}

fn keys<V>(map: &BTreeMap<String, V>) -> BTreeSet<&str> {
    map.keys().map(String::as_str).collect()
}

fn difference(left: &BTreeSet<&str>, right: &BTreeSet<&str>) -> Vec<String> {
    left.difference(right).map(|s| s.to_string()).collect()
}
