//! Primitive types shared across the Nomad configuration stack
//!
//! These are the leaves of the configuration data model:
//! - [`NomadIdentifier`]: 32-byte network-agnostic account/contract id
//! - [`NomadLocator`]: a (domain, identifier) pair
//! - [`Proxy`]: upgradeable contract triple
//! - [`NameOrDomain`]: a domain referenced by name or numeric id
//!
//! Numbers in configuration documents are written by several generations of
//! tooling, so the `deser_nomad_*` helpers accept integers, decimal strings
//! and `0x`-prefixed hex strings alike.

pub mod error;
pub mod identifier;
pub mod locator;
mod number;

pub use error::{Result, TypesError};
pub use identifier::NomadIdentifier;
pub use locator::{NameOrDomain, NomadLocator, Proxy};
pub use number::{
    deser_nomad_opt_u64, deser_nomad_u32, deser_nomad_u64, deser_nomad_u8,
};
