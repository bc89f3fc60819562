//! Extension Holder capability
//!
//! Any host type that owns exactly one ExtensionMap implements
//! [`ExtensionHolder`]. Serialization and transfer policy is not duplicated on
//! each host; it lives in the free functions of holder_operations.rs and
//! transfer_operations.rs.

pub mod holder_operations;

pub use holder_operations::{all, deserialize_all, serialize_all, LoadReport};

use crate::extension::ExtensionMap;
use crate::host::HostRef;
use crate::transfer::TransferReport;

/// Capability of a host that owns an ExtensionMap
pub trait ExtensionHolder {
    /// Identity of this host instance
    fn host_ref(&self) -> HostRef;

    fn extensions(&self) -> &ExtensionMap;

    fn extensions_mut(&mut self) -> &mut ExtensionMap;

    /// Called after persisted extension data was routed into the map
    fn on_extensions_loaded(&mut self, _report: &LoadReport) {}

    /// Called on the successor host once transfer from `_from` completed
    fn on_extensions_transferred(&mut self, _from: &HostRef, _report: &TransferReport) {}
}
