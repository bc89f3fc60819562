//! Transfer Data - the outcome of one host replacement
//!
//! The protocol itself lives in transfer_operations.rs

use crate::error::ExtensionError;
use crate::host::HostRef;

/// Outcome of moving extensions from a replaced host to its successor
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    pub from: HostRef,
    pub to: HostRef,
    /// Extensions now living on the successor, in the old host's order
    pub transferred: Vec<String>,
    /// Successor defaults that a transferred extension replaced
    pub overwritten: Vec<String>,
    /// Extensions with no transfer capability, dropped with the old host
    pub discarded: Vec<String>,
    /// Extensions whose transfer failed; each stays untouched on the old host
    pub failed: Vec<(String, ExtensionError)>,
    /// Retained data carried over from the old host, loaded into a matching
    /// successor extension or kept retained for the successor's next save
    pub retained: Vec<String>,
}

impl TransferReport {
    pub fn new(from: HostRef, to: HostRef) -> Self {
        Self {
            from,
            to,
            transferred: Vec::new(),
            overwritten: Vec::new(),
            discarded: Vec::new(),
            failed: Vec::new(),
            retained: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
