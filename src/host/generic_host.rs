//! Ready-made host for engines that model hosts as plain records
use super::{HostCategory, HostId, HostRef};
use crate::extension::ExtensionMap;
use crate::holder::ExtensionHolder;
use crate::tag::TagCompound;

/// A host that carries nothing but its identity, its own record data and
/// its extensions
#[derive(Debug)]
pub struct GenericHost {
    host: HostRef,
    /// Engine-owned fields persisted next to the extension sub-tree
    pub data: TagCompound,
    extensions: ExtensionMap,
}

impl GenericHost {
    pub fn new(id: HostId, category: HostCategory) -> Self {
        Self {
            host: HostRef::new(id, category),
            data: TagCompound::new(),
            extensions: ExtensionMap::new(),
        }
    }

    pub fn id(&self) -> HostId {
        self.host.id
    }

    pub fn category(&self) -> &HostCategory {
        &self.host.category
    }
}

impl ExtensionHolder for GenericHost {
    fn host_ref(&self) -> HostRef {
        self.host.clone()
    }

    fn extensions(&self) -> &ExtensionMap {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut ExtensionMap {
        &mut self.extensions
    }
}
