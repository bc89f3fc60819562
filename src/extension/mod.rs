//! Extension contracts
//!
//! An extension is a named unit of auxiliary state attached to exactly one
//! host. The framework never looks inside it; it only asks it to serialize,
//! deserialize and, when the extension opts in, transfer itself to a
//! successor host.

pub mod extension_map;

pub use extension_map::ExtensionMap;

use crate::error::ExtensionResult;
use crate::host::HostRef;
use crate::tag::Tag;
use std::any::Any;

/// Upcast helper so consumer code can get its concrete extension type back
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of auxiliary state and behavior attached to a host
///
/// `deserialize(serialize(x))` must restore state equivalent to `x`.
pub trait Extension: AsAny {
    /// Unique name within the owning map, also the persistence key
    fn name(&self) -> &str;

    /// Snapshot of the current state. An empty compound is a valid answer.
    fn serialize(&self) -> Tag;

    /// Overwrite current state from a previously serialized tag
    fn deserialize(&mut self, tag: &Tag) -> ExtensionResult<()>;

    /// Transfer capability, if this extension has one
    fn as_transferable(&mut self) -> Option<&mut dyn TransferableExtension> {
        None
    }
}

/// An extension that can move its state to a successor host instance
pub trait TransferableExtension: Extension {
    /// Produce a copy bound to `new_host` carrying this extension's logical
    /// state. With `keep_original == false` the source must be left cleared.
    ///
    /// The returned extension must report the same `name()`.
    fn transfer(
        &mut self,
        new_host: &HostRef,
        keep_original: bool,
    ) -> ExtensionResult<Box<dyn Extension>>;
}

impl<'a> dyn Extension + 'a {
    pub fn is_transferable(&mut self) -> bool {
        self.as_transferable().is_some()
    }

    pub fn downcast_ref<T: Extension>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Extension>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
