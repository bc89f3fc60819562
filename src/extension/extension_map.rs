//! Per-host extension registry
//!
//! Extensions are kept in insertion order with a name index on the side, so
//! iteration (and therefore save output) is reproducible across runs.

use super::Extension;
use crate::error::{ExtensionError, ExtensionResult};
use crate::tag::{Tag, TagCompound};
use rustc_hash::FxHashMap;

/// Ordered collection of extensions owned by one host
#[derive(Default)]
pub struct ExtensionMap {
    /// Attached extensions in insertion order
    entries: Vec<Box<dyn Extension>>,
    /// Map from name to position in `entries`
    index: FxHashMap<String, usize>,
    /// Persisted data that matched no attached extension at load time
    retained: TagCompound,
    /// Set once the registration event has fired for the owning host
    registration_fired: bool,
}

impl ExtensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an extension, replacing any extension with the same name
    ///
    /// A replaced extension keeps its iteration position and is handed back
    /// to the caller. Replacement is always logged. Retained data saved under
    /// the same name is loaded into the new extension.
    pub fn add(&mut self, extension: Box<dyn Extension>) -> Option<Box<dyn Extension>> {
        let name = extension.name().to_string();
        let previous = self.insert_or_replace(extension);
        if previous.is_some() {
            log::warn!(
                "[ExtensionMap] Extension '{}' was already attached; replacing it",
                name
            );
        } else {
            log::debug!("[ExtensionMap] Attached extension '{}'", name);
        }
        self.adopt_retained(&name);
        previous
    }

    /// Attach an extension, rejecting it if the name is taken
    pub fn try_add(&mut self, extension: Box<dyn Extension>) -> ExtensionResult<()> {
        let name = extension.name();
        if self.index.contains_key(name) {
            log::warn!(
                "[ExtensionMap] Rejected duplicate extension '{}'",
                name
            );
            return Err(ExtensionError::DuplicateExtension {
                name: name.to_string(),
            });
        }
        let name = name.to_string();
        log::debug!("[ExtensionMap] Attached extension '{}'", name);
        self.insert_or_replace(extension);
        self.adopt_retained(&name);
        Ok(())
    }

    /// Route retained data for `name` into the extension now attached under it
    ///
    /// Data the extension rejects stays retained and the extension is rolled
    /// back; the next save then writes the extension's live state instead.
    fn adopt_retained(&mut self, name: &str) {
        if !self.contains(name) {
            return;
        }
        let Some(tag) = self.retained.remove(name) else {
            return;
        };
        let Some(extension) = self.get_mut(name) else {
            return;
        };

        match load_with_rollback(extension, &tag) {
            Ok(()) => log::info!(
                "[ExtensionMap] Extension '{}' picked up its retained data",
                name
            ),
            Err(err) => {
                log::warn!(
                    "[ExtensionMap] Extension '{}' rejected its retained data: {}; \
                     it will be overwritten at the next save",
                    name,
                    err
                );
                self.retained.insert(name, tag);
            }
        }
    }

    /// Insert without collision logging; transfer uses this since overriding
    /// a default is the expected outcome there.
    pub(crate) fn insert_or_replace(
        &mut self,
        extension: Box<dyn Extension>,
    ) -> Option<Box<dyn Extension>> {
        match self.index.get(extension.name()) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position], extension)),
            None => {
                self.index
                    .insert(extension.name().to_string(), self.entries.len());
                self.entries.push(extension);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Extension> {
        let position = *self.index.get(name)?;
        Some(&*self.entries[position])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn Extension> {
        let position = *self.index.get(name)?;
        Some(&mut *self.entries[position])
    }

    /// Look up an extension and downcast it to its concrete type
    pub fn get_as<T: Extension>(&self, name: &str) -> Option<&T> {
        self.get(name)?.downcast_ref::<T>()
    }

    pub fn get_as_mut<T: Extension>(&mut self, name: &str) -> Option<&mut T> {
        self.get_mut(name)?.downcast_mut::<T>()
    }

    /// Detach an extension and hand it to the caller
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Extension>> {
        let position = self.index.remove(name)?;
        let removed = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        log::debug!("[ExtensionMap] Detached extension '{}'", name);
        Some(removed)
    }

    /// Snapshot of every attached extension in insertion order
    pub fn all(&self) -> Vec<&dyn Extension> {
        self.entries.iter().map(|entry| &**entry).collect()
    }

    pub(crate) fn all_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Extension>> {
        self.entries.iter_mut()
    }

    /// Names of attached extensions in insertion order
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persisted data kept for extensions that are not attached
    pub fn retained(&self) -> &TagCompound {
        &self.retained
    }

    /// Drop all retained data; the next save will no longer carry it
    pub fn clear_retained(&mut self) -> TagCompound {
        std::mem::take(&mut self.retained)
    }

    pub(crate) fn retain_orphan(&mut self, name: &str, tag: Tag) {
        self.retained.insert(name, tag);
    }

    pub(crate) fn drop_retained(&mut self, name: &str) {
        self.retained.remove(name);
    }

    pub fn registration_fired(&self) -> bool {
        self.registration_fired
    }

    pub(crate) fn mark_registration_fired(&mut self) {
        self.registration_fired = true;
    }
}

/// Deserialize one extension, restoring its previous state on failure
pub(crate) fn load_with_rollback(extension: &mut dyn Extension, tag: &Tag) -> ExtensionResult<()> {
    let snapshot = extension.serialize();
    if let Err(err) = extension.deserialize(tag) {
        if let Err(rollback) = extension.deserialize(&snapshot) {
            log::error!(
                "[ExtensionMap] Could not restore extension '{}' after failed load: {}",
                extension.name(),
                rollback
            );
        }
        return Err(err);
    }
    Ok(())
}

impl std::fmt::Debug for ExtensionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionMap")
            .field("extensions", &self.names())
            .field("retained", &self.retained.keys().collect::<Vec<_>>())
            .field("registration_fired", &self.registration_fired)
            .finish()
    }
}
