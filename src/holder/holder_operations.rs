//! Holder Operations - serialization dispatch over any ExtensionHolder
//!
//! One broken extension must never corrupt the rest of a host's state, so
//! every per-extension call here is isolated: failures are rolled back,
//! logged and collected into a report while the loop carries on.

use super::ExtensionHolder;
use crate::error::ExtensionError;
use crate::extension::extension_map::load_with_rollback;
use crate::extension::Extension;
use crate::tag::TagCompound;

/// Outcome of routing persisted data into a host's extensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Extensions that accepted their data
    pub loaded: Vec<String>,
    /// Keys with no attached extension, kept for the next save
    pub retained: Vec<String>,
    /// Extensions whose data was rejected; each was left at its prior state
    pub failed: Vec<(String, ExtensionError)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Build the extension sub-tree for a host's save record
///
/// Every attached extension is written, even one that emits an empty
/// compound. Retained data is written back unless an attached extension now
/// owns that name.
pub fn serialize_all<H: ExtensionHolder + ?Sized>(holder: &H) -> TagCompound {
    let map = holder.extensions();
    let mut data = TagCompound::new();

    for (name, tag) in map.retained().iter() {
        if !map.contains(name) {
            data.insert(name, tag.clone());
        }
    }

    for extension in map.all() {
        data.insert(extension.name(), extension.serialize());
    }

    log::debug!(
        "[Holder] Serialized {} extensions ({} retained) for {}",
        map.len(),
        map.retained().len(),
        holder.host_ref()
    );
    data
}

/// Route each entry of `data` into the extension of the same name
pub fn deserialize_all<H: ExtensionHolder + ?Sized>(holder: &mut H, data: &TagCompound) -> LoadReport {
    let host = holder.host_ref();
    let map = holder.extensions_mut();
    let mut report = LoadReport::default();

    for (name, tag) in data.iter() {
        match map.get_mut(name) {
            Some(extension) => match load_with_rollback(extension, tag) {
                Ok(()) => {
                    report.loaded.push(name.to_string());
                    map.drop_retained(name);
                }
                Err(err) => {
                    log::error!(
                        "[Holder] Failed to load extension '{}' on {}: {}",
                        name,
                        host,
                        err
                    );
                    report.failed.push((name.to_string(), err));
                }
            },
            None => {
                log::debug!(
                    "[Holder] No extension '{}' attached to {}; retaining its data",
                    name,
                    host
                );
                map.retain_orphan(name, tag.clone());
                report.retained.push(name.to_string());
            }
        }
    }

    log::debug!(
        "[Holder] Loaded {} extensions on {} ({} retained, {} failed)",
        report.loaded.len(),
        host,
        report.retained.len(),
        report.failed.len()
    );
    report
}

/// Every extension attached to `holder`, in insertion order
pub fn all<H: ExtensionHolder + ?Sized>(holder: &H) -> Vec<&dyn Extension> {
    holder.extensions().all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{GenericHost, HostCategory, HostId};
    use crate::tag::Tag;
    use crate::tests::fixtures::{init_test_logging, Counter, Fragile, Marker};

    fn host_with(extensions: Vec<Box<dyn Extension>>) -> GenericHost {
        let mut host = GenericHost::new(HostId(1), HostCategory::Player);
        for extension in extensions {
            host.extensions_mut().add(extension);
        }
        host
    }

    #[test]
    fn test_serialize_writes_every_extension() {
        let host = host_with(vec![
            Box::new(Counter::new("score", 10)),
            Box::new(Marker::new("tag")),
        ]);

        let data = serialize_all(&host);
        assert_eq!(
            data.get_compound("score").and_then(|c| c.get_int("value")),
            Ok(10)
        );
        // Empty output is still written
        assert_eq!(data.get("tag"), Some(&Tag::empty()));
    }

    #[test]
    fn test_round_trip_through_holder() {
        let source = host_with(vec![Box::new(Counter::new("score", 37))]);
        let data = serialize_all(&source);

        let mut target = host_with(vec![Box::new(Counter::new("score", 0))]);
        let report = deserialize_all(&mut target, &data);

        assert!(report.is_clean());
        assert_eq!(report.loaded, vec!["score".to_string()]);
        assert_eq!(
            target.extensions().get_as::<Counter>("score").map(|c| c.value),
            Some(37)
        );
        assert_eq!(serialize_all(&target), data);
    }

    #[test]
    fn test_failure_is_isolated() {
        init_test_logging();
        let mut host = host_with(vec![
            Box::new(Fragile::new("broken", 5)),
            Box::new(Counter::new("score", 0)),
        ]);

        let data = TagCompound::new()
            .with("broken", TagCompound::new().with("value", 99))
            .with("score", TagCompound::new().with("value", 12));
        let report = deserialize_all(&mut host, &data);

        assert_eq!(report.loaded, vec!["score".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken");
        assert_eq!(
            host.extensions().get_as::<Counter>("score").map(|c| c.value),
            Some(12)
        );
        // Partially applied state was rolled back
        assert_eq!(
            host.extensions().get_as::<Fragile>("broken").map(|f| f.value),
            Some(5)
        );
    }

    #[test]
    fn test_malformed_data_leaves_extension_untouched() {
        let mut host = host_with(vec![Box::new(Counter::new("score", 3))]);
        let data = TagCompound::new().with("score", "not a compound");

        let report = deserialize_all(&mut host, &data);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].1,
            ExtensionError::MalformedTag { .. }
        ));
        assert_eq!(
            host.extensions().get_as::<Counter>("score").map(|c| c.value),
            Some(3)
        );
    }

    #[test]
    fn test_unknown_keys_are_retained_for_next_save() {
        let mut host = host_with(vec![Box::new(Counter::new("score", 0))]);
        let legacy = TagCompound::new().with("version", 1);
        let data = TagCompound::new()
            .with("legacy", legacy.clone())
            .with("score", TagCompound::new().with("value", 4));

        let report = deserialize_all(&mut host, &data);
        assert!(report.is_clean());
        assert_eq!(report.retained, vec!["legacy".to_string()]);

        let saved = serialize_all(&host);
        assert_eq!(saved.get("legacy"), Some(&Tag::Compound(legacy)));
        assert_eq!(
            saved.get_compound("score").and_then(|c| c.get_int("value")),
            Ok(4)
        );
    }

    #[test]
    fn test_late_attached_extension_keeps_retained_data() {
        let mut host = host_with(vec![]);
        let data = TagCompound::new().with("score", TagCompound::new().with("value", 37));
        deserialize_all(&mut host, &data);

        host.extensions_mut().add(Box::new(Counter::new("score", 0)));
        let saved = serialize_all(&host);
        assert_eq!(
            saved.get_compound("score").and_then(|c| c.get_int("value")),
            Ok(37)
        );
        assert!(host.extensions().retained().is_empty());
    }

    #[test]
    fn test_live_state_wins_when_retained_data_is_rejected() {
        let mut host = host_with(vec![]);
        let data = TagCompound::new().with("broken", TagCompound::new().with("value", 99));
        deserialize_all(&mut host, &data);

        host.extensions_mut().add(Box::new(Fragile::new("broken", 5)));
        let saved = serialize_all(&host);
        assert_eq!(
            saved.get_compound("broken").and_then(|c| c.get_int("value")),
            Ok(5)
        );
    }

    #[test]
    fn test_all_delegates_to_map() {
        let host = host_with(vec![
            Box::new(Marker::new("first")),
            Box::new(Marker::new("second")),
        ]);
        let names: Vec<&str> = all(&host).iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
