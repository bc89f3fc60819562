//! Lifecycle hooks - the contract a host engine calls into
//!
//! Engines call these at four points in a host's life: right after
//! construction, when its record is loaded, when its record is saved, and
//! when it is replaced by a successor instance. Durable storage stays with
//! the engine; these hooks only build or consume tag trees in memory.

use crate::config::ExtensionConfig;
use crate::error::{ExtensionError, ExtensionResult};
use crate::holder::{deserialize_all, serialize_all, ExtensionHolder, LoadReport};
use crate::registration::{ExtensionRegistry, RegistrationReport};
use crate::tag::TagCompound;
use crate::transfer::{transfer_extensions, TransferReport};

/// Host construction hook: fires the registration event exactly once
pub fn on_host_constructed<H: ExtensionHolder + ?Sized>(
    registry: &ExtensionRegistry<H>,
    host: &mut H,
) -> ExtensionResult<RegistrationReport> {
    registry.fire(host)
}

/// Host load hook
///
/// Extracts the reserved sub-tree from the host's record and routes it into
/// the attached extensions. A record without the sub-tree loads nothing.
pub fn on_host_load<H: ExtensionHolder + ?Sized>(
    host: &mut H,
    record: &TagCompound,
    config: &ExtensionConfig,
) -> ExtensionResult<LoadReport> {
    let host_ref = host.host_ref();
    if !host.extensions().registration_fired() {
        return Err(ExtensionError::RegistrationNotFired { host: host_ref });
    }

    let report = match record.get(&config.data_key) {
        None => {
            log::debug!(
                "[Lifecycle] Record for {} has no '{}' data",
                host_ref,
                config.data_key
            );
            LoadReport::default()
        }
        Some(tag) => {
            let data = tag.as_compound(&config.data_key).map_err(|err| {
                log::error!(
                    "[Lifecycle] Extension data for {} is unreadable: {}",
                    host_ref,
                    err
                );
                err
            })?;
            deserialize_all(host, data)
        }
    };

    if config.log_retained {
        for name in &report.retained {
            log::warn!(
                "[Lifecycle] Retaining data for unattached extension '{}' on {}",
                name,
                host_ref
            );
        }
    }

    host.on_extensions_loaded(&report);
    Ok(report)
}

/// Host save hook: the tag to merge into the host's own record
pub fn on_host_save<H: ExtensionHolder + ?Sized>(host: &H, config: &ExtensionConfig) -> TagCompound {
    TagCompound::new().with(config.data_key.as_str(), serialize_all(host))
}

/// Merge the extension sub-tree into an existing host record
///
/// Replaces any previous extension data in `record`; every other key the
/// engine wrote is left alone.
pub fn write_extension_data<H: ExtensionHolder + ?Sized>(
    host: &H,
    record: &mut TagCompound,
    config: &ExtensionConfig,
) {
    record.merge(on_host_save(host, config));
}

/// Host replacement hook: runs the transfer protocol old -> new
pub fn on_host_replaced<O, N>(
    old: &mut O,
    new: &mut N,
    keep_original: bool,
) -> ExtensionResult<TransferReport>
where
    O: ExtensionHolder + ?Sized,
    N: ExtensionHolder + ?Sized,
{
    transfer_extensions(old, new, keep_original)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{GenericHost, HostCategory, HostId};
    use crate::tag::Tag;
    use crate::tests::fixtures::Counter;

    fn registry() -> ExtensionRegistry<GenericHost> {
        let mut registry = ExtensionRegistry::new();
        registry.subscribe("score", |host: &mut GenericHost| {
            host.extensions_mut().add(Box::new(Counter::new("score", 0)));
            Ok(())
        });
        registry
    }

    #[test]
    fn test_save_uses_reserved_key() {
        let config = ExtensionConfig::default();
        let mut host = GenericHost::new(HostId(1), HostCategory::Player);
        on_host_constructed(&registry(), &mut host).expect("registration should fire");

        let saved = on_host_save(&host, &config);
        assert_eq!(saved.keys().collect::<Vec<_>>(), vec!["extensions"]);
    }

    #[test]
    fn test_write_keeps_engine_fields() {
        let config = ExtensionConfig::default();
        let mut host = GenericHost::new(HostId(1), HostCategory::Player);
        on_host_constructed(&registry(), &mut host).expect("registration should fire");

        let mut record = TagCompound::new()
            .with("position", vec![Tag::Double(1.0), Tag::Double(64.0), Tag::Double(2.0)])
            .with("extensions", "stale");
        write_extension_data(&host, &mut record, &config);

        assert!(record.contains_key("position"));
        assert!(record.get_compound("extensions").is_ok());
    }

    #[test]
    fn test_load_before_registration_is_rejected() {
        let config = ExtensionConfig::default();
        let mut host = GenericHost::new(HostId(1), HostCategory::Player);
        let result = on_host_load(&mut host, &TagCompound::new(), &config);
        assert!(matches!(
            result,
            Err(ExtensionError::RegistrationNotFired { .. })
        ));
    }

    #[test]
    fn test_load_without_extension_data() {
        let config = ExtensionConfig::default();
        let mut host = GenericHost::new(HostId(1), HostCategory::Player);
        on_host_constructed(&registry(), &mut host).expect("registration should fire");

        let report = on_host_load(&mut host, &TagCompound::new().with("health", 20), &config)
            .expect("load should succeed");
        assert_eq!(report, LoadReport::default());
    }

    #[test]
    fn test_unreadable_subtree_leaves_host_usable() {
        let config = ExtensionConfig::default();
        let mut host = GenericHost::new(HostId(1), HostCategory::Player);
        on_host_constructed(&registry(), &mut host).expect("registration should fire");

        let record = TagCompound::new().with("extensions", 5);
        assert!(on_host_load(&mut host, &record, &config).is_err());
        assert_eq!(
            host.extensions().get_as::<Counter>("score").map(|c| c.value),
            Some(0)
        );
    }

    #[test]
    fn test_custom_data_key_round_trip() {
        let config = ExtensionConfig {
            data_key: "attachments".to_string(),
            ..Default::default()
        };
        let registry = registry();

        let mut first = GenericHost::new(HostId(1), HostCategory::Player);
        on_host_constructed(&registry, &mut first).expect("registration should fire");
        if let Some(score) = first.extensions_mut().get_as_mut::<Counter>("score") {
            score.value = 25;
        }
        let record = on_host_save(&first, &config);
        assert!(record.contains_key("attachments"));

        let mut second = GenericHost::new(HostId(2), HostCategory::Player);
        on_host_constructed(&registry, &mut second).expect("registration should fire");
        on_host_load(&mut second, &record, &config).expect("load should succeed");
        assert_eq!(
            second.extensions().get_as::<Counter>("score").map(|c| c.value),
            Some(25)
        );
    }
}
