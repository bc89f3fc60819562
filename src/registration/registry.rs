//! Extension provider registry
//!
//! Subsystems subscribe once at startup; every new host of the registry's
//! type is then offered to each subscriber, in subscription order, exactly
//! once.

use crate::error::{ExtensionError, ExtensionResult};
use crate::holder::ExtensionHolder;
use crate::host::HostCategory;
use parking_lot::RwLock;
use std::sync::Arc;

/// Callback that attaches extensions to a freshly constructed host
pub type ExtensionProvider<H> = Box<dyn Fn(&mut H) -> ExtensionResult<()> + Send + Sync>;

/// One subscriber and the hosts it wants to see
struct Subscription<H: ?Sized> {
    label: String,
    /// `None` means every host of type `H`
    category: Option<HostCategory>,
    provider: ExtensionProvider<H>,
}

/// Outcome of one registration broadcast
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationReport {
    /// Subscribers that ran, in order
    pub invoked: Vec<String>,
    /// Subscribers skipped because of a category filter
    pub skipped: Vec<String>,
    /// Subscribers that returned an error
    pub failed: Vec<(String, ExtensionError)>,
    /// Extension names attached once the broadcast finished
    pub attached: Vec<String>,
}

/// Typed publish/subscribe registry for one host type
pub struct ExtensionRegistry<H: ExtensionHolder + ?Sized> {
    subscriptions: Vec<Subscription<H>>,
}

/// Registry shared with subsystems that subscribe from other threads
pub type SharedExtensionRegistry<H> = Arc<RwLock<ExtensionRegistry<H>>>;

impl<H: ExtensionHolder + ?Sized> ExtensionRegistry<H> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Offer every host of type `H` to `provider`
    pub fn subscribe<F>(&mut self, label: &str, provider: F)
    where
        F: Fn(&mut H) -> ExtensionResult<()> + Send + Sync + 'static,
    {
        self.push(label, None, Box::new(provider));
    }

    /// Offer only hosts whose category equals `category` to `provider`
    pub fn subscribe_for<F>(&mut self, category: HostCategory, label: &str, provider: F)
    where
        F: Fn(&mut H) -> ExtensionResult<()> + Send + Sync + 'static,
    {
        self.push(label, Some(category), Box::new(provider));
    }

    fn push(&mut self, label: &str, category: Option<HostCategory>, provider: ExtensionProvider<H>) {
        log::info!(
            "[ExtensionRegistry] Subscribed '{}' (category: {})",
            label,
            category
                .as_ref()
                .map(HostCategory::as_str)
                .unwrap_or("any")
        );
        self.subscriptions.push(Subscription {
            label: label.to_string(),
            category,
            provider,
        });
    }

    /// Labels in subscription order
    pub fn labels(&self) -> Vec<&str> {
        self.subscriptions
            .iter()
            .map(|subscription| subscription.label.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Broadcast the registration event for `host`
    ///
    /// Fails only when the event already fired for this host instance. A
    /// subscriber error is logged and reported; the remaining subscribers
    /// still run.
    pub fn fire(&self, host: &mut H) -> ExtensionResult<RegistrationReport> {
        let host_ref = host.host_ref();
        if host.extensions().registration_fired() {
            log::warn!(
                "[ExtensionRegistry] Registration already fired for {}",
                host_ref
            );
            return Err(ExtensionError::RegistrationAlreadyFired { host: host_ref });
        }
        host.extensions_mut().mark_registration_fired();

        let mut report = RegistrationReport::default();
        for subscription in &self.subscriptions {
            let wanted = subscription
                .category
                .as_ref()
                .map_or(true, |category| *category == host_ref.category);
            if !wanted {
                report.skipped.push(subscription.label.clone());
                continue;
            }

            match (subscription.provider)(&mut *host) {
                Ok(()) => report.invoked.push(subscription.label.clone()),
                Err(err) => {
                    log::error!(
                        "[ExtensionRegistry] Subscriber '{}' failed on {}: {}",
                        subscription.label,
                        host_ref,
                        err
                    );
                    report.failed.push((subscription.label.clone(), err));
                }
            }
        }

        report.attached = host.extensions().names();
        log::debug!(
            "[ExtensionRegistry] Registration for {} attached {:?}",
            host_ref,
            report.attached
        );
        Ok(report)
    }
}

impl<H: ExtensionHolder + ?Sized> Default for ExtensionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an empty registry wrapped for sharing
pub fn create_shared_registry<H: ExtensionHolder + ?Sized>() -> SharedExtensionRegistry<H> {
    Arc::new(RwLock::new(ExtensionRegistry::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{GenericHost, HostId};
    use crate::tests::fixtures::{Counter, Marker};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn player(id: u64) -> GenericHost {
        GenericHost::new(HostId(id), HostCategory::Player)
    }

    #[test]
    fn test_subscribers_run_in_subscription_order() {
        let mut registry = ExtensionRegistry::<GenericHost>::new();
        registry.subscribe("second", |host| {
            host.extensions_mut().add(Box::new(Marker::new("b")));
            Ok(())
        });
        registry.subscribe("first", |host| {
            host.extensions_mut().add(Box::new(Marker::new("a")));
            Ok(())
        });

        let mut host = player(1);
        let report = registry.fire(&mut host).expect("first fire should succeed");

        assert_eq!(report.invoked, vec!["second".to_string(), "first".to_string()]);
        assert_eq!(host.extensions().names(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(report.attached, host.extensions().names());
    }

    #[test]
    fn test_fires_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let mut registry = ExtensionRegistry::<GenericHost>::new();
        registry.subscribe("counter", move |_host| {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let mut host = player(2);
        registry.fire(&mut host).expect("first fire should succeed");
        let second = registry.fire(&mut host);

        assert!(matches!(
            second,
            Err(ExtensionError::RegistrationAlreadyFired { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_category_filter() {
        let mut registry = ExtensionRegistry::<GenericHost>::new();
        registry.subscribe_for(HostCategory::World, "border", |host| {
            host.extensions_mut().add(Box::new(Marker::new("border")));
            Ok(())
        });
        registry.subscribe("score", |host| {
            host.extensions_mut().add(Box::new(Counter::new("score", 0)));
            Ok(())
        });

        let mut world = GenericHost::new(HostId(3), HostCategory::World);
        let mut player = player(4);
        registry.fire(&mut world).expect("fire should succeed");
        let report = registry.fire(&mut player).expect("fire should succeed");

        assert!(world.extensions().contains("border"));
        assert!(!player.extensions().contains("border"));
        assert!(player.extensions().contains("score"));
        assert_eq!(report.skipped, vec!["border".to_string()]);
    }

    #[test]
    fn test_subscriber_error_does_not_stop_broadcast() {
        let mut registry = ExtensionRegistry::<GenericHost>::new();
        registry.subscribe("first", |host| {
            host.extensions_mut().try_add(Box::new(Marker::new("x")))
        });
        registry.subscribe("duplicate", |host| {
            host.extensions_mut().try_add(Box::new(Marker::new("x")))
        });
        registry.subscribe("last", |host| {
            host.extensions_mut().add(Box::new(Marker::new("y")));
            Ok(())
        });

        let mut host = player(5);
        let report = registry.fire(&mut host).expect("fire should succeed");

        assert_eq!(report.invoked, vec!["first".to_string(), "last".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "duplicate");
        assert_eq!(host.extensions().names(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_shared_registry() {
        let shared = create_shared_registry::<GenericHost>();
        {
            let registry = Arc::clone(&shared);
            std::thread::spawn(move || {
                registry.write().subscribe("remote", |host| {
                    host.extensions_mut().add(Box::new(Marker::new("remote")));
                    Ok(())
                });
            })
            .join()
            .expect("subscriber thread should not panic");
        }

        let mut host = player(6);
        shared.read().fire(&mut host).expect("fire should succeed");
        assert!(host.extensions().contains("remote"));
    }
}
