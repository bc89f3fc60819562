//! Registration event
//!
//! A one-shot broadcast per host instance, fired right after construction and
//! before any load or transfer hook, giving independent subsystems the chance
//! to attach their extensions.

pub mod registry;

pub use registry::{
    create_shared_registry, ExtensionProvider, ExtensionRegistry, RegistrationReport,
    SharedExtensionRegistry,
};
