// Hearth Extensions - attachable, persistent, transferable host state
//
// Data-oriented layout, same as the rest of the engine:
// - *_data.rs files hold plain data
// - *_operations.rs files hold the free functions that transform it
// - Hosts implement ExtensionHolder; policy lives in the operations, not on hosts
//
// Typical flow for an engine:
// - subscribe providers on an ExtensionRegistry at startup
// - lifecycle::on_host_constructed for every new host
// - lifecycle::on_host_load / on_host_save around the engine's own record I/O
// - lifecycle::on_host_replaced when a host instance is succeeded by another

pub mod config;
pub mod error;
pub mod extension;
pub mod holder;
pub mod host;
pub mod lifecycle;
pub mod persistence;
pub mod registration;
pub mod tag;
pub mod transfer;


pub use config::{ExtensionConfig, DEFAULT_DATA_KEY};
pub use error::{ExtensionError, ExtensionResult, OptionExt};
pub use extension::{AsAny, Extension, ExtensionMap, TransferableExtension};
pub use holder::{ExtensionHolder, LoadReport};
pub use host::{GenericHost, HostCategory, HostId, HostIdGenerator, HostRef};
pub use lifecycle::{
    on_host_constructed, on_host_load, on_host_replaced, on_host_save, write_extension_data,
};
pub use persistence::{HostRecord, PersistenceError, PersistenceResult};
pub use registration::{
    create_shared_registry, ExtensionRegistry, RegistrationReport, SharedExtensionRegistry,
};
pub use tag::{Tag, TagCompound};
pub use transfer::{transfer_extensions, TransferReport};

/// Initialize env_logger for binaries embedding the subsystem
///
/// Honors `RUST_LOG`; defaults to `info`. Calling it twice is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
