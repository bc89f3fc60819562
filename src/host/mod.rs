//! Host identity
//!
//! Hosts are long-lived simulated objects (players, worlds, teams, generic
//! entities). This module only names them; what they do is the engine's
//! business.

pub mod generic_host;
pub mod host_data;

pub use generic_host::GenericHost;
pub use host_data::{HostCategory, HostId, HostIdGenerator, HostRef};
