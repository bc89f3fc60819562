//! Transfer protocol
//!
//! Handles host replacement: one live instance superseded by a new instance
//! representing the same logical object.

pub mod transfer_data;
pub mod transfer_operations;

pub use transfer_data::TransferReport;
pub use transfer_operations::transfer_extensions;
