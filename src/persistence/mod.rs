//! Persistence Module
//!
//! Reference storage for host records. Engines with their own save format
//! only need the lifecycle hooks; this module is for engines that want a
//! ready-made file per host.

// Data modules
pub mod record_data;

// Operations modules
pub mod record_operations;

pub use record_data::{HostRecord, RecordHeader, RECORD_FORMAT_VERSION, RECORD_MAGIC};
pub use record_operations::{
    decode_record, encode_record, export_json, load_host, read_record, save_host, write_record,
};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistenceError {
    #[error("Save failed: {0}")]
    SaveFailed(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Compression error: {0}")]
    CompressionError(String),
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Checksum mismatch: expected {expected:#010x}, found {found:#010x}")]
    ChecksumMismatch { expected: u32, found: u32 },
    #[error("Corrupted data: {0}")]
    CorruptedData(String),
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(error: std::io::Error) -> Self {
        PersistenceError::IoError(error.to_string())
    }
}
