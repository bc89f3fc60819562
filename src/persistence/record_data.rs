//! Host Record Data
//!
//! Record and header types with the file constants.
//! Encoding and file handling happen in record_operations.rs

use crate::host::HostRef;
use crate::tag::TagCompound;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File magic of a host record
pub const RECORD_MAGIC: &[u8; 4] = b"HEXT";

/// Current on-disk format version
pub const RECORD_FORMAT_VERSION: u32 = 1;

/// magic + version + flags + crc32 + payload length
pub const RECORD_HEADER_LEN: usize = 4 + 4 + 1 + 4 + 4;

/// Header flag: payload is gzip-compressed
pub const FLAG_COMPRESSED: u8 = 0b0000_0001;

/// One host's persisted state: engine fields plus the extension sub-tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Instance that wrote the record; a loading instance may differ
    pub host: HostRef,
    /// Save time, milliseconds since the Unix epoch
    pub saved_at_ms: i64,
    pub data: TagCompound,
}

impl HostRecord {
    pub fn new(host: HostRef, data: TagCompound) -> Self {
        Self {
            host,
            saved_at_ms: Utc::now().timestamp_millis(),
            data,
        }
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.saved_at_ms)
    }
}

/// Decoded fixed-size record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub version: u32,
    pub flags: u8,
    pub checksum: u32,
    pub payload_len: u32,
}

impl RecordHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }
}
