//! Host Record Operations - encoding and atomic file I/O
//!
//! Tags are always built completely in memory before any file is touched;
//! a failed write never leaves a half-written record behind.

use super::record_data::{
    HostRecord, RecordHeader, FLAG_COMPRESSED, RECORD_FORMAT_VERSION, RECORD_HEADER_LEN,
    RECORD_MAGIC,
};
use super::{PersistenceError, PersistenceResult};
use crate::config::ExtensionConfig;
use crate::error::ExtensionResult;
use crate::holder::{ExtensionHolder, LoadReport};
use crate::lifecycle::{on_host_load, write_extension_data};
use crate::tag::tag_codec::ensure_json_safe;
use crate::tag::TagCompound;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Encode a record into its on-disk byte form
pub fn encode_record(record: &HostRecord, compress: bool) -> PersistenceResult<Vec<u8>> {
    let raw = bincode::serialize(record)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

    let (payload, flags) = if compress {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&raw)
            .map_err(|e| PersistenceError::CompressionError(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| PersistenceError::CompressionError(e.to_string()))?;
        (compressed, FLAG_COMPRESSED)
    } else {
        (raw, 0)
    };

    let payload_len = u32::try_from(payload.len()).map_err(|_| {
        PersistenceError::CapacityExceeded(format!("record payload of {} bytes", payload.len()))
    })?;

    let mut bytes = Vec::with_capacity(RECORD_HEADER_LEN + payload.len());
    bytes.extend_from_slice(RECORD_MAGIC);
    bytes.extend_from_slice(&RECORD_FORMAT_VERSION.to_le_bytes());
    bytes.push(flags);
    bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    bytes.extend_from_slice(&payload_len.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parse and validate the fixed-size header
pub fn decode_header(bytes: &[u8]) -> PersistenceResult<RecordHeader> {
    if bytes.len() < RECORD_HEADER_LEN {
        return Err(PersistenceError::CorruptedData(format!(
            "record is {} bytes, shorter than its header",
            bytes.len()
        )));
    }
    if &bytes[0..4] != RECORD_MAGIC {
        return Err(PersistenceError::CorruptedData("bad record magic".to_string()));
    }

    let header = RecordHeader {
        version: read_u32(&bytes[4..8]),
        flags: bytes[8],
        checksum: read_u32(&bytes[9..13]),
        payload_len: read_u32(&bytes[13..17]),
    };

    if header.version != RECORD_FORMAT_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: RECORD_FORMAT_VERSION,
            found: header.version,
        });
    }
    Ok(header)
}

/// Decode a record produced by [`encode_record`]
pub fn decode_record(bytes: &[u8]) -> PersistenceResult<HostRecord> {
    let header = decode_header(bytes)?;
    let payload = &bytes[RECORD_HEADER_LEN..];

    if payload.len() != header.payload_len as usize {
        return Err(PersistenceError::CorruptedData(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            header.payload_len
        )));
    }

    let actual = crc32fast::hash(payload);
    if actual != header.checksum {
        return Err(PersistenceError::ChecksumMismatch {
            expected: header.checksum,
            found: actual,
        });
    }

    let raw = if header.is_compressed() {
        let mut decoder = GzDecoder::new(payload);
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|e| PersistenceError::CompressionError(e.to_string()))?;
        raw
    } else {
        payload.to_vec()
    };

    bincode::deserialize(&raw).map_err(|e| PersistenceError::DeserializationError(e.to_string()))
}

/// Write a record atomically: temp file first, then rename over the target
pub fn write_record(path: &Path, record: &HostRecord, compress: bool) -> PersistenceResult<()> {
    let bytes = encode_record(record, compress)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, &bytes).map_err(|e| {
        PersistenceError::SaveFailed(format!("{}: {}", temp_path.display(), e))
    })?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(PersistenceError::SaveFailed(format!("{}: {}", path.display(), e)));
    }

    log::debug!(
        "[Persistence] Wrote {} bytes for {} to {}",
        bytes.len(),
        record.host,
        path.display()
    );
    Ok(())
}

pub fn read_record(path: &Path) -> PersistenceResult<HostRecord> {
    let bytes = fs::read(path)?;
    decode_record(&bytes)
}

/// Save a host's record: engine fields plus the extension sub-tree
pub fn save_host<H: ExtensionHolder + ?Sized>(
    host: &H,
    engine_data: &TagCompound,
    path: &Path,
    config: &ExtensionConfig,
) -> PersistenceResult<HostRecord> {
    let mut data = engine_data.clone();
    write_extension_data(host, &mut data, config);
    let record = HostRecord::new(host.host_ref(), data);

    write_record(path, &record, config.compress_records)?;
    log::info!("[Persistence] Saved {} to {}", record.host, path.display());
    Ok(record)
}

/// Load a host's record and route its extension data into `host`
///
/// The record is returned so the engine can restore its own fields.
pub fn load_host<H: ExtensionHolder + ?Sized>(
    host: &mut H,
    path: &Path,
    config: &ExtensionConfig,
) -> ExtensionResult<(HostRecord, LoadReport)> {
    let record = read_record(path)?;
    let current = host.host_ref();
    if record.host.category != current.category {
        log::warn!(
            "[Persistence] Record written by {} is being loaded into {}",
            record.host,
            current
        );
    }

    let report = on_host_load(host, &record.data, config)?;
    Ok((record, report))
}

/// Pretty JSON view of a record for debugging
///
/// Fails on NaN or infinite floats, which JSON cannot carry.
pub fn export_json(record: &HostRecord) -> PersistenceResult<String> {
    ensure_json_safe(&record.data)?;
    serde_json::to_string_pretty(record)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
