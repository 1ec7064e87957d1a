//! Incremental builds keep the solver's transfer data next to the source map.
//!
//! The cache file layout, all little endian:
//!
//! | Field Size | Data Type    | Content                                  |
//! |------------|--------------|------------------------------------------|
//! | 0x00-0x03  | 4 ASCII char | `RINC`                                   |
//! | 0x04-0x0B  | u64          | Patch count the transfers were built for |
//! | 0x0C-0x0F  | u32          | CRC32 of the source file                 |
//! | 0x10-0x17  | u64          | Payload length in bytes                  |
//! | 0x18-      | bytes        | Opaque transfer payload                  |
//!
//! The payload belongs to the transfer solver and is never inspected here.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::CacheError;

const CACHE_MAGIC: &[u8; 4] = b"RINC";
const CACHE_EXTENSION: &str = "inc";
const HEADER_LEN: u64 = 4 + 8 + 4 + 8;

/// Gates reading and writing of the transfer cache for one source map
#[derive(Debug, Clone)]
pub struct TransferCache {
    path: PathBuf,
    incremental: bool,
    source_crc: u32,
}

impl TransferCache {
    /// The cache lives at `source` with its extension swapped for `inc`. The
    /// source bytes are hashed so an edited map never reuses stale transfers.
    pub fn for_source(source: &Path, incremental: bool) -> Self {
        let source_crc = match std::fs::read(source) {
            Ok(bytes) => crc32fast::hash(&bytes),
            Err(e) => {
                warn!("Could not read {source:?} to hash it: {e}");
                0
            }
        };
        Self {
            path: source.with_extension(CACHE_EXTENSION),
            incremental,
            source_crc,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn incremental(&self) -> bool {
        self.incremental
    }

    /// Cached transfers, if incremental mode is on and a cache built from the
    /// same source with the same patch count exists. Any problem reading it is
    /// logged and treated as a miss.
    pub fn load(&self, num_patches: usize) -> Option<Vec<u8>> {
        if !self.incremental || !self.path.exists() {
            return None;
        }
        match self.read(num_patches) {
            Ok(Some(payload)) => {
                info!(
                    "Loaded {} bytes of transfers from {:?}",
                    payload.len(),
                    self.path
                );
                Some(payload)
            }
            Ok(None) => {
                info!("Transfer cache {:?} is stale, rebuilding", self.path);
                None
            }
            Err(e) => {
                warn!("Ignoring transfer cache {:?}: {e}", self.path);
                None
            }
        }
    }

    /// Persist `payload` in incremental mode, otherwise remove any stale cache
    pub fn finish(&self, num_patches: usize, payload: &[u8]) -> Result<(), CacheError> {
        if self.incremental {
            self.store(num_patches, payload)
        } else {
            self.discard()
        }
    }

    pub fn store(&self, num_patches: usize, payload: &[u8]) -> Result<(), CacheError> {
        let mut file = File::create(&self.path)?;

        let mut header = Vec::with_capacity(HEADER_LEN as usize);
        header.extend_from_slice(CACHE_MAGIC);
        header.extend_from_slice(&(num_patches as u64).to_le_bytes());
        header.extend_from_slice(&self.source_crc.to_le_bytes());
        header.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        file.write_all(&header)?;
        file.write_all(payload)?;
        file.flush()?;

        info!("Wrote {} bytes of transfers to {:?}", payload.len(), self.path);
        Ok(())
    }

    pub fn discard(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed stale transfer cache {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// `Ok(None)` for a well formed cache that doesn't match this build
    fn read(&self, num_patches: usize) -> Result<Option<Vec<u8>>, CacheError> {
        let mut file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if &magic != CACHE_MAGIC {
            return Err(CacheError::BadMagic);
        }

        let mut buf8 = [0u8; 8];
        let mut buf4 = [0u8; 4];
        file.read_exact(&mut buf8)?;
        let cached_patches = u64::from_le_bytes(buf8);
        file.read_exact(&mut buf4)?;
        let cached_crc = u32::from_le_bytes(buf4);
        file.read_exact(&mut buf8)?;
        let payload_len = u64::from_le_bytes(buf8);

        if cached_patches != num_patches as u64 || cached_crc != self.source_crc {
            return Ok(None);
        }

        let available = file_len.saturating_sub(HEADER_LEN);
        if payload_len > available {
            return Err(CacheError::Truncated {
                claimed: payload_len,
                available,
            });
        }

        let mut payload = vec![0u8; payload_len as usize];
        file.read_exact(&mut payload)?;
        Ok(Some(payload))
    }
}
