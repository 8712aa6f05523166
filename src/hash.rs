//! Streaming content digests used for exact duplicate detection.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest as _, Sha256};

use crate::error::{Error, Result};

/// Read buffer size used when hashing.
const CHUNK_SIZE: usize = 16 * 1024;

/// SHA-256 of the full file content.
///
/// Two files with an equal digest are treated as byte-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Compute the digest of everything `reader` yields, one chunk at a time.
///
/// # Errors
/// Returns an error if reading fails.
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<Digest> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    Ok(Digest(bytes))
}

/// Compute the content digest of a file without loading it into memory.
///
/// # Errors
/// Returns an IO error if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> Result<Digest> {
    let file = File::open(path).map_err(|e| Error::io_path("open", path, e))?;
    hash_reader(BufReader::with_capacity(CHUNK_SIZE, file)).map_err(|e| Error::io_path("read", path, e))
}
