//! Streamed content hashing of stored files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Chunk size for streamed hashing; bounds memory on large files.
const CHUNK_SIZE: usize = 64 * 1024;

/// Content-hash algorithm for the dedup key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Md5,
}

/// Computes the hex digest of the file at `path`, returning the digest
/// and the number of bytes hashed.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> std::io::Result<(String, u64)> {
    let mut file = File::open(path)?;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = file.read(&mut buffer)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buffer[..n]);
                total += n as u64;
            }
            Ok((format!("{:x}", hasher.finalize()), total))
        }
        HashAlgorithm::Md5 => {
            let mut context = md5::Context::new();
            loop {
                let n = file.read(&mut buffer)?;
                if n == 0 {
                    break;
                }
                context.consume(&buffer[..n]);
                total += n as u64;
            }
            Ok((format!("{:x}", context.compute()), total))
        }
    }
}
