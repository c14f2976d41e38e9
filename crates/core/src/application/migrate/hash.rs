// Migration content hash (SHA-512, lowercase hex)

use sha2::{Digest, Sha512};
use std::path::Path;
use tokio::io::AsyncReadExt;

const READ_CHUNK: usize = 8 * 1024;

/// Digest of raw bytes
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha512::digest(bytes))
}

/// Digest of a file's raw bytes, streamed in chunks
pub async fn file_hash(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha512::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
