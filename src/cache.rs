//! Content-addressed skip cache for patched output.
//!
//! The cache entry is a sidecar file `<output>.hash` holding the hex SHA-256
//! of the *input* text that produced the output. It is valid only while the
//! output file and the sidecar both exist and the recorded digest equals the
//! digest of the current input. Any byte-level change to the input
//! invalidates it; there is no TTL.

use crate::persist::ArtifactStore;
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

pub const SIDECAR_SUFFIX: &str = ".hash";

/// Hex-encoded SHA-256 of `text`.
pub fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Path of the digest sidecar for `output`.
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

/// Pure validity rule.
pub fn is_valid(
    stored: Option<&str>,
    input_digest: &str,
    output_exists: bool,
    sidecar_exists: bool,
) -> bool {
    output_exists && sidecar_exists && stored.map(str::trim) == Some(input_digest)
}

/// Check whether `output` was produced from input with `input_digest`.
///
/// The sidecar is only read when both files exist. A sidecar that exists but
/// cannot be read is an error, not a miss. One that reads as non-UTF-8 bytes
/// is a miss.
pub fn lookup(
    store: &impl ArtifactStore,
    output: &Path,
    input_digest: &str,
) -> io::Result<bool> {
    let sidecar = sidecar_path(output);
    let output_exists = store.exists(output);
    let sidecar_exists = store.exists(&sidecar);

    let stored = if output_exists && sidecar_exists {
        match store.read_to_string(&sidecar) {
            Ok(stored) => Some(stored),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => None,
            Err(err) => return Err(err),
        }
    } else {
        None
    };

    Ok(is_valid(
        stored.as_deref(),
        input_digest,
        output_exists,
        sidecar_exists,
    ))
}

/// Record `input_digest` as the producer of `output`.
pub fn record(store: &impl ArtifactStore, output: &Path, input_digest: &str) -> io::Result<()> {
    store.write_atomic(&sidecar_path(output), input_digest.as_bytes())
}

/// Drop the cache entry for `output`.
///
/// Runs before `output` is replaced, so an interrupted write can only cost a
/// miss on the next run.
pub fn invalidate(store: &impl ArtifactStore, output: &Path) -> io::Result<()> {
    store.remove(&sidecar_path(output))
}
