use std::{fs::File, io, path::Path};

use sha2::{Digest, Sha256};

use crate::error::{HashError, HashResult};

/// Computes the content fingerprint of `bytes`.
///
/// The fingerprint is the SHA-256 digest rendered as 64 lowercase hex characters. It is used
/// to tell whether two payloads are identical, nothing more.
///
/// # Example
///
/// ```
/// use yanked_utils::hash::fingerprint;
///
/// assert_eq!(
///     fingerprint(b"hi"),
///     "8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4"
/// );
/// ```
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Calculates the fingerprint of a file on disk.
///
/// The file is streamed through the hasher, so the result is identical to calling
/// [`fingerprint`] on the full contents.
///
/// # Errors
///
/// * [`HashError::ReadFailed`] if the file cannot be opened or read.
///
/// # Example
///
/// ```no_run
/// use yanked_utils::error::HashResult;
/// use yanked_utils::hash::calculate_checksum;
///
/// fn main() -> HashResult<()> {
///     let checksum = calculate_checksum("/path/to/file")?;
///     println!("Checksum is {}", checksum);
///     Ok(())
/// }
/// ```
pub fn calculate_checksum<P: AsRef<Path>>(file_path: P) -> HashResult<String> {
    let file_path = file_path.as_ref();
    let read_failed = |err| {
        HashError::ReadFailed {
            path: file_path.to_path_buf(),
            source: err,
        }
    };

    let mut file = File::open(file_path).map_err(read_failed)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(read_failed)?;

    Ok(hex::encode(hasher.finalize()))
}

/// Verifies the checksum of a file against an expected value.
///
/// The comparison is case-insensitive.
///
/// # Errors
///
/// * [`HashError::ReadFailed`] if the file cannot be read.
pub fn verify_checksum<P: AsRef<Path>>(file_path: P, expected: &str) -> HashResult<bool> {
    let actual = calculate_checksum(file_path)?;
    Ok(actual.eq_ignore_ascii_case(expected))
}
