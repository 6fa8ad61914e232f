//! Stable, non-reversible user ids derived from sign-in principals.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derives the signed-in user id from a user principal name.
///
/// The principal is lower-cased and reversed, hashed with SHA-256, and the
/// two 16-byte halves of the digest are folded together with XOR. The result
/// is laid out with the mixed-endian GUID byte order so ids stay compatible
/// with records keyed by earlier deployments.
pub fn signed_in_user_id(user_principal_name: &str) -> String {
    let reversed: String = user_principal_name.to_lowercase().chars().rev().collect();
    let digest = Sha256::digest(reversed.as_bytes());

    let mut folded = [0u8; 16];
    for (i, byte) in folded.iter_mut().enumerate() {
        *byte = digest[i] ^ digest[i + 16];
    }

    Uuid::from_bytes_le(folded).to_string()
}
