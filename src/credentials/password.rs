//! Random root password generation

use rand::rngs::OsRng;
use rand::RngCore;

/// Bytes of entropy in a generated password
pub const GENERATED_PASSWORD_BYTES: usize = 24;

/// Generate a cryptographically secure root password.
///
/// 24 random bytes, standard base64 (32 printable characters).
pub fn generate_root_password() -> String {
    let mut bytes = [0u8; GENERATED_PASSWORD_BYTES];
    OsRng.fill_bytes(&mut bytes);
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
}
