use rand::{rngs::OsRng, RngCore};

/// Random bytes per session token.
pub const TOKEN_BYTES: usize = 32;

/// Generates a session token: 256 bits from the operating system's secure
/// random source, hex encoded to 64 characters.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
