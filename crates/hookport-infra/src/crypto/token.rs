//! Random tokens from the OS CSPRNG.

use rand::rngs::OsRng;
use rand::RngCore;

use hookport_types::environment::EnvironmentKind;

/// Random bytes behind every API key.
const API_KEY_BYTES: usize = 24;

/// Random bytes behind signing secrets and invite tokens.
const SECRET_BYTES: usize = 32;

/// `{prefix}_{hex}` with `len` random bytes.
pub fn generate_token(prefix: &str, len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("{prefix}_{hex}")
}

/// New API key for an environment, e.g. `hp_prod_3f9a...`.
pub fn generate_api_key(kind: EnvironmentKind) -> String {
    generate_token(&format!("hp_{}", kind.key_tag()), API_KEY_BYTES)
}

/// New secret an event source uses to sign deliveries.
pub fn generate_signing_secret() -> String {
    generate_token("whsec", SECRET_BYTES)
}

/// New token for an invitation link.
pub fn generate_invite_token() -> String {
    generate_token("inv", SECRET_BYTES)
}
