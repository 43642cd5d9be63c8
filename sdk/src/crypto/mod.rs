//! Password-based sealing of rendered content.
//!
//! Every protected block is encrypted with AES-256-GCM. The key is derived from
//! the block password with PBKDF2-HMAC-SHA256 ([`ITERATIONS`] rounds, 32-byte output).
//!
//! Salt and nonce are not random: both are taken from the SHA-512 digest of the
//! plaintext (salt = bytes 0..32, nonce = bytes 32..44). Sealing the same
//! plaintext with the same password therefore always produces the same envelope,
//! which keeps generated HTML byte-stable between builds. The price is that two
//! envelopes of equal plaintext under the same password can be recognized as equal.
//!
//! The resulting [`CipherEnvelope`](ldseal_protocol::CipherEnvelope) is written as
//!
//! - iteration count (decimal string, base64)
//! - salt (32 bytes, base64)
//! - nonce (12 bytes, base64)
//! - ciphertext followed by the 16-byte authentication tag (base64)
//!
//! joined with `:`. The browser-side decryptor reverses exactly these steps,
//! so none of them may change without a new envelope format.

mod cipher;

pub use cipher::{ITERATIONS, KEY_LENGTH, derive_key, open, open_str, seal};
