//! Types shared between the sealing pipeline and its consumers: passwords,
//! the cipher envelope wire format and the password manifest records.

pub mod credentials;
pub mod envelope;
pub mod manifest;
pub mod util;

pub use crate::{
    credentials::{DEFAULT_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, Password, PasswordError},
    envelope::{CipherEnvelope, EnvelopeError, NONCE_LENGTH, SALT_LENGTH, TAG_LENGTH},
    manifest::{MANIFEST_META_NAME, ManifestRecord},
};
