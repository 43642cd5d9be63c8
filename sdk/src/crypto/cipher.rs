use {
    crate::error::CryptoError,
    aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce, aead::Aead},
    ldseal_protocol::{CipherEnvelope, NONCE_LENGTH, Password, SALT_LENGTH},
    pbkdf2::pbkdf2_hmac,
    sha2::{Digest, Sha256, Sha512},
    zeroize::Zeroizing,
};

/// PBKDF2 rounds used for every new envelope.
pub const ITERATIONS: u32 = 100_000;

/// Length of the derived AES-256 key.
pub const KEY_LENGTH: usize = 32;

/// Stretches `password` into an AES key.
#[must_use]
#[inline]
pub fn derive_key(
    password: &Password,
    salt: &[u8; SALT_LENGTH],
    iterations: u32,
) -> Zeroizing<[u8; KEY_LENGTH]> {
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, key.as_mut_slice());
    key
}

fn content_salt_and_nonce(plaintext: &[u8]) -> ([u8; SALT_LENGTH], [u8; NONCE_LENGTH]) {
    let digest = Sha512::digest(plaintext);
    let (salt_bytes, rest) = digest.split_at(SALT_LENGTH);
    let (nonce_bytes, _) = rest.split_at(NONCE_LENGTH);
    let mut salt = [0u8; SALT_LENGTH];
    salt.copy_from_slice(salt_bytes);
    let mut nonce = [0u8; NONCE_LENGTH];
    nonce.copy_from_slice(nonce_bytes);
    (salt, nonce)
}

fn decrypt_with_key(
    key: &[u8; KEY_LENGTH],
    envelope: &CipherEnvelope,
) -> Result<Vec<u8>, CryptoError> {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key))
        .decrypt(
            Nonce::from_slice(&envelope.nonce),
            envelope.ciphertext.as_slice(),
        )
        .map_err(|aes_gcm::Error| CryptoError::AuthenticationFailure)
}

/// Encrypts `plaintext` under `password`.
///
/// The result only depends on the inputs, see the [module docs](super).
#[inline]
pub fn seal(password: &Password, plaintext: &[u8]) -> Result<CipherEnvelope, CryptoError> {
    let (salt, nonce) = content_salt_and_nonce(plaintext);
    let key = derive_key(password, &salt, ITERATIONS);
    let ciphertext = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()))
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|aes_gcm::Error| CryptoError::Encryption)?;
    Ok(CipherEnvelope {
        iterations: ITERATIONS,
        salt,
        nonce,
        ciphertext,
    })
}

/// Reverses [`seal`]. Nothing is returned unless the authentication tag matches.
#[inline]
pub fn open(password: &Password, envelope: &CipherEnvelope) -> Result<Vec<u8>, CryptoError> {
    let key = derive_key(password, &envelope.salt, envelope.iterations);
    decrypt_with_key(&key, envelope)
}

#[inline]
pub fn open_str(password: &Password, envelope: &str) -> Result<Vec<u8>, CryptoError> {
    open(password, &envelope.parse()?)
}
