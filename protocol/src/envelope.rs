use {
    base64::{Engine, display::Base64Display, prelude::BASE64_STANDARD},
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    std::{
        borrow::Cow,
        fmt::{self, Debug, Display},
        str::FromStr,
    },
    thiserror::Error,
};

pub const SALT_LENGTH: usize = 32;
pub const NONCE_LENGTH: usize = 12;
pub const TAG_LENGTH: usize = 16;

const SEPARATOR: char = ':';
const FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("expected {FIELD_COUNT} `:`-separated fields, got {0}")]
    FieldCount(usize),
    #[error("field `{field}` is not valid base64: {message}")]
    Base64 {
        field: &'static str,
        message: String,
    },
    #[error("invalid iteration count `{0}`")]
    Iterations(String),
    #[error("invalid length of `{field}`; got {actual}, expected {expected}")]
    FieldLength {
        field: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("ciphertext is shorter than the authentication tag ({0} bytes)")]
    TruncatedCiphertext(usize),
}

/// Sealed form of one protected block.
///
/// Wire encoding: `b64(iterations) ":" b64(salt) ":" b64(nonce) ":" b64(ciphertext)`
/// with the standard base64 alphabet. The iteration count is encoded as its
/// decimal string and the ciphertext carries the authentication tag at its end.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    pub iterations: u32,
    pub salt: [u8; SALT_LENGTH],
    pub nonce: [u8; NONCE_LENGTH],
    pub ciphertext: Vec<u8>,
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, EnvelopeError> {
    BASE64_STANDARD
        .decode(value)
        .map_err(|err| EnvelopeError::Base64 {
            field,
            message: err.to_string(),
        })
}

fn decode_array<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N], EnvelopeError> {
    <[u8; N]>::try_from(decode_field(field, value)?).map_err(|bytes| EnvelopeError::FieldLength {
        field,
        actual: bytes.len(),
        expected: N,
    })
}

impl Display for CipherEnvelope {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iterations = self.iterations.to_string();
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            Base64Display::new(iterations.as_bytes(), &BASE64_STANDARD),
            Base64Display::new(&self.salt, &BASE64_STANDARD),
            Base64Display::new(&self.nonce, &BASE64_STANDARD),
            Base64Display::new(&self.ciphertext, &BASE64_STANDARD),
        )
    }
}

impl FromStr for CipherEnvelope {
    type Err = EnvelopeError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(SEPARATOR).collect();
        let [iterations, salt, nonce, ciphertext] = fields.as_slice() else {
            return Err(EnvelopeError::FieldCount(fields.len()));
        };

        let iterations = String::from_utf8(decode_field("iterations", iterations)?)
            .map_err(|err| EnvelopeError::Iterations(err.to_string()))?;
        let iterations = iterations
            .parse::<u32>()
            .ok()
            .filter(|&value| value > 0 && iterations.bytes().all(|c| c.is_ascii_digit()))
            .ok_or(EnvelopeError::Iterations(iterations))?;

        let ciphertext = decode_field("ciphertext", ciphertext)?;
        if ciphertext.len() < TAG_LENGTH {
            return Err(EnvelopeError::TruncatedCiphertext(ciphertext.len()));
        }

        Ok(Self {
            iterations,
            salt: decode_array("salt", salt)?,
            nonce: decode_array("nonce", nonce)?,
            ciphertext,
        })
    }
}

impl Debug for CipherEnvelope {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEnvelope")
            .field("iterations", &self.iterations)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

impl<'de> Deserialize<'de> for CipherEnvelope {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Cow::<'_, str>::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

impl Serialize for CipherEnvelope {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}
