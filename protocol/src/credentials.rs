use {
    derive_more::Into,
    rand::{Rng, rand_core, rngs::OsRng},
    serde::{Deserialize, Serialize},
    std::{
        any::Any,
        fmt::{self, Debug},
        panic::catch_unwind,
        str::FromStr,
    },
    thiserror::Error,
};

/// Minimal length (in bytes) of a password used to seal content.
pub const MIN_PASSWORD_LENGTH: usize = 3;

/// Number of letters in a generated password unless requested otherwise.
pub const DEFAULT_PASSWORD_LENGTH: usize = 8;

const GROUP_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} bytes long, got {0}")]
    InvalidPasswordLength(usize),
    #[error("generated password length must be greater than {GROUP_LENGTH}, got {0}")]
    InvalidLength(usize),
    #[error("secure random source failed: {0}")]
    RandomSource(String),
}

/// Password used to derive the key that seals a protected block.
///
/// Either supplied by the author in a block declaration or produced by
/// [`Password::generate`]. The value is hidden from `Debug` output.
#[derive(Clone, PartialEq, Eq, Into, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Password(String);

fn format_panic_message(err: &(dyn Any + Send + 'static)) -> String {
    err.downcast_ref::<&'static str>()
        .map(|&s| s.to_owned())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| format!("{err:?}"))
}

impl Password {
    /// Generates `length` random lowercase letters grouped in dash-separated
    /// triples, e.g. `abc-def-gh` for the default length.
    #[inline]
    pub fn generate(length: usize) -> Result<Self, PasswordError> {
        if length <= GROUP_LENGTH {
            return Err(PasswordError::InvalidLength(length));
        }
        let letters = catch_unwind(|| {
            let mut rng = rand_core::UnwrapErr(OsRng);
            (0..length)
                .map(|_| char::from(rng.random_range(b'a'..=b'z')))
                .collect::<Vec<char>>()
        })
        .map_err(|err| PasswordError::RandomSource(format_panic_message(&*err)))?;

        let groups = letters
            .chunks(GROUP_LENGTH)
            .map(|group| group.iter().collect::<String>())
            .collect::<Vec<_>>();
        Ok(Self(groups.join("-")))
    }

    #[must_use]
    #[inline]
    pub fn as_unmasked_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl TryFrom<String> for Password {
    type Error = PasswordError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.len() < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::InvalidPasswordLength(value.len()));
        }
        Ok(Self(value))
    }
}

impl FromStr for Password {
    type Err = PasswordError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl Debug for Password {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password").finish()
    }
}
