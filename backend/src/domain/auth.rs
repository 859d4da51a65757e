//! Authentication primitives such as login credentials.
//!
//! Inbound adapters parse raw strings through these constructors before they
//! reach a handler, so validation failures never hit storage.

use zeroize::Zeroizing;

use super::{UserValidationError, Username};

/// Domain error returned when login or registration inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Username failed [`Username`] validation.
    #[error(transparent)]
    Username(#[from] UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Plain-text password held in zeroising memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept any non-empty password, keeping caller whitespace intact.
    pub fn new(raw: impl Into<String>) -> Result<Self, CredentialsValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use cinerate::domain::Credentials;
///
/// let creds = Credentials::try_from_parts(" alice ", "pw").unwrap();
/// assert_eq!(creds.username().as_ref(), "alice");
/// assert_eq!(creds.password().expose(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    username: Username,
    password: Password,
}

impl Credentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Split into owned parts for command construction.
    pub fn into_parts(self) -> (Username, Password) {
        (self.username, self.password)
    }
}
