//! User aggregate: identity, credentials and the confirmation lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 32;

/// Validation errors for user identifiers and usernames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The username was blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The username exceeded [`USERNAME_MAX`] characters.
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    /// The username contained whitespace.
    #[error("username must not contain whitespace")]
    UsernameWhitespace,
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual UUID form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID loaded from storage.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique login name.
///
/// ## Invariants
/// - Trimmed, non-empty, at most [`USERNAME_MAX`] characters.
/// - Contains no interior whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use cinerate::domain::Username;
    ///
    /// let name = Username::new("  alice ").expect("valid username");
    /// assert_eq!(name.as_ref(), "alice");
    /// assert!(Username::new("two words").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::UsernameWhitespace);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Encoded credential produced by a password encoder. Opaque to the domain.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded password string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Returned by [`User::confirm`] when the user is already confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("user {user_id} is already confirmed")]
pub struct UserAlreadyConfirmed {
    pub user_id: UserId,
}

/// Plain field bundle used by adapters to rebuild a stored [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub id: UserId,
    pub username: Username,
    pub password_hash: PasswordHash,
    pub is_confirmed: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registered application user.
///
/// ## Invariants
/// - A freshly created user is unconfirmed and active.
/// - Confirmation is one-way; confirming twice is reported, never absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    password_hash: PasswordHash,
    is_confirmed: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unconfirmed and active user.
    pub fn create(
        id: UserId,
        username: Username,
        password_hash: PasswordHash,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            is_confirmed: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from stored fields.
    pub fn restore(snapshot: UserSnapshot) -> Self {
        let UserSnapshot {
            id,
            username,
            password_hash,
            is_confirmed,
            is_active,
            created_at,
            updated_at,
        } = snapshot;
        Self {
            id,
            username,
            password_hash,
            is_confirmed,
            is_active,
            created_at,
            updated_at,
        }
    }

    /// Export all fields for persistence adapters.
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id,
            username: self.username.clone(),
            password_hash: self.password_hash.clone(),
            is_confirmed: self.is_confirmed,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Mark the user as confirmed.
    ///
    /// # Errors
    /// Returns [`UserAlreadyConfirmed`] when the user was confirmed before; the
    /// user is left untouched.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), UserAlreadyConfirmed> {
        if self.is_confirmed {
            return Err(UserAlreadyConfirmed { user_id: self.id });
        }
        self.is_confirmed = true;
        self.updated_at = now;
        Ok(())
    }

    /// Change the login name.
    pub fn update_username(&mut self, username: Username, now: DateTime<Utc>) {
        self.username = username;
        self.updated_at = now;
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn is_confirmed(&self) -> bool {
        self.is_confirmed
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
