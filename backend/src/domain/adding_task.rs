//! Requests to import a title from an external catalogue.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Validation errors for adding task inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddingTaskValidationError {
    #[error("adding type must be one of: movie, series")]
    UnknownType,
    #[error("kinopoisk id must be a non-empty string of digits")]
    InvalidKinopoiskId,
    #[error("unknown adding task status")]
    UnknownStatus,
}

/// Stable task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddingTaskId(Uuid);

impl AddingTaskId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AddingTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of title the task imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddingTaskType {
    Movie,
    Series,
}

impl AddingTaskType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }
}

impl FromStr for AddingTaskType {
    type Err = AddingTaskValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "series" => Ok(Self::Series),
            _ => Err(AddingTaskValidationError::UnknownType),
        }
    }
}

/// Processing state of a task. Only creation happens in this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddingTaskStatus {
    Pending,
    Completed,
    Failed,
}

impl AddingTaskStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for AddingTaskStatus {
    type Err = AddingTaskValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(AddingTaskValidationError::UnknownStatus),
        }
    }
}

/// Identifier of a title in the Kinopoisk catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KinopoiskId(String);

impl KinopoiskId {
    /// Validate a numeric catalogue identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AddingTaskValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddingTaskValidationError::InvalidKinopoiskId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for KinopoiskId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<KinopoiskId> for String {
    fn from(value: KinopoiskId) -> Self {
        value.0
    }
}

impl TryFrom<String> for KinopoiskId {
    type Error = AddingTaskValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A user's request to import a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddingTask {
    id: AddingTaskId,
    creator_id: UserId,
    adding_type: AddingTaskType,
    kinopoisk_id: KinopoiskId,
    status: AddingTaskStatus,
    created_at: DateTime<Utc>,
}

impl AddingTask {
    /// Create a pending task.
    pub fn create(
        id: AddingTaskId,
        creator_id: UserId,
        adding_type: AddingTaskType,
        kinopoisk_id: KinopoiskId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            creator_id,
            adding_type,
            kinopoisk_id,
            status: AddingTaskStatus::Pending,
            created_at: now,
        }
    }

    /// Rebuild a task from stored fields.
    pub fn restore(
        id: AddingTaskId,
        creator_id: UserId,
        adding_type: AddingTaskType,
        kinopoisk_id: KinopoiskId,
        status: AddingTaskStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            creator_id,
            adding_type,
            kinopoisk_id,
            status,
            created_at,
        }
    }

    /// Event announcing this task to downstream importers.
    pub fn created_event(&self) -> AddingTaskCreatedEvent {
        AddingTaskCreatedEvent {
            id: self.id,
            creator_id: self.creator_id,
            adding_type: self.adding_type,
            kinopoisk_id: self.kinopoisk_id.clone(),
            created_at: self.created_at,
        }
    }

    pub fn id(&self) -> &AddingTaskId {
        &self.id
    }

    pub fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    pub fn adding_type(&self) -> AddingTaskType {
        self.adding_type
    }

    pub fn kinopoisk_id(&self) -> &KinopoiskId {
        &self.kinopoisk_id
    }

    pub fn status(&self) -> AddingTaskStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Published once a task is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddingTaskCreatedEvent {
    pub id: AddingTaskId,
    pub creator_id: UserId,
    pub adding_type: AddingTaskType,
    pub kinopoisk_id: KinopoiskId,
    pub created_at: DateTime<Utc>,
}
