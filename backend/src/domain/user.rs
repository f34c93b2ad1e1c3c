//! User data model.
//!
//! Field newtypes validate on construction so a [`User`] can only exist in
//! a well-formed state; adapters converting wire or storage payloads go
//! through the fallible constructors and surface the typed failures below.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors raised by the user field constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The identifier is empty.
    EmptyId,
    /// The identifier is not a 24-character lowercase hex string.
    InvalidId,
    /// The name trims to nothing.
    EmptyName,
    /// The name exceeds the permitted length.
    NameTooLong {
        /// Maximum number of characters allowed.
        max: usize,
    },
    /// The email address does not have a `local@domain` shape.
    InvalidEmail,
    /// The email address exceeds the permitted length.
    EmailTooLong {
        /// Maximum number of characters allowed.
        max: usize,
    },
    /// The age is implausibly large.
    AgeOutOfRange {
        /// Maximum accepted age.
        max: u32,
    },
    /// An update patch carries no fields at all.
    EmptyPatch,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a 24-character hex string"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must look like local@domain"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::AgeOutOfRange { max } => write!(f, "age must be at most {max}"),
            Self::EmptyPatch => write!(f, "update must change at least one field"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Store-assigned user identifier: 24 lowercase hex characters.
///
/// The domain validates the shape itself rather than borrowing the driver's
/// id type, so only the persistence adapter knows how the store spells it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

static USER_ID_RE: OnceLock<Regex> = OnceLock::new();

fn user_id_regex() -> &'static Regex {
    USER_ID_RE.get_or_init(|| {
        let pattern = "^[0-9a-f]{24}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("user id regex failed to compile: {error}"))
    })
}

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if !user_id_regex().is_match(&id) {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 64;

/// Human-readable name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`] from owned input.
    ///
    /// Surrounding whitespace is trimmed before validation.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, UserValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: USER_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliberately permissive: one "@", no whitespace, a dotted domain.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`] from owned input.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum accepted age.
pub const AGE_MAX: u32 = 150;

/// Age in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Age(u32);

impl Age {
    /// Validate and construct an [`Age`].
    pub const fn new(years: u32) -> Result<Self, UserValidationError> {
        if years > AGE_MAX {
            return Err(UserValidationError::AgeOutOfRange { max: AGE_MAX });
        }
        Ok(Self(years))
    }

    /// The age in years.
    #[must_use]
    pub const fn years(self) -> u32 {
        self.0
    }
}

impl From<Age> for u32 {
    fn from(value: Age) -> Self {
        value.0
    }
}

impl TryFrom<u32> for Age {
    type Error = UserValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// ## Invariants
/// - `id` is a valid 24-character hex identifier assigned by the store.
/// - `name` is non-empty once trimmed and at most [`USER_NAME_MAX`] chars.
/// - `email` has a `local@domain` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    #[schema(value_type = String, example = "66f1a0b2c3d4e5f6a7b8c9d0")]
    id: UserId,
    #[schema(value_type = String, example = "Ada Lovelace")]
    name: UserName,
    #[schema(value_type = String, example = "ada@example.com")]
    email: EmailAddress,
    #[schema(value_type = Option<u32>, example = 36)]
    age: Option<Age>,
    created_at: DateTime<Utc>,
}

impl User {
    /// Build a [`User`] from validated components.
    #[must_use]
    pub const fn new(
        id: UserId,
        name: UserName,
        email: EmailAddress,
        age: Option<Age>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            age,
            created_at,
        }
    }

    /// Stable store-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Contact email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Age in years, when the user provided one.
    #[must_use]
    pub const fn age(&self) -> Option<Age> {
        self.age
    }

    /// Creation timestamp assigned by the service.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            name,
            email,
            age,
            created_at,
        } = value;
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            age: age.map(Age::years),
            created_at,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let UserDto {
            id,
            name,
            email,
            age,
            created_at,
        } = value;
        Ok(User::new(
            UserId::new(id)?,
            UserName::new(name)?,
            EmailAddress::new(email)?,
            age.map(Age::new).transpose()?,
            created_at,
        ))
    }
}

/// Caller-supplied fields for creating a user.
///
/// The identifier and creation timestamp are assigned by the service at
/// insert time, so they are absent here.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    name: UserName,
    email: EmailAddress,
    age: Option<Age>,
}

impl NewUser {
    /// Bundle validated components for a create call.
    #[must_use]
    pub const fn new(name: UserName, email: EmailAddress, age: Option<Age>) -> Self {
        Self { name, email, age }
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Contact email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Age in years, when provided.
    #[must_use]
    pub const fn age(&self) -> Option<Age> {
        self.age
    }

    /// Decompose into owned components.
    #[must_use]
    pub fn into_parts(self) -> (UserName, EmailAddress, Option<Age>) {
        let Self { name, email, age } = self;
        (name, email, age)
    }
}

/// Partial update for an existing user.
///
/// ## Invariants
/// - At least one field is present.
/// - Absent fields are left untouched by the update; there is no way to
///   clear a field through a patch.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPatch {
    name: Option<UserName>,
    email: Option<EmailAddress>,
    age: Option<Age>,
}

impl UserPatch {
    /// Bundle validated optional components, rejecting an all-empty patch.
    pub fn new(
        name: Option<UserName>,
        email: Option<EmailAddress>,
        age: Option<Age>,
    ) -> Result<Self, UserValidationError> {
        if name.is_none() && email.is_none() && age.is_none() {
            return Err(UserValidationError::EmptyPatch);
        }
        Ok(Self { name, email, age })
    }

    /// Replacement name, when present.
    #[must_use]
    pub const fn name(&self) -> Option<&UserName> {
        self.name.as_ref()
    }

    /// Replacement email, when present.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Replacement age, when present.
    #[must_use]
    pub const fn age(&self) -> Option<Age> {
        self.age
    }
}

#[cfg(test)]
mod tests;
