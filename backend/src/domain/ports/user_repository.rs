//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUser, Page, User, UserId, UserPatch};

/// Persistence errors raised by user repository adapters.
///
/// Adapters never swallow a storage failure: each driver error is wrapped
/// into exactly one of these variants with the failing operation named in
/// the message, and callers decide what it means for them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStoreError {
    /// A storage session could not be established or checked out.
    #[error("user store connection failed: {message}")]
    Connection {
        /// Driver-provided failure description.
        message: String,
    },

    /// A command failed in transport or at the protocol level.
    #[error("user store query failed: {message}")]
    Query {
        /// Driver-provided failure description.
        message: String,
    },

    /// A by-identifier lookup matched nothing.
    #[error("user {id} does not exist")]
    NotFound {
        /// The identifier that failed to match.
        id: String,
    },

    /// The store rejected a write because of a uniqueness constraint.
    #[error("user conflicts with existing data: {message}")]
    Conflict {
        /// Description of the violated constraint.
        message: String,
    },

    /// A stored document does not translate to a valid domain user.
    #[error("stored user record is corrupt: {message}")]
    Corrupt {
        /// Description of the translation failure.
        message: String,
    },
}

impl UserStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a not-found error for the given identifier.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a conflict error with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a corrupt-record error with the given message.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// Resource-typed data access for users.
///
/// Implementations translate domain values to storage documents on the way
/// in and back on the way out; a stored record that cannot be translated
/// surfaces as [`UserStoreError::Corrupt`], never as a partial value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; the store assigns the identifier.
    ///
    /// Fails with [`UserStoreError::Conflict`] when a uniqueness
    /// constraint (the email index) rejects the write.
    async fn create(&self, user: NewUser) -> Result<User, UserStoreError>;

    /// Fetch a user by identifier.
    ///
    /// Absence is [`UserStoreError::NotFound`], not an empty success.
    async fn get_by_id(&self, id: &UserId) -> Result<User, UserStoreError>;

    /// Fetch a user by email address, if any.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserStoreError>;

    /// List users within a pagination window, oldest first.
    async fn list(&self, page: Page) -> Result<Vec<User>, UserStoreError>;

    /// Apply a partial update; returns the number of modified records.
    ///
    /// Zero means the identifier matched nothing or the patch changed
    /// nothing; neither is an error.
    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<u64, UserStoreError>;

    /// Delete a user; returns the number of deleted records.
    async fn delete(&self, id: &UserId) -> Result<u64, UserStoreError>;
}

#[cfg(test)]
mod tests {
    //! Message formatting coverage for the port error taxonomy.
    use super::UserStoreError;

    #[test]
    fn constructors_accept_borrowed_messages() {
        assert_eq!(
            UserStoreError::connection("refused").to_string(),
            "user store connection failed: refused"
        );
        assert_eq!(
            UserStoreError::not_found("66f1a0b2c3d4e5f6a7b8c9d0").to_string(),
            "user 66f1a0b2c3d4e5f6a7b8c9d0 does not exist"
        );
        assert_eq!(
            UserStoreError::conflict("email taken").to_string(),
            "user conflicts with existing data: email taken"
        );
        assert_eq!(
            UserStoreError::corrupt("missing email field").to_string(),
            "stored user record is corrupt: missing email field"
        );
    }
}
