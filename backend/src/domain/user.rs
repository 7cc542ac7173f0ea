//! Marketplace user model.
//!
//! A user is a client, a master (craftsman), a verified master, or an admin.
//! Values are validated at construction so services and adapters only ever
//! handle well-formed names, emails and identifiers.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum number of characters in a user name.
pub const USER_NAME_MAX: usize = 100;
/// Maximum number of characters in an email address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors raised by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Name was blank once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeded [`USER_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Upper bound that was exceeded.
        max: usize,
    },
    /// Email was blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email did not look like `local@domain.tld`.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Role string did not name a known role.
    #[error("unknown role: {value}")]
    UnknownRole {
        /// Rejected input.
        value: String,
    },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from a UUID string.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, as loaded from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable user name, trimmed, 1..=100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
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
        f.write_str(&self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address as submitted, minus surrounding whitespace.
///
/// Equality and hashing ignore case, so uniqueness and lookups are case
/// blind while the stored spelling is kept for display.
#[derive(Debug, Clone)]
pub struct Email(String);

impl Email {
    /// Validate an email address.
    ///
    /// # Examples
    /// ```
    /// use masters_backend::domain::Email;
    ///
    /// let email = Email::new(" Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "Ada@Example.COM");
    /// assert_eq!(email, Email::new("ada@example.com").expect("valid email"));
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.len() > EMAIL_MAX || !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Lower-cased form used for comparisons and lookups.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Email {}

impl Hash for Email {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marketplace role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Customer placing orders.
    Client,
    /// Craftsman offering services.
    Master,
    /// Craftsman whose identity has been verified by an administrator.
    VerifiedMaster,
    /// Operator with access to user management.
    Admin,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Role; 4] = [Role::Client, Role::Master, Role::VerifiedMaster, Role::Admin];

    /// Wire representation of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Master => "master",
            Self::VerifiedMaster => "verified_master",
            Self::Admin => "admin",
        }
    }

    /// True for every craftsman tier.
    pub fn is_master(self) -> bool {
        matches!(self, Self::Master | Self::VerifiedMaster)
    }

    /// True for administrators.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalised)
            .ok_or_else(|| UserValidationError::UnknownRole {
                value: s.to_owned(),
            })
    }
}

/// Validated fields of a user that callers supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    /// Display name.
    pub name: UserName,
    /// Login email.
    pub email: Email,
    /// Assigned role.
    pub role: Role,
}

/// Partial update to a user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// Replacement name.
    pub name: Option<UserName>,
    /// Replacement email.
    pub email: Option<Email>,
    /// Replacement role.
    pub role: Option<Role>,
}

impl UserPatch {
    /// Patch changing only the role.
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

/// Marketplace user.
///
/// ## Invariants
/// - `email` is unique across users (enforced by the store).
/// - `updated_at` is never earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: Email,
    role: Role,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, active user.
    pub fn register(id: UserId, draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from stored state.
    pub fn restore(
        id: UserId,
        draft: UserDraft,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
            active,
            created_at,
            updated_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Current role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// False once an administrator has blocked the account.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &UserPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        self.touch(now);
    }

    /// Flip the active flag.
    pub fn toggle_active(&mut self, now: DateTime<Utc>) {
        self.active = !self.active;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

#[cfg(test)]
mod tests;
