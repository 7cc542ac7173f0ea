//! Authentication primitives: login credentials, passwords and registration.
//!
//! Inbound payload parsing stays outside the domain; these constructors
//! validate raw strings before a handler talks to a service.

use zeroize::Zeroizing;

use super::user::{Email, Role, UserDraft, UserName, UserValidationError};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 6;
/// Maximum accepted password length, in bytes (bcrypt truncates beyond this).
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and non-empty. Its format is not
///   checked here so that malformed addresses fail like unknown ones.
/// - `password` is non-empty and retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use masters_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "secret")
///     .expect("valid credentials");
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalised = email.trim();
        if normalised.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalised.to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Password policy violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyError {
    /// Fewer than [`PASSWORD_MIN_LEN`] characters.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Minimum length.
        min: usize,
    },
    /// More than [`PASSWORD_MAX_BYTES`] bytes.
    #[error("password must be at most {max} bytes")]
    TooLong {
        /// Maximum length.
        max: usize,
    },
}

/// Plaintext password that satisfies the policy. Zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(..)")
    }
}

impl Password {
    /// Validate a new password against the length policy.
    pub fn new(raw: &str) -> Result<Self, PasswordPolicyError> {
        if raw.chars().count() < PASSWORD_MIN_LEN {
            return Err(PasswordPolicyError::TooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        if raw.len() > PASSWORD_MAX_BYTES {
            return Err(PasswordPolicyError::TooLong {
                max: PASSWORD_MAX_BYTES,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext value, for handing to a hasher.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

/// Opaque password hash as produced by a [`PasswordHasher`](super::ports::PasswordHasher).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a stored hash.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Encoded hash string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Reasons a self-registration is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// Name, email or role failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
    /// Password policy violation.
    #[error(transparent)]
    Password(#[from] PasswordPolicyError),
    /// The terms were not accepted.
    #[error("terms must be accepted")]
    TermsNotAccepted,
    /// Only clients and masters may register themselves.
    #[error("role {role} cannot be chosen at registration")]
    RoleNotSelfAssignable {
        /// Requested role.
        role: Role,
    },
}

/// Raw registration input as received by an inbound adapter.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationInput<'a> {
    /// Display name.
    pub name: &'a str,
    /// Email address.
    pub email: &'a str,
    /// Chosen password.
    pub password: &'a str,
    /// Requested role; defaults to client.
    pub role: Option<&'a str>,
    /// Whether the terms were accepted.
    pub accept_terms: bool,
}

/// Validated self-registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    draft: UserDraft,
    password: Password,
}

impl Registration {
    /// Validate raw registration input.
    ///
    /// Consent is checked first, then the user fields, then the password.
    pub fn try_from_input(input: RegistrationInput<'_>) -> Result<Self, RegistrationValidationError> {
        if !input.accept_terms {
            return Err(RegistrationValidationError::TermsNotAccepted);
        }
        let role = match input.role {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<Role>()?,
            _ => Role::Client,
        };
        if !matches!(role, Role::Client | Role::Master) {
            return Err(RegistrationValidationError::RoleNotSelfAssignable { role });
        }
        let draft = UserDraft {
            name: UserName::new(input.name)?,
            email: Email::new(input.email)?,
            role,
        };
        let password = Password::new(input.password)?;
        Ok(Self { draft, password })
    }

    /// Validated user fields.
    pub fn draft(&self) -> &UserDraft {
        &self.draft
    }

    /// Chosen password.
    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Split into parts.
    pub fn into_parts(self) -> (UserDraft, Password) {
        (self.draft, self.password)
    }
}
