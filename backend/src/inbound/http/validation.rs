//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper yields an `invalid_request` error whose `details` carry the
//! offending `field` and a stable `code`.

use serde_json::json;

use crate::domain::{
    BidId, Error, LoginValidationError, OrderId, OrderValidationError, PasswordPolicyError,
    RegistrationValidationError, UserId, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyField,
    InvalidUuid,
    InvalidEmail,
    TooLong,
    TooShort,
    UnknownRole,
    RoleNotAllowed,
    TermsNotAccepted,
    InvalidAmount,
    InvalidCurrency,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::EmptyField => "empty_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidEmail => "invalid_email",
            Self::TooLong => "too_long",
            Self::TooShort => "too_short",
            Self::UnknownRole => "unknown_role",
            Self::RoleNotAllowed => "role_not_allowed",
            Self::TermsNotAccepted => "terms_not_accepted",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidCurrency => "invalid_currency",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

/// Unwrap an optional payload field or report it missing.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    Error::invalid_request(format!("{} must be a valid UUID", field.as_str())).with_details(
        json!({
            "field": field.as_str(),
            "value": value,
            "code": ErrorCode::InvalidUuid.as_str(),
        }),
    )
}

pub(crate) fn parse_user_id(raw: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| invalid_uuid_error(field, raw))
}

pub(crate) fn parse_order_id(raw: &str, field: FieldName) -> Result<OrderId, Error> {
    OrderId::new(raw).map_err(|_| invalid_uuid_error(field, raw))
}

pub(crate) fn parse_bid_id(raw: &str, field: FieldName) -> Result<BidId, Error> {
    BidId::new(raw).map_err(|_| invalid_uuid_error(field, raw))
}

/// Map a user value error onto the field that produced it.
pub(crate) fn user_validation_error(err: &UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => {
            ("id", ErrorCode::InvalidUuid)
        }
        UserValidationError::EmptyName => ("name", ErrorCode::EmptyField),
        UserValidationError::NameTooLong { .. } => ("name", ErrorCode::TooLong),
        UserValidationError::EmptyEmail => ("email", ErrorCode::EmptyField),
        UserValidationError::InvalidEmail => ("email", ErrorCode::InvalidEmail),
        UserValidationError::UnknownRole { .. } => ("role", ErrorCode::UnknownRole),
    };
    field_error(FieldName::new(field), code, err.to_string())
}

pub(crate) fn password_policy_error(err: &PasswordPolicyError) -> Error {
    let code = match err {
        PasswordPolicyError::TooShort { .. } => ErrorCode::TooShort,
        PasswordPolicyError::TooLong { .. } => ErrorCode::TooLong,
    };
    field_error(FieldName::new("password"), code, err.to_string())
}

pub(crate) fn login_validation_error(err: &LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(FieldName::new(field), ErrorCode::EmptyField, err.to_string())
}

pub(crate) fn registration_validation_error(err: &RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::User(inner) => user_validation_error(inner),
        RegistrationValidationError::Password(inner) => password_policy_error(inner),
        RegistrationValidationError::TermsNotAccepted => field_error(
            FieldName::new("acceptTerms"),
            ErrorCode::TermsNotAccepted,
            err.to_string(),
        ),
        RegistrationValidationError::RoleNotSelfAssignable { .. } => field_error(
            FieldName::new("role"),
            ErrorCode::RoleNotAllowed,
            err.to_string(),
        ),
    }
}

pub(crate) fn order_validation_error(err: &OrderValidationError, field: FieldName) -> Error {
    let code = match err {
        OrderValidationError::InvalidId { .. } => ErrorCode::InvalidUuid,
        OrderValidationError::NonPositiveAmount => ErrorCode::InvalidAmount,
        OrderValidationError::InvalidCurrency => ErrorCode::InvalidCurrency,
        OrderValidationError::InvalidTitle { .. } | OrderValidationError::UnknownStatus { .. } => {
            ErrorCode::InvalidValue
        }
    };
    field_error(field, code, err.to_string())
}
