use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::domain::validation::ValidationErrors;

// Field name used when an error does not belong to a single input member.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

// Violations of the envelope shape, reported at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("error_code is required when status is false")]
    MissingErrorCode,
    #[error("errors are required when status is false")]
    MissingErrors,
    #[error("error_code must be absent when status is true (got {0})")]
    ErrorCodeOnSuccess(u16),
    #[error("errors must be absent when status is true")]
    ErrorsOnSuccess,
    #[error("error_code must be between 400 and 599 (got {0})")]
    ErrorCodeOutOfRange(u16),
}

/// HTTP-flavoured failure code carried by a failed envelope.
///
/// Always within `400..=599`; the only way to build one outside the
/// associated constants is [`ErrorCode::new`], which checks the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ErrorCode(u16);

impl ErrorCode {
    pub const BAD_REQUEST: Self = Self(400);
    pub const UNAUTHORIZED: Self = Self(401);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);
    pub const INTERNAL: Self = Self(500);

    pub fn new(code: u16) -> Result<Self, EnvelopeError> {
        if (400..=599).contains(&code) {
            Ok(Self(code))
        } else {
            Err(EnvelopeError::ErrorCodeOutOfRange(code))
        }
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = EnvelopeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ErrorCode> for u16 {
    fn from(value: ErrorCode) -> Self {
        value.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn non_field() -> String {
    NON_FIELD_ERRORS.to_string()
}

/// A single field-level message inside a failed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageError {
    #[serde(default = "non_field")]
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<BTreeMap<String, String>>,
}

impl MessageError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        Self::new(NON_FIELD_ERRORS, message)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn not_found(field: impl Into<String>, entity: &str) -> Self {
        Self::new(field, format!("{entity} not found")).with_detail("code", "not-found")
    }

    pub fn already_exists(field: impl Into<String>, entity: &str) -> Self {
        Self::new(field, format!("{entity} already exists"))
            .with_detail("code", "already-exists")
    }

    // Value of the `code` detail, when one was attached.
    pub fn code(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|details| details.get("code"))
            .map(String::as_str)
    }
}

/// The failing half of a command outcome.
///
/// Commands build one of these on their early-return paths and the
/// envelope is produced from it at the end, so a rejection can travel
/// through `?` regardless of the query type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    code: ErrorCode,
    errors: Vec<MessageError>,
}

impl Rejection {
    pub fn new(code: ErrorCode, error: MessageError) -> Self {
        Self {
            code,
            errors: vec![error],
        }
    }

    pub fn invalid(errors: ValidationErrors) -> Self {
        Self {
            code: ErrorCode::BAD_REQUEST,
            errors: errors.into_vec(),
        }
    }

    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BAD_REQUEST, MessageError::new(field, message))
    }

    pub fn not_found(field: impl Into<String>, entity: &str) -> Self {
        Self::new(ErrorCode::NOT_FOUND, MessageError::not_found(field, entity))
    }

    pub fn conflict(field: impl Into<String>, entity: &str) -> Self {
        Self::new(
            ErrorCode::BAD_REQUEST,
            MessageError::already_exists(field, entity),
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UNAUTHORIZED, MessageError::non_field(message))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FORBIDDEN, MessageError::non_field(message))
    }

    pub fn internal() -> Self {
        Self::new(
            ErrorCode::INTERNAL,
            MessageError::non_field("the request could not be completed"),
        )
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn errors(&self) -> &[MessageError] {
        &self.errors
    }
}

/// Uniform outcome of every command.
///
/// `status == false` always carries a non-empty `errors` list and an
/// `error_code`; `status == true` carries neither. The fields are private
/// and there are no setters, so a value that passed construction keeps
/// that shape for its whole life.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCommand<T> {
    status: bool,
    query: Option<T>,
    errors: Option<Vec<MessageError>>,
    error_code: Option<ErrorCode>,
}

impl<T> ResultCommand<T> {
    /// Builds an envelope from raw parts, rejecting any inconsistent shape.
    pub fn try_new(
        status: bool,
        query: Option<T>,
        errors: Option<Vec<MessageError>>,
        error_code: Option<u16>,
    ) -> Result<Self, EnvelopeError> {
        let error_code = match (status, error_code) {
            (true, Some(code)) => return Err(EnvelopeError::ErrorCodeOnSuccess(code)),
            (_, Some(code)) => Some(ErrorCode::new(code)?),
            (_, None) => None,
        };
        let envelope = Self {
            status,
            query,
            errors,
            error_code,
        };
        envelope.check()?;
        Ok(envelope)
    }

    // Shape check shared by every construction path.
    fn check(&self) -> Result<(), EnvelopeError> {
        let has_errors = self.errors.as_ref().is_some_and(|errors| !errors.is_empty());
        if self.status {
            if self.errors.is_some() {
                return Err(EnvelopeError::ErrorsOnSuccess);
            }
            if let Some(code) = self.error_code {
                return Err(EnvelopeError::ErrorCodeOnSuccess(code.as_u16()));
            }
            return Ok(());
        }
        if !has_errors {
            return Err(EnvelopeError::MissingErrors);
        }
        if self.error_code.is_none() {
            return Err(EnvelopeError::MissingErrorCode);
        }
        Ok(())
    }

    pub fn success(query: T) -> Self {
        Self {
            status: true,
            query: Some(query),
            errors: None,
            error_code: None,
        }
    }

    pub fn failure(rejection: Rejection) -> Self {
        // `Rejection` always holds at least one error and an in-range code.
        Self {
            status: false,
            query: None,
            errors: Some(rejection.errors),
            error_code: Some(rejection.code),
        }
    }

    pub fn invalid(errors: ValidationErrors) -> Self {
        Self::failure(Rejection::invalid(errors))
    }

    pub fn from_outcome(outcome: Result<T, Rejection>) -> Self {
        match outcome {
            Ok(query) => Self::success(query),
            Err(rejection) => Self::failure(rejection),
        }
    }

    pub fn status(&self) -> bool {
        self.status
    }

    pub fn query(&self) -> Option<&T> {
        self.query.as_ref()
    }

    pub fn into_query(self) -> Option<T> {
        self.query
    }

    pub fn errors(&self) -> Option<&[MessageError]> {
        self.errors.as_deref()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error_code
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultCommand<U> {
        ResultCommand {
            status: self.status,
            query: self.query.map(f),
            errors: self.errors,
            error_code: self.error_code,
        }
    }
}

impl<T> From<Rejection> for ResultCommand<T> {
    fn from(rejection: Rejection) -> Self {
        Self::failure(rejection)
    }
}

impl<T: Serialize> Serialize for ResultCommand<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // All four members are always present so clients can rely on the shape.
        let mut state = serializer.serialize_struct("ResultCommand", 4)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("query", &self.query)?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("error_code", &self.error_code)?;
        state.end()
    }
}

#[derive(Deserialize)]
struct RawResultCommand<T> {
    status: bool,
    query: Option<T>,
    errors: Option<Vec<MessageError>>,
    error_code: Option<u16>,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ResultCommand<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawResultCommand::<T>::deserialize(deserializer)?;
        Self::try_new(raw.status, raw.query, raw.errors, raw.error_code)
            .map_err(serde::de::Error::custom)
    }
}
